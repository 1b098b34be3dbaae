//! Search filter and result models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::opportunity::{Opportunity, OpportunityInfo};
use super::status::OpportunityStatus;

/// Administrative search filter. Empty lists behave like absent ones.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpportunitySearchFilter {
    pub organization_id: Option<Uuid>,
    pub type_ids: Option<Vec<Uuid>>,
    pub category_ids: Option<Vec<Uuid>>,
    pub language_ids: Option<Vec<Uuid>>,
    pub country_ids: Option<Vec<Uuid>>,
    pub statuses: Option<Vec<OpportunityStatus>>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub value_contains: Option<String>,
    pub page_number: Option<i64>,
    pub page_size: Option<i64>,
}

/// Public search filter; status is always forced to Active.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpportunitySearchFilterInfo {
    pub type_ids: Option<Vec<Uuid>>,
    pub category_ids: Option<Vec<Uuid>>,
    pub language_ids: Option<Vec<Uuid>>,
    pub country_ids: Option<Vec<Uuid>>,
    pub value_contains: Option<String>,
    pub page_number: Option<i64>,
    pub page_size: Option<i64>,
}

impl From<OpportunitySearchFilterInfo> for OpportunitySearchFilter {
    fn from(f: OpportunitySearchFilterInfo) -> Self {
        Self {
            organization_id: None,
            type_ids: f.type_ids,
            category_ids: f.category_ids,
            language_ids: f.language_ids,
            country_ids: f.country_ids,
            statuses: Some(vec![OpportunityStatus::Active]),
            start_date: None,
            end_date: None,
            value_contains: f.value_contains,
            page_number: f.page_number,
            page_size: f.page_size,
        }
    }
}

/// Search results; `total_count` is only set for paginated searches.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OpportunitySearchResults {
    pub total_count: Option<u64>,
    pub items: Vec<Opportunity>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OpportunitySearchResultsInfo {
    pub total_count: Option<u64>,
    pub items: Vec<OpportunityInfo>,
}

impl From<OpportunitySearchResults> for OpportunitySearchResultsInfo {
    fn from(r: OpportunitySearchResults) -> Self {
        Self {
            total_count: r.total_count,
            items: r.items.into_iter().map(OpportunityInfo::from).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_info_filter_forces_active() {
        let filter: OpportunitySearchFilter = OpportunitySearchFilterInfo {
            value_contains: Some("beach".to_string()),
            ..Default::default()
        }
        .into();
        assert_eq!(filter.statuses, Some(vec![OpportunityStatus::Active]));
        assert_eq!(filter.value_contains.as_deref(), Some("beach"));
        assert!(filter.organization_id.is_none());
    }

    #[test]
    fn test_filter_deserializes_camel_case() {
        let filter: OpportunitySearchFilter = serde_json::from_str(
            r#"{"typeIds":[],"statuses":["Active","Inactive"],"pageNumber":2,"pageSize":5}"#,
        )
        .unwrap();
        assert_eq!(filter.type_ids, Some(vec![]));
        assert_eq!(filter.statuses.map(|s| s.len()), Some(2));
        assert_eq!(filter.page_number, Some(2));
    }
}
