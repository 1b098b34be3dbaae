//! Opportunity domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use super::lookup::LookupItem;
use super::status::OpportunityStatus;

/// Separator used when keywords are persisted as one string.
pub const KEYWORD_SEPARATOR: &str = " ";

/// Joins keywords for storage; an empty list is stored as null.
pub fn join_keywords(keywords: &[String]) -> Option<String> {
    let joined = keywords
        .iter()
        .map(|k| k.trim())
        .filter(|k| !k.is_empty())
        .collect::<Vec<_>>()
        .join(KEYWORD_SEPARATOR);
    (!joined.is_empty()).then_some(joined)
}

/// Splits a persisted keyword string back into a list.
pub fn split_keywords(value: &str) -> Vec<String> {
    value
        .split(KEYWORD_SEPARATOR)
        .filter(|k| !k.is_empty())
        .map(str::to_string)
        .collect()
}

/// The opportunity aggregate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Opportunity {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub type_id: Uuid,
    pub type_name: String,
    pub organization_id: Uuid,
    pub organization_name: String,
    pub instructions: Option<String>,
    pub url: Option<String>,
    pub zlto_reward: Option<f64>,
    pub yoma_reward: Option<f64>,
    pub zlto_reward_pool: Option<f64>,
    pub yoma_reward_pool: Option<f64>,
    pub verification_supported: bool,
    pub difficulty_id: Uuid,
    pub difficulty_name: String,
    pub commitment_interval_id: Uuid,
    pub commitment_interval_name: String,
    pub commitment_interval_count: i16,
    pub participant_limit: Option<i32>,
    pub participant_count: Option<i32>,
    pub keywords: Option<Vec<String>>,
    pub date_start: DateTime<Utc>,
    pub date_end: Option<DateTime<Utc>>,
    pub status: OpportunityStatus,
    pub created_by: String,
    pub date_created: DateTime<Utc>,
    pub modified_by: String,
    pub date_modified: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub categories: Option<Vec<LookupItem>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub countries: Option<Vec<LookupItem>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub languages: Option<Vec<LookupItem>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skills: Option<Vec<LookupItem>>,
}

impl Opportunity {
    /// Current participant count, absent counts as zero.
    pub fn participants(&self) -> i32 {
        self.participant_count.unwrap_or(0)
    }

    /// Strips the child collections, as returned when children are not requested.
    pub fn without_children(mut self) -> Self {
        self.categories = None;
        self.countries = None;
        self.languages = None;
        self.skills = None;
        self
    }
}

/// Public projection of an opportunity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpportunityInfo {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    #[serde(rename = "type")]
    pub type_name: String,
    pub organization: String,
    pub instructions: Option<String>,
    pub url: Option<String>,
    pub zlto_reward: Option<f64>,
    pub yoma_reward: Option<f64>,
    pub verification_supported: bool,
    pub difficulty: String,
    pub commitment_interval: String,
    pub commitment_interval_count: i16,
    pub participant_limit: Option<i32>,
    pub participant_count: Option<i32>,
    pub keywords: Option<Vec<String>>,
    pub date_start: DateTime<Utc>,
    pub date_end: Option<DateTime<Utc>>,
    pub status: OpportunityStatus,
    pub categories: Vec<LookupItem>,
    pub countries: Vec<LookupItem>,
    pub languages: Vec<LookupItem>,
    pub skills: Vec<LookupItem>,
}

impl From<Opportunity> for OpportunityInfo {
    fn from(o: Opportunity) -> Self {
        Self {
            id: o.id,
            title: o.title,
            description: o.description,
            type_name: o.type_name,
            organization: o.organization_name,
            instructions: o.instructions,
            url: o.url,
            zlto_reward: o.zlto_reward,
            yoma_reward: o.yoma_reward,
            verification_supported: o.verification_supported,
            difficulty: o.difficulty_name,
            commitment_interval: o.commitment_interval_name,
            commitment_interval_count: o.commitment_interval_count,
            participant_limit: o.participant_limit,
            participant_count: o.participant_count,
            keywords: o.keywords,
            date_start: o.date_start,
            date_end: o.date_end,
            status: o.status,
            categories: o.categories.unwrap_or_default(),
            countries: o.countries.unwrap_or_default(),
            languages: o.languages.unwrap_or_default(),
            skills: o.skills.unwrap_or_default(),
        }
    }
}

/// Create-or-update payload. A missing id creates a new opportunity.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_date_range"))]
pub struct OpportunityRequest {
    pub id: Option<Uuid>,

    #[validate(
        length(min = 1, max = 255, message = "Title must be 1-255 characters"),
        custom(function = "shared::validation::validate_not_blank")
    )]
    pub title: String,

    #[validate(custom(function = "shared::validation::validate_not_blank"))]
    pub description: String,

    pub type_id: Uuid,

    pub organization_id: Uuid,

    pub instructions: Option<String>,

    #[validate(
        url(message = "Url must be a valid URL"),
        length(max = 2048, message = "Url must be at most 2048 characters")
    )]
    pub url: Option<String>,

    #[validate(range(min = 0.0, message = "Zlto reward must not be negative"))]
    pub zlto_reward: Option<f64>,

    #[validate(range(min = 0.0, message = "Yoma reward must not be negative"))]
    pub yoma_reward: Option<f64>,

    #[validate(range(min = 0.0, message = "Zlto reward pool must not be negative"))]
    pub zlto_reward_pool: Option<f64>,

    #[validate(range(min = 0.0, message = "Yoma reward pool must not be negative"))]
    pub yoma_reward_pool: Option<f64>,

    #[serde(default)]
    pub verification_supported: bool,

    pub difficulty_id: Uuid,

    pub commitment_interval_id: Uuid,

    #[validate(range(min = 1, message = "Commitment interval count must be at least 1"))]
    pub commitment_interval_count: i16,

    #[validate(range(min = 1, message = "Participant limit must be at least 1"))]
    pub participant_limit: Option<i32>,

    #[validate(custom(function = "shared::validation::validate_keywords"))]
    pub keywords: Option<Vec<String>>,

    pub date_start: DateTime<Utc>,

    pub date_end: Option<DateTime<Utc>>,

    #[serde(default)]
    pub post_as_active: bool,
}

fn validate_date_range(request: &OpportunityRequest) -> Result<(), ValidationError> {
    match request.date_end {
        Some(end) if end < request.date_start => {
            let mut err = ValidationError::new("date_range");
            err.message = Some("End date must not be earlier than start date".into());
            Err(err)
        }
        _ => Ok(()),
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn valid() -> OpportunityRequest {
        fixtures::request(
            "Beach cleanup",
            Uuid::new_v4(),
            Uuid::new_v4(),
            Uuid::new_v4(),
            Uuid::new_v4(),
        )
    }

    #[test]
    fn test_keywords_round_trip_through_separator() {
        let keywords = vec!["climate".to_string(), "ocean".to_string()];
        let joined = join_keywords(&keywords).unwrap();
        assert_eq!(joined, "climate ocean");
        assert_eq!(split_keywords(&joined), keywords);
        assert_eq!(join_keywords(&[]), None);
    }

    #[test]
    fn test_valid_request() {
        assert!(valid().validate().is_ok());
    }

    #[test]
    fn test_request_rejects_long_title() {
        let mut request = valid();
        request.title = "x".repeat(256);
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_request_rejects_blank_title() {
        let mut request = valid();
        request.title = "   ".to_string();
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_request_rejects_negative_reward() {
        let mut request = valid();
        request.zlto_reward = Some(-1.0);
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_request_rejects_zero_participant_limit() {
        let mut request = valid();
        request.participant_limit = Some(0);
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_request_rejects_end_before_start() {
        let mut request = valid();
        request.date_end = Some(request.date_start - Duration::days(1));
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_request_rejects_blank_keyword() {
        let mut request = valid();
        request.keywords = Some(vec!["ok".to_string(), "".to_string()]);
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_request_rejects_overlong_url() {
        let mut request = valid();
        request.url = Some(format!("https://example.org/{}", "a".repeat(2048)));
        let errors = request.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("url"));
    }

    #[test]
    fn test_request_rejects_overlong_keyword_list() {
        let mut request = valid();
        request.keywords = Some((0..30).map(|i| format!("{:0>99}", i)).collect());
        let errors = request.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("keywords"));
    }
}
