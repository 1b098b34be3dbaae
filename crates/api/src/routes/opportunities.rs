//! Opportunity endpoint handlers.

use axum::{
    extract::State,
    Json,
};
use domain::models::{
    LinkKind, Opportunity, OpportunityInfo, OpportunityRequest, OpportunitySearchFilter,
    OpportunitySearchFilterInfo, OpportunitySearchResults, OpportunitySearchResultsInfo,
    OpportunityStatus,
};
use tracing::info;
use uuid::Uuid;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::{AdminPrincipal, JsonBody, PathParams};
use crate::middleware::metrics::record_opportunity_mutation;

fn parse_status(value: &str) -> Result<OpportunityStatus, ApiError> {
    OpportunityStatus::parse(value)
        .ok_or_else(|| ApiError::Validation(format!("Unknown opportunity status '{value}'")))
}

fn parse_link_kind(value: &str) -> Result<LinkKind, ApiError> {
    LinkKind::parse(value).ok_or_else(|| {
        ApiError::Validation(format!(
            "Unknown association '{value}'; expected categories, countries, languages or skills"
        ))
    })
}

/// Public projection of a single opportunity.
///
/// GET /api/v3/opportunity/:id/info
pub async fn get_info_by_id(
    State(state): State<AppState>,
    PathParams(id): PathParams<Uuid>,
) -> Result<Json<OpportunityInfo>, ApiError> {
    info!(opportunity_id = %id, "Handling request for opportunity info");
    let result = state.opportunities.get_info_by_id(id).await?;
    info!(opportunity_id = %id, "Request for opportunity info handled");
    Ok(Json(result))
}

/// Public search over active opportunities.
///
/// POST /api/v3/opportunity/info/search
pub async fn search_info(
    State(state): State<AppState>,
    JsonBody(filter): JsonBody<OpportunitySearchFilterInfo>,
) -> Result<Json<OpportunitySearchResultsInfo>, ApiError> {
    info!(
        value_contains = filter.value_contains.as_deref().unwrap_or_default(),
        "Handling request for public opportunity search"
    );
    let results = state.opportunities.search_info(filter).await?;
    info!(
        items = results.items.len(),
        total_count = ?results.total_count,
        "Request for public opportunity search handled"
    );
    Ok(Json(results))
}

/// GET /api/v3/opportunity/:id
pub async fn get_by_id(
    State(state): State<AppState>,
    PathParams(id): PathParams<Uuid>,
) -> Result<Json<Opportunity>, ApiError> {
    info!(opportunity_id = %id, "Handling request for opportunity");
    let opportunity = state.opportunities.get_by_id(id, true).await?;
    info!(opportunity_id = %id, "Request for opportunity handled");
    Ok(Json(opportunity))
}

/// POST /api/v3/opportunity/search
pub async fn search(
    State(state): State<AppState>,
    JsonBody(filter): JsonBody<OpportunitySearchFilter>,
) -> Result<Json<OpportunitySearchResults>, ApiError> {
    info!("Handling request for opportunity search");
    let results = state.opportunities.search(&filter).await?;
    info!(
        items = results.items.len(),
        total_count = ?results.total_count,
        "Request for opportunity search handled"
    );
    Ok(Json(results))
}

/// Creates the opportunity when the body has no `id`, otherwise updates it.
///
/// POST /api/v3/opportunity
pub async fn upsert(
    State(state): State<AppState>,
    AdminPrincipal(principal): AdminPrincipal,
    JsonBody(request): JsonBody<OpportunityRequest>,
) -> Result<Json<Opportunity>, ApiError> {
    info!(
        opportunity_id = ?request.id,
        username = %principal.username,
        "Handling request to upsert opportunity"
    );
    let opportunity = state.opportunities.upsert(request, &principal).await?;
    record_opportunity_mutation("upsert");
    info!(opportunity_id = %opportunity.id, "Request to upsert opportunity handled");
    Ok(Json(opportunity))
}

/// PUT /api/v3/opportunity/:id/status/:status
pub async fn update_status(
    State(state): State<AppState>,
    AdminPrincipal(principal): AdminPrincipal,
    PathParams((id, status)): PathParams<(Uuid, String)>,
) -> Result<Json<Opportunity>, ApiError> {
    let status = parse_status(&status)?;
    info!(
        opportunity_id = %id,
        status = %status,
        username = %principal.username,
        "Handling request to update opportunity status"
    );
    let opportunity = state
        .opportunities
        .update_status(id, status, &principal)
        .await?;
    record_opportunity_mutation("update_status");
    info!(opportunity_id = %id, "Request to update opportunity status handled");
    Ok(Json(opportunity))
}

/// Body is a JSON array of reference ids.
///
/// PUT /api/v3/opportunity/:id/assign/:kind
pub async fn assign(
    State(state): State<AppState>,
    AdminPrincipal(principal): AdminPrincipal,
    PathParams((id, kind)): PathParams<(Uuid, String)>,
    JsonBody(ids): JsonBody<Vec<Uuid>>,
) -> Result<Json<Opportunity>, ApiError> {
    let kind = parse_link_kind(&kind)?;
    info!(
        opportunity_id = %id,
        kind = kind.plural(),
        count = ids.len(),
        "Handling request to assign opportunity links"
    );
    let opportunity = state
        .opportunities
        .assign(id, kind, &ids, &principal)
        .await?;
    record_opportunity_mutation("assign");
    info!(opportunity_id = %id, "Request to assign opportunity links handled");
    Ok(Json(opportunity))
}

/// DELETE /api/v3/opportunity/:id/remove/:kind
pub async fn remove(
    State(state): State<AppState>,
    AdminPrincipal(principal): AdminPrincipal,
    PathParams((id, kind)): PathParams<(Uuid, String)>,
    JsonBody(ids): JsonBody<Vec<Uuid>>,
) -> Result<Json<Opportunity>, ApiError> {
    let kind = parse_link_kind(&kind)?;
    info!(
        opportunity_id = %id,
        kind = kind.plural(),
        count = ids.len(),
        "Handling request to remove opportunity links"
    );
    let opportunity = state
        .opportunities
        .remove(id, kind, &ids, &principal)
        .await?;
    record_opportunity_mutation("remove");
    info!(opportunity_id = %id, "Request to remove opportunity links handled");
    Ok(Json(opportunity))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_status() {
        assert_eq!(parse_status("inactive").unwrap(), OpportunityStatus::Inactive);
        assert!(matches!(parse_status("archived"), Err(ApiError::Validation(_))));
    }

    #[test]
    fn test_parse_link_kind() {
        assert_eq!(parse_link_kind("skills").unwrap(), LinkKind::Skill);
        assert!(matches!(parse_link_kind("skill"), Err(ApiError::Validation(_))));
    }
}
