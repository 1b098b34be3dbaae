//! Reference data lists for the administrative UI.

use axum::{extract::State, Json};
use domain::models::{LookupItem, LookupKind};
use tracing::info;

use crate::app::AppState;
use crate::error::ApiError;

async fn list(state: &AppState, kind: LookupKind) -> Result<Json<Vec<LookupItem>>, ApiError> {
    info!(kind = kind.as_str(), "Handling request for lookup list");
    let items = state.lookups.list(kind).await?;
    info!(kind = kind.as_str(), count = items.len(), "Request for lookup list handled");
    Ok(Json(items))
}

/// GET /api/v3/opportunity/category
pub async fn list_categories(
    State(state): State<AppState>,
) -> Result<Json<Vec<LookupItem>>, ApiError> {
    list(&state, LookupKind::Category).await
}

/// GET /api/v3/opportunity/difficulty
pub async fn list_difficulties(
    State(state): State<AppState>,
) -> Result<Json<Vec<LookupItem>>, ApiError> {
    list(&state, LookupKind::Difficulty).await
}

/// GET /api/v3/opportunity/status
pub async fn list_statuses(
    State(state): State<AppState>,
) -> Result<Json<Vec<LookupItem>>, ApiError> {
    list(&state, LookupKind::Status).await
}

/// GET /api/v3/opportunity/type
pub async fn list_types(
    State(state): State<AppState>,
) -> Result<Json<Vec<LookupItem>>, ApiError> {
    list(&state, LookupKind::Type).await
}
