//! Authenticated administrator extractor.

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use domain::models::Principal;

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::user_auth::{authenticate, bearer_token};

/// The caller of an administrative route.
///
/// Reads the principal stored by `require_administrator`; when the route is
/// mounted without that middleware the token is verified here instead.
#[derive(Debug, Clone)]
pub struct AdminPrincipal(pub Principal);

#[async_trait]
impl FromRequestParts<AppState> for AdminPrincipal {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(principal) = parts.extensions.get::<Principal>() {
            return Ok(AdminPrincipal(principal.clone()));
        }

        let token = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(bearer_token)
            .ok_or_else(|| ApiError::Unauthorized("Missing Authorization header".to_string()))?;

        let principal = authenticate(&state.jwt, token)?;
        if !principal.is_administrator() {
            return Err(ApiError::Forbidden(
                "Administrator role required".to_string(),
            ));
        }
        Ok(AdminPrincipal(principal))
    }
}
