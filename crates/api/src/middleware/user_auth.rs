//! Bearer token authentication for the administrative routes.

use axum::{
    body::Body,
    extract::State,
    http::{header, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};
use domain::models::Principal;
use shared::jwt::{JwtConfig, JwtError};

use crate::app::AppState;
use crate::error::ApiError;

/// Pulls the token out of an `Authorization: Bearer <token>` header value.
pub fn bearer_token(value: &str) -> Option<&str> {
    value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Verifies the token and builds the caller from its claims.
pub fn authenticate(jwt: &JwtConfig, token: &str) -> Result<Principal, ApiError> {
    let claims = jwt.validate_token(token).map_err(|e| {
        tracing::debug!(error = %e, "Token validation failed");
        match e {
            JwtError::TokenExpired => ApiError::Unauthorized("Token has expired".to_string()),
            _ => ApiError::Unauthorized("Invalid token".to_string()),
        }
    })?;

    if claims.sub.trim().is_empty() {
        return Err(ApiError::Unauthorized(
            "Token does not identify a user".to_string(),
        ));
    }

    Ok(Principal::from_claims(claims.sub.trim(), &claims.roles))
}

/// Requires a valid bearer token carrying `Admin` or `OrganizationAdmin`.
///
/// Missing or invalid tokens get 401, an authenticated caller without one
/// of those roles gets 403. The [`Principal`] is stored in request
/// extensions for handlers.
pub async fn require_administrator(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let token = match req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(bearer_token)
    {
        Some(token) => token.to_string(),
        None => {
            return ApiError::Unauthorized("Missing or invalid Authorization header".to_string())
                .into_response()
        }
    };

    let principal = match authenticate(&state.jwt, &token) {
        Ok(principal) => principal,
        Err(e) => return e.into_response(),
    };

    if !principal.is_administrator() {
        tracing::info!(username = %principal.username, "Administrative access denied");
        return ApiError::Forbidden("Administrator role required".to_string()).into_response();
    }

    req.extensions_mut().insert(principal);
    next.run(req).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::models::Role;

    fn jwt() -> JwtConfig {
        JwtConfig::new_for_testing("user-auth-test-secret")
    }

    #[test]
    fn test_bearer_token() {
        assert_eq!(bearer_token("Bearer abc.def"), Some("abc.def"));
        assert_eq!(bearer_token("Bearer   "), None);
        assert_eq!(bearer_token("Basic abc"), None);
        assert_eq!(bearer_token("abc"), None);
    }

    #[test]
    fn test_authenticate_valid_token() {
        let jwt = jwt();
        let (token, _) = jwt.issue_token("admin@example.org", &["Admin"]).unwrap();

        let principal = authenticate(&jwt, &token).unwrap();
        assert_eq!(principal.username, "admin@example.org");
        assert_eq!(principal.roles, vec![Role::Admin]);
    }

    #[test]
    fn test_authenticate_invalid_token() {
        let err = authenticate(&jwt(), "not-a-token").unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized(_)));
    }

    #[test]
    fn test_authenticate_wrong_secret() {
        let (token, _) = JwtConfig::new_for_testing("other-secret")
            .issue_token("admin@example.org", &["Admin"])
            .unwrap();
        assert!(authenticate(&jwt(), &token).is_err());
    }

    #[test]
    fn test_authenticate_blank_subject() {
        let jwt = jwt();
        let (token, _) = jwt.issue_token("  ", &["Admin"]).unwrap();
        assert!(matches!(
            authenticate(&jwt, &token),
            Err(ApiError::Unauthorized(_))
        ));
    }
}
