//! Path parameter extractor whose rejections use the API error body.

use axum::extract::FromRequestParts;

use crate::error::ApiError;

/// Same as [`axum::extract::Path`], but unparseable segments are reported as
/// `400 validation_error`.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
pub struct PathParams<T>(pub T);
