//! JSON body extractor whose rejections use the API error body.

use axum::extract::FromRequest;

use crate::error::ApiError;

/// Same as [`axum::Json`], but malformed bodies are reported as
/// `400 validation_error` instead of axum's plain-text rejection.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct JsonBody<T>(pub T);
