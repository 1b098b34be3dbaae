//! Custom Axum extractors.

pub mod json;
pub mod path;
pub mod principal;

pub use json::JsonBody;
pub use path::PathParams;
pub use principal::AdminPrincipal;
