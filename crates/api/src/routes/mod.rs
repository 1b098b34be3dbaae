//! HTTP route handlers.

pub mod health;
pub mod lookups;
pub mod opportunities;
