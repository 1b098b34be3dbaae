//! Domain layer for the opportunity backend.
//!
//! This crate contains:
//! - Domain models (Opportunity, lookups, search filters)
//! - The search predicate tree and status lifecycle rules
//! - Storage traits with an in-memory implementation
//! - Business logic services
//! - Domain error types

pub mod cache;
pub mod errors;
pub mod lifecycle;
pub mod memory;
pub mod models;
pub mod predicate;
pub mod services;
pub mod store;

pub use errors::{DomainError, DomainResult};
