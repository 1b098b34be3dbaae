//! Persistence layer for the opportunity backend.
//!
//! This crate contains:
//! - Database connection management
//! - Entity definitions (database row mappings)
//! - Repository implementations of the domain storage traits
//! - SQL compilation of search predicates

pub mod db;
pub mod entities;
pub mod error;
pub mod metrics;
pub mod repositories;
pub mod sql;

pub use repositories::{LookupRepository, OpportunityRepository, OrganizationRepository};
