//! Shared utilities and common types for the opportunity backend.
//!
//! This crate provides common functionality used across all other crates:
//! - Bearer token verification (and minting for tooling)
//! - Page-number pagination
//! - Day-boundary date normalization
//! - Common validation logic

pub mod dates;
pub mod jwt;
pub mod pagination;
pub mod validation;
