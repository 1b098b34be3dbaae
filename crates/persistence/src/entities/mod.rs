//! Database entity definitions.
//!
//! Entities are direct mappings to database rows.

pub mod lookup;
pub mod opportunity;
pub mod organization;

pub use lookup::{LinkedLookupEntity, LookupEntity};
pub use opportunity::OpportunityEntity;
pub use organization::OrganizationEntity;
