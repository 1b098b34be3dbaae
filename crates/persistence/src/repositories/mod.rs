//! Repository implementations.
//!
//! Repositories provide the database operations behind the domain storage traits.

pub mod lookup;
pub mod opportunity;
pub mod organization;

pub use lookup::LookupRepository;
pub use opportunity::OpportunityRepository;
pub use organization::OrganizationRepository;
