//! Domain models for the opportunity backend.

pub mod lookup;
pub mod opportunity;
pub mod principal;
pub mod search;
pub mod status;

pub use lookup::{LinkKind, LookupItem, LookupKind, Organization};
pub use opportunity::{Opportunity, OpportunityInfo, OpportunityRequest};
pub use principal::{Principal, Role};
pub use search::{
    OpportunitySearchFilter, OpportunitySearchFilterInfo, OpportunitySearchResults,
    OpportunitySearchResultsInfo,
};
pub use status::OpportunityStatus;
