//! Domain services for the opportunity backend.
//!
//! Services contain business logic that operates on domain models.

pub mod lookup;
pub mod notification;
pub mod opportunity;

pub use lookup::LookupService;
pub use notification::{
    ExpirationNotifier, ExpiringOpportunity, LoggingExpirationNotifier, MockExpirationNotifier,
    NotificationResult,
};
pub use opportunity::OpportunityService;
