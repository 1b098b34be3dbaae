//! Storage traits implemented by the Postgres and in-memory stores.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use shared::pagination::Page;
use uuid::Uuid;

use crate::errors::DomainResult;
use crate::models::{LinkKind, LookupItem, LookupKind, Opportunity, Organization};
use crate::predicate::Predicate;

/// A compiled search: predicate, newest-first ordering, optional page.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchQuery {
    pub predicate: Predicate,
    pub page: Option<Page>,
}

/// Matching items plus the size of the full matching set.
#[derive(Debug, Clone)]
pub struct SearchPage {
    pub total_count: u64,
    pub items: Vec<Opportunity>,
}

/// Read access to the reference tables.
#[async_trait]
pub trait LookupStore: Send + Sync {
    async fn list(&self, kind: LookupKind) -> DomainResult<Vec<LookupItem>>;
}

#[async_trait]
pub trait OrganizationStore: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> DomainResult<Option<Organization>>;

    /// Organizations whose name contains `text`, ignoring case.
    async fn find_name_contains(&self, text: &str) -> DomainResult<Vec<Organization>>;
}

/// Persistence for the opportunity aggregate and its association tables.
#[async_trait]
pub trait OpportunityStore: Send + Sync {
    async fn find_by_id(&self, id: Uuid, include_children: bool)
        -> DomainResult<Option<Opportunity>>;

    /// Exact match on the trimmed title, ignoring Deleted opportunities.
    async fn find_by_title(&self, title: &str) -> DomainResult<Option<Opportunity>>;

    /// Children are always loaded for search results.
    async fn search(&self, query: &SearchQuery) -> DomainResult<SearchPage>;

    async fn create(&self, opportunity: &Opportunity) -> DomainResult<()>;

    /// Persists the scalar fields; children are managed through links.
    async fn update(&self, opportunity: &Opportunity) -> DomainResult<()>;

    /// Creates the missing links in one transaction. Returns how many were added.
    async fn add_links(
        &self,
        opportunity_id: Uuid,
        kind: LinkKind,
        ids: &[Uuid],
    ) -> DomainResult<u64>;

    /// Deletes the existing links in one transaction. Returns how many were removed.
    async fn remove_links(
        &self,
        opportunity_id: Uuid,
        kind: LinkKind,
        ids: &[Uuid],
    ) -> DomainResult<u64>;

    /// Up to `limit` Active/Inactive opportunities whose end date has passed,
    /// ordered by end date.
    async fn find_expirable(&self, now: DateTime<Utc>, limit: u32)
        -> DomainResult<Vec<Opportunity>>;

    /// Active/Inactive opportunities ending within `[from, to]`, ordered by end date.
    async fn find_expiring_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
        page: Page,
    ) -> DomainResult<Vec<Opportunity>>;

    /// Cheap connectivity check used by readiness probes.
    async fn ping(&self) -> DomainResult<()>;
}
