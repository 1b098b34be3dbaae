//! In-memory implementation of the storage traits.
//!
//! Used by the test suites and for running the API without a database.
//! Search goes through [`Predicate::matches`], the same tree the Postgres
//! store compiles to SQL.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use shared::pagination::Page;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::errors::{DomainError, DomainResult};
use crate::models::{
    LinkKind, LookupItem, LookupKind, Opportunity, OpportunityStatus, Organization,
};
use crate::store::{LookupStore, OpportunityStore, OrganizationStore, SearchPage, SearchQuery};

#[derive(Debug, Clone)]
struct Link {
    opportunity_id: Uuid,
    kind: LinkKind,
    target_id: Uuid,
}

#[derive(Default)]
pub struct InMemoryStore {
    lookups: RwLock<HashMap<LookupKind, Vec<LookupItem>>>,
    lookup_loads: RwLock<HashMap<LookupKind, usize>>,
    organizations: RwLock<Vec<Organization>>,
    opportunities: RwLock<Vec<Opportunity>>,
    links: RwLock<Vec<Link>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the rows of one reference table.
    pub async fn set_lookups(&self, kind: LookupKind, items: Vec<LookupItem>) {
        self.lookups.write().await.insert(kind, items);
    }

    /// Adds a reference row and returns it.
    pub async fn add_lookup(&self, kind: LookupKind, name: &str) -> LookupItem {
        let item = LookupItem::new(Uuid::new_v4(), name);
        self.lookups
            .write()
            .await
            .entry(kind)
            .or_default()
            .push(item.clone());
        item
    }

    pub async fn add_organization(&self, name: &str) -> Organization {
        let organization = Organization {
            id: Uuid::new_v4(),
            name: name.to_string(),
        };
        self.organizations.write().await.push(organization.clone());
        organization
    }

    /// Stores an aggregate as-is, including links for any loaded children.
    pub async fn insert_opportunity(&self, opportunity: Opportunity) {
        let mut links = self.links.write().await;
        for kind in LinkKind::ALL {
            for item in children(&opportunity, kind) {
                links.push(Link {
                    opportunity_id: opportunity.id,
                    kind,
                    target_id: item.id,
                });
            }
        }
        self.opportunities
            .write()
            .await
            .push(opportunity.without_children());
    }

    /// How many times `list` has read the given reference table.
    pub async fn lookup_loads(&self, kind: LookupKind) -> usize {
        self.lookup_loads
            .read()
            .await
            .get(&kind)
            .copied()
            .unwrap_or(0)
    }

    /// Number of link rows of one kind for an opportunity.
    pub async fn link_count(&self, opportunity_id: Uuid, kind: LinkKind) -> usize {
        self.links
            .read()
            .await
            .iter()
            .filter(|l| l.opportunity_id == opportunity_id && l.kind == kind)
            .count()
    }

    async fn hydrate(&self, mut opportunity: Opportunity) -> Opportunity {
        let links = self.links.read().await;
        let lookups = self.lookups.read().await;

        let resolve = |kind: LinkKind| -> Vec<LookupItem> {
            let table = lookups.get(&kind.lookup_kind());
            links
                .iter()
                .filter(|l| l.opportunity_id == opportunity.id && l.kind == kind)
                .filter_map(|l| {
                    table.and_then(|t| t.iter().find(|item| item.id == l.target_id).cloned())
                })
                .collect()
        };

        let categories = resolve(LinkKind::Category);
        let countries = resolve(LinkKind::Country);
        let languages = resolve(LinkKind::Language);
        let skills = resolve(LinkKind::Skill);
        opportunity.categories = Some(categories);
        opportunity.countries = Some(countries);
        opportunity.languages = Some(languages);
        opportunity.skills = Some(skills);
        opportunity
    }

    async fn snapshot(&self) -> Vec<Opportunity> {
        let rows = self.opportunities.read().await.clone();
        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            out.push(self.hydrate(row).await);
        }
        out
    }
}

fn children(opportunity: &Opportunity, kind: LinkKind) -> &[LookupItem] {
    let list = match kind {
        LinkKind::Category => &opportunity.categories,
        LinkKind::Country => &opportunity.countries,
        LinkKind::Language => &opportunity.languages,
        LinkKind::Skill => &opportunity.skills,
    };
    list.as_deref().unwrap_or(&[])
}

#[async_trait]
impl LookupStore for InMemoryStore {
    async fn list(&self, kind: LookupKind) -> DomainResult<Vec<LookupItem>> {
        *self.lookup_loads.write().await.entry(kind).or_insert(0) += 1;
        Ok(self
            .lookups
            .read()
            .await
            .get(&kind)
            .cloned()
            .unwrap_or_default())
    }
}

#[async_trait]
impl OrganizationStore for InMemoryStore {
    async fn find_by_id(&self, id: Uuid) -> DomainResult<Option<Organization>> {
        Ok(self
            .organizations
            .read()
            .await
            .iter()
            .find(|o| o.id == id)
            .cloned())
    }

    async fn find_name_contains(&self, text: &str) -> DomainResult<Vec<Organization>> {
        let needle = text.to_lowercase();
        Ok(self
            .organizations
            .read()
            .await
            .iter()
            .filter(|o| o.name.to_lowercase().contains(&needle))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl OpportunityStore for InMemoryStore {
    async fn find_by_id(
        &self,
        id: Uuid,
        include_children: bool,
    ) -> DomainResult<Option<Opportunity>> {
        let found = self
            .opportunities
            .read()
            .await
            .iter()
            .find(|o| o.id == id)
            .cloned();
        match found {
            Some(o) if include_children => Ok(Some(self.hydrate(o).await)),
            other => Ok(other),
        }
    }

    async fn find_by_title(&self, title: &str) -> DomainResult<Option<Opportunity>> {
        let title = title.trim();
        Ok(self
            .opportunities
            .read()
            .await
            .iter()
            .find(|o| o.title == title && o.status != OpportunityStatus::Deleted)
            .cloned())
    }

    async fn search(&self, query: &SearchQuery) -> DomainResult<SearchPage> {
        let mut items: Vec<Opportunity> = self
            .snapshot()
            .await
            .into_iter()
            .filter(|o| query.predicate.matches(o))
            .collect();
        items.sort_by(|a, b| b.date_created.cmp(&a.date_created));

        let total_count = items.len() as u64;
        let items = match query.page {
            Some(page) => page.slice(items),
            None => items,
        };
        Ok(SearchPage { total_count, items })
    }

    async fn create(&self, opportunity: &Opportunity) -> DomainResult<()> {
        self.insert_opportunity(opportunity.clone()).await;
        Ok(())
    }

    async fn update(&self, opportunity: &Opportunity) -> DomainResult<()> {
        let mut rows = self.opportunities.write().await;
        let row = rows
            .iter_mut()
            .find(|o| o.id == opportunity.id)
            .ok_or_else(|| DomainError::not_found("Opportunity", opportunity.id))?;
        *row = opportunity.clone().without_children();
        Ok(())
    }

    async fn add_links(
        &self,
        opportunity_id: Uuid,
        kind: LinkKind,
        ids: &[Uuid],
    ) -> DomainResult<u64> {
        let mut links = self.links.write().await;
        let mut added = 0;
        for &target_id in ids {
            let exists = links.iter().any(|l| {
                l.opportunity_id == opportunity_id && l.kind == kind && l.target_id == target_id
            });
            if !exists {
                links.push(Link {
                    opportunity_id,
                    kind,
                    target_id,
                });
                added += 1;
            }
        }
        Ok(added)
    }

    async fn remove_links(
        &self,
        opportunity_id: Uuid,
        kind: LinkKind,
        ids: &[Uuid],
    ) -> DomainResult<u64> {
        let mut links = self.links.write().await;
        let before = links.len();
        links.retain(|l| {
            !(l.opportunity_id == opportunity_id && l.kind == kind && ids.contains(&l.target_id))
        });
        Ok((before - links.len()) as u64)
    }

    async fn find_expirable(
        &self,
        now: DateTime<Utc>,
        limit: u32,
    ) -> DomainResult<Vec<Opportunity>> {
        let mut due: Vec<Opportunity> = self
            .opportunities
            .read()
            .await
            .iter()
            .filter(|o| o.status.is_expirable() && o.date_end.is_some_and(|end| end <= now))
            .cloned()
            .collect();
        due.sort_by_key(|o| o.date_end);
        due.truncate(limit as usize);
        Ok(due)
    }

    async fn find_expiring_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
        page: Page,
    ) -> DomainResult<Vec<Opportunity>> {
        let mut expiring: Vec<Opportunity> = self
            .opportunities
            .read()
            .await
            .iter()
            .filter(|o| {
                o.status.is_expirable()
                    && o.date_end.is_some_and(|end| end >= from && end <= to)
            })
            .cloned()
            .collect();
        expiring.sort_by_key(|o| o.date_end);
        Ok(page.slice(expiring))
    }

    async fn ping(&self) -> DomainResult<()> {
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::predicate::Predicate;
    use chrono::Duration;

    /// An Active opportunity that started yesterday, with empty children.
    pub(crate) fn sample_opportunity(title: &str) -> Opportunity {
        let now = Utc::now();
        Opportunity {
            id: Uuid::new_v4(),
            title: title.to_string(),
            description: format!("{title} description"),
            type_id: Uuid::new_v4(),
            type_name: "Task".to_string(),
            organization_id: Uuid::new_v4(),
            organization_name: "Org".to_string(),
            instructions: None,
            url: None,
            zlto_reward: None,
            yoma_reward: None,
            zlto_reward_pool: None,
            yoma_reward_pool: None,
            verification_supported: false,
            difficulty_id: Uuid::new_v4(),
            difficulty_name: "Beginner".to_string(),
            commitment_interval_id: Uuid::new_v4(),
            commitment_interval_name: "Day".to_string(),
            commitment_interval_count: 1,
            participant_limit: None,
            participant_count: None,
            keywords: None,
            date_start: now - Duration::days(1),
            date_end: None,
            status: OpportunityStatus::Active,
            created_by: "admin".to_string(),
            date_created: now,
            modified_by: "admin".to_string(),
            date_modified: now,
            categories: Some(vec![]),
            countries: Some(vec![]),
            languages: Some(vec![]),
            skills: Some(vec![]),
        }
    }

    #[tokio::test]
    async fn test_links_are_unique_per_pair() {
        let store = InMemoryStore::new();
        let o = sample_opportunity("Links");
        store.create(&o).await.unwrap();
        let category = Uuid::new_v4();

        assert_eq!(store.add_links(o.id, LinkKind::Category, &[category]).await.unwrap(), 1);
        assert_eq!(store.add_links(o.id, LinkKind::Category, &[category]).await.unwrap(), 0);
        assert_eq!(store.link_count(o.id, LinkKind::Category).await, 1);

        assert_eq!(
            store
                .remove_links(o.id, LinkKind::Category, &[category, Uuid::new_v4()])
                .await
                .unwrap(),
            1
        );
        assert_eq!(store.link_count(o.id, LinkKind::Category).await, 0);
    }

    #[tokio::test]
    async fn test_children_resolve_through_lookups() {
        let store = InMemoryStore::new();
        let skill = store.add_lookup(LookupKind::Skill, "Rust").await;
        let o = sample_opportunity("Children");
        store.create(&o).await.unwrap();
        store.add_links(o.id, LinkKind::Skill, &[skill.id]).await.unwrap();

        let loaded = OpportunityStore::find_by_id(&store, o.id, true).await.unwrap().unwrap();
        assert_eq!(loaded.skills, Some(vec![skill]));

        let bare = OpportunityStore::find_by_id(&store, o.id, false).await.unwrap().unwrap();
        assert!(bare.skills.is_none());
    }

    #[tokio::test]
    async fn test_find_by_title_skips_deleted() {
        let store = InMemoryStore::new();
        let mut deleted = sample_opportunity("Reused");
        deleted.status = OpportunityStatus::Deleted;
        store.create(&deleted).await.unwrap();

        assert!(store.find_by_title(" Reused ").await.unwrap().is_none());

        let live = sample_opportunity("Reused");
        store.create(&live).await.unwrap();
        let found = store.find_by_title("Reused").await.unwrap().unwrap();
        assert_eq!(found.id, live.id);
    }

    #[tokio::test]
    async fn test_search_orders_newest_first_and_pages() {
        let store = InMemoryStore::new();
        for i in 0..5 {
            let mut o = sample_opportunity(&format!("Item {i}"));
            o.date_created = Utc::now() - Duration::hours(i);
            store.create(&o).await.unwrap();
        }

        let page = store
            .search(&SearchQuery {
                predicate: Predicate::True,
                page: Some(Page { number: 2, size: 2 }),
            })
            .await
            .unwrap();
        assert_eq!(page.total_count, 5);
        let titles: Vec<_> = page.items.iter().map(|o| o.title.as_str()).collect();
        assert_eq!(titles, vec!["Item 2", "Item 3"]);
    }

    #[tokio::test]
    async fn test_find_expirable_orders_by_end_date() {
        let store = InMemoryStore::new();
        let now = Utc::now();
        for (title, days, status) in [
            ("late", 1, OpportunityStatus::Active),
            ("early", 3, OpportunityStatus::Inactive),
            ("deleted", 5, OpportunityStatus::Deleted),
            ("future", -2, OpportunityStatus::Active),
        ] {
            let mut o = sample_opportunity(title);
            o.status = status;
            o.date_end = Some(now - Duration::days(days));
            store.create(&o).await.unwrap();
        }

        let due = store.find_expirable(now, 10).await.unwrap();
        let titles: Vec<_> = due.iter().map(|o| o.title.as_str()).collect();
        assert_eq!(titles, vec!["early", "late"]);
        assert_eq!(store.find_expirable(now, 1).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_lookup_loads_are_counted() {
        let store = InMemoryStore::new();
        store.add_lookup(LookupKind::Type, "Task").await;
        store.list(LookupKind::Type).await.unwrap();
        store.list(LookupKind::Type).await.unwrap();
        assert_eq!(store.lookup_loads(LookupKind::Type).await, 2);
        assert_eq!(store.lookup_loads(LookupKind::Skill).await, 0);
    }
}
