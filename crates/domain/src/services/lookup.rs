//! Cached access to the reference tables.

use std::sync::Arc;

use tracing::debug;
use uuid::Uuid;

use crate::cache::{CachePolicy, TtlCache};
use crate::errors::{DomainError, DomainResult};
use crate::models::{LookupItem, LookupKind};
use crate::store::LookupStore;

/// Serves reference lists, cached per kind when a policy is configured.
pub struct LookupService {
    store: Arc<dyn LookupStore>,
    cache: Option<TtlCache<LookupKind, Arc<Vec<LookupItem>>>>,
}

impl LookupService {
    /// `policy` of `None` disables caching; every call reads the store.
    pub fn new(store: Arc<dyn LookupStore>, policy: Option<CachePolicy>) -> Self {
        Self {
            store,
            cache: policy.map(|p| TtlCache::new("lookups", p)),
        }
    }

    async fn load(&self, kind: LookupKind) -> DomainResult<Arc<Vec<LookupItem>>> {
        let mut items = self.store.list(kind).await?;
        items.sort_by(|a, b| a.name.cmp(&b.name));
        debug!(kind = %kind, count = items.len(), "Loaded lookup list");
        Ok(Arc::new(items))
    }

    async fn items(&self, kind: LookupKind) -> DomainResult<Arc<Vec<LookupItem>>> {
        match &self.cache {
            Some(cache) => cache.get_or_load(kind, || self.load(kind)).await,
            None => self.load(kind).await,
        }
    }

    /// All rows of one reference table ordered by name.
    pub async fn list(&self, kind: LookupKind) -> DomainResult<Vec<LookupItem>> {
        Ok(self.items(kind).await?.as_ref().clone())
    }

    pub async fn get_by_id_or_none(
        &self,
        kind: LookupKind,
        id: Uuid,
    ) -> DomainResult<Option<LookupItem>> {
        if id.is_nil() {
            return Err(DomainError::ArgumentNull("id"));
        }
        Ok(self.items(kind).await?.iter().find(|i| i.id == id).cloned())
    }

    pub async fn get_by_id(&self, kind: LookupKind, id: Uuid) -> DomainResult<LookupItem> {
        self.get_by_id_or_none(kind, id)
            .await?
            .ok_or_else(|| DomainError::not_found(kind.display_name(), id))
    }

    /// Exact match on the trimmed name.
    pub async fn get_by_name_or_none(
        &self,
        kind: LookupKind,
        name: &str,
    ) -> DomainResult<Option<LookupItem>> {
        let name = name.trim();
        if name.is_empty() {
            return Err(DomainError::ArgumentNull("name"));
        }
        Ok(self
            .items(kind)
            .await?
            .iter()
            .find(|i| i.name == name)
            .cloned())
    }

    pub async fn get_by_name(&self, kind: LookupKind, name: &str) -> DomainResult<LookupItem> {
        self.get_by_name_or_none(kind, name)
            .await?
            .ok_or_else(|| DomainError::not_found(kind.display_name(), name.trim()))
    }

    /// Rows whose name contains `text`, ignoring case.
    pub async fn contains(&self, kind: LookupKind, text: &str) -> DomainResult<Vec<LookupItem>> {
        let needle = text.trim().to_lowercase();
        if needle.is_empty() {
            return Err(DomainError::ArgumentNull("value"));
        }
        Ok(self
            .items(kind)
            .await?
            .iter()
            .filter(|i| i.name.to_lowercase().contains(&needle))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryStore;
    use std::time::Duration;

    fn policy() -> CachePolicy {
        CachePolicy::new(Duration::from_secs(3600), Duration::from_secs(86400))
    }

    async fn store() -> Arc<InMemoryStore> {
        let store = Arc::new(InMemoryStore::new());
        store.add_lookup(LookupKind::Category, "Technology").await;
        store.add_lookup(LookupKind::Category, "Agriculture").await;
        store.add_lookup(LookupKind::Category, "Environment").await;
        store
    }

    #[tokio::test]
    async fn test_list_is_sorted_by_name() {
        let service = LookupService::new(store().await, Some(policy()));
        let names: Vec<_> = service
            .list(LookupKind::Category)
            .await
            .unwrap()
            .into_iter()
            .map(|i| i.name)
            .collect();
        assert_eq!(names, vec!["Agriculture", "Environment", "Technology"]);
    }

    #[tokio::test]
    async fn test_cached_list_reads_store_once() {
        let store = store().await;
        let service = LookupService::new(store.clone(), Some(policy()));

        service.list(LookupKind::Category).await.unwrap();
        service.get_by_name(LookupKind::Category, "Technology").await.unwrap();
        service.contains(LookupKind::Category, "cult").await.unwrap();

        assert_eq!(store.lookup_loads(LookupKind::Category).await, 1);
    }

    #[tokio::test]
    async fn test_disabled_cache_reads_store_every_time() {
        let store = store().await;
        let service = LookupService::new(store.clone(), None);

        service.list(LookupKind::Category).await.unwrap();
        service.list(LookupKind::Category).await.unwrap();

        assert_eq!(store.lookup_loads(LookupKind::Category).await, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_expired_cache_reloads() {
        let store = store().await;
        let service = LookupService::new(store.clone(), Some(policy()));

        service.list(LookupKind::Category).await.unwrap();
        tokio::time::advance(Duration::from_secs(3601)).await;
        service.list(LookupKind::Category).await.unwrap();

        assert_eq!(store.lookup_loads(LookupKind::Category).await, 2);
    }

    #[tokio::test]
    async fn test_get_by_name_trims_and_matches_exactly() {
        let service = LookupService::new(store().await, Some(policy()));

        let item = service
            .get_by_name(LookupKind::Category, "  Technology ")
            .await
            .unwrap();
        assert_eq!(item.name, "Technology");

        assert!(service
            .get_by_name_or_none(LookupKind::Category, "technology")
            .await
            .unwrap()
            .is_none());
        assert!(matches!(
            service.get_by_name(LookupKind::Category, "Sports").await,
            Err(DomainError::NotFound(_))
        ));
        assert!(matches!(
            service.get_by_name(LookupKind::Category, "  ").await,
            Err(DomainError::ArgumentNull("name"))
        ));
    }

    #[tokio::test]
    async fn test_get_by_id() {
        let store = store().await;
        let skill = store.add_lookup(LookupKind::Skill, "Rust").await;
        let service = LookupService::new(store, Some(policy()));

        assert_eq!(service.get_by_id(LookupKind::Skill, skill.id).await.unwrap(), skill);
        assert!(matches!(
            service.get_by_id(LookupKind::Category, skill.id).await,
            Err(DomainError::NotFound(_))
        ));
        assert!(matches!(
            service.get_by_id(LookupKind::Skill, Uuid::nil()).await,
            Err(DomainError::ArgumentNull("id"))
        ));
    }

    #[tokio::test]
    async fn test_contains_ignores_case() {
        let service = LookupService::new(store().await, None);
        let found = service.contains(LookupKind::Category, "TECH").await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "Technology");
    }
}
