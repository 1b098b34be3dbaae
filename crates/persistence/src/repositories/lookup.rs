//! Lookup repository for the reference tables.

use async_trait::async_trait;
use sqlx::PgPool;

use domain::models::{LookupItem, LookupKind};
use domain::store::LookupStore;
use domain::DomainResult;

use crate::entities::LookupEntity;
use crate::error::storage;
use crate::metrics::QueryTimer;
use crate::sql::lookup_table;

/// Repository for reference-table reads.
#[derive(Clone)]
pub struct LookupRepository {
    pool: PgPool,
}

impl LookupRepository {
    /// Creates a new LookupRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LookupStore for LookupRepository {
    async fn list(&self, kind: LookupKind) -> DomainResult<Vec<LookupItem>> {
        let timer = QueryTimer::new("list_lookups");
        let sql = format!("SELECT id, name FROM {} ORDER BY name", lookup_table(kind));
        let result = sqlx::query_as::<_, LookupEntity>(&sql)
            .fetch_all(&self.pool)
            .await;
        timer.record();
        Ok(result
            .map_err(storage("list_lookups"))?
            .into_iter()
            .map(LookupItem::from)
            .collect())
    }
}
