//! Organization repository for database operations.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use domain::models::Organization;
use domain::store::OrganizationStore;
use domain::DomainResult;

use crate::entities::OrganizationEntity;
use crate::error::storage;
use crate::metrics::QueryTimer;
use crate::sql::contains_pattern;

/// Repository for organization reads.
#[derive(Clone)]
pub struct OrganizationRepository {
    pool: PgPool,
}

impl OrganizationRepository {
    /// Creates a new OrganizationRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OrganizationStore for OrganizationRepository {
    async fn find_by_id(&self, id: Uuid) -> DomainResult<Option<Organization>> {
        let timer = QueryTimer::new("find_organization_by_id");
        let result = sqlx::query_as::<_, OrganizationEntity>(
            r#"
            SELECT id, name FROM organization WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        Ok(result
            .map_err(storage("find_organization_by_id"))?
            .map(Organization::from))
    }

    async fn find_name_contains(&self, text: &str) -> DomainResult<Vec<Organization>> {
        let timer = QueryTimer::new("find_organizations_name_contains");
        let result = sqlx::query_as::<_, OrganizationEntity>(
            r#"
            SELECT id, name FROM organization WHERE name ILIKE $1 ORDER BY name
            "#,
        )
        .bind(contains_pattern(text.trim()))
        .fetch_all(&self.pool)
        .await;
        timer.record();
        Ok(result
            .map_err(storage("find_organizations_name_contains"))?
            .into_iter()
            .map(Organization::from)
            .collect())
    }
}
