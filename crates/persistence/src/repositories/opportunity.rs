//! Opportunity repository for database operations.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use shared::pagination::Page;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use domain::models::opportunity::join_keywords;
use domain::models::{LinkKind, LookupItem, Opportunity, OpportunityStatus};
use domain::predicate::Predicate;
use domain::store::{OpportunityStore, SearchPage, SearchQuery};
use domain::{DomainError, DomainResult};

use crate::entities::opportunity::SELECT_OPPORTUNITY;
use crate::entities::{LinkedLookupEntity, OpportunityEntity};
use crate::error::storage;
use crate::metrics::QueryTimer;
use crate::sql::{link_table, lookup_table, push_predicate};

fn expirable_status_ids() -> Vec<Uuid> {
    OpportunityStatus::ALL
        .iter()
        .filter(|s| s.is_expirable())
        .map(|s| s.id())
        .collect()
}

fn to_domain(entities: Vec<OpportunityEntity>) -> DomainResult<Vec<Opportunity>> {
    entities.into_iter().map(Opportunity::try_from).collect()
}

/// Repository for the opportunity aggregate and its association tables.
#[derive(Clone)]
pub struct OpportunityRepository {
    pool: PgPool,
}

impl OpportunityRepository {
    /// Creates a new OpportunityRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn linked(
        &self,
        kind: LinkKind,
        opportunity_ids: &[Uuid],
    ) -> DomainResult<HashMap<Uuid, Vec<LookupItem>>> {
        let (table, column) = link_table(kind);
        let sql = format!(
            "SELECT l.opportunity_id, r.id, r.name FROM {table} l \
             JOIN {lookup} r ON r.id = l.{column} \
             WHERE l.opportunity_id = ANY($1) ORDER BY r.name",
            lookup = lookup_table(kind.lookup_kind()),
        );

        let timer = QueryTimer::new("load_opportunity_children");
        let rows = sqlx::query_as::<_, LinkedLookupEntity>(&sql)
            .bind(opportunity_ids)
            .fetch_all(&self.pool)
            .await;
        timer.record();

        let mut grouped: HashMap<Uuid, Vec<LookupItem>> = HashMap::new();
        for row in rows.map_err(storage("load_opportunity_children"))? {
            grouped
                .entry(row.opportunity_id)
                .or_default()
                .push(LookupItem::new(row.id, row.name));
        }
        Ok(grouped)
    }

    /// Loads categories, countries, languages and skills for every item.
    async fn load_children(&self, items: &mut [Opportunity]) -> DomainResult<()> {
        if items.is_empty() {
            return Ok(());
        }
        let ids: Vec<Uuid> = items.iter().map(|o| o.id).collect();

        for kind in LinkKind::ALL {
            let mut grouped = self.linked(kind, &ids).await?;
            for item in items.iter_mut() {
                let children = Some(grouped.remove(&item.id).unwrap_or_default());
                match kind {
                    LinkKind::Category => item.categories = children,
                    LinkKind::Country => item.countries = children,
                    LinkKind::Language => item.languages = children,
                    LinkKind::Skill => item.skills = children,
                }
            }
        }
        Ok(())
    }

    /// `SELECT ... WHERE <predicate>`, ready for ordering and paging clauses.
    fn select_where(predicate: &Predicate) -> QueryBuilder<'static, Postgres> {
        let mut qb = QueryBuilder::new(SELECT_OPPORTUNITY);
        qb.push(" WHERE ");
        push_predicate(&mut qb, predicate);
        qb
    }
}

#[async_trait]
impl OpportunityStore for OpportunityRepository {
    async fn find_by_id(
        &self,
        id: Uuid,
        include_children: bool,
    ) -> DomainResult<Option<Opportunity>> {
        let timer = QueryTimer::new("find_opportunity_by_id");
        let sql = format!("{SELECT_OPPORTUNITY} WHERE o.id = $1");
        let result = sqlx::query_as::<_, OpportunityEntity>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await;
        timer.record();

        let Some(entity) = result.map_err(storage("find_opportunity_by_id"))? else {
            return Ok(None);
        };
        let mut items = vec![Opportunity::try_from(entity)?];
        if include_children {
            self.load_children(&mut items).await?;
        }
        Ok(items.pop())
    }

    async fn find_by_title(&self, title: &str) -> DomainResult<Option<Opportunity>> {
        let timer = QueryTimer::new("find_opportunity_by_title");
        let sql = format!("{SELECT_OPPORTUNITY} WHERE o.title = $1 AND o.status_id <> $2");
        let result = sqlx::query_as::<_, OpportunityEntity>(&sql)
            .bind(title.trim())
            .bind(OpportunityStatus::Deleted.id())
            .fetch_optional(&self.pool)
            .await;
        timer.record();

        result
            .map_err(storage("find_opportunity_by_title"))?
            .map(Opportunity::try_from)
            .transpose()
    }

    async fn search(&self, query: &SearchQuery) -> DomainResult<SearchPage> {
        let timer = QueryTimer::new("count_opportunities");
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM opportunity o WHERE ");
        push_predicate(&mut count, &query.predicate);
        let total = count
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await;
        timer.record();
        let total_count = total.map_err(storage("count_opportunities"))?.max(0) as u64;

        let timer = QueryTimer::new("search_opportunities");
        let mut qb = Self::select_where(&query.predicate);
        qb.push(" ORDER BY o.date_created DESC, o.id");
        if let Some(page) = query.page {
            qb.push(" LIMIT ");
            qb.push_bind(page.limit() as i64);
            qb.push(" OFFSET ");
            qb.push_bind(page.offset() as i64);
        }
        let rows = qb
            .build_query_as::<OpportunityEntity>()
            .fetch_all(&self.pool)
            .await;
        timer.record();

        let mut items = to_domain(rows.map_err(storage("search_opportunities"))?)?;
        self.load_children(&mut items).await?;
        Ok(SearchPage { total_count, items })
    }

    async fn create(&self, opportunity: &Opportunity) -> DomainResult<()> {
        let timer = QueryTimer::new("create_opportunity");
        let result = sqlx::query(
            r#"
            INSERT INTO opportunity (id, title, description, type_id, organization_id,
                                     instructions, url, zlto_reward, yoma_reward,
                                     zlto_reward_pool, yoma_reward_pool, verification_supported,
                                     difficulty_id, commitment_interval_id,
                                     commitment_interval_count, participant_limit,
                                     participant_count, keywords, date_start, date_end,
                                     status_id, created_by, date_created, modified_by,
                                     date_modified)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15,
                    $16, $17, $18, $19, $20, $21, $22, $23, $24, $25)
            "#,
        )
        .bind(opportunity.id)
        .bind(&opportunity.title)
        .bind(&opportunity.description)
        .bind(opportunity.type_id)
        .bind(opportunity.organization_id)
        .bind(&opportunity.instructions)
        .bind(&opportunity.url)
        .bind(opportunity.zlto_reward)
        .bind(opportunity.yoma_reward)
        .bind(opportunity.zlto_reward_pool)
        .bind(opportunity.yoma_reward_pool)
        .bind(opportunity.verification_supported)
        .bind(opportunity.difficulty_id)
        .bind(opportunity.commitment_interval_id)
        .bind(opportunity.commitment_interval_count)
        .bind(opportunity.participant_limit)
        .bind(opportunity.participant_count)
        .bind(opportunity.keywords.as_deref().and_then(join_keywords))
        .bind(opportunity.date_start)
        .bind(opportunity.date_end)
        .bind(opportunity.status.id())
        .bind(&opportunity.created_by)
        .bind(opportunity.date_created)
        .bind(&opportunity.modified_by)
        .bind(opportunity.date_modified)
        .execute(&self.pool)
        .await;
        timer.record();
        result.map_err(storage("create_opportunity"))?;
        Ok(())
    }

    async fn update(&self, opportunity: &Opportunity) -> DomainResult<()> {
        let timer = QueryTimer::new("update_opportunity");
        let result = sqlx::query(
            r#"
            UPDATE opportunity SET
                title = $2,
                description = $3,
                type_id = $4,
                organization_id = $5,
                instructions = $6,
                url = $7,
                zlto_reward = $8,
                yoma_reward = $9,
                zlto_reward_pool = $10,
                yoma_reward_pool = $11,
                verification_supported = $12,
                difficulty_id = $13,
                commitment_interval_id = $14,
                commitment_interval_count = $15,
                participant_limit = $16,
                participant_count = $17,
                keywords = $18,
                date_start = $19,
                date_end = $20,
                status_id = $21,
                modified_by = $22,
                date_modified = $23
            WHERE id = $1
            "#,
        )
        .bind(opportunity.id)
        .bind(&opportunity.title)
        .bind(&opportunity.description)
        .bind(opportunity.type_id)
        .bind(opportunity.organization_id)
        .bind(&opportunity.instructions)
        .bind(&opportunity.url)
        .bind(opportunity.zlto_reward)
        .bind(opportunity.yoma_reward)
        .bind(opportunity.zlto_reward_pool)
        .bind(opportunity.yoma_reward_pool)
        .bind(opportunity.verification_supported)
        .bind(opportunity.difficulty_id)
        .bind(opportunity.commitment_interval_id)
        .bind(opportunity.commitment_interval_count)
        .bind(opportunity.participant_limit)
        .bind(opportunity.participant_count)
        .bind(opportunity.keywords.as_deref().and_then(join_keywords))
        .bind(opportunity.date_start)
        .bind(opportunity.date_end)
        .bind(opportunity.status.id())
        .bind(&opportunity.modified_by)
        .bind(opportunity.date_modified)
        .execute(&self.pool)
        .await;
        timer.record();

        if result.map_err(storage("update_opportunity"))?.rows_affected() == 0 {
            return Err(DomainError::not_found("Opportunity", opportunity.id));
        }
        Ok(())
    }

    async fn add_links(
        &self,
        opportunity_id: Uuid,
        kind: LinkKind,
        ids: &[Uuid],
    ) -> DomainResult<u64> {
        let (table, column) = link_table(kind);
        let sql = format!(
            "INSERT INTO {table} (opportunity_id, {column}, date_created) \
             VALUES ($1, $2, NOW()) ON CONFLICT DO NOTHING"
        );

        let timer = QueryTimer::new("add_opportunity_links");
        let mut tx = self.pool.begin().await.map_err(storage("add_opportunity_links"))?;
        let mut added = 0;
        for &id in ids {
            let result = sqlx::query(&sql)
                .bind(opportunity_id)
                .bind(id)
                .execute(&mut *tx)
                .await
                .map_err(storage("add_opportunity_links"))?;
            added += result.rows_affected();
        }
        tx.commit().await.map_err(storage("add_opportunity_links"))?;
        timer.record();
        Ok(added)
    }

    async fn remove_links(
        &self,
        opportunity_id: Uuid,
        kind: LinkKind,
        ids: &[Uuid],
    ) -> DomainResult<u64> {
        let (table, column) = link_table(kind);
        let sql = format!("DELETE FROM {table} WHERE opportunity_id = $1 AND {column} = $2");

        let timer = QueryTimer::new("remove_opportunity_links");
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(storage("remove_opportunity_links"))?;
        let mut removed = 0;
        for &id in ids {
            let result = sqlx::query(&sql)
                .bind(opportunity_id)
                .bind(id)
                .execute(&mut *tx)
                .await
                .map_err(storage("remove_opportunity_links"))?;
            removed += result.rows_affected();
        }
        tx.commit()
            .await
            .map_err(storage("remove_opportunity_links"))?;
        timer.record();
        Ok(removed)
    }

    async fn find_expirable(
        &self,
        now: DateTime<Utc>,
        limit: u32,
    ) -> DomainResult<Vec<Opportunity>> {
        let timer = QueryTimer::new("find_expirable_opportunities");
        let sql = format!(
            "{SELECT_OPPORTUNITY} WHERE o.status_id = ANY($1) AND o.date_end <= $2 \
             ORDER BY o.date_end LIMIT $3"
        );
        let result = sqlx::query_as::<_, OpportunityEntity>(&sql)
            .bind(expirable_status_ids())
            .bind(now)
            .bind(i64::from(limit))
            .fetch_all(&self.pool)
            .await;
        timer.record();
        to_domain(result.map_err(storage("find_expirable_opportunities"))?)
    }

    async fn find_expiring_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
        page: Page,
    ) -> DomainResult<Vec<Opportunity>> {
        let timer = QueryTimer::new("find_expiring_opportunities");
        let sql = format!(
            "{SELECT_OPPORTUNITY} WHERE o.status_id = ANY($1) \
             AND o.date_end >= $2 AND o.date_end <= $3 \
             ORDER BY o.date_end, o.id LIMIT $4 OFFSET $5"
        );
        let result = sqlx::query_as::<_, OpportunityEntity>(&sql)
            .bind(expirable_status_ids())
            .bind(from)
            .bind(to)
            .bind(page.limit() as i64)
            .bind(page.offset() as i64)
            .fetch_all(&self.pool)
            .await;
        timer.record();
        to_domain(result.map_err(storage("find_expiring_opportunities"))?)
    }

    async fn ping(&self) -> DomainResult<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(storage("ping"))?;
        Ok(())
    }
}
