//! Opportunity entity (database row mapping).

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use domain::models::opportunity::split_keywords;
use domain::models::{Opportunity, OpportunityStatus};
use domain::DomainError;

/// Column list producing an [`OpportunityEntity`], with reference names joined in.
///
/// Decimal columns are cast so they decode as `f64`.
pub const SELECT_OPPORTUNITY: &str = r#"
    SELECT o.id, o.title, o.description,
           o.type_id, t.name AS type_name,
           o.organization_id, org.name AS organization_name,
           o.instructions, o.url,
           o.zlto_reward::float8 AS zlto_reward,
           o.yoma_reward::float8 AS yoma_reward,
           o.zlto_reward_pool::float8 AS zlto_reward_pool,
           o.yoma_reward_pool::float8 AS yoma_reward_pool,
           o.verification_supported,
           o.difficulty_id, d.name AS difficulty_name,
           o.commitment_interval_id, ti.name AS commitment_interval_name,
           o.commitment_interval_count, o.participant_limit, o.participant_count,
           o.keywords, o.date_start, o.date_end, o.status_id,
           o.created_by, o.date_created, o.modified_by, o.date_modified
    FROM opportunity o
    JOIN lookup_opportunity_type t ON t.id = o.type_id
    JOIN organization org ON org.id = o.organization_id
    JOIN lookup_opportunity_difficulty d ON d.id = o.difficulty_id
    JOIN lookup_time_interval ti ON ti.id = o.commitment_interval_id
"#;

/// Database row mapping for the opportunity table.
#[derive(Debug, Clone, FromRow)]
pub struct OpportunityEntity {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub type_id: Uuid,
    pub type_name: String,
    pub organization_id: Uuid,
    pub organization_name: String,
    pub instructions: Option<String>,
    pub url: Option<String>,
    pub zlto_reward: Option<f64>,
    pub yoma_reward: Option<f64>,
    pub zlto_reward_pool: Option<f64>,
    pub yoma_reward_pool: Option<f64>,
    pub verification_supported: bool,
    pub difficulty_id: Uuid,
    pub difficulty_name: String,
    pub commitment_interval_id: Uuid,
    pub commitment_interval_name: String,
    pub commitment_interval_count: i16,
    pub participant_limit: Option<i32>,
    pub participant_count: Option<i32>,
    pub keywords: Option<String>,
    pub date_start: DateTime<Utc>,
    pub date_end: Option<DateTime<Utc>>,
    pub status_id: Uuid,
    pub created_by: String,
    pub date_created: DateTime<Utc>,
    pub modified_by: String,
    pub date_modified: DateTime<Utc>,
}

impl TryFrom<OpportunityEntity> for Opportunity {
    type Error = DomainError;

    fn try_from(entity: OpportunityEntity) -> Result<Self, Self::Error> {
        let status = OpportunityStatus::from_id(entity.status_id).ok_or_else(|| {
            DomainError::Storage(format!(
                "Opportunity '{}' has unknown status id '{}'",
                entity.id, entity.status_id
            ))
        })?;

        Ok(Self {
            id: entity.id,
            title: entity.title,
            description: entity.description,
            type_id: entity.type_id,
            type_name: entity.type_name,
            organization_id: entity.organization_id,
            organization_name: entity.organization_name,
            instructions: entity.instructions,
            url: entity.url,
            zlto_reward: entity.zlto_reward,
            yoma_reward: entity.yoma_reward,
            zlto_reward_pool: entity.zlto_reward_pool,
            yoma_reward_pool: entity.yoma_reward_pool,
            verification_supported: entity.verification_supported,
            difficulty_id: entity.difficulty_id,
            difficulty_name: entity.difficulty_name,
            commitment_interval_id: entity.commitment_interval_id,
            commitment_interval_name: entity.commitment_interval_name,
            commitment_interval_count: entity.commitment_interval_count,
            participant_limit: entity.participant_limit,
            participant_count: entity.participant_count,
            keywords: entity.keywords.as_deref().map(split_keywords),
            date_start: entity.date_start,
            date_end: entity.date_end,
            status,
            created_by: entity.created_by,
            date_created: entity.date_created,
            modified_by: entity.modified_by,
            date_modified: entity.date_modified,
            categories: None,
            countries: None,
            languages: None,
            skills: None,
        })
    }
}
