//! Reference table entities.

use sqlx::FromRow;
use uuid::Uuid;

use domain::models::LookupItem;

/// Row of any `lookup_*` table.
#[derive(Debug, Clone, FromRow)]
pub struct LookupEntity {
    pub id: Uuid,
    pub name: String,
}

impl From<LookupEntity> for LookupItem {
    fn from(entity: LookupEntity) -> Self {
        Self {
            id: entity.id,
            name: entity.name,
        }
    }
}

/// A reference row joined through an association table.
#[derive(Debug, Clone, FromRow)]
pub struct LinkedLookupEntity {
    pub opportunity_id: Uuid,
    pub id: Uuid,
    pub name: String,
}
