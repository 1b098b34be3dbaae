//! Organization entity (database row mapping).

use sqlx::FromRow;
use uuid::Uuid;

use domain::models::Organization;

/// Database row mapping for the organization table.
#[derive(Debug, Clone, FromRow)]
pub struct OrganizationEntity {
    pub id: Uuid,
    pub name: String,
}

impl From<OrganizationEntity> for Organization {
    fn from(entity: OrganizationEntity) -> Self {
        Self {
            id: entity.id,
            name: entity.name,
        }
    }
}
