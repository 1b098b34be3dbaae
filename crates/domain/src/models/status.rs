//! Opportunity status model.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle status of an opportunity.
///
/// Each variant maps to a fixed row of the `lookup_opportunity_status` table, so no
/// storage round trip is needed to resolve an id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OpportunityStatus {
    Active,
    Inactive,
    Expired,
    Deleted,
}

const ACTIVE_ID: Uuid = Uuid::from_u128(0x5d2c_1f0a_8e3b_4c6d_9a01_0000_0000_0001);
const INACTIVE_ID: Uuid = Uuid::from_u128(0x5d2c_1f0a_8e3b_4c6d_9a01_0000_0000_0002);
const EXPIRED_ID: Uuid = Uuid::from_u128(0x5d2c_1f0a_8e3b_4c6d_9a01_0000_0000_0003);
const DELETED_ID: Uuid = Uuid::from_u128(0x5d2c_1f0a_8e3b_4c6d_9a01_0000_0000_0004);

impl OpportunityStatus {
    pub const ALL: [OpportunityStatus; 4] = [
        OpportunityStatus::Active,
        OpportunityStatus::Inactive,
        OpportunityStatus::Expired,
        OpportunityStatus::Deleted,
    ];

    /// Persisted reference id.
    pub fn id(&self) -> Uuid {
        match self {
            OpportunityStatus::Active => ACTIVE_ID,
            OpportunityStatus::Inactive => INACTIVE_ID,
            OpportunityStatus::Expired => EXPIRED_ID,
            OpportunityStatus::Deleted => DELETED_ID,
        }
    }

    pub fn from_id(id: Uuid) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.id() == id)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OpportunityStatus::Active => "Active",
            OpportunityStatus::Inactive => "Inactive",
            OpportunityStatus::Expired => "Expired",
            OpportunityStatus::Deleted => "Deleted",
        }
    }

    /// Parses a status name, ignoring case.
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        Self::ALL
            .into_iter()
            .find(|s| s.as_str().eq_ignore_ascii_case(value))
    }

    /// Core fields and associations may only change in these states.
    pub fn is_updatable(&self) -> bool {
        matches!(self, OpportunityStatus::Active | OpportunityStatus::Inactive)
    }

    /// States the expiration sweep picks up.
    pub fn is_expirable(&self) -> bool {
        self.is_updatable()
    }
}

impl std::fmt::Display for OpportunityStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
