//! Authenticated caller.

use serde::{Deserialize, Serialize};

/// Roles recognised by the administrative surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    Admin,
    OrganizationAdmin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "Admin",
            Role::OrganizationAdmin => "OrganizationAdmin",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "Admin" => Some(Role::Admin),
            "OrganizationAdmin" => Some(Role::OrganizationAdmin),
            _ => None,
        }
    }
}

/// The caller on whose behalf a mutation runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub username: String,
    pub roles: Vec<Role>,
}

impl Principal {
    /// Builds a principal from raw claim values, dropping unknown roles.
    pub fn from_claims(username: impl Into<String>, roles: &[String]) -> Self {
        Self {
            username: username.into(),
            roles: roles.iter().filter_map(|r| Role::parse(r)).collect(),
        }
    }

    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }

    /// True for any role allowed to manage opportunities.
    pub fn is_administrator(&self) -> bool {
        self.has_role(Role::Admin) || self.has_role(Role::OrganizationAdmin)
    }
}
