//! Reference data models.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A row of one of the small reference tables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LookupItem {
    pub id: Uuid,
    pub name: String,
}

impl LookupItem {
    pub fn new(id: Uuid, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

/// Reference tables served through the lookup cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LookupKind {
    Category,
    Country,
    Language,
    Skill,
    Type,
    Difficulty,
    TimeInterval,
    Status,
}

impl LookupKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            LookupKind::Category => "category",
            LookupKind::Country => "country",
            LookupKind::Language => "language",
            LookupKind::Skill => "skill",
            LookupKind::Type => "type",
            LookupKind::Difficulty => "difficulty",
            LookupKind::TimeInterval => "time_interval",
            LookupKind::Status => "status",
        }
    }

    /// Human readable name used in error messages.
    pub fn display_name(&self) -> &'static str {
        match self {
            LookupKind::Category => "Category",
            LookupKind::Country => "Country",
            LookupKind::Language => "Language",
            LookupKind::Skill => "Skill",
            LookupKind::Type => "Type",
            LookupKind::Difficulty => "Difficulty",
            LookupKind::TimeInterval => "Time interval",
            LookupKind::Status => "Status",
        }
    }
}

impl std::fmt::Display for LookupKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Publishing organization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Organization {
    pub id: Uuid,
    pub name: String,
}

/// Many-to-many associations of an opportunity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkKind {
    Category,
    Country,
    Language,
    Skill,
}

impl LinkKind {
    pub const ALL: [LinkKind; 4] = [
        LinkKind::Category,
        LinkKind::Country,
        LinkKind::Language,
        LinkKind::Skill,
    ];

    /// Reference table the linked ids belong to.
    pub fn lookup_kind(&self) -> LookupKind {
        match self {
            LinkKind::Category => LookupKind::Category,
            LinkKind::Country => LookupKind::Country,
            LinkKind::Language => LookupKind::Language,
            LinkKind::Skill => LookupKind::Skill,
        }
    }

    /// Parses the plural path segment used by the HTTP routes.
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "categories" => Some(LinkKind::Category),
            "countries" => Some(LinkKind::Country),
            "languages" => Some(LinkKind::Language),
            "skills" => Some(LinkKind::Skill),
            _ => None,
        }
    }

    pub fn plural(&self) -> &'static str {
        match self {
            LinkKind::Category => "categories",
            LinkKind::Country => "countries",
            LinkKind::Language => "languages",
            LinkKind::Skill => "skills",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_link_kind_parse() {
        assert_eq!(LinkKind::parse("categories"), Some(LinkKind::Category));
        assert_eq!(LinkKind::parse("Skills"), Some(LinkKind::Skill));
        assert_eq!(LinkKind::parse("category"), None);
        for kind in LinkKind::ALL {
            assert_eq!(LinkKind::parse(kind.plural()), Some(kind));
        }
    }

    #[test]
    fn test_link_kind_lookup_kind() {
        assert_eq!(LinkKind::Country.lookup_kind(), LookupKind::Country);
        assert_eq!(LinkKind::Language.lookup_kind(), LookupKind::Language);
    }
}
