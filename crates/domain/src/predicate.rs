//! Search predicate tree.
//!
//! Filters are composed into a [`Predicate`] once and then either evaluated
//! in memory ([`Predicate::matches`]) or compiled to SQL by the persistence
//! layer, so both stores agree on search semantics.

use chrono::{DateTime, Utc};
use shared::dates::{end_of_day, start_of_day};
use uuid::Uuid;

use crate::models::opportunity::Opportunity;
use crate::models::{LinkKind, LookupItem, OpportunitySearchFilter, OpportunityStatus};

#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    True,
    False,
    And(Vec<Predicate>),
    Or(Vec<Predicate>),
    OrganizationIn(Vec<Uuid>),
    TypeIn(Vec<Uuid>),
    StatusIn(Vec<OpportunityStatus>),
    /// Inclusive lower bound on the creation timestamp.
    CreatedFrom(DateTime<Utc>),
    /// Inclusive upper bound on the creation timestamp.
    CreatedTo(DateTime<Utc>),
    /// At least one association of `kind` points at one of `ids`.
    LinkedTo { kind: LinkKind, ids: Vec<Uuid> },
    /// Case-insensitive substring of title, description, instructions or keywords.
    TextContains(String),
}

impl Predicate {
    /// Conjunction of all parts, flattening nested `And`s.
    pub fn all(parts: impl IntoIterator<Item = Predicate>) -> Predicate {
        let mut out = Vec::new();
        for part in parts {
            match part {
                Predicate::True => {}
                Predicate::False => return Predicate::False,
                Predicate::And(inner) => out.extend(inner),
                other => out.push(other),
            }
        }
        match out.len() {
            0 => Predicate::True,
            1 => out.remove(0),
            _ => Predicate::And(out),
        }
    }

    /// Disjunction of all parts, flattening nested `Or`s.
    pub fn any(parts: impl IntoIterator<Item = Predicate>) -> Predicate {
        let mut out = Vec::new();
        for part in parts {
            match part {
                Predicate::False => {}
                Predicate::True => return Predicate::True,
                Predicate::Or(inner) => out.extend(inner),
                other => out.push(other),
            }
        }
        match out.len() {
            0 => Predicate::False,
            1 => out.remove(0),
            _ => Predicate::Or(out),
        }
    }

    pub fn and(self, other: Predicate) -> Predicate {
        Predicate::all([self, other])
    }

    pub fn or(self, other: Predicate) -> Predicate {
        Predicate::any([self, other])
    }

    /// Evaluates the predicate against a loaded aggregate.
    ///
    /// `LinkedTo` only matches when the relevant children are loaded.
    pub fn matches(&self, o: &Opportunity) -> bool {
        match self {
            Predicate::True => true,
            Predicate::False => false,
            Predicate::And(parts) => parts.iter().all(|p| p.matches(o)),
            Predicate::Or(parts) => parts.iter().any(|p| p.matches(o)),
            Predicate::OrganizationIn(ids) => ids.contains(&o.organization_id),
            Predicate::TypeIn(ids) => ids.contains(&o.type_id),
            Predicate::StatusIn(statuses) => statuses.contains(&o.status),
            Predicate::CreatedFrom(from) => o.date_created >= *from,
            Predicate::CreatedTo(to) => o.date_created <= *to,
            Predicate::LinkedTo { kind, ids } => children(o, *kind)
                .map(|items| items.iter().any(|item| ids.contains(&item.id)))
                .unwrap_or(false),
            Predicate::TextContains(text) => {
                let needle = text.to_lowercase();
                let contains = |value: &str| value.to_lowercase().contains(&needle);
                contains(&o.title)
                    || contains(&o.description)
                    || o.instructions.as_deref().is_some_and(contains)
                    || o
                        .keywords
                        .as_ref()
                        .is_some_and(|k| contains(&k.join(" ")))
            }
        }
    }
}

fn children(o: &Opportunity, kind: LinkKind) -> Option<&[LookupItem]> {
    match kind {
        LinkKind::Category => o.categories.as_deref(),
        LinkKind::Country => o.countries.as_deref(),
        LinkKind::Language => o.languages.as_deref(),
        LinkKind::Skill => o.skills.as_deref(),
    }
}

/// Reference ids whose names contain the free-text search value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextMatches {
    pub organization_ids: Vec<Uuid>,
    pub type_ids: Vec<Uuid>,
    pub category_ids: Vec<Uuid>,
    pub skill_ids: Vec<Uuid>,
}

/// Trimmed free-text value of a filter, if any.
pub fn search_text(filter: &OpportunitySearchFilter) -> Option<&str> {
    filter
        .value_contains
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

/// Removes duplicates while keeping first-seen order.
pub fn distinct<T: PartialEq + Copy>(values: impl IntoIterator<Item = T>) -> Vec<T> {
    let mut out: Vec<T> = Vec::new();
    for value in values {
        if !out.contains(&value) {
            out.push(value);
        }
    }
    out
}

fn ids_of(list: &Option<Vec<Uuid>>) -> Vec<Uuid> {
    distinct(list.iter().flatten().copied())
}

/// Builds the predicate for a search filter.
///
/// `text_matches` must be supplied when the filter carries free text; the
/// organization, type and category filters are then merged with the matched
/// ids into one disjunction together with the text and skill matches.
pub fn build_search_predicate(
    filter: &OpportunitySearchFilter,
    text_matches: Option<&TextMatches>,
) -> Predicate {
    let mut parts = Vec::new();

    if let Some(start) = filter.start_date {
        parts.push(Predicate::CreatedFrom(start_of_day(start)));
    }
    if let Some(end) = filter.end_date {
        parts.push(Predicate::CreatedTo(end_of_day(end)));
    }

    let statuses = distinct(filter.statuses.iter().flatten().copied());
    if !statuses.is_empty() {
        parts.push(Predicate::StatusIn(statuses));
    }

    for (kind, list) in [
        (LinkKind::Language, &filter.language_ids),
        (LinkKind::Country, &filter.country_ids),
    ] {
        let ids = ids_of(list);
        if !ids.is_empty() {
            parts.push(Predicate::LinkedTo { kind, ids });
        }
    }

    let organizations = distinct(filter.organization_id);
    let types = ids_of(&filter.type_ids);
    let categories = ids_of(&filter.category_ids);

    match search_text(filter) {
        Some(text) => {
            let empty = TextMatches::default();
            let matched = text_matches.unwrap_or(&empty);
            let merge = |explicit: &[Uuid], found: &[Uuid]| {
                distinct(explicit.iter().chain(found.iter()).copied())
            };

            let mut alternatives = Vec::new();
            let organizations = merge(&organizations, &matched.organization_ids);
            if !organizations.is_empty() {
                alternatives.push(Predicate::OrganizationIn(organizations));
            }
            let types = merge(&types, &matched.type_ids);
            if !types.is_empty() {
                alternatives.push(Predicate::TypeIn(types));
            }
            let categories = merge(&categories, &matched.category_ids);
            if !categories.is_empty() {
                alternatives.push(Predicate::LinkedTo {
                    kind: LinkKind::Category,
                    ids: categories,
                });
            }
            alternatives.push(Predicate::TextContains(text.to_string()));
            let skills = distinct(matched.skill_ids.iter().copied());
            if !skills.is_empty() {
                alternatives.push(Predicate::LinkedTo {
                    kind: LinkKind::Skill,
                    ids: skills,
                });
            }
            parts.push(Predicate::any(alternatives));
        }
        None => {
            if !organizations.is_empty() {
                parts.push(Predicate::OrganizationIn(organizations));
            }
            if !types.is_empty() {
                parts.push(Predicate::TypeIn(types));
            }
            if !categories.is_empty() {
                parts.push(Predicate::LinkedTo {
                    kind: LinkKind::Category,
                    ids: categories,
                });
            }
        }
    }

    Predicate::all(parts)
}
