//! SQL compilation of the search predicate tree.
//!
//! Column references assume the opportunity table is aliased `o`.

use domain::models::{LinkKind, LookupKind};
use domain::predicate::Predicate;
use sqlx::{Postgres, QueryBuilder};
use uuid::Uuid;

/// Reference table backing each lookup kind.
pub fn lookup_table(kind: LookupKind) -> &'static str {
    match kind {
        LookupKind::Category => "lookup_category",
        LookupKind::Country => "lookup_country",
        LookupKind::Language => "lookup_language",
        LookupKind::Skill => "lookup_skill",
        LookupKind::Type => "lookup_opportunity_type",
        LookupKind::Difficulty => "lookup_opportunity_difficulty",
        LookupKind::TimeInterval => "lookup_time_interval",
        LookupKind::Status => "lookup_opportunity_status",
    }
}

/// Association table and its reference column for each link kind.
pub fn link_table(kind: LinkKind) -> (&'static str, &'static str) {
    match kind {
        LinkKind::Category => ("opportunity_category", "category_id"),
        LinkKind::Country => ("opportunity_country", "country_id"),
        LinkKind::Language => ("opportunity_language", "language_id"),
        LinkKind::Skill => ("opportunity_skill", "skill_id"),
    }
}

/// Escapes `%`, `_` and `\` so `value` matches literally inside a LIKE pattern.
pub fn escape_like(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// `%value%` with LIKE metacharacters escaped.
pub fn contains_pattern(value: &str) -> String {
    format!("%{}%", escape_like(value))
}

fn push_joined(
    qb: &mut QueryBuilder<'_, Postgres>,
    parts: &[Predicate],
    separator: &str,
    empty: &str,
) {
    if parts.is_empty() {
        qb.push(empty);
        return;
    }
    qb.push("(");
    for (i, part) in parts.iter().enumerate() {
        if i > 0 {
            qb.push(separator);
        }
        push_predicate(qb, part);
    }
    qb.push(")");
}

fn push_any(qb: &mut QueryBuilder<'_, Postgres>, column: &str, ids: Vec<Uuid>) {
    qb.push(column);
    qb.push(" = ANY(");
    qb.push_bind(ids);
    qb.push(")");
}

/// Appends `predicate` as a boolean SQL expression with bound parameters.
pub fn push_predicate(qb: &mut QueryBuilder<'_, Postgres>, predicate: &Predicate) {
    match predicate {
        Predicate::True => {
            qb.push("TRUE");
        }
        Predicate::False => {
            qb.push("FALSE");
        }
        Predicate::And(parts) => push_joined(qb, parts, " AND ", "TRUE"),
        Predicate::Or(parts) => push_joined(qb, parts, " OR ", "FALSE"),
        Predicate::OrganizationIn(ids) => push_any(qb, "o.organization_id", ids.clone()),
        Predicate::TypeIn(ids) => push_any(qb, "o.type_id", ids.clone()),
        Predicate::StatusIn(statuses) => {
            push_any(qb, "o.status_id", statuses.iter().map(|s| s.id()).collect())
        }
        Predicate::CreatedFrom(from) => {
            qb.push("o.date_created >= ");
            qb.push_bind(*from);
        }
        Predicate::CreatedTo(to) => {
            qb.push("o.date_created <= ");
            qb.push_bind(*to);
        }
        Predicate::LinkedTo { kind, ids } => {
            let (table, column) = link_table(*kind);
            qb.push("o.id IN (SELECT opportunity_id FROM ");
            qb.push(table);
            qb.push(" WHERE ");
            push_any(qb, column, ids.clone());
            qb.push(")");
        }
        Predicate::TextContains(text) => {
            let pattern = contains_pattern(text);
            qb.push("(");
            for (i, column) in ["o.title", "o.description", "o.instructions", "o.keywords"]
                .iter()
                .enumerate()
            {
                if i > 0 {
                    qb.push(" OR ");
                }
                qb.push(*column);
                qb.push(" ILIKE ");
                qb.push_bind(pattern.clone());
            }
            qb.push(")");
        }
    }
}
