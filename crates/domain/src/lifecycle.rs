//! Status transition rules for opportunities.

use chrono::{DateTime, Utc};

use crate::errors::{DomainError, DomainResult};
use crate::models::{Opportunity, OpportunityStatus};

/// Outcome of a legal status change request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Already in the requested state; nothing to persist.
    Unchanged,
    Apply(OpportunityStatus),
}

fn rejected(current: OpportunityStatus, target: OpportunityStatus) -> DomainError {
    DomainError::InvalidOperation(format!(
        "Status transition not allowed: Current status '{current}' / requested status '{target}'"
    ))
}

/// Plans a user-requested status change.
///
/// Expiration is reserved for the sweep, see [`plan_expiration`].
pub fn plan_status_change(
    current: OpportunityStatus,
    target: OpportunityStatus,
) -> DomainResult<Transition> {
    use crate::models::OpportunityStatus::*;

    match (current, target) {
        (Active, Active) | (Inactive, Inactive) => Ok(Transition::Unchanged),
        (Inactive, Active) | (Active, Inactive) => Ok(Transition::Apply(target)),
        (Active | Inactive, Deleted) => Ok(Transition::Apply(Deleted)),
        _ => Err(rejected(current, target)),
    }
}

/// Plans the system transition to Expired.
pub fn plan_expiration(
    opportunity: &Opportunity,
    now: DateTime<Utc>,
) -> DomainResult<Transition> {
    let due = opportunity.date_end.is_some_and(|end| end <= now);
    if opportunity.status.is_expirable() && due {
        Ok(Transition::Apply(OpportunityStatus::Expired))
    } else {
        Err(rejected(opportunity.status, OpportunityStatus::Expired))
    }
}

/// Guards core-field and association mutation.
pub fn ensure_updatable(status: OpportunityStatus) -> DomainResult<()> {
    if status.is_updatable() {
        Ok(())
    } else {
        Err(DomainError::InvalidOperation(format!(
            "Opportunity can no longer be updated (current status '{status}')"
        )))
    }
}

/// Checks a participant-count increment and returns the new count.
pub fn check_participant_increment(
    opportunity: &Opportunity,
    increment: i32,
    now: DateTime<Utc>,
) -> DomainResult<i32> {
    if increment <= 0 {
        return Err(DomainError::Validation(
            "Increment must be greater than 0".to_string(),
        ));
    }
    if opportunity.status != OpportunityStatus::Active {
        return Err(DomainError::InvalidOperation(format!(
            "Opportunity is not active (current status '{}')",
            opportunity.status
        )));
    }
    if opportunity.date_start > now {
        return Err(DomainError::InvalidOperation(
            "Opportunity has not started yet".to_string(),
        ));
    }

    let count = opportunity
        .participants()
        .checked_add(increment)
        .ok_or_else(|| DomainError::Validation("Participant count overflow".to_string()))?;
    if let Some(limit) = opportunity.participant_limit {
        if count > limit {
            return Err(DomainError::InvalidOperation(format!(
                "Increment would exceed the participant limit (current {}, increment {}, limit {})",
                opportunity.participants(),
                increment,
                limit
            )));
        }
    }
    Ok(count)
}
