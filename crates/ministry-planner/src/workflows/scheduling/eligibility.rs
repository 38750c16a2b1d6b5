//! Hard constraints deciding whether a person may occupy a slot.
//!
//! Rules are checked in a fixed order and the first failure wins: fixed part, slot range,
//! sex rule, then "already on this part". Lead/assist eligibility is a separate check that
//! only automated ranking applies; manual assignments skip it and rely on the validation
//! pass to flag the result afterwards.

use chrono::NaiveDate;

use super::domain::{Assignment, Person, PersonId, RoleType, SlotRole, WeekCommitment, WeeklyPartId};
use super::repository::{EligibilityStore, RepositoryError};

/// Constraint violations raised by single-slot checks.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EligibilityViolation {
    #[error("part '{label}' is fixed and never receives assignments")]
    FixedPartNotAssignable { label: String },
    #[error("slot {slot} is outside 1..={slot_count} for part '{label}'")]
    InvalidSlot {
        label: String,
        slot: i64,
        slot_count: u8,
    },
    #[error("{person} does not satisfy the sex rule of part '{label}'")]
    SexRuleMismatch { person: String, label: String },
    #[error("{person} already holds a slot of part '{label}'")]
    PersonAlreadyOnPart { person: String, label: String },
}

/// Rules 1 and 2: the part must be assignable and the slot inside its range.
///
/// Takes the slot as requested by the caller and returns it narrowed once it is known to fit.
pub fn check_slot(role_type: &RoleType, slot: i64) -> Result<u8, EligibilityViolation> {
    if role_type.fixed {
        return Err(EligibilityViolation::FixedPartNotAssignable {
            label: role_type.label.clone(),
        });
    }

    match u8::try_from(slot) {
        Ok(narrowed) if (1..=role_type.slot_count).contains(&narrowed) => Ok(narrowed),
        _ => Err(EligibilityViolation::InvalidSlot {
            label: role_type.label.clone(),
            slot,
            slot_count: role_type.slot_count,
        }),
    }
}

pub fn check_sex_rule(role_type: &RoleType, person: &Person) -> Result<(), EligibilityViolation> {
    if role_type.sex_rule.admits(person.sex) {
        Ok(())
    } else {
        Err(EligibilityViolation::SexRuleMismatch {
            person: person.display_name(),
            label: role_type.label.clone(),
        })
    }
}

/// Rules 1 to 4, as enforced when a single assignment is committed.
pub fn check_manual(
    role_type: &RoleType,
    slot: u8,
    person: &Person,
    already_on_part: bool,
) -> Result<(), EligibilityViolation> {
    check_slot(role_type, i64::from(slot))?;
    check_sex_rule(role_type, person)?;

    if already_on_part {
        return Err(EligibilityViolation::PersonAlreadyOnPart {
            person: person.display_name(),
            label: role_type.label.clone(),
        });
    }

    Ok(())
}

pub fn can_occupy(role_type: &RoleType, slot: u8, person: &Person) -> bool {
    check_slot(role_type, i64::from(slot)).is_ok() && check_sex_rule(role_type, person).is_ok()
}

pub fn is_filled(assignments: &[Assignment], weekly_part_id: &WeeklyPartId, slot: u8) -> bool {
    assignments
        .iter()
        .any(|assignment| &assignment.weekly_part_id == weekly_part_id && assignment.slot == slot)
}

/// Rule 5: leads need the per part type flag, assistants the global one.
pub fn meets_role_eligibility(person: &Person, slot: u8, can_lead: bool) -> bool {
    match SlotRole::of(slot) {
        SlotRole::Lead => can_lead,
        SlotRole::Assist => person.can_assist,
    }
}

/// Future weeks a person is already committed to, so a caller can warn before suspending them.
pub fn suspension_impact<S>(
    store: &S,
    person_id: &PersonId,
    from: NaiveDate,
) -> Result<Vec<WeekCommitment>, RepositoryError>
where
    S: EligibilityStore + ?Sized,
{
    let mut commitments = store.future_commitments(person_id, from)?;
    commitments.sort_by(|a, b| a.week_start.cmp(&b.week_start).then(a.slot.cmp(&b.slot)));
    Ok(commitments)
}
