use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use tracing::debug;

use super::domain::{Assignment, AssignmentId, PersonId, WeekPlan, WeeklyPartId};
use super::eligibility::{check_manual, check_slot, EligibilityViolation};
use super::repository::{AssignmentStore, PersonCatalog, RepositoryError, WeekPlanStore};

static ASSIGNMENT_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_assignment_id() -> AssignmentId {
    let seq = ASSIGNMENT_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    let stamp = Utc::now().format("%Y%m%d%H%M%S");
    AssignmentId(format!("asg-{stamp}-{seq:06}"))
}

/// Validates and commits one (person, slot) pairing at a time.
pub struct AssignmentService<S> {
    store: Arc<S>,
}

impl<S> Clone for AssignmentService<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S> AssignmentService<S>
where
    S: WeekPlanStore + AssignmentStore + PersonCatalog + 'static,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Commit `person_id` to `slot` of a part in the week starting on `week_start`.
    ///
    /// Lead/assist eligibility is not enforced here. An occupied slot is never overwritten;
    /// the store rejects it and the caller sees [`AssignmentError::Conflict`].
    pub fn assign(
        &self,
        week_start: NaiveDate,
        weekly_part_id: &WeeklyPartId,
        person_id: &PersonId,
        slot: i64,
    ) -> Result<Assignment, AssignmentError> {
        let week = self
            .store
            .find_by_date(week_start)?
            .ok_or(AssignmentError::WeekNotFound { week_start })?;

        self.assign_in_week(&week, weekly_part_id, person_id, slot)
    }

    /// Same checks as [`AssignmentService::assign`] against a week plan the caller already holds.
    pub fn assign_in_week(
        &self,
        week: &WeekPlan,
        weekly_part_id: &WeeklyPartId,
        person_id: &PersonId,
        slot: i64,
    ) -> Result<Assignment, AssignmentError> {
        let part = week
            .part(weekly_part_id)
            .ok_or_else(|| AssignmentError::PartNotFound {
                weekly_part_id: weekly_part_id.clone(),
            })?;

        let slot = check_slot(&part.role_type, slot)?;

        let person = self
            .store
            .find_person(person_id)?
            .ok_or_else(|| AssignmentError::PersonNotFound {
                person_id: person_id.clone(),
            })?;

        let already_on_part = self
            .store
            .is_person_assigned_to_part(weekly_part_id, person_id)?;
        check_manual(&part.role_type, slot, &person, already_on_part)?;

        let assignment = Assignment {
            id: next_assignment_id(),
            weekly_part_id: weekly_part_id.clone(),
            person_id: person_id.clone(),
            slot,
        };
        let stored = self.store.save(assignment)?;

        debug!(
            assignment = %stored.id,
            week = %week.week_start,
            program = %week.program_id,
            part = %part.role_type.label,
            person = %person.display_name(),
            slot,
            "assignment committed"
        );
        Ok(stored)
    }

    pub fn remove(&self, assignment_id: &AssignmentId) -> Result<(), AssignmentError> {
        match self.store.remove(assignment_id) {
            Ok(()) => {
                debug!(assignment = %assignment_id, "assignment removed");
                Ok(())
            }
            Err(RepositoryError::NotFound) => Err(AssignmentError::AssignmentNotFound {
                assignment_id: assignment_id.clone(),
            }),
            Err(other) => Err(other.into()),
        }
    }
}

/// Every way a single-slot operation can fail.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AssignmentError {
    #[error("no week plan starts on {week_start}")]
    WeekNotFound { week_start: NaiveDate },
    #[error("part {weekly_part_id} does not exist in this week")]
    PartNotFound { weekly_part_id: WeeklyPartId },
    #[error("person {person_id} does not exist")]
    PersonNotFound { person_id: PersonId },
    #[error("assignment {assignment_id} does not exist")]
    AssignmentNotFound { assignment_id: AssignmentId },
    #[error(transparent)]
    Ineligible(#[from] EligibilityViolation),
    #[error("slot already filled or person already on this part")]
    Conflict,
    #[error("could not persist assignment: {0}")]
    Persistence(String),
}

impl From<RepositoryError> for AssignmentError {
    fn from(value: RepositoryError) -> Self {
        match value {
            RepositoryError::Conflict => AssignmentError::Conflict,
            other => AssignmentError::Persistence(other.to_string()),
        }
    }
}
