use chrono::NaiveDate;

use super::domain::{
    Assignment, AssignmentId, AssignmentWithPerson, HistoryEntry, Person, PersonId, ProgramId,
    RoleTypeId, WeekCommitment, WeekPlan, WeekPlanId, WeekPlanStatus, WeekPlanSummary,
    WeeklyPartId,
};
use super::settings::AssignmentSettings;

/// Error enumeration for persistence failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Read access to the roster.
pub trait PersonCatalog: Send + Sync {
    /// Every person, in catalog order.
    fn people(&self) -> Result<Vec<Person>, RepositoryError>;
    fn find_person(&self, id: &PersonId) -> Result<Option<Person>, RepositoryError>;
}

/// Optional constraints for listing a program's weeks. Date bounds are inclusive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WeekPlanFilter {
    pub status: Option<WeekPlanStatus>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl WeekPlanFilter {
    pub fn matches(&self, summary: &WeekPlanSummary) -> bool {
        self.status.map_or(true, |status| summary.status == status)
            && self.from.map_or(true, |from| summary.week_start >= from)
            && self.to.map_or(true, |to| summary.week_start <= to)
    }
}

pub trait WeekPlanStore: Send + Sync {
    fn find_by_date(&self, week_start: NaiveDate) -> Result<Option<WeekPlan>, RepositoryError>;
    fn find_week(&self, id: &WeekPlanId) -> Result<Option<WeekPlan>, RepositoryError>;
    /// Summaries sorted by week start.
    fn list_by_program(
        &self,
        program_id: &ProgramId,
        filter: WeekPlanFilter,
    ) -> Result<Vec<WeekPlanSummary>, RepositoryError>;
    /// Full plans with `start <= week_start <= end`, sorted by week start.
    fn list_in_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<WeekPlan>, RepositoryError>;
}

pub trait AssignmentStore: Send + Sync {
    fn list_by_week(
        &self,
        week_plan_id: &WeekPlanId,
    ) -> Result<Vec<AssignmentWithPerson>, RepositoryError>;
    /// Rejects a second assignment for the same (part, slot) or (part, person) with
    /// [`RepositoryError::Conflict`].
    fn save(&self, assignment: Assignment) -> Result<Assignment, RepositoryError>;
    fn remove(&self, id: &AssignmentId) -> Result<(), RepositoryError>;
    fn is_person_assigned_to_part(
        &self,
        weekly_part_id: &WeeklyPartId,
        person_id: &PersonId,
    ) -> Result<bool, RepositoryError>;
    /// Every assignment held in a week that starts strictly before `before`.
    fn history_before(&self, before: NaiveDate) -> Result<Vec<HistoryEntry>, RepositoryError>;
}

pub trait EligibilityStore: Send + Sync {
    /// Per part type lead eligibility. Absent entries mean "not eligible".
    fn can_lead(
        &self,
        person_id: &PersonId,
        role_type_id: &RoleTypeId,
    ) -> Result<bool, RepositoryError>;
    /// Weeks starting on or after `from` in which the person already holds a slot.
    fn future_commitments(
        &self,
        person_id: &PersonId,
        from: NaiveDate,
    ) -> Result<Vec<WeekCommitment>, RepositoryError>;
}

pub trait SettingsStore: Send + Sync {
    fn load_settings(&self) -> Result<AssignmentSettings, RepositoryError>;
    /// Stores the normalized form and returns it.
    fn save_settings(
        &self,
        settings: AssignmentSettings,
    ) -> Result<AssignmentSettings, RepositoryError>;
}

/// Everything the engine needs from persistence.
pub trait SchedulingStore:
    PersonCatalog + WeekPlanStore + AssignmentStore + EligibilityStore + SettingsStore
{
}

impl<T> SchedulingStore for T where
    T: PersonCatalog + WeekPlanStore + AssignmentStore + EligibilityStore + SettingsStore
{
}
