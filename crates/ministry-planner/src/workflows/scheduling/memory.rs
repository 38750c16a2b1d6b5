use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::domain::{
    Assignment, AssignmentId, AssignmentWithPerson, HistoryEntry, Person, PersonId, ProgramId,
    RoleTypeId, WeekCommitment, WeekPlan, WeekPlanId, WeekPlanSummary, WeeklyPart, WeeklyPartId,
};
use super::repository::{
    AssignmentStore, EligibilityStore, PersonCatalog, RepositoryError, SettingsStore,
    WeekPlanFilter, WeekPlanStore,
};
use super::settings::AssignmentSettings;

/// Lead eligibility of one person for one part type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadEligibility {
    pub person_id: PersonId,
    pub role_type_id: RoleTypeId,
    pub can_lead: bool,
}

/// Serializable image of everything the engine reads and writes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlanSnapshot {
    #[serde(default)]
    pub people: Vec<Person>,
    #[serde(default)]
    pub lead_eligibility: Vec<LeadEligibility>,
    #[serde(default)]
    pub weeks: Vec<WeekPlan>,
    #[serde(default)]
    pub assignments: Vec<Assignment>,
    #[serde(default)]
    pub settings: AssignmentSettings,
}

#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("failed to access snapshot file: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid snapshot data: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Mutex-backed store implementing every scheduling collaborator.
#[derive(Debug, Default, Clone)]
pub struct InMemoryPlanStore {
    state: Arc<Mutex<PlanSnapshot>>,
}

impl InMemoryPlanStore {
    pub fn from_snapshot(mut snapshot: PlanSnapshot) -> Self {
        snapshot.settings = snapshot.settings.normalized();
        Self {
            state: Arc::new(Mutex::new(snapshot)),
        }
    }

    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, SnapshotError> {
        let reader = BufReader::new(File::open(path)?);
        let snapshot: PlanSnapshot = serde_json::from_reader(reader)?;
        Ok(Self::from_snapshot(snapshot))
    }

    pub fn save_json(&self, path: impl AsRef<Path>) -> Result<(), SnapshotError> {
        let snapshot = self.snapshot()?;
        let writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(writer, &snapshot)?;
        Ok(())
    }

    pub fn snapshot(&self) -> Result<PlanSnapshot, RepositoryError> {
        Ok(self.lock()?.clone())
    }

    pub fn upsert_person(&self, person: Person) -> Result<(), RepositoryError> {
        let mut state = self.lock()?;
        match state.people.iter_mut().find(|existing| existing.id == person.id) {
            Some(existing) => *existing = person,
            None => state.people.push(person),
        }
        Ok(())
    }

    pub fn set_can_lead(
        &self,
        person_id: &PersonId,
        role_type_id: &RoleTypeId,
        can_lead: bool,
    ) -> Result<(), RepositoryError> {
        let mut state = self.lock()?;
        match state
            .lead_eligibility
            .iter_mut()
            .find(|entry| &entry.person_id == person_id && &entry.role_type_id == role_type_id)
        {
            Some(entry) => entry.can_lead = can_lead,
            None => state.lead_eligibility.push(LeadEligibility {
                person_id: person_id.clone(),
                role_type_id: role_type_id.clone(),
                can_lead,
            }),
        }
        Ok(())
    }

    pub fn insert_week(&self, week: WeekPlan) -> Result<(), RepositoryError> {
        let mut state = self.lock()?;
        if state.weeks.iter().any(|existing| existing.id == week.id) {
            return Err(RepositoryError::Conflict);
        }
        state.weeks.push(week);
        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, PlanSnapshot>, RepositoryError> {
        self.state
            .lock()
            .map_err(|_| RepositoryError::Unavailable("plan store lock poisoned".to_string()))
    }
}

/// Where each weekly part lives.
fn part_index(weeks: &[WeekPlan]) -> HashMap<&WeeklyPartId, (&WeekPlan, &WeeklyPart)> {
    weeks
        .iter()
        .flat_map(|week| week.parts.iter().map(move |part| (&part.id, (week, part))))
        .collect()
}

impl PersonCatalog for InMemoryPlanStore {
    fn people(&self) -> Result<Vec<Person>, RepositoryError> {
        Ok(self.lock()?.people.clone())
    }

    fn find_person(&self, id: &PersonId) -> Result<Option<Person>, RepositoryError> {
        let state = self.lock()?;
        Ok(state.people.iter().find(|person| &person.id == id).cloned())
    }
}

impl WeekPlanStore for InMemoryPlanStore {
    fn find_by_date(&self, week_start: NaiveDate) -> Result<Option<WeekPlan>, RepositoryError> {
        let state = self.lock()?;
        Ok(state
            .weeks
            .iter()
            .find(|week| week.week_start == week_start)
            .cloned())
    }

    fn find_week(&self, id: &WeekPlanId) -> Result<Option<WeekPlan>, RepositoryError> {
        let state = self.lock()?;
        Ok(state.weeks.iter().find(|week| &week.id == id).cloned())
    }

    fn list_by_program(
        &self,
        program_id: &ProgramId,
        filter: WeekPlanFilter,
    ) -> Result<Vec<WeekPlanSummary>, RepositoryError> {
        let state = self.lock()?;
        let mut summaries: Vec<WeekPlanSummary> = state
            .weeks
            .iter()
            .filter(|week| &week.program_id == program_id)
            .map(WeekPlan::summary)
            .filter(|summary| filter.matches(summary))
            .collect();
        summaries.sort_by_key(|summary| summary.week_start);
        Ok(summaries)
    }

    fn list_in_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<WeekPlan>, RepositoryError> {
        let state = self.lock()?;
        let mut weeks: Vec<WeekPlan> = state
            .weeks
            .iter()
            .filter(|week| week.week_start >= start && week.week_start <= end)
            .cloned()
            .collect();
        weeks.sort_by_key(|week| week.week_start);
        Ok(weeks)
    }
}

impl AssignmentStore for InMemoryPlanStore {
    fn list_by_week(
        &self,
        week_plan_id: &WeekPlanId,
    ) -> Result<Vec<AssignmentWithPerson>, RepositoryError> {
        let state = self.lock()?;
        let week = state
            .weeks
            .iter()
            .find(|week| &week.id == week_plan_id)
            .ok_or(RepositoryError::NotFound)?;

        let mut rows = Vec::new();
        for part in week.ordered_parts() {
            let mut held: Vec<&Assignment> = state
                .assignments
                .iter()
                .filter(|assignment| assignment.weekly_part_id == part.id)
                .collect();
            held.sort_by_key(|assignment| assignment.slot);

            for assignment in held {
                let person = state
                    .people
                    .iter()
                    .find(|person| person.id == assignment.person_id)
                    .ok_or(RepositoryError::NotFound)?;
                rows.push(AssignmentWithPerson {
                    assignment: assignment.clone(),
                    person: person.clone(),
                });
            }
        }
        Ok(rows)
    }

    fn save(&self, assignment: Assignment) -> Result<Assignment, RepositoryError> {
        let mut state = self.lock()?;
        let clashes = state.assignments.iter().any(|existing| {
            existing.id == assignment.id
                || (existing.weekly_part_id == assignment.weekly_part_id
                    && (existing.slot == assignment.slot
                        || existing.person_id == assignment.person_id))
        });
        if clashes {
            return Err(RepositoryError::Conflict);
        }
        state.assignments.push(assignment.clone());
        Ok(assignment)
    }

    fn remove(&self, id: &AssignmentId) -> Result<(), RepositoryError> {
        let mut state = self.lock()?;
        let position = state
            .assignments
            .iter()
            .position(|assignment| &assignment.id == id)
            .ok_or(RepositoryError::NotFound)?;
        state.assignments.remove(position);
        Ok(())
    }

    fn is_person_assigned_to_part(
        &self,
        weekly_part_id: &WeeklyPartId,
        person_id: &PersonId,
    ) -> Result<bool, RepositoryError> {
        let state = self.lock()?;
        Ok(state.assignments.iter().any(|assignment| {
            &assignment.weekly_part_id == weekly_part_id && &assignment.person_id == person_id
        }))
    }

    fn history_before(&self, before: NaiveDate) -> Result<Vec<HistoryEntry>, RepositoryError> {
        let state = self.lock()?;
        let parts = part_index(&state.weeks);
        Ok(state
            .assignments
            .iter()
            .filter_map(|assignment| {
                let (week, part) = parts.get(&assignment.weekly_part_id)?;
                (week.week_start < before).then(|| HistoryEntry {
                    person_id: assignment.person_id.clone(),
                    role_type_id: part.role_type.id.clone(),
                    slot: assignment.slot,
                    week_start: week.week_start,
                })
            })
            .collect())
    }
}

impl EligibilityStore for InMemoryPlanStore {
    fn can_lead(
        &self,
        person_id: &PersonId,
        role_type_id: &RoleTypeId,
    ) -> Result<bool, RepositoryError> {
        let state = self.lock()?;
        Ok(state.lead_eligibility.iter().any(|entry| {
            &entry.person_id == person_id && &entry.role_type_id == role_type_id && entry.can_lead
        }))
    }

    fn future_commitments(
        &self,
        person_id: &PersonId,
        from: NaiveDate,
    ) -> Result<Vec<WeekCommitment>, RepositoryError> {
        let state = self.lock()?;
        let parts = part_index(&state.weeks);
        Ok(state
            .assignments
            .iter()
            .filter(|assignment| &assignment.person_id == person_id)
            .filter_map(|assignment| {
                let (week, part) = parts.get(&assignment.weekly_part_id)?;
                (week.week_start >= from).then(|| WeekCommitment {
                    week_start: week.week_start,
                    part_label: part.role_type.label.clone(),
                    slot: assignment.slot,
                })
            })
            .collect())
    }
}

impl SettingsStore for InMemoryPlanStore {
    fn load_settings(&self) -> Result<AssignmentSettings, RepositoryError> {
        Ok(self.lock()?.settings)
    }

    fn save_settings(
        &self,
        settings: AssignmentSettings,
    ) -> Result<AssignmentSettings, RepositoryError> {
        let normalized = settings.normalized();
        self.lock()?.settings = normalized;
        Ok(normalized)
    }
}
