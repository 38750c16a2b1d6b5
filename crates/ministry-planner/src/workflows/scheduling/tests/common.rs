use std::sync::mpsc::{Receiver, Sender};
use std::sync::{Arc, Mutex};

use chrono::NaiveDate;

use crate::workflows::scheduling::domain::{
    Assignment, AssignmentId, AssignmentWithPerson, HistoryEntry, Person, PersonId, ProgramId,
    RoleType, RoleTypeId, Sex, SexRule, WeekCommitment, WeekPlan, WeekPlanId, WeekPlanStatus,
    WeekPlanSummary, WeeklyPart, WeeklyPartId,
};
use crate::workflows::scheduling::memory::{InMemoryPlanStore, LeadEligibility, PlanSnapshot};
use crate::workflows::scheduling::repository::{
    AssignmentStore, EligibilityStore, PersonCatalog, RepositoryError, WeekPlanFilter,
    WeekPlanStore,
};
use crate::workflows::scheduling::settings::AssignmentSettings;

pub(super) fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

pub(super) fn week_one() -> NaiveDate {
    date(2025, 1, 6)
}

pub(super) fn week_two() -> NaiveDate {
    date(2025, 1, 13)
}

pub(super) fn program() -> ProgramId {
    ProgramId::new("midweek")
}

pub(super) fn song() -> RoleType {
    RoleType {
        id: RoleTypeId::new("song"),
        code: "SONG".to_string(),
        label: "Opening Song".to_string(),
        slot_count: 1,
        sex_rule: SexRule::Open,
        fixed: true,
        display_order: 0,
    }
}

pub(super) fn reading() -> RoleType {
    RoleType {
        id: RoleTypeId::new("reading"),
        code: "BR".to_string(),
        label: "Bible Reading".to_string(),
        slot_count: 1,
        sex_rule: SexRule::MaleOnly,
        fixed: false,
        display_order: 1,
    }
}

pub(super) fn demo() -> RoleType {
    RoleType {
        id: RoleTypeId::new("demo"),
        code: "SC".to_string(),
        label: "Starting a Conversation".to_string(),
        slot_count: 2,
        sex_rule: SexRule::Open,
        fixed: false,
        display_order: 2,
    }
}

pub(super) fn person(id: &str, given: &str, family: &str, sex: Sex, can_assist: bool) -> Person {
    Person {
        id: PersonId::new(id),
        given_name: given.to_string(),
        family_name: family.to_string(),
        sex,
        active: true,
        suspended: false,
        can_assist,
    }
}

pub(super) fn aldo() -> PersonId {
    PersonId::new("p-aldo")
}

pub(super) fn bianca() -> PersonId {
    PersonId::new("p-bianca")
}

pub(super) fn carlo() -> PersonId {
    PersonId::new("p-carlo")
}

pub(super) fn diana() -> PersonId {
    PersonId::new("p-diana")
}

/// Roster in catalog order: Aldo, Bianca, Carlo, Diana (Diana cannot assist).
pub(super) fn roster() -> Vec<Person> {
    vec![
        person("p-aldo", "Aldo", "Rossi", Sex::Male, true),
        person("p-bianca", "Bianca", "Verdi", Sex::Female, true),
        person("p-carlo", "Carlo", "Neri", Sex::Male, true),
        person("p-diana", "Diana", "Russo", Sex::Female, false),
    ]
}

fn lead(person: &str, role_type: &str) -> LeadEligibility {
    LeadEligibility {
        person_id: PersonId::new(person),
        role_type_id: RoleTypeId::new(role_type),
        can_lead: true,
    }
}

pub(super) fn part_id(week: &str, part: &str) -> WeeklyPartId {
    WeeklyPartId::new(format!("{week}-{part}"))
}

/// Week with a fixed song, a male-only reading, and a two-slot demonstration.
pub(super) fn week_plan(id: &str, week_start: NaiveDate, status: WeekPlanStatus) -> WeekPlan {
    WeekPlan {
        id: WeekPlanId::new(id),
        week_start,
        program_id: program(),
        status,
        parts: vec![
            WeeklyPart {
                id: part_id(id, "demo"),
                role_type: demo(),
                sort_order: 2,
            },
            WeeklyPart {
                id: part_id(id, "song"),
                role_type: song(),
                sort_order: 0,
            },
            WeeklyPart {
                id: part_id(id, "reading"),
                role_type: reading(),
                sort_order: 1,
            },
        ],
    }
}

/// Two active weeks (w1, w2), a skipped w3, and a past w0.
pub(super) fn snapshot() -> PlanSnapshot {
    PlanSnapshot {
        people: roster(),
        lead_eligibility: vec![
            lead("p-aldo", "reading"),
            lead("p-carlo", "reading"),
            lead("p-bianca", "demo"),
            lead("p-diana", "demo"),
        ],
        weeks: vec![
            week_plan("w0", date(2024, 12, 30), WeekPlanStatus::Active),
            week_plan("w1", week_one(), WeekPlanStatus::Active),
            week_plan("w2", week_two(), WeekPlanStatus::Active),
            week_plan("w3", date(2025, 1, 20), WeekPlanStatus::Skipped),
        ],
        assignments: Vec::new(),
        settings: AssignmentSettings::default(),
    }
}

pub(super) fn seeded_store() -> Arc<InMemoryPlanStore> {
    Arc::new(InMemoryPlanStore::from_snapshot(snapshot()))
}

pub(super) fn seed_assignment(
    store: &InMemoryPlanStore,
    id: &str,
    part: WeeklyPartId,
    person: PersonId,
    slot: u8,
) {
    store
        .save(Assignment {
            id: AssignmentId::new(id),
            weekly_part_id: part,
            person_id: person,
            slot,
        })
        .expect("seed assignment");
}

pub(super) fn assignments_in(store: &InMemoryPlanStore, week: &str) -> Vec<AssignmentWithPerson> {
    store
        .list_by_week(&WeekPlanId::new(week))
        .expect("list assignments")
}

/// Store wrapper that can pause the first week listing, reject saves, or go offline.
pub(super) struct ScriptedStore {
    inner: InMemoryPlanStore,
    gate: Mutex<Option<(Sender<()>, Receiver<()>)>>,
    fail_saves: bool,
    offline: bool,
}

impl ScriptedStore {
    pub(super) fn new(inner: InMemoryPlanStore) -> Self {
        Self {
            inner,
            gate: Mutex::new(None),
            fail_saves: false,
            offline: false,
        }
    }

    /// The first `list_by_program` call signals `entered` and then waits on `release`.
    pub(super) fn gated(inner: InMemoryPlanStore, entered: Sender<()>, release: Receiver<()>) -> Self {
        Self {
            gate: Mutex::new(Some((entered, release))),
            ..Self::new(inner)
        }
    }

    pub(super) fn failing_saves(inner: InMemoryPlanStore) -> Self {
        Self {
            fail_saves: true,
            ..Self::new(inner)
        }
    }

    pub(super) fn offline(inner: InMemoryPlanStore) -> Self {
        Self {
            offline: true,
            ..Self::new(inner)
        }
    }

    fn check(&self) -> Result<(), RepositoryError> {
        if self.offline {
            Err(RepositoryError::Unavailable("database offline".to_string()))
        } else {
            Ok(())
        }
    }
}

impl PersonCatalog for ScriptedStore {
    fn people(&self) -> Result<Vec<Person>, RepositoryError> {
        self.check()?;
        self.inner.people()
    }

    fn find_person(&self, id: &PersonId) -> Result<Option<Person>, RepositoryError> {
        self.check()?;
        self.inner.find_person(id)
    }
}

impl WeekPlanStore for ScriptedStore {
    fn find_by_date(&self, week_start: NaiveDate) -> Result<Option<WeekPlan>, RepositoryError> {
        self.check()?;
        self.inner.find_by_date(week_start)
    }

    fn find_week(&self, id: &WeekPlanId) -> Result<Option<WeekPlan>, RepositoryError> {
        self.check()?;
        self.inner.find_week(id)
    }

    fn list_by_program(
        &self,
        program_id: &ProgramId,
        filter: WeekPlanFilter,
    ) -> Result<Vec<WeekPlanSummary>, RepositoryError> {
        self.check()?;
        let gate = self.gate.lock().expect("gate mutex poisoned").take();
        if let Some((entered, release)) = gate {
            entered.send(()).expect("signal entry");
            release.recv().expect("wait for release");
        }
        self.inner.list_by_program(program_id, filter)
    }

    fn list_in_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<WeekPlan>, RepositoryError> {
        self.check()?;
        self.inner.list_in_range(start, end)
    }
}

impl AssignmentStore for ScriptedStore {
    fn list_by_week(
        &self,
        week_plan_id: &WeekPlanId,
    ) -> Result<Vec<AssignmentWithPerson>, RepositoryError> {
        self.check()?;
        self.inner.list_by_week(week_plan_id)
    }

    fn save(&self, assignment: Assignment) -> Result<Assignment, RepositoryError> {
        self.check()?;
        if self.fail_saves {
            return Err(RepositoryError::Unavailable("write rejected".to_string()));
        }
        self.inner.save(assignment)
    }

    fn remove(&self, id: &AssignmentId) -> Result<(), RepositoryError> {
        self.check()?;
        self.inner.remove(id)
    }

    fn is_person_assigned_to_part(
        &self,
        weekly_part_id: &WeeklyPartId,
        person_id: &PersonId,
    ) -> Result<bool, RepositoryError> {
        self.check()?;
        self.inner.is_person_assigned_to_part(weekly_part_id, person_id)
    }

    fn history_before(&self, before: NaiveDate) -> Result<Vec<HistoryEntry>, RepositoryError> {
        self.check()?;
        self.inner.history_before(before)
    }
}

impl EligibilityStore for ScriptedStore {
    fn can_lead(
        &self,
        person_id: &PersonId,
        role_type_id: &RoleTypeId,
    ) -> Result<bool, RepositoryError> {
        self.check()?;
        self.inner.can_lead(person_id, role_type_id)
    }

    fn future_commitments(
        &self,
        person_id: &PersonId,
        from: NaiveDate,
    ) -> Result<Vec<WeekCommitment>, RepositoryError> {
        self.check()?;
        self.inner.future_commitments(person_id, from)
    }
}
