use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::domain::{
    weeks_between, HistoryEntry, Person, PersonId, RoleType, RoleTypeId, SlotRole, WeeklyPartId,
};
use super::eligibility::{can_occupy, meets_role_eligibility};
use super::repository::{AssignmentStore, EligibilityStore, PersonCatalog, RepositoryError};

/// A rule-compliant candidate together with how long they have been resting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankedCandidate {
    pub person: Person,
    /// Weeks since the last assignment in the slot's scope; `None` when never assigned.
    pub last_global_weeks: Option<i64>,
    /// Weeks since the last assignment to this part type; `None` when never assigned.
    pub last_same_type_weeks: Option<i64>,
}

/// Input for a single ranking pass.
#[derive(Debug, Clone, Copy)]
pub struct RankingRequest<'a> {
    pub role_type: &'a RoleType,
    pub slot: u8,
    pub week_start: NaiveDate,
    /// When set, people already holding a slot of this part are dropped.
    pub weekly_part_id: Option<&'a WeeklyPartId>,
    pub excluded: &'a HashSet<PersonId>,
}

/// Most recent prior week per person, split by scope.
#[derive(Debug, Clone)]
pub struct RecencyIndex {
    as_of: NaiveDate,
    global: HashMap<PersonId, NaiveDate>,
    same_type: HashMap<PersonId, NaiveDate>,
}

impl RecencyIndex {
    /// Lead scope only looks at slot 1 history; assist scope looks at every slot.
    pub fn build(
        history: &[HistoryEntry],
        as_of: NaiveDate,
        role: SlotRole,
        role_type_id: Option<&RoleTypeId>,
    ) -> Self {
        let mut global: HashMap<PersonId, NaiveDate> = HashMap::new();
        let mut same_type: HashMap<PersonId, NaiveDate> = HashMap::new();

        for entry in history
            .iter()
            .filter(|entry| entry.week_start < as_of && role.counts(entry.slot))
        {
            keep_latest(&mut global, &entry.person_id, entry.week_start);
            if role_type_id == Some(&entry.role_type_id) {
                keep_latest(&mut same_type, &entry.person_id, entry.week_start);
            }
        }

        Self {
            as_of,
            global,
            same_type,
        }
    }

    pub fn weeks_since_global(&self, person_id: &PersonId) -> Option<i64> {
        self.global
            .get(person_id)
            .map(|last| weeks_between(*last, self.as_of))
    }

    pub fn weeks_since_same_type(&self, person_id: &PersonId) -> Option<i64> {
        self.same_type
            .get(person_id)
            .map(|last| weeks_between(*last, self.as_of))
    }
}

fn keep_latest(index: &mut HashMap<PersonId, NaiveDate>, person_id: &PersonId, week: NaiveDate) {
    index
        .entry(person_id.clone())
        .and_modify(|latest| {
            if week > *latest {
                *latest = week;
            }
        })
        .or_insert(week);
}

/// Computes rule-compliant candidates with their recency, in roster order.
pub struct RecencyRanker<S> {
    store: Arc<S>,
}

impl<S> Clone for RecencyRanker<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S> RecencyRanker<S>
where
    S: PersonCatalog + AssignmentStore + EligibilityStore + 'static,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Candidates in catalog order. No recency ordering is applied here; see
    /// [`sort_for_picker`] for the interactive ordering.
    pub fn rank_candidates(
        &self,
        request: &RankingRequest<'_>,
    ) -> Result<Vec<RankedCandidate>, RepositoryError> {
        let role = SlotRole::of(request.slot);
        let history = self.store.history_before(request.week_start)?;
        let recency = RecencyIndex::build(
            &history,
            request.week_start,
            role,
            Some(&request.role_type.id),
        );

        let mut candidates = Vec::new();
        for person in self.store.people()? {
            if !person.active || person.suspended {
                continue;
            }
            if !can_occupy(request.role_type, request.slot, &person) {
                continue;
            }
            if request.excluded.contains(&person.id) {
                continue;
            }
            if let Some(part_id) = request.weekly_part_id {
                if self.store.is_person_assigned_to_part(part_id, &person.id)? {
                    continue;
                }
            }

            let can_lead = match role {
                SlotRole::Lead => self.store.can_lead(&person.id, &request.role_type.id)?,
                SlotRole::Assist => false,
            };
            if !meets_role_eligibility(&person, request.slot, can_lead) {
                continue;
            }

            candidates.push(RankedCandidate {
                last_global_weeks: recency.weeks_since_global(&person.id),
                last_same_type_weeks: recency.weeks_since_same_type(&person.id),
                person,
            });
        }

        Ok(candidates)
    }

    /// Weeks since the person's last assignment in `role` scope, as of `as_of`.
    pub fn weeks_since_last(
        &self,
        person_id: &PersonId,
        role: SlotRole,
        as_of: NaiveDate,
    ) -> Result<Option<i64>, RepositoryError> {
        Ok(self.recency_as_of(as_of, role)?.weeks_since_global(person_id))
    }

    pub fn recency_as_of(
        &self,
        as_of: NaiveDate,
        role: SlotRole,
    ) -> Result<RecencyIndex, RepositoryError> {
        let history = self.store.history_before(as_of)?;
        Ok(RecencyIndex::build(&history, as_of, role, None))
    }
}

/// Where people with no history land in the interactive list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NeverAssigned {
    #[default]
    First,
    Last,
}

/// Longest-rested first, ties broken by part type recency then roster order.
pub fn sort_for_picker(candidates: &mut [RankedCandidate], never: NeverAssigned) {
    candidates.sort_by(|a, b| {
        compare_rest(a.last_global_weeks, b.last_global_weeks, never)
            .then_with(|| compare_rest(a.last_same_type_weeks, b.last_same_type_weeks, never))
    });
}

fn compare_rest(a: Option<i64>, b: Option<i64>, never: NeverAssigned) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => b.cmp(&a),
        (None, None) => Ordering::Equal,
        (None, Some(_)) => match never {
            NeverAssigned::First => Ordering::Less,
            NeverAssigned::Last => Ordering::Greater,
        },
        (Some(_), None) => match never {
            NeverAssigned::First => Ordering::Greater,
            NeverAssigned::Last => Ordering::Less,
        },
    }
}
