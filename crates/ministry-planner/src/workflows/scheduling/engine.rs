use std::collections::HashSet;
use std::sync::Arc;

use chrono::NaiveDate;

use super::auto_assign::{AutoAssignError, AutoAssignReport, AutoAssigner, SingleFlight};
use super::domain::{Assignment, AssignmentId, PersonId, ProgramId, WeekCommitment, WeeklyPartId};
use super::eligibility::{check_slot, suspension_impact};
use super::ranking::{sort_for_picker, NeverAssigned, RankedCandidate, RankingRequest, RecencyRanker};
use super::repository::{RepositoryError, SchedulingStore};
use super::service::{AssignmentError, AssignmentService};
use super::settings::AssignmentSettings;
use super::validation::{AssignmentValidator, ValidationError, ValidationFinding};

/// Facade composing the ranker, single-slot service, batch runner, and validator over one store.
pub struct SchedulingEngine<S> {
    store: Arc<S>,
    ranker: RecencyRanker<S>,
    assignments: AssignmentService<S>,
    auto: AutoAssigner<S>,
    validator: AssignmentValidator<S>,
}

impl<S> SchedulingEngine<S>
where
    S: SchedulingStore + 'static,
{
    pub fn new(store: Arc<S>) -> Self {
        Self::with_flight(store, Arc::new(SingleFlight::new()))
    }

    pub fn with_flight(store: Arc<S>, flight: Arc<SingleFlight>) -> Self {
        Self {
            ranker: RecencyRanker::new(Arc::clone(&store)),
            assignments: AssignmentService::new(Arc::clone(&store)),
            auto: AutoAssigner::with_flight(Arc::clone(&store), flight),
            validator: AssignmentValidator::new(Arc::clone(&store)),
            store,
        }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub fn assign(
        &self,
        week_start: NaiveDate,
        weekly_part_id: &WeeklyPartId,
        person_id: &PersonId,
        slot: i64,
    ) -> Result<Assignment, AssignmentError> {
        self.assignments
            .assign(week_start, weekly_part_id, person_id, slot)
    }

    pub fn remove(&self, assignment_id: &AssignmentId) -> Result<(), AssignmentError> {
        self.assignments.remove(assignment_id)
    }

    pub fn auto_assign(
        &self,
        program_id: &ProgramId,
        reference_date: NaiveDate,
    ) -> Result<AutoAssignReport, AutoAssignError> {
        self.auto.auto_assign(program_id, reference_date)
    }

    pub fn validate(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<ValidationFinding>, ValidationError> {
        self.validator.validate(start, end)
    }

    /// Candidate list for a human picker, sorted longest-rested first.
    pub fn candidates(
        &self,
        week_start: NaiveDate,
        weekly_part_id: &WeeklyPartId,
        slot: i64,
        never: NeverAssigned,
    ) -> Result<Vec<RankedCandidate>, AssignmentError> {
        let week = self
            .store
            .find_by_date(week_start)?
            .ok_or(AssignmentError::WeekNotFound { week_start })?;
        let part = week
            .part(weekly_part_id)
            .ok_or_else(|| AssignmentError::PartNotFound {
                weekly_part_id: weekly_part_id.clone(),
            })?;
        let slot = check_slot(&part.role_type, slot)?;

        let excluded = HashSet::new();
        let request = RankingRequest {
            role_type: &part.role_type,
            slot,
            week_start,
            weekly_part_id: Some(&part.id),
            excluded: &excluded,
        };
        let mut candidates = self.ranker.rank_candidates(&request)?;
        sort_for_picker(&mut candidates, never);
        Ok(candidates)
    }

    pub fn settings(&self) -> Result<AssignmentSettings, RepositoryError> {
        self.store.load_settings()
    }

    pub fn update_settings(
        &self,
        settings: AssignmentSettings,
    ) -> Result<AssignmentSettings, RepositoryError> {
        self.store.save_settings(settings)
    }

    pub fn suspension_impact(
        &self,
        person_id: &PersonId,
        from: NaiveDate,
    ) -> Result<Vec<WeekCommitment>, RepositoryError> {
        suspension_impact(&*self.store, person_id, from)
    }
}
