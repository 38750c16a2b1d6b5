use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, info_span, warn};

use super::domain::{Assignment, PersonId, ProgramId, WeekPlanStatus};
use super::eligibility::is_filled;
use super::ranking::{RankingRequest, RecencyRanker};
use super::repository::{
    AssignmentStore, EligibilityStore, PersonCatalog, RepositoryError, WeekPlanFilter,
    WeekPlanStore,
};
use super::service::AssignmentService;

pub const NO_ELIGIBLE_CANDIDATE: &str = "no eligible candidate";

/// Non-blocking, non-reentrant run guard. A second `try_acquire` while a guard is alive fails.
#[derive(Debug, Default)]
pub struct SingleFlight {
    busy: AtomicBool,
}

impl SingleFlight {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn try_acquire(&self) -> Option<SingleFlightGuard<'_>> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| SingleFlightGuard { flight: self })
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}

/// Releases the [`SingleFlight`] on drop.
#[derive(Debug)]
pub struct SingleFlightGuard<'a> {
    flight: &'a SingleFlight,
}

impl Drop for SingleFlightGuard<'_> {
    fn drop(&mut self) {
        self.flight.busy.store(false, Ordering::Release);
    }
}

/// A slot the batch runner could not fill.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnresolvedSlot {
    pub week_start: NaiveDate,
    pub part_label: String,
    pub slot: u8,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutoAssignReport {
    pub assigned_count: usize,
    pub unresolved: Vec<UnresolvedSlot>,
}

#[derive(Debug, thiserror::Error)]
pub enum AutoAssignError {
    #[error("scheduling store unavailable: {0}")]
    Store(#[from] RepositoryError),
}

/// Fills every open slot of a program's upcoming active weeks, one greedy decision at a time.
pub struct AutoAssigner<S> {
    store: Arc<S>,
    ranker: RecencyRanker<S>,
    service: AssignmentService<S>,
    flight: Arc<SingleFlight>,
}

impl<S> AutoAssigner<S>
where
    S: WeekPlanStore + AssignmentStore + PersonCatalog + EligibilityStore + 'static,
{
    pub fn new(store: Arc<S>) -> Self {
        Self::with_flight(store, Arc::new(SingleFlight::new()))
    }

    /// Share `flight` with other runners so that at most one of them works at a time.
    pub fn with_flight(store: Arc<S>, flight: Arc<SingleFlight>) -> Self {
        Self {
            ranker: RecencyRanker::new(Arc::clone(&store)),
            service: AssignmentService::new(Arc::clone(&store)),
            store,
            flight,
        }
    }

    pub fn flight(&self) -> &Arc<SingleFlight> {
        &self.flight
    }

    /// Run the batch for weeks starting on or after `reference_date`.
    ///
    /// Returns an empty report without doing anything when another run holds the guard.
    /// Per-slot failures land in `unresolved`; only an unreachable store aborts the run.
    pub fn auto_assign(
        &self,
        program_id: &ProgramId,
        reference_date: NaiveDate,
    ) -> Result<AutoAssignReport, AutoAssignError> {
        let Some(_guard) = self.flight.try_acquire() else {
            debug!(program = %program_id, "auto-assignment already running, skipping");
            return Ok(AutoAssignReport::default());
        };

        let span = info_span!("auto_assign", program = %program_id, from = %reference_date);
        let _entered = span.enter();

        let filter = WeekPlanFilter {
            status: Some(WeekPlanStatus::Active),
            from: Some(reference_date),
            to: None,
        };
        let mut weeks = self.store.list_by_program(program_id, filter)?;
        weeks.sort_by_key(|summary| summary.week_start);

        let mut report = AutoAssignReport::default();

        for summary in weeks {
            let Some(week) = self.store.find_week(&summary.id)? else {
                warn!(week = %summary.week_start, "week plan disappeared during auto-assignment");
                continue;
            };

            let mut committed: Vec<Assignment> = self
                .store
                .list_by_week(&week.id)?
                .into_iter()
                .map(|row| row.assignment)
                .collect();
            let mut excluded: HashSet<PersonId> = committed
                .iter()
                .map(|assignment| assignment.person_id.clone())
                .collect();

            for part in week.ordered_parts() {
                if part.role_type.fixed {
                    continue;
                }

                for slot in 1..=part.role_type.slot_count {
                    if is_filled(&committed, &part.id, slot) {
                        continue;
                    }

                    let request = RankingRequest {
                        role_type: &part.role_type,
                        slot,
                        week_start: week.week_start,
                        weekly_part_id: Some(&part.id),
                        excluded: &excluded,
                    };
                    let candidate = self.ranker.rank_candidates(&request)?.into_iter().next();

                    let Some(candidate) = candidate else {
                        warn!(
                            week = %week.week_start,
                            part = %part.role_type.label,
                            slot,
                            "no eligible candidate"
                        );
                        report.unresolved.push(UnresolvedSlot {
                            week_start: week.week_start,
                            part_label: part.role_type.label.clone(),
                            slot,
                            reason: NO_ELIGIBLE_CANDIDATE.to_string(),
                        });
                        continue;
                    };

                    match self.service.assign_in_week(
                        &week,
                        &part.id,
                        &candidate.person.id,
                        i64::from(slot),
                    ) {
                        Ok(assignment) => {
                            report.assigned_count += 1;
                            committed.push(assignment);
                            excluded.insert(candidate.person.id);
                        }
                        Err(err) => {
                            warn!(
                                week = %week.week_start,
                                part = %part.role_type.label,
                                slot,
                                error = %err,
                                "could not commit auto-assignment"
                            );
                            report.unresolved.push(UnresolvedSlot {
                                week_start: week.week_start,
                                part_label: part.role_type.label.clone(),
                                slot,
                                reason: err.to_string(),
                            });
                        }
                    }
                }
            }
        }

        info!(
            assigned = report.assigned_count,
            unresolved = report.unresolved.len(),
            "auto-assignment finished"
        );
        Ok(report)
    }
}
