//! Weekly programme assignment engine.
//!
//! Ranks people by how long they have rested, commits single slots under hard constraints,
//! fills a program's upcoming weeks in one guarded batch, and audits what has already been
//! committed. Persistence stays behind the traits in [`repository`].

pub mod auto_assign;
pub mod domain;
pub mod eligibility;
pub mod engine;
pub mod memory;
pub mod ranking;
pub mod repository;
pub mod router;
pub mod service;
pub mod settings;
pub mod validation;

#[cfg(test)]
mod tests;

pub use auto_assign::{
    AutoAssignError, AutoAssignReport, AutoAssigner, SingleFlight, SingleFlightGuard,
    UnresolvedSlot, NO_ELIGIBLE_CANDIDATE,
};
pub use domain::{
    Assignment, AssignmentId, AssignmentWithPerson, HistoryEntry, Person, PersonId, ProgramId,
    RoleType, RoleTypeId, Sex, SexRule, SlotRole, WeekCommitment, WeekPlan, WeekPlanId,
    WeekPlanStatus, WeekPlanSummary, WeeklyPart, WeeklyPartId,
};
pub use eligibility::EligibilityViolation;
pub use engine::SchedulingEngine;
pub use memory::{InMemoryPlanStore, LeadEligibility, PlanSnapshot, SnapshotError};
pub use ranking::{NeverAssigned, RankedCandidate, RankingRequest, RecencyRanker};
pub use repository::{
    AssignmentStore, EligibilityStore, PersonCatalog, RepositoryError, SchedulingStore,
    SettingsStore, WeekPlanFilter, WeekPlanStore,
};
pub use router::scheduling_router;
pub use service::{AssignmentError, AssignmentService};
pub use settings::AssignmentSettings;
pub use validation::{
    write_findings_csv, AssignmentValidator, FindingKind, ValidationError, ValidationFinding,
};
