//! Read-only audit of committed assignments.
//!
//! Findings are data, not errors: nothing here mutates the store or corrects what it flags.

use std::collections::{HashMap, HashSet};
use std::io::Write;
use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::domain::{AssignmentWithPerson, PersonId, SlotRole, WeekPlan};
use super::ranking::{RecencyIndex, RecencyRanker};
use super::repository::{
    AssignmentStore, EligibilityStore, PersonCatalog, RepositoryError, SettingsStore,
    WeekPlanStore,
};
use super::settings::AssignmentSettings;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FindingKind {
    DuplicateAssignment,
    CooldownViolation,
    IneligibleAssignment,
}

impl FindingKind {
    pub const fn label(self) -> &'static str {
        match self {
            FindingKind::DuplicateAssignment => "duplicate_assignment",
            FindingKind::CooldownViolation => "cooldown_violation",
            FindingKind::IneligibleAssignment => "ineligible_assignment",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationFinding {
    pub kind: FindingKind,
    pub week_start: NaiveDate,
    pub person_id: PersonId,
    pub person_name: String,
    /// Absent for duplicate findings, which span several parts.
    pub part_label: Option<String>,
    pub detail: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("scheduling store unavailable: {0}")]
    Store(#[from] RepositoryError),
}

pub struct AssignmentValidator<S> {
    store: Arc<S>,
    ranker: RecencyRanker<S>,
}

impl<S> AssignmentValidator<S>
where
    S: WeekPlanStore + AssignmentStore + PersonCatalog + EligibilityStore + SettingsStore + 'static,
{
    pub fn new(store: Arc<S>) -> Self {
        Self {
            ranker: RecencyRanker::new(Arc::clone(&store)),
            store,
        }
    }

    /// Scan every week plan starting within `start..=end`.
    pub fn validate(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<ValidationFinding>, ValidationError> {
        let settings = self.store.load_settings()?.normalized();
        let mut findings = Vec::new();

        for week in self.store.list_in_range(start, end)? {
            let rows = self.store.list_by_week(&week.id)?;
            findings.extend(duplicate_findings(&week, &rows));
            self.slot_findings(&week, &rows, &settings, &mut findings)?;
        }

        debug!(%start, %end, findings = findings.len(), "validation pass finished");
        Ok(findings)
    }

    fn slot_findings(
        &self,
        week: &WeekPlan,
        rows: &[AssignmentWithPerson],
        settings: &AssignmentSettings,
        findings: &mut Vec<ValidationFinding>,
    ) -> Result<(), ValidationError> {
        let mut recency: HashMap<SlotRole, RecencyIndex> = HashMap::new();

        for row in rows {
            let assignment = &row.assignment;
            let Some(part) = week.part(&assignment.weekly_part_id) else {
                warn!(
                    week = %week.week_start,
                    part = %assignment.weekly_part_id,
                    "assignment references a part outside its week"
                );
                continue;
            };
            let role = SlotRole::of(assignment.slot);

            let threshold = settings.cooldown_for(role);
            if threshold > 0 {
                if !recency.contains_key(&role) {
                    let built = self.ranker.recency_as_of(week.week_start, role)?;
                    recency.insert(role, built);
                }
                let index = &recency[&role];
                if let Some(weeks) = index.weeks_since_global(&row.person.id) {
                    if weeks < threshold {
                        findings.push(ValidationFinding {
                            kind: FindingKind::CooldownViolation,
                            week_start: week.week_start,
                            person_id: row.person.id.clone(),
                            person_name: row.person.display_name(),
                            part_label: Some(part.role_type.label.clone()),
                            detail: format!(
                                "{} assigned {weeks} week(s) after the previous one, cooldown is {threshold}",
                                role.label()
                            ),
                        });
                    }
                }
            }

            let eligible = match role {
                SlotRole::Lead => self.store.can_lead(&row.person.id, &part.role_type.id)?,
                SlotRole::Assist => row.person.can_assist,
            };
            if !eligible {
                findings.push(ValidationFinding {
                    kind: FindingKind::IneligibleAssignment,
                    week_start: week.week_start,
                    person_id: row.person.id.clone(),
                    person_name: row.person.display_name(),
                    part_label: Some(part.role_type.label.clone()),
                    detail: format!("not eligible to {} this part", role.label()),
                });
            }
        }

        Ok(())
    }
}

/// One finding per person holding more than one assignment in the week.
fn duplicate_findings(week: &WeekPlan, rows: &[AssignmentWithPerson]) -> Vec<ValidationFinding> {
    let mut counts: HashMap<&PersonId, usize> = HashMap::new();
    for row in rows {
        *counts.entry(&row.person.id).or_default() += 1;
    }

    let mut reported = HashSet::new();
    rows.iter()
        .filter(|row| counts[&row.person.id] > 1 && reported.insert(&row.person.id))
        .map(|row| ValidationFinding {
            kind: FindingKind::DuplicateAssignment,
            week_start: week.week_start,
            person_id: row.person.id.clone(),
            person_name: row.person.display_name(),
            part_label: None,
            detail: format!(
                "{} assignments in the same week",
                counts[&row.person.id]
            ),
        })
        .collect()
}

#[derive(Serialize)]
struct FindingRow<'a> {
    kind: &'static str,
    week_start: NaiveDate,
    person: &'a str,
    part: Option<&'a str>,
    detail: &'a str,
}

const CSV_HEADER: [&str; 5] = ["kind", "week_start", "person", "part", "detail"];

/// Write findings as CSV. The header row is written even when there are no findings.
pub fn write_findings_csv<W: Write>(
    findings: &[ValidationFinding],
    writer: W,
) -> Result<(), csv::Error> {
    let mut csv_writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    csv_writer.write_record(CSV_HEADER)?;
    for finding in findings {
        csv_writer.serialize(FindingRow {
            kind: finding.kind.label(),
            week_start: finding.week_start,
            person: &finding.person_name,
            part: finding.part_label.as_deref(),
            detail: &finding.detail,
        })?;
    }
    csv_writer.flush()?;
    Ok(())
}
