use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use chrono::NaiveDate;
use metrics_exporter_prometheus::PrometheusHandle;
use ministry_planner::error::AppError;
use ministry_planner::workflows::scheduling::InMemoryPlanStore;
use tracing::{info, warn};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

/// Whether a missing snapshot file is an error or the start of an empty plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum MissingSnapshot {
    Fail,
    StartEmpty,
}

pub(crate) fn open_store(path: &Path, missing: MissingSnapshot) -> Result<InMemoryPlanStore, AppError> {
    if !path.exists() && missing == MissingSnapshot::StartEmpty {
        warn!(path = %path.display(), "snapshot not found, starting with an empty plan");
        return Ok(InMemoryPlanStore::default());
    }

    let store = InMemoryPlanStore::load_json(path)?;
    info!(path = %path.display(), "plan snapshot loaded");
    Ok(store)
}
