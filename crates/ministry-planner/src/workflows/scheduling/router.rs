use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use chrono::{Local, NaiveDate};
use serde::Deserialize;

use super::auto_assign::AutoAssignReport;
use super::domain::{Assignment, AssignmentId, PersonId, ProgramId, WeekCommitment, WeeklyPartId};
use super::engine::SchedulingEngine;
use super::ranking::{NeverAssigned, RankedCandidate};
use super::repository::SchedulingStore;
use super::settings::AssignmentSettings;
use super::validation::ValidationFinding;
use crate::error::AppError;

#[derive(Debug, Deserialize)]
pub struct AssignRequest {
    pub week_start: NaiveDate,
    pub weekly_part_id: WeeklyPartId,
    pub person_id: PersonId,
    /// Signed so out-of-range requests reach the slot check instead of failing to parse.
    pub slot: i64,
}

#[derive(Debug, Default, Deserialize)]
pub struct AutoAssignRequest {
    #[serde(default)]
    pub reference_date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub struct CandidateQuery {
    pub week_start: NaiveDate,
    pub weekly_part_id: WeeklyPartId,
    pub slot: i64,
    #[serde(default)]
    pub never_assigned: NeverAssigned,
}

#[derive(Debug, Deserialize)]
pub struct ValidationQuery {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

#[derive(Debug, Deserialize)]
pub struct SuspensionQuery {
    #[serde(default)]
    pub from: Option<NaiveDate>,
}

/// Router exposing the assignment engine over HTTP.
pub fn scheduling_router<S>(engine: Arc<SchedulingEngine<S>>) -> Router
where
    S: SchedulingStore + 'static,
{
    Router::new()
        .route(
            "/api/v1/programs/:program_id/auto-assign",
            post(auto_assign_handler::<S>),
        )
        .route("/api/v1/assignments", post(assign_handler::<S>))
        .route(
            "/api/v1/assignments/candidates",
            get(candidates_handler::<S>),
        )
        .route(
            "/api/v1/assignments/:assignment_id",
            delete(remove_handler::<S>),
        )
        .route("/api/v1/validation", get(validation_handler::<S>))
        .route(
            "/api/v1/people/:person_id/commitments",
            get(commitments_handler::<S>),
        )
        .route(
            "/api/v1/settings",
            get(settings_handler::<S>).put(update_settings_handler::<S>),
        )
        .with_state(engine)
}

pub(crate) async fn assign_handler<S>(
    State(engine): State<Arc<SchedulingEngine<S>>>,
    Json(request): Json<AssignRequest>,
) -> Result<(StatusCode, Json<Assignment>), AppError>
where
    S: SchedulingStore + 'static,
{
    let assignment = engine.assign(
        request.week_start,
        &request.weekly_part_id,
        &request.person_id,
        request.slot,
    )?;
    Ok((StatusCode::CREATED, Json(assignment)))
}

pub(crate) async fn remove_handler<S>(
    State(engine): State<Arc<SchedulingEngine<S>>>,
    Path(assignment_id): Path<String>,
) -> Result<StatusCode, AppError>
where
    S: SchedulingStore + 'static,
{
    engine.remove(&AssignmentId(assignment_id))?;
    Ok(StatusCode::NO_CONTENT)
}

pub(crate) async fn auto_assign_handler<S>(
    State(engine): State<Arc<SchedulingEngine<S>>>,
    Path(program_id): Path<String>,
    request: Option<Json<AutoAssignRequest>>,
) -> Result<Json<AutoAssignReport>, AppError>
where
    S: SchedulingStore + 'static,
{
    let request = request.map(|Json(body)| body).unwrap_or_default();
    let reference_date = request
        .reference_date
        .unwrap_or_else(|| Local::now().date_naive());

    let report = engine.auto_assign(&ProgramId(program_id), reference_date)?;
    Ok(Json(report))
}

pub(crate) async fn candidates_handler<S>(
    State(engine): State<Arc<SchedulingEngine<S>>>,
    Query(query): Query<CandidateQuery>,
) -> Result<Json<Vec<RankedCandidate>>, AppError>
where
    S: SchedulingStore + 'static,
{
    let candidates = engine.candidates(
        query.week_start,
        &query.weekly_part_id,
        query.slot,
        query.never_assigned,
    )?;
    Ok(Json(candidates))
}

pub(crate) async fn validation_handler<S>(
    State(engine): State<Arc<SchedulingEngine<S>>>,
    Query(query): Query<ValidationQuery>,
) -> Result<Json<Vec<ValidationFinding>>, AppError>
where
    S: SchedulingStore + 'static,
{
    if query.end < query.start {
        return Err(AppError::InvalidRange {
            start: query.start,
            end: query.end,
        });
    }

    let findings = engine.validate(query.start, query.end)?;
    Ok(Json(findings))
}

pub(crate) async fn commitments_handler<S>(
    State(engine): State<Arc<SchedulingEngine<S>>>,
    Path(person_id): Path<String>,
    Query(query): Query<SuspensionQuery>,
) -> Result<Json<Vec<WeekCommitment>>, AppError>
where
    S: SchedulingStore + 'static,
{
    let from = query.from.unwrap_or_else(|| Local::now().date_naive());
    let commitments = engine.suspension_impact(&PersonId(person_id), from)?;
    Ok(Json(commitments))
}

pub(crate) async fn settings_handler<S>(
    State(engine): State<Arc<SchedulingEngine<S>>>,
) -> Result<Json<AssignmentSettings>, AppError>
where
    S: SchedulingStore + 'static,
{
    Ok(Json(engine.settings()?))
}

pub(crate) async fn update_settings_handler<S>(
    State(engine): State<Arc<SchedulingEngine<S>>>,
    Json(settings): Json<AssignmentSettings>,
) -> Result<Json<AssignmentSettings>, AppError>
where
    S: SchedulingStore + 'static,
{
    Ok(Json(engine.update_settings(settings)?))
}
