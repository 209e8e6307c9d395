//! HTTP handlers for the REST API.
//!
//! Each handler corresponds to an API endpoint and delegates to the
//! service layer for scheduling logic. Every session read goes through the
//! status resolver, so callers always see the time-derived lifecycle phase
//! rather than the raw stored status.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use std::time::Duration;

use super::dto::{
    AvailabilityQuery, ClassroomAvailability, CreateSessionRequest, DeleteSessionResponse,
    GenerateScheduleRequest, GenerateScheduleResponse, HealthResponse, SessionListResponse,
    SessionView, TeacherAvailability, UpdateSessionRequest, UpdateSessionResponse,
};
use super::error::AppError;
use super::state::AppState;
use crate::api::SessionId;
use crate::db::repository::DirectoryRepository;
use crate::models::TimeSlot;
use crate::scheduler::GenerationPlan;
use crate::services::availability;

/// Result type for handlers.
pub type HandlerResult<T> = Result<Json<T>, AppError>;

fn now() -> chrono::NaiveDateTime {
    chrono::Local::now().naive_local()
}

// =============================================================================
// Health Check
// =============================================================================

/// GET /health
///
/// Health check endpoint to verify the service is running and the storage
/// backend is reachable.
pub async fn health_check(State(state): State<AppState>) -> HandlerResult<HealthResponse> {
    let db_status = match state.repository.health_check().await {
        Ok(true) => "connected".to_string(),
        Ok(false) => "disconnected".to_string(),
        Err(e) => format!("error: {}", e),
    };

    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        version: "v1".to_string(),
        database: db_status,
    }))
}

// =============================================================================
// Session CRUD
// =============================================================================

/// GET /v1/sessions
///
/// List all sessions with their computed display status.
pub async fn list_sessions(State(state): State<AppState>) -> HandlerResult<SessionListResponse> {
    let sessions = state.lifecycle.list(now()).await?;
    let total = sessions.len();
    Ok(Json(SessionListResponse { sessions, total }))
}

/// GET /v1/sessions/{id}
///
/// Fetch a single session with its computed display status.
pub async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> HandlerResult<SessionView> {
    let view = state.lifecycle.get(SessionId::new(id), now()).await?;
    Ok(Json(view))
}

/// POST /v1/sessions
///
/// Validate and create a session. Conflicts and unavailable supervisors
/// come back as structured 400 responses.
pub async fn create_session(
    State(state): State<AppState>,
    Json(request): Json<CreateSessionRequest>,
) -> Result<(StatusCode, Json<SessionView>), AppError> {
    let draft = request.into_draft().map_err(AppError::BadRequest)?;
    let session = state.lifecycle.create(draft).await?;
    let view = SessionView::resolve(&session, now());
    Ok((StatusCode::CREATED, Json(view)))
}

/// PATCH /v1/sessions/{id}
///
/// Apply a partial update. The response lists the supervisors whose
/// assignments changed so the caller can notify them.
pub async fn update_session(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<UpdateSessionRequest>,
) -> HandlerResult<UpdateSessionResponse> {
    let patch = request.into_patch().map_err(AppError::BadRequest)?;
    let update = state.lifecycle.update(SessionId::new(id), patch).await?;
    Ok(Json(UpdateSessionResponse {
        session: SessionView::resolve(&update.session, now()),
        affected_supervisors: update.affected_supervisors,
    }))
}

/// DELETE /v1/sessions/{id}
///
/// Remove a session and report its prior supervisors.
pub async fn delete_session(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> HandlerResult<DeleteSessionResponse> {
    let affected = state.lifecycle.delete(SessionId::new(id)).await?;
    Ok(Json(DeleteSessionResponse {
        affected_supervisors: affected,
    }))
}

// =============================================================================
// Batch Generation
// =============================================================================

/// POST /v1/schedule/generate
///
/// Generate sessions for every pending requirement in the date range.
/// Partial results are returned with 201; the `unscheduled` list carries
/// whatever could not be placed.
pub async fn generate_schedule(
    State(state): State<AppState>,
    Json(request): Json<GenerateScheduleRequest>,
) -> Result<(StatusCode, Json<GenerateScheduleResponse>), AppError> {
    let mut daily_slots = Vec::with_capacity(request.daily_slots.len());
    for entry in &request.daily_slots {
        let slot = TimeSlot::new(entry.start, entry.end)
            .map_err(|e| AppError::BadRequest(e.to_string()))?;
        daily_slots.push(slot);
    }

    let plan = GenerationPlan {
        start_date: request.start_date,
        end_date: request.end_date,
        daily_slots,
        deadline: request.timeout_seconds.map(Duration::from_secs),
    };

    let outcome = state.generator.generate(&plan).await?;
    let at = now();
    let data: Vec<SessionView> = outcome
        .scheduled
        .iter()
        .map(|s| SessionView::resolve(s, at))
        .collect();

    Ok((
        StatusCode::CREATED,
        Json(GenerateScheduleResponse {
            count: data.len(),
            data,
            unscheduled: outcome.unscheduled,
        }),
    ))
}

// =============================================================================
// Availability
// =============================================================================

/// GET /v1/availability/teachers
///
/// Resolve every teacher against the queried interval, with their daily
/// and weekly supervision load.
pub async fn available_teachers(
    State(state): State<AppState>,
    Query(query): Query<AvailabilityQuery>,
) -> HandlerResult<Vec<TeacherAvailability>> {
    let slot = TimeSlot::new(query.start, query.end)
        .map_err(|e| AppError::BadRequest(e.to_string()))?;
    let teachers = availability::teacher_availability_overview(
        state.repository.as_ref(),
        query.date,
        &slot,
        query.session_id,
    )
    .await?;
    Ok(Json(teachers))
}

/// GET /v1/availability/classrooms
///
/// Report free/busy for every classroom over the queried interval.
pub async fn available_classrooms(
    State(state): State<AppState>,
    Query(query): Query<AvailabilityQuery>,
) -> HandlerResult<Vec<ClassroomAvailability>> {
    let slot = TimeSlot::new(query.start, query.end)
        .map_err(|e| AppError::BadRequest(e.to_string()))?;
    let classrooms = state.repository.list_classrooms().await?;
    let out = availability::classroom_availability(
        state.repository.as_ref(),
        &classrooms,
        query.date,
        &slot,
        query.session_id,
    )
    .await?;
    Ok(Json(out))
}
