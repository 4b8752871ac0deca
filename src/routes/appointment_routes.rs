// src/routes/appointment_routes.rs

use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    error::{ApiError, SchedulingError},
    middleware::auth_context::AuthContext,
    models::{AppState, Appointment, AppointmentRequest, OkData},
    scheduling::TimeWindow,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/appointments", get(list_appointments).post(create_appointment))
        .route("/appointments/check", post(check_slot))
        .route(
            "/appointments/{appointment_id}",
            get(get_appointment)
                .put(edit_appointment)
                .delete(delete_appointment),
        )
}

/* ============================================================
   Response DTOs
   ============================================================ */

#[derive(Debug, Serialize)]
pub struct ApiOk<T> {
    pub data: T,
}

#[derive(Debug, Serialize)]
pub struct SlotVerdict {
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
    pub available: bool,
    /// Error code explaining why the slot is not available.
    pub reason: Option<&'static str>,
}

#[derive(Debug, Deserialize)]
pub struct CheckSlotRequest {
    pub start_at: DateTime<Utc>,
    /// Set when checking a new time for an existing appointment.
    pub appointment_id: Option<Uuid>,
}

/* ============================================================
   GET /appointments
   ============================================================ */

pub async fn list_appointments(
    State(state): State<AppState>,
    _auth: AuthContext,
) -> Result<Json<ApiOk<Vec<Appointment>>>, ApiError> {
    let data = state.scheduler.list(Utc::now()).await?;
    Ok(Json(ApiOk { data }))
}

/* ============================================================
   GET /appointments/{id}
   ============================================================ */

pub async fn get_appointment(
    State(state): State<AppState>,
    _auth: AuthContext,
    Path(appointment_id): Path<Uuid>,
) -> Result<Json<ApiOk<Appointment>>, ApiError> {
    let data = state.scheduler.view(appointment_id, Utc::now()).await?;
    Ok(Json(ApiOk { data }))
}

/* ============================================================
   POST /appointments (create)
   ============================================================ */

pub async fn create_appointment(
    State(state): State<AppState>,
    auth: AuthContext,
    Json(req): Json<AppointmentRequest>,
) -> Result<Json<ApiOk<Appointment>>, ApiError> {
    let data = state.scheduler.create(&req, Utc::now()).await?;
    tracing::debug!(user_id = %auth.user_id, appointment_id = %data.appointment_id, "create by user");
    Ok(Json(ApiOk { data }))
}

/* ============================================================
   PUT /appointments/{id}
   ============================================================ */

pub async fn edit_appointment(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(appointment_id): Path<Uuid>,
    Json(req): Json<AppointmentRequest>,
) -> Result<Json<ApiOk<Appointment>>, ApiError> {
    let data = state
        .scheduler
        .edit(appointment_id, &req, Utc::now())
        .await?;
    tracing::debug!(user_id = %auth.user_id, %appointment_id, "edit by user");
    Ok(Json(ApiOk { data }))
}

/* ============================================================
   DELETE /appointments/{id}
   ============================================================ */

pub async fn delete_appointment(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(appointment_id): Path<Uuid>,
) -> Result<Json<ApiOk<OkData>>, ApiError> {
    state.scheduler.delete(appointment_id).await?;
    tracing::debug!(user_id = %auth.user_id, %appointment_id, "delete by user");
    Ok(Json(ApiOk {
        data: OkData { ok: true },
    }))
}

/* ============================================================
   POST /appointments/check  (dry run)
   ============================================================ */

pub async fn check_slot(
    State(state): State<AppState>,
    _auth: AuthContext,
    Json(req): Json<CheckSlotRequest>,
) -> Result<Json<ApiOk<SlotVerdict>>, ApiError> {
    let outcome = state
        .scheduler
        .check(req.start_at, req.appointment_id, Utc::now())
        .await;
    let window = state.scheduler.rules().window_for(req.start_at);
    let data = slot_verdict(window, outcome)?;
    Ok(Json(ApiOk { data }))
}

/// Rule violations become an unavailable verdict; anything else (store
/// outage, bad input) is returned as an error.
fn slot_verdict(
    window: Option<TimeWindow>,
    outcome: Result<TimeWindow, SchedulingError>,
) -> Result<SlotVerdict, ApiError> {
    let reason = match outcome {
        Ok(_) => None,
        Err(SchedulingError::SchedulingConflict) => Some("SCHEDULING_CONFLICT"),
        Err(SchedulingError::InvalidServiceHours) => Some("INVALID_SERVICE_HOURS"),
        Err(SchedulingError::StartInPast) => Some("START_IN_PAST"),
        Err(e) => return Err(e.into()),
    };
    let window = window
        .ok_or_else(|| SchedulingError::Validation("start_at is out of range".into()))?;
    Ok(SlotVerdict {
        start_at: window.start,
        end_at: window.end,
        available: reason.is_none(),
        reason,
    })
}
