use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::store::StoreError;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorObject,
}

#[derive(Debug, Serialize)]
pub struct ErrorObject {
    pub code: String,
    pub message: String,
}

#[derive(Debug)]
pub enum ApiError {
    Unauthorized(&'static str, String),
    Forbidden(&'static str, String),
    BadRequest(&'static str, String),
    NotFound(&'static str, String),
    Conflict(&'static str, String),
    Unprocessable(&'static str, String),
    Unavailable(&'static str, String),
    Internal(String),
}

impl ApiError {
    pub fn invalid_credentials() -> Self {
        ApiError::Unauthorized("INVALID_CREDENTIALS", "Username or password is incorrect".into())
    }

    pub fn session_expired() -> Self {
        ApiError::Unauthorized("SESSION_EXPIRED", "Session expired".into())
    }

    fn to_error_response(code: &str, message: &str) -> Json<ErrorResponse> {
        Json(ErrorResponse {
            error: ErrorObject {
                code: code.to_string(),
                message: message.to_string(),
            },
        })
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, msg) = match self {
            ApiError::Unauthorized(code, msg) => (StatusCode::UNAUTHORIZED, code, msg),
            ApiError::Forbidden(code, msg) => (StatusCode::FORBIDDEN, code, msg),
            ApiError::BadRequest(code, msg) => (StatusCode::BAD_REQUEST, code, msg),
            ApiError::NotFound(code, msg) => (StatusCode::NOT_FOUND, code, msg),
            ApiError::Conflict(code, msg) => (StatusCode::CONFLICT, code, msg),
            ApiError::Unprocessable(code, msg) => (StatusCode::UNPROCESSABLE_ENTITY, code, msg),
            ApiError::Unavailable(code, msg) => (StatusCode::SERVICE_UNAVAILABLE, code, msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL", msg),
        };
        (status, ApiError::to_error_response(code, &msg)).into_response()
    }
}

/// Why a scheduling operation was refused. Every variant is raised before
/// anything is written.
#[derive(Debug, Error)]
pub enum SchedulingError {
    #[error("the appointment store is unavailable: {0}")]
    StoreUnavailable(String),
    #[error("the requested time overlaps an existing appointment")]
    SchedulingConflict,
    #[error("the requested time is outside service hours")]
    InvalidServiceHours,
    #[error("only pending appointments can be edited")]
    EditNotAllowed,
    #[error("appointment not found")]
    NotFound,
    #[error("appointment start is in the past")]
    StartInPast,
    #[error("{0}")]
    Validation(String),
}

impl From<StoreError> for SchedulingError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Exclusion => SchedulingError::SchedulingConflict,
            StoreError::Unavailable(msg) => SchedulingError::StoreUnavailable(msg),
        }
    }
}

impl From<SchedulingError> for ApiError {
    fn from(e: SchedulingError) -> Self {
        match e {
            SchedulingError::StoreUnavailable(detail) => {
                tracing::error!(%detail, "appointment store call failed");
                ApiError::Unavailable(
                    "STORE_UNAVAILABLE",
                    "Could not reach the appointment store, please try again".into(),
                )
            }
            SchedulingError::SchedulingConflict => ApiError::Conflict(
                "SCHEDULING_CONFLICT",
                "Another appointment already uses that time; check the start time".into(),
            ),
            SchedulingError::InvalidServiceHours => ApiError::Unprocessable(
                "INVALID_SERVICE_HOURS",
                "Pick a time between 8:00 a.m. and 12:00 p.m. or 2:30 p.m. and 5:00 p.m.; \
                 the appointment must end before closing"
                    .into(),
            ),
            SchedulingError::EditNotAllowed => ApiError::Conflict(
                "EDIT_NOT_ALLOWED",
                "Only pending appointments can be edited".into(),
            ),
            SchedulingError::NotFound => {
                ApiError::NotFound("NOT_FOUND", "appointment not found".into())
            }
            SchedulingError::StartInPast => ApiError::BadRequest(
                "START_IN_PAST",
                "appointment start must not be in the past".into(),
            ),
            SchedulingError::Validation(msg) => ApiError::BadRequest("VALIDATION_ERROR", msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(e: SchedulingError) -> StatusCode {
        ApiError::from(e).into_response().status()
    }

    #[test]
    fn scheduling_errors_map_to_http_statuses() {
        assert_eq!(status_of(SchedulingError::SchedulingConflict), StatusCode::CONFLICT);
        assert_eq!(
            status_of(SchedulingError::InvalidServiceHours),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(status_of(SchedulingError::EditNotAllowed), StatusCode::CONFLICT);
        assert_eq!(status_of(SchedulingError::NotFound), StatusCode::NOT_FOUND);
        assert_eq!(
            status_of(SchedulingError::StoreUnavailable("timeout".into())),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            status_of(SchedulingError::Validation("title is required".into())),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn exclusion_violation_is_a_conflict() {
        assert!(matches!(
            SchedulingError::from(StoreError::Exclusion),
            SchedulingError::SchedulingConflict
        ));
    }
}
