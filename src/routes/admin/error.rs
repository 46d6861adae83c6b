use axum::{
    Json,
    extract::rejection::FormRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use crate::{db::DbError, services::GroupError};

/// Error body: `{"error": {"code": "...", "message": "..."}}`
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorInfo,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Machine-readable error code
    pub code: String,
    pub message: String,
    /// Set by the request ID middleware
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

impl ErrorResponse {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: ErrorInfo {
                code: code.into(),
                message: message.into(),
                request_id: None,
            },
        }
    }
}

#[derive(Debug)]
pub enum AdminError {
    InvalidInput(String),
    NotFound(String),
    Conflict(String),
    Unauthenticated(String),
    Forbidden(String),
    ServicesRequired,
    Database(DbError),
}

impl From<DbError> for AdminError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::Conflict(msg) => AdminError::Conflict(msg),
            DbError::NotConfigured => AdminError::ServicesRequired,
            _ => AdminError::Database(err),
        }
    }
}

impl From<GroupError> for AdminError {
    fn from(err: GroupError) -> Self {
        match err {
            GroupError::InvalidInput(msg) => AdminError::InvalidInput(msg),
            GroupError::NotFound(msg) => AdminError::NotFound(msg),
            GroupError::Conflict(msg) => AdminError::Conflict(msg),
            GroupError::Database(db_err) => db_err.into(),
        }
    }
}

impl From<FormRejection> for AdminError {
    fn from(rejection: FormRejection) -> Self {
        AdminError::InvalidInput(rejection.body_text())
    }
}

impl IntoResponse for AdminError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            AdminError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, "invalid_input", msg),
            AdminError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg),
            AdminError::Conflict(msg) => (StatusCode::CONFLICT, "conflict", msg),
            AdminError::Unauthenticated(msg) => {
                (StatusCode::UNAUTHORIZED, "unauthenticated", msg)
            }
            AdminError::Forbidden(msg) => (StatusCode::FORBIDDEN, "insufficient_privileges", msg),
            AdminError::ServicesRequired => (
                StatusCode::SERVICE_UNAVAILABLE,
                "database_required",
                "Database is not configured".to_string(),
            ),
            AdminError::Database(err) => {
                tracing::error!(error = %err, "Database error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
                )
            }
        };

        (status, Json(ErrorResponse::new(code, message))).into_response()
    }
}
