// src/error.rs

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::fmt;

/// Global Application Error Enum.
/// Every variant maps to a stable machine-readable kind and an HTTP status.
#[derive(Debug, Clone, PartialEq)]
pub enum AppError {
    // 500 Internal Server Error (storage / I/O failures)
    InternalServerError(String),

    // 400 Bad Request (malformed body, missing or invalid field)
    BadRequest(String),

    // 401 Unauthorized (no identity resolved for an owner-scoped read)
    Unauthorized(String),

    // 403 Forbidden (session owned by another identity)
    Forbidden(String),

    // 404 Not Found (unknown question or session)
    NotFound(String),

    // 409 Conflict (data-integrity gap, e.g. a question without a correct option)
    Conflict(String),

    // 422 Unprocessable Entity (operation not possible in the current state)
    InvalidState(String),
}

impl AppError {
    /// Machine-readable error kind sent alongside the message.
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::InternalServerError(_) => "storage_failure",
            AppError::BadRequest(_) => "invalid_input",
            AppError::Unauthorized(_) => "unauthorized",
            AppError::Forbidden(_) => "forbidden",
            AppError::NotFound(_) => "not_found",
            AppError::Conflict(_) => "conflict",
            AppError::InvalidState(_) => "invalid_state",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::InvalidState(_) => StatusCode::UNPROCESSABLE_ENTITY,
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::InternalServerError(msg)
            | AppError::BadRequest(msg)
            | AppError::Unauthorized(msg)
            | AppError::Forbidden(msg)
            | AppError::NotFound(msg)
            | AppError::Conflict(msg)
            | AppError::InvalidState(msg) => write!(f, "{}: {}", self.kind(), msg),
        }
    }
}

impl std::error::Error for AppError {}

/// Converts the error into a JSON response with appropriate HTTP status code.
/// Internal details are logged, never sent to the client.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let kind = self.kind();
        let error_message = match self {
            AppError::InternalServerError(msg) => {
                tracing::error!("Internal Server Error: {}", msg);
                "Internal Server Error".to_string()
            }
            AppError::BadRequest(msg)
            | AppError::Unauthorized(msg)
            | AppError::Forbidden(msg)
            | AppError::NotFound(msg)
            | AppError::Conflict(msg)
            | AppError::InvalidState(msg) => msg,
        };
        let body = Json(json!({
            "error": error_message,
            "kind": kind,
        }));

        (status, body).into_response()
    }
}

/// Converts `sqlx::Error` into `AppError::InternalServerError`.
/// Allows using `?` operator on database queries.
impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::InternalServerError(err.to_string())
    }
}

impl From<sqlx::migrate::MigrateError> for AppError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        AppError::InternalServerError(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::BadRequest(err.to_string())
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::BadRequest(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds_and_statuses() {
        let cases = [
            (AppError::NotFound("x".into()), "not_found", 404),
            (AppError::BadRequest("x".into()), "invalid_input", 400),
            (AppError::Conflict("x".into()), "conflict", 409),
            (AppError::InvalidState("x".into()), "invalid_state", 422),
            (AppError::Forbidden("x".into()), "forbidden", 403),
            (AppError::Unauthorized("x".into()), "unauthorized", 401),
            (AppError::InternalServerError("x".into()), "storage_failure", 500),
        ];
        for (err, kind, status) in cases {
            assert_eq!(err.kind(), kind);
            assert_eq!(err.status().as_u16(), status);
        }
    }

    #[test]
    fn test_internal_error_hides_detail() {
        let response =
            AppError::InternalServerError("connection refused at 10.0.0.1".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_display_includes_kind() {
        let err = AppError::Conflict("question q1 has no correct option".into());
        assert_eq!(err.to_string(), "conflict: question q1 has no correct option");
    }
}
