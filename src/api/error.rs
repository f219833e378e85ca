//! HTTP mapping for domain errors

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Map, Value};

use crate::domain::DomainError;

impl IntoResponse for DomainError {
    fn into_response(self) -> Response {
        match self {
            DomainError::NotFound(msg) => error_response(StatusCode::NOT_FOUND, &msg),
            DomainError::Validation(msg) => error_response(StatusCode::BAD_REQUEST, &msg),
            DomainError::InvalidInput(errors) => {
                let details: Map<String, Value> = errors
                    .iter()
                    .map(|(field, msg)| (field.to_string(), Value::String(msg.to_string())))
                    .collect();
                (
                    StatusCode::BAD_REQUEST,
                    Json(json!({ "error": "Invalid input", "details": details })),
                )
                    .into_response()
            }
            DomainError::Unauthorized(msg) => error_response(StatusCode::UNAUTHORIZED, &msg),
            DomainError::Forbidden(msg) => error_response(StatusCode::FORBIDDEN, &msg),
            DomainError::Conflict(msg) => error_response(StatusCode::CONFLICT, &msg),
            DomainError::Database(msg) => {
                tracing::error!("Database error: {}", msg);
                error_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
            DomainError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                error_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
        }
    }
}

pub fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}
