use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;

use crate::models::{ClashSet, ConflictReport, ConflictResponse};

/// Message raised by the storage triggers in `migrations/`.
pub const STORAGE_CONFLICT_MARKER: &str = "schedule_conflict";

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Validation error: {0}")]
    ValidationError(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("{}", .0.summary())]
    Conflict(ConflictReport),
    #[error("Storage conflict: {0}")]
    StorageConflict(String),
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("Internal error: {0}")]
    InternalError(String),
}

impl ResponseError for ServiceError {
    fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::ValidationError(_) => StatusCode::BAD_REQUEST,
            ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
            ServiceError::Conflict(_) | ServiceError::StorageConflict(_) => StatusCode::CONFLICT,
            ServiceError::DatabaseError(_) | ServiceError::InternalError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            ServiceError::ValidationError(msg) | ServiceError::NotFound(msg) => {
                HttpResponse::build(self.status_code()).json(json!({
                    "success": false,
                    "message": msg
                }))
            }
            ServiceError::Conflict(report) => HttpResponse::Conflict().json(ConflictResponse {
                success: false,
                message: report.summary(),
                clashes: ClashSet::from(report),
            }),
            ServiceError::StorageConflict(msg) => {
                tracing::warn!("Storage rejected overlapping schedule: {}", msg);
                HttpResponse::Conflict().json(json!({
                    "success": false,
                    "message": "The schedule changed while saving and now clashes with another class. Reload and try again."
                }))
            }
            ServiceError::DatabaseError(msg) => {
                tracing::error!("Database error: {}", msg);
                HttpResponse::InternalServerError().json(json!({
                    "success": false,
                    "message": "Database error occurred"
                }))
            }
            ServiceError::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                HttpResponse::InternalServerError().json(json!({
                    "success": false,
                    "message": "Internal server error"
                }))
            }
        }
    }
}

// Conversion from sqlx errors
impl From<sqlx::Error> for ServiceError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.message().contains(STORAGE_CONFLICT_MARKER) {
                return ServiceError::StorageConflict(db_err.message().to_string());
            }
        }
        ServiceError::DatabaseError(err.to_string())
    }
}
