//! Error handling for the application

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use uuid::Uuid;

use crate::pricing::responses::PricingErrorResponse;

/// Application error type
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Room {0} not found")]
    RoomNotFound(Uuid),

    #[error("Invalid range: {0}")]
    InvalidRange(String),

    #[error("Invalid pricing rule: {0}")]
    InvalidRule(String),

    #[error("Invalid request body: {0}")]
    InvalidRequest(String),

    #[error("Availability for room {room_id} changed concurrently")]
    ConcurrentUpdateConflict { room_id: Uuid },

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl AppError {
    /// Stable machine-readable tag used in error bodies
    pub fn error_type(&self) -> &'static str {
        match self {
            AppError::RoomNotFound(_) => "not_found",
            AppError::InvalidRange(_) => "invalid_range",
            AppError::InvalidRule(_) => "invalid_rule",
            AppError::InvalidRequest(_) => "invalid_request",
            AppError::ConcurrentUpdateConflict { .. } => "concurrent_update_conflict",
            AppError::Database(_) => "persistence_failure",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::RoomNotFound(_) => StatusCode::NOT_FOUND,
            AppError::InvalidRange(_) | AppError::InvalidRule(_) | AppError::InvalidRequest(_) => {
                StatusCode::BAD_REQUEST
            }
            AppError::ConcurrentUpdateConflict { .. } => StatusCode::CONFLICT,
            AppError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            AppError::Database(e) => {
                tracing::error!("Database error: {}", e);
                "Database error".to_string()
            }
            other => other.to_string(),
        };

        let body = PricingErrorResponse {
            error_type: self.error_type().to_string(),
            message,
        };

        (status, Json(body)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let id = Uuid::nil();
        assert_eq!(AppError::RoomNotFound(id).status(), StatusCode::NOT_FOUND);
        assert_eq!(
            AppError::InvalidRange("x".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::InvalidRequest("x".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::ConcurrentUpdateConflict { room_id: id }.status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::Database(sqlx::Error::RowNotFound).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_error_display() {
        let err = AppError::InvalidRange("check_in must be before check_out".into());
        assert!(err.to_string().contains("check_in must be before check_out"));
        assert_eq!(err.error_type(), "invalid_range");
    }
}
