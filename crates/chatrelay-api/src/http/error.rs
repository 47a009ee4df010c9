//! Application error type mapping to HTTP status codes and envelope format.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use chatrelay_types::error::{CatalogError, SessionError};

use super::response::ApiResponse;

/// Application-level error that maps to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    /// Session actor errors.
    Session(SessionError),
    /// Session catalog errors.
    Catalog(CatalogError),
    /// Missing or malformed request input.
    Validation(String),
    /// Generic internal error.
    Internal(String),
}

impl From<SessionError> for AppError {
    fn from(e: SessionError) -> Self {
        AppError::Session(e)
    }
}

impl From<CatalogError> for AppError {
    fn from(e: CatalogError) -> Self {
        AppError::Catalog(e)
    }
}

impl AppError {
    fn parts(&self) -> (StatusCode, &'static str, String) {
        match self {
            AppError::Session(SessionError::EmptyMessage) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", self.message())
            }
            AppError::Session(SessionError::Persistence(_)) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "PERSISTENCE_ERROR", self.message())
            }
            AppError::Session(SessionError::ActorUnavailable) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "SESSION_UNAVAILABLE", self.message())
            }
            AppError::Catalog(CatalogError::MissingUser | CatalogError::MissingSession) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", self.message())
            }
            AppError::Catalog(CatalogError::NotFound) => {
                (StatusCode::NOT_FOUND, "CHAT_NOT_FOUND", self.message())
            }
            AppError::Catalog(CatalogError::Storage(_)) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "CATALOG_ERROR", self.message())
            }
            AppError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", self.message()),
            AppError::Internal(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", self.message())
            }
        }
    }

    fn message(&self) -> String {
        match self {
            AppError::Session(e) => e.to_string(),
            AppError::Catalog(e) => e.to_string(),
            AppError::Validation(msg) | AppError::Internal(msg) => msg.clone(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = self.parts();
        if status.is_server_error() {
            tracing::error!(code, %message, "Request failed");
        }

        let body = ApiResponse::error(code, &message, uuid::Uuid::now_v7().to_string());
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use chatrelay_types::error::RepositoryError;

    use super::*;

    fn status_of(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn client_errors_map_to_400() {
        assert_eq!(status_of(SessionError::EmptyMessage.into()), StatusCode::BAD_REQUEST);
        assert_eq!(status_of(CatalogError::MissingUser.into()), StatusCode::BAD_REQUEST);
        assert_eq!(
            status_of(AppError::Validation("userId is required".into())),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn unknown_catalog_entry_maps_to_404() {
        assert_eq!(status_of(CatalogError::NotFound.into()), StatusCode::NOT_FOUND);
    }

    #[test]
    fn faults_map_to_500_with_description() {
        let err: AppError = SessionError::Persistence(RepositoryError::Query("disk full".into())).into();
        let (status, code, message) = err.parts();
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(code, "PERSISTENCE_ERROR");
        assert_eq!(message, "persistence error: query error: disk full");
    }
}
