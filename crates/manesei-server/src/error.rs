//! HTTP error handling
//!
//! Handlers return `Result<_, AppError>`. Every error carries a description
//! that is shown to the user; the underlying cause is only logged.

use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use thiserror::Error;
use tracing::{error, info};
use uuid::Uuid;

use manesei_core::{FormError, StorageError};

use crate::templates;

#[derive(Debug, Error)]
pub enum AppError {
    /// The note store reported a failure
    #[error("{description}: {source}")]
    Store {
        description: String,
        #[source]
        source: StorageError,
    },

    /// A response could not be put together
    #[error("{description}: {source}")]
    Render {
        description: String,
        #[source]
        source: axum::http::Error,
    },

    #[error("{description}: {source}")]
    BadRequest {
        description: String,
        #[source]
        source: FormError,
    },

    #[error("{0}")]
    NotFound(String),

    /// Anything unexpected, reported with a correlation id
    #[error("{description}: {source}")]
    Internal {
        description: String,
        #[source]
        source: anyhow::Error,
    },
}

impl AppError {
    pub fn store(description: impl Into<String>, source: StorageError) -> Self {
        AppError::Store {
            description: description.into(),
            source,
        }
    }

    pub fn internal(description: impl Into<String>, source: impl Into<anyhow::Error>) -> Self {
        AppError::Internal {
            description: description.into(),
            source: source.into(),
        }
    }

    pub fn not_found() -> Self {
        AppError::NotFound("This document does not exist.".to_string())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Store { source, .. } if source.is_not_found() => StatusCode::NOT_FOUND,
            AppError::Store { source, .. } if source.is_illegal_path() => StatusCode::BAD_REQUEST,
            AppError::Store { .. } | AppError::Render { .. } | AppError::Internal { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            AppError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
        }
    }

    /// The part of the error that is safe to show
    pub fn description(&self) -> &str {
        match self {
            AppError::Store { description, .. }
            | AppError::Render { description, .. }
            | AppError::BadRequest { description, .. }
            | AppError::Internal { description, .. } => description,
            AppError::NotFound(description) => description,
        }
    }
}

impl From<FormError> for AppError {
    fn from(source: FormError) -> Self {
        AppError::BadRequest {
            description: "Failed to parse document headers".to_string(),
            source,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let correlation = match self {
            AppError::Internal { .. } => Some(Uuid::new_v4().to_string()),
            _ => None,
        };

        match &correlation {
            Some(id) => error!(correlation = %id, "Request failed: {}", self),
            None if status.is_server_error() => error!("Request failed: {}", self),
            None => info!("Request rejected ({}): {}", status, self),
        }

        let hint = match &self {
            AppError::Store { source, .. } => source.recovery_suggestion(),
            _ => None,
        };
        let page = templates::error_page(status, self.description(), hint, correlation.as_deref());
        (status, Html(page.into_string())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        let missing = StorageError::NotFound {
            id: "x".to_string(),
            generation: 3,
        };
        assert_eq!(
            AppError::store("Failed to open file x", missing).status(),
            StatusCode::NOT_FOUND
        );

        let illegal = StorageError::IllegalPath {
            id: "../x".to_string(),
        };
        assert_eq!(
            AppError::store("Failed to open file ../x", illegal).status(),
            StatusCode::BAD_REQUEST
        );

        let io = StorageError::Io(std::io::Error::other("boom"));
        assert_eq!(
            AppError::store("Failed to write file x", io).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );

        assert_eq!(AppError::not_found().status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_description_hides_cause() {
        let err = AppError::internal("Unknown error", anyhow::anyhow!("secret detail"));

        assert_eq!(err.description(), "Unknown error");
        assert!(err.to_string().contains("secret detail"));
    }

    #[test]
    fn test_form_error_is_bad_request() {
        let source = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = AppError::from(FormError::InvalidHeaders(source));

        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.description(), "Failed to parse document headers");
    }
}
