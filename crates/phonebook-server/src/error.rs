//! API errors and their HTTP mapping.

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use phonebook_core::domain::{FieldError, ValidationErrors};
use phonebook_core::{EntryId, PhonebookError};
use serde::Serialize;
use tracing::{error, warn};

#[derive(Debug)]
pub enum ApiError {
    /// Field rules failed; nothing was dispatched.
    Validation(ValidationErrors),
    /// Malformed JSON body or unparsable path parameter.
    BadRequest(String),
    IdMismatch { path: EntryId, body: Option<EntryId> },
    NotFound,
    Internal(PhonebookError),
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<FieldError>,
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::BadRequest(_) | Self::IdMismatch { .. } => {
                StatusCode::BAD_REQUEST
            }
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Internal(PhonebookError::Cancelled) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let (message, errors) = match self {
            Self::Validation(errors) => ("validation failed".to_string(), errors.into_errors()),
            Self::BadRequest(message) => (message, Vec::new()),
            Self::IdMismatch { path, body } => {
                let body = body.map_or_else(|| "none".to_string(), |id| id.to_string());
                (format!("id mismatch: path has {path}, body has {body}"), Vec::new())
            }
            Self::NotFound => ("entry not found".to_string(), Vec::new()),
            Self::Internal(PhonebookError::Cancelled) => {
                warn!("request cancelled before the handler finished");
                ("request cancelled".to_string(), Vec::new())
            }
            Self::Internal(e) => {
                error!(error = %e, "request failed");
                ("internal server error".to_string(), Vec::new())
            }
        };

        let body = ErrorResponse {
            error: message,
            code: status.as_u16(),
            errors,
        };
        (status, Json(body)).into_response()
    }
}

impl From<PhonebookError> for ApiError {
    fn from(e: PhonebookError) -> Self {
        Self::Internal(e)
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(e: ValidationErrors) -> Self {
        Self::Validation(e)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}
