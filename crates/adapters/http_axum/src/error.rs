//! HTTP error response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use labhub_domain::error::{LabHubError, ValidationError};

use crate::envelope::Envelope;

/// Maps [`LabHubError`] to an HTTP response with appropriate status code.
#[derive(Debug)]
pub struct ApiError(LabHubError);

impl From<LabHubError> for ApiError {
    fn from(err: LabHubError) -> Self {
        Self(err)
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        Self(LabHubError::Validation(err))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self.0 {
            LabHubError::Validation(err) => (StatusCode::BAD_REQUEST, err.to_string()),
            LabHubError::NotFound(err) => (StatusCode::NOT_FOUND, err.to_string()),
            LabHubError::Storage(err) => {
                tracing::error!(error = ?err, "storage error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
        };

        (status, Envelope::<()>::empty(message)).into_response()
    }
}
