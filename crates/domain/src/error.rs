//! Common error types used across the workspace.
//!
//! Every layer defines its own typed error and converts into [`LabHubError`]
//! via `From`, so services can use `?` on adapter results.

use std::error::Error as StdError;

/// Top-level error returned by application services.
#[derive(Debug, thiserror::Error)]
pub enum LabHubError {
    /// The caller supplied malformed or inconsistent input.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A referenced record does not exist (or is not reachable through the
    /// stated parent).
    #[error(transparent)]
    NotFound(#[from] NotFoundError),

    /// The underlying store failed.
    #[error("storage error")]
    Storage(#[source] Box<dyn StdError + Send + Sync>),
}

/// Reasons why an input was rejected.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("{field} is required")]
    MissingField { field: &'static str },

    #[error("{field} must not be empty")]
    EmptyField { field: &'static str },

    #[error("{field} must be a non-negative number")]
    InvalidAmount { field: &'static str },

    #[error("hourly_rate is required unless the material is free")]
    MissingHourlyRate,

    #[error("invalid time {0:?}, expected HH:mm")]
    InvalidTime(String),

    #[error("invalid date {0:?}, expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("end time must be after start time")]
    EndNotAfterStart,

    #[error("invalid {kind} id {value:?}")]
    InvalidId { kind: &'static str, value: String },

    #[error("invalid email address {0:?}")]
    InvalidEmail(String),

    #[error("invalid {kind} status {value:?}")]
    InvalidStatus { kind: &'static str, value: String },

    #[error("unsupported image type {0:?}")]
    UnsupportedImage(String),

    #[error("malformed request: {0}")]
    MalformedRequest(String),
}

/// A referenced record could not be found.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{entity} {id} not found")]
pub struct NotFoundError {
    pub entity: &'static str,
    pub id: String,
}

impl NotFoundError {
    /// Build a not-found error for any displayable identifier.
    pub fn new(entity: &'static str, id: impl ToString) -> Self {
        Self {
            entity,
            id: id.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_display_validation_reason_transparently() {
        let err = LabHubError::from(ValidationError::EndNotAfterStart);
        assert_eq!(err.to_string(), "end time must be after start time");
    }

    #[test]
    fn should_display_not_found_with_entity_and_id() {
        let err = LabHubError::from(NotFoundError::new("Laboratory", "abc"));
        assert_eq!(err.to_string(), "Laboratory abc not found");
    }

    #[test]
    fn should_hide_storage_detail_in_display() {
        let io = std::io::Error::other("disk on fire");
        let err = LabHubError::Storage(Box::new(io));
        assert_eq!(err.to_string(), "storage error");
        assert!(err.source().is_some());
    }
}
