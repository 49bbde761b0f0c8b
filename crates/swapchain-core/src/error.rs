//! Error types for Swapchain.

use thiserror::Error;

/// Main error type for Swapchain operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SwapchainError {
    /// Raw input could not be turned into a value for the field.
    #[error("Invalid value for {field}: {message}")]
    InvalidFieldValue { field: String, message: String },

    /// A value of the wrong kind was supplied for a field.
    #[error("Field {field} expects a {expected} value")]
    FieldTypeMismatch { field: String, expected: String },

    /// A required builder input was not supplied.
    #[error("Missing required field: {0}")]
    MissingField(String),

    /// The draft failed validation; carries the first-failure message.
    #[error("{message}")]
    ValidationFailed { message: String },

    /// The draft cannot be edited in the current lifecycle state.
    #[error("Draft is locked while the proposal is {state}")]
    DraftLocked { state: String },

    /// Submit was requested outside of the idle state.
    #[error("Cannot submit while the proposal is {state}")]
    SubmitNotAllowed { state: String },

    /// The lifecycle machine has no edge for this event.
    #[error("Invalid transition from {from} on {event}")]
    InvalidTransition { from: String, event: String },

    /// Resource not found.
    #[error("Resource not found: {resource_type} with id {id}")]
    NotFound { resource_type: String, id: String },
}

impl SwapchainError {
    /// Returns true if the user can fix this by editing the draft.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            SwapchainError::InvalidFieldValue { .. } | SwapchainError::ValidationFailed { .. }
        )
    }

    pub(crate) fn invalid_value(field: impl Into<String>, message: impl Into<String>) -> Self {
        SwapchainError::InvalidFieldValue {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Convenience Result type for Swapchain operations.
pub type Result<T> = std::result::Result<T, SwapchainError>;
