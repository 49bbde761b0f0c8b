//! Client errors.

use thiserror::Error;
use uuid::Uuid;

/// Errors returned by [`SwapchainClient`](crate::SwapchainClient).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    /// The node could not be reached.
    #[error("Connection error: {0}")]
    Connection(String),

    /// The node rejected the input, e.g. an unknown field or unparsable value.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Submit found the draft invalid; carries the validation message.
    #[error("{0}")]
    Rejected(String),

    /// The proposal is not in a state that allows the request.
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Proposal {0} not found")]
    NotFound(Uuid),

    #[error("Unexpected response {status}: {message}")]
    Unexpected { status: u16, message: String },

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl ClientError {
    /// Map an error response from the node.
    pub(crate) fn from_status(status: u16, id: Option<Uuid>, message: String) -> Self {
        match (status, id) {
            (400, _) => ClientError::BadRequest(message),
            (404, Some(id)) => ClientError::NotFound(id),
            (409, _) => ClientError::Conflict(message),
            (422, _) => ClientError::Rejected(message),
            _ => ClientError::Unexpected { status, message },
        }
    }
}

pub type ClientResult<T> = std::result::Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_status() {
        let id = Uuid::new_v4();
        assert_eq!(
            ClientError::from_status(422, Some(id), "Rate is less than 0".to_string()).to_string(),
            "Rate is less than 0"
        );
        assert_eq!(
            ClientError::from_status(404, Some(id), String::new()),
            ClientError::NotFound(id)
        );
        assert!(matches!(
            ClientError::from_status(404, None, String::new()),
            ClientError::Unexpected { status: 404, .. }
        ));
        assert!(matches!(
            ClientError::from_status(409, Some(id), String::new()),
            ClientError::Conflict(_)
        ));
    }
}
