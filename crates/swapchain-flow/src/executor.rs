//! The execution seam: whatever actually performs the swap.

use std::sync::Arc;

use async_trait::async_trait;
use swapchain_core::ProposalDraft;
use thiserror::Error;

/// A failed swap, carrying the message shown to the user.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct ExecutionError {
    pub message: String,
}

impl ExecutionError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<String> for ExecutionError {
    fn from(message: String) -> Self {
        Self { message }
    }
}

impl From<&str> for ExecutionError {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

/// Performs the swap for a submitted draft.
///
/// The draft handed over is frozen; the result is final and is not retried.
#[async_trait]
pub trait SwapExecutor: Send + Sync {
    async fn execute(&self, draft: ProposalDraft) -> Result<(), ExecutionError>;
}

#[async_trait]
impl<T: SwapExecutor + ?Sized> SwapExecutor for Arc<T> {
    async fn execute(&self, draft: ProposalDraft) -> Result<(), ExecutionError> {
        (**self).execute(draft).await
    }
}
