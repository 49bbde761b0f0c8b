//! Lifecycle state machine of a proposal.

use std::fmt;

use serde::{Deserialize, Serialize};
use swapchain_core::{Result, SwapchainError};

/// State of a proposal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum LifecycleState {
    /// Editing; submit is available.
    #[default]
    Idle,
    /// Last submit was rejected by validation.
    Error { message: String },
    /// The swap is executing with a frozen draft.
    Running,
    /// The swap completed.
    Success,
    /// The swap failed.
    Failure { message: String },
}

/// Inputs to the state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowEvent {
    /// Submit found the draft invalid.
    SubmitRejected(String),
    /// Submit found the draft valid.
    SubmitAccepted,
    /// An edit made the draft valid again.
    Revalidated,
    /// The executor resolved.
    ExecutionSucceeded,
    /// The executor failed.
    ExecutionFailed(String),
}

impl FlowEvent {
    /// Short name for logs and errors.
    pub fn name(&self) -> &'static str {
        match self {
            FlowEvent::SubmitRejected(_) => "submit_rejected",
            FlowEvent::SubmitAccepted => "submit_accepted",
            FlowEvent::Revalidated => "revalidated",
            FlowEvent::ExecutionSucceeded => "execution_succeeded",
            FlowEvent::ExecutionFailed(_) => "execution_failed",
        }
    }
}

impl LifecycleState {
    /// Short name for logs and errors.
    pub fn name(&self) -> &'static str {
        match self {
            LifecycleState::Idle => "idle",
            LifecycleState::Error { .. } => "error",
            LifecycleState::Running => "running",
            LifecycleState::Success => "success",
            LifecycleState::Failure { .. } => "failure",
        }
    }

    /// The message carried by Error and Failure.
    pub fn message(&self) -> Option<&str> {
        match self {
            LifecycleState::Error { message } | LifecycleState::Failure { message } => {
                Some(message)
            }
            _ => None,
        }
    }

    /// Success and Failure have no outgoing edges.
    pub fn is_terminal(&self) -> bool {
        matches!(self, LifecycleState::Success | LifecycleState::Failure { .. })
    }

    /// Whether field edits are accepted.
    pub fn accepts_edits(&self) -> bool {
        matches!(self, LifecycleState::Idle | LifecycleState::Error { .. })
    }

    /// Apply an event.
    pub fn next(self, event: &FlowEvent) -> Result<LifecycleState> {
        match (self, event) {
            (LifecycleState::Idle, FlowEvent::SubmitRejected(message)) => Ok(LifecycleState::Error {
                message: message.clone(),
            }),
            (LifecycleState::Idle, FlowEvent::SubmitAccepted) => Ok(LifecycleState::Running),
            (LifecycleState::Error { .. }, FlowEvent::Revalidated) => Ok(LifecycleState::Idle),
            (LifecycleState::Running, FlowEvent::ExecutionSucceeded) => Ok(LifecycleState::Success),
            (LifecycleState::Running, FlowEvent::ExecutionFailed(message)) => {
                Ok(LifecycleState::Failure {
                    message: message.clone(),
                })
            }
            (state, event) => Err(SwapchainError::InvalidTransition {
                from: state.name().to_string(),
                event: event.name().to_string(),
            }),
        }
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
