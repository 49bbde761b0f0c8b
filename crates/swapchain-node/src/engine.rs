//! Swap execution for the node.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::FutureExt;
use swapchain_core::ProposalDraft;
use swapchain_flow::{ExecutionError, Submission, SwapExecutor};
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{error, info};

use crate::config::ExecutorConfig;
use crate::state::Session;

/// Stands in for the on-chain HTLC exchange.
///
/// Waits for the configured latency, then succeeds or fails with the
/// configured message.
#[derive(Debug, Clone)]
pub struct SimulatedExecutor {
    latency: Duration,
    fail_with: Option<String>,
}

impl SimulatedExecutor {
    pub fn new(latency: Duration, fail_with: Option<String>) -> Self {
        Self { latency, fail_with }
    }

    pub fn from_config(config: &ExecutorConfig) -> Self {
        Self::new(config.latency(), config.fail_with.clone())
    }
}

#[async_trait]
impl SwapExecutor for SimulatedExecutor {
    async fn execute(&self, draft: ProposalDraft) -> Result<(), ExecutionError> {
        info!(
            "Simulating swap of {} {} for {} {} on {}",
            draft.amount_to_send,
            draft.currency_to_give,
            draft.amount_to_receive,
            draft.currency_to_give.counter(),
            draft.network_to_trade.as_str()
        );
        sleep(self.latency).await;

        match &self.fail_with {
            Some(message) => Err(ExecutionError::new(message.clone())),
            None => Ok(()),
        }
    }
}

/// Run the executor for an accepted submission and record its outcome.
///
/// The session lock is not held while the executor runs. A panicking
/// executor is recorded as a failed swap.
pub fn spawn_execution(
    session: Session,
    executor: Arc<dyn SwapExecutor>,
    submission: Submission,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let execution = executor.execute(submission.draft().clone());
        let outcome = match AssertUnwindSafe(execution).catch_unwind().await {
            Ok(outcome) => outcome,
            Err(panic) => {
                let reason = panic_reason(panic.as_ref());
                error!("Executor panicked on proposal {}: {}", session.id, reason);
                Err(ExecutionError::new(format!("Executor panicked: {}", reason)))
            }
        };

        let mut proposal = session.proposal.write().await;
        match proposal.complete(outcome) {
            Ok(state) => info!("Proposal {} finished: {}", session.id, state),
            Err(e) => error!("Proposal {} could not record outcome: {}", session.id, e),
        }
    })
}

fn panic_reason(payload: &(dyn Any + Send)) -> &str {
    if let Some(reason) = payload.downcast_ref::<&str>() {
        reason
    } else if let Some(reason) = payload.downcast_ref::<String>() {
        reason
    } else {
        "unknown"
    }
}
