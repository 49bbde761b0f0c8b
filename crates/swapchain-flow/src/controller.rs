//! The proposal controller: one draft, one lifecycle.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use swapchain_core::derive;
use swapchain_core::{
    DraftField, DraftValidator, FieldValue, KeyValidator, ProposalDraft, Result, SwapchainError,
};
use swapchain_keys::SecretGenerator;
use swapchain_state::{DraftSubscription, FieldStore, SubscriptionFilter};
use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};

use crate::executor::{ExecutionError, SwapExecutor};
use crate::state::{FlowEvent, LifecycleState};
use crate::view::ProposalView;

/// A lifecycle change, as seen by subscribers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowUpdate {
    /// The state entered.
    #[serde(flatten)]
    pub state: LifecycleState,

    /// Sequence number of the change, starting at 1.
    pub sequence: u64,

    /// Draft version at the time of the change.
    pub draft_version: u64,

    /// When the change happened.
    pub timestamp: DateTime<Utc>,
}

/// Ticket for an accepted submit.
///
/// Holds the draft exactly as it was when the proposal entered Running.
#[derive(Debug, Clone)]
pub struct Submission {
    draft: Arc<ProposalDraft>,
    draft_version: u64,
    started_at: DateTime<Utc>,
}

impl Submission {
    /// The frozen draft.
    pub fn draft(&self) -> &ProposalDraft {
        &self.draft
    }

    /// Version of the frozen draft.
    pub fn draft_version(&self) -> u64 {
        self.draft_version
    }

    /// When the submit was accepted.
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }
}

/// Drives a single proposal from editing to a terminal outcome.
pub struct ProposalController<K, E: ?Sized> {
    store: FieldStore,
    validator: DraftValidator<K>,
    executor: Arc<E>,
    state: LifecycleState,
    sequence: u64,
    updates: broadcast::Sender<FlowUpdate>,
}

impl<K, E> ProposalController<K, E>
where
    K: KeyValidator,
    E: SwapExecutor + ?Sized,
{
    /// Start a proposal from `draft`. Derived fields are settled first.
    pub fn new(draft: ProposalDraft, keys: K, executor: Arc<E>) -> Self {
        let (updates, _) = broadcast::channel(64);
        Self {
            store: FieldStore::new(derive::settle(draft)),
            validator: DraftValidator::new(keys),
            executor,
            state: LifecycleState::Idle,
            sequence: 0,
            updates,
        }
    }

    /// Start a proposal from the default draft with a freshly generated secret.
    pub fn create(secrets: &dyn SecretGenerator, keys: K, executor: Arc<E>) -> Self {
        Self::new(ProposalDraft::new(secrets.generate()), keys, executor)
    }

    /// Current lifecycle state.
    pub fn state(&self) -> &LifecycleState {
        &self.state
    }

    /// Message of the Error or Failure state.
    pub fn error_message(&self) -> Option<&str> {
        self.state.message()
    }

    /// Current draft snapshot.
    pub fn snapshot(&self) -> Arc<ProposalDraft> {
        self.store.snapshot()
    }

    /// Version of the current draft.
    pub fn draft_version(&self) -> u64 {
        self.store.version()
    }

    /// The executor this proposal submits to.
    pub fn executor(&self) -> Arc<E> {
        Arc::clone(&self.executor)
    }

    /// Presentation model of the current snapshot and state.
    pub fn view(&self) -> ProposalView {
        ProposalView::render(&self.store.snapshot(), &self.state, self.store.version())
    }

    /// Subscribe to lifecycle changes.
    pub fn subscribe(&self) -> broadcast::Receiver<FlowUpdate> {
        self.updates.subscribe()
    }

    /// Subscribe to draft changes.
    pub fn subscribe_draft(&self, filter: SubscriptionFilter) -> DraftSubscription {
        self.store.subscribe(filter)
    }

    /// Overwrite one field.
    ///
    /// Derived fields are settled after the edit. While in Error, the new
    /// draft is re-validated and the proposal returns to Idle once it
    /// passes; a still-invalid draft keeps the original message.
    pub fn update_key(&mut self, field: DraftField, value: FieldValue) -> Result<Arc<ProposalDraft>> {
        if !self.state.accepts_edits() {
            return Err(SwapchainError::DraftLocked {
                state: self.state.name().to_string(),
            });
        }

        let edited = self.store.update_key(field, value)?;
        self.store.replace(derive::settle((*edited).clone()));

        let snapshot = self.store.snapshot();
        if matches!(self.state, LifecycleState::Error { .. }) {
            match self.validator.validate(&snapshot) {
                Ok(()) => self.transition(FlowEvent::Revalidated)?,
                Err(failure) => debug!("Still invalid after editing {}: {}", field, failure),
            }
        }

        Ok(snapshot)
    }

    /// Parse raw input for `field` and apply it.
    pub fn update_raw(&mut self, field: DraftField, raw: &str) -> Result<Arc<ProposalDraft>> {
        let value = FieldValue::parse(field, raw)?;
        self.update_key(field, value)
    }

    /// Validate the draft and, if it passes, enter Running.
    ///
    /// The returned ticket must be executed and its outcome fed back through
    /// [`complete`](Self::complete). A failing draft moves the proposal to
    /// Error and is reported as `ValidationFailed`.
    pub fn begin_submit(&mut self) -> Result<Submission> {
        if self.state != LifecycleState::Idle {
            return Err(SwapchainError::SubmitNotAllowed {
                state: self.state.name().to_string(),
            });
        }

        let draft = self.store.snapshot();
        if let Err(failure) = self.validator.validate(&draft) {
            warn!("Submit rejected: {}", failure);
            self.transition(FlowEvent::SubmitRejected(failure.message().to_string()))?;
            return Err(failure.into());
        }

        self.transition(FlowEvent::SubmitAccepted)?;
        info!(
            "Submitted {} {} at rate {} with {} timelock",
            draft.amount_to_send,
            draft.currency_to_give,
            draft.rate,
            draft.timelock.label()
        );

        Ok(Submission {
            draft,
            draft_version: self.store.version(),
            started_at: Utc::now(),
        })
    }

    /// Record the executor's outcome. Only valid while Running.
    pub fn complete(&mut self, outcome: std::result::Result<(), ExecutionError>) -> Result<&LifecycleState> {
        let event = match outcome {
            Ok(()) => FlowEvent::ExecutionSucceeded,
            Err(e) => FlowEvent::ExecutionFailed(e.to_string()),
        };
        self.transition(event)?;

        match &self.state {
            LifecycleState::Failure { message } => error!("Swap execution failed: {}", message),
            _ => info!("Swap executed successfully"),
        }
        Ok(&self.state)
    }

    /// Submit and wait for the executor in one step.
    pub async fn submit(&mut self) -> Result<&LifecycleState> {
        let submission = self.begin_submit()?;
        let executor = self.executor();
        let outcome = executor.execute(submission.draft().clone()).await;
        self.complete(outcome)
    }

    fn transition(&mut self, event: FlowEvent) -> Result<()> {
        let from = self.state.name();
        let next = self.state.clone().next(&event)?;
        info!("Proposal {} -> {} on {}", from, next.name(), event.name());

        self.state = next;
        self.sequence += 1;

        let _ = self.updates.send(FlowUpdate {
            state: self.state.clone(),
            sequence: self.sequence,
            draft_version: self.store.version(),
            timestamp: Utc::now(),
        });

        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use async_trait::async_trait;
    use rust_decimal_macros::dec;
    use swapchain_core::Secret;
    use swapchain_keys::{secret_from_preimage, ChainKeyValidator};
    use swapchain_state::ChangeType;

    pub(crate) const BITCOIN_KEY: &str = "cMahea7zqjxrtgAbB7LSGbcQUr1uX1ojuat9jZodMN87JcbXMTcA";
    pub(crate) const BITSHARES_KEY: &str = "5HpHagT65TZzG1PH3CSu63k8DbpvD8s5ip4nEB3kEsreAnchuDf";
    pub(crate) const COUNTERPARTY_KEY: &str =
        "034c7ddacc16fa5e53aa5dc19748e3877ba07b981fdbbcdb97b8b19de240241f61";

    struct Scripted(std::result::Result<(), ExecutionError>);

    #[async_trait]
    impl SwapExecutor for Scripted {
        async fn execute(&self, _draft: ProposalDraft) -> std::result::Result<(), ExecutionError> {
            self.0.clone()
        }
    }

    fn valid_draft() -> ProposalDraft {
        ProposalDraft::builder()
            .bitcoin_private_key(BITCOIN_KEY)
            .bitshares_private_key(BITSHARES_KEY)
            .counterparty_bitcoin_public_key(COUNTERPARTY_KEY)
            .counterparty_bitshares_account_name("amos")
            .bitcoin_tx_id("ab".repeat(32))
            .secret(secret_from_preimage([9u8; 32]))
            .build()
            .unwrap()
    }

    fn controller(
        draft: ProposalDraft,
        outcome: std::result::Result<(), ExecutionError>,
    ) -> ProposalController<ChainKeyValidator, Scripted> {
        ProposalController::new(draft, ChainKeyValidator::new(), Arc::new(Scripted(outcome)))
    }

    #[tokio::test]
    async fn test_zero_amount_submit_enters_error() {
        let mut flow = controller(valid_draft(), Ok(()));
        flow.update_key(DraftField::AmountToSend, FieldValue::Quantity(dec!(0)))
            .unwrap();

        let err = flow.submit().await.unwrap_err();

        assert_eq!(err.to_string(), "Amount to send is empty");
        assert_eq!(
            flow.state(),
            &LifecycleState::Error {
                message: "Amount to send is empty".to_string()
            }
        );
    }

    #[test]
    fn test_amount_to_receive_follows_rate() {
        let mut flow = controller(valid_draft(), Ok(()));
        flow.update_key(DraftField::AmountToSend, FieldValue::Quantity(dec!(1)))
            .unwrap();
        let draft = flow
            .update_key(DraftField::Rate, FieldValue::Quantity(dec!(2)))
            .unwrap();

        assert_eq!(draft.amount_to_receive, dec!(2));
        assert!(derive::is_consistent(&draft));
    }

    #[tokio::test]
    async fn test_successful_execution_ends_in_success() {
        let mut flow = controller(valid_draft(), Ok(()));
        let mut updates = flow.subscribe();

        let state = flow.submit().await.unwrap();
        assert_eq!(state, &LifecycleState::Success);

        assert_eq!(updates.recv().await.unwrap().state, LifecycleState::Running);
        assert_eq!(updates.recv().await.unwrap().state, LifecycleState::Success);
    }

    #[tokio::test]
    async fn test_failure_keeps_executor_message() {
        let mut flow = controller(valid_draft(), Err(ExecutionError::new("insufficient funds")));

        flow.submit().await.unwrap();

        assert_eq!(
            flow.state(),
            &LifecycleState::Failure {
                message: "insufficient funds".to_string()
            }
        );
        assert_eq!(flow.error_message(), Some("insufficient funds"));
    }

    #[test]
    fn test_fixing_draft_clears_error_without_submit() {
        let mut flow = controller(valid_draft(), Ok(()));
        flow.update_raw(DraftField::CounterpartyBitsharesAccountName, "")
            .unwrap();
        assert!(flow.begin_submit().is_err());
        assert_eq!(
            flow.error_message(),
            Some("Counterparty bitshares account name is empty")
        );

        flow.update_raw(DraftField::CounterpartyBitsharesAccountName, "amos")
            .unwrap();

        assert_eq!(flow.state(), &LifecycleState::Idle);
        assert_eq!(flow.error_message(), None);
    }

    #[test]
    fn test_edit_publishes_field_change_then_settled_draft() {
        let mut flow = controller(valid_draft(), Ok(()));
        let mut changes = flow.subscribe_draft(SubscriptionFilter::default());

        flow.update_key(DraftField::AmountToSend, FieldValue::Quantity(dec!(2)))
            .unwrap();

        let edited = changes.try_recv().unwrap();
        assert_eq!(edited.change_type, ChangeType::FieldUpdated);
        assert_eq!(edited.field, Some(DraftField::AmountToSend));
        assert_eq!(edited.draft.amount_to_receive, dec!(1));

        let settled = changes.try_recv().unwrap();
        assert_eq!(settled.change_type, ChangeType::Replaced);
        assert_eq!(settled.field, None);
        assert_eq!(settled.draft.amount_to_receive, dec!(2));
        assert_eq!(settled.version, flow.draft_version());

        assert!(changes.try_recv().is_none());
    }

    #[test]
    fn test_error_message_unchanged_while_still_invalid() {
        let mut flow = controller(valid_draft(), Ok(()));
        flow.update_raw(DraftField::Rate, "-1").unwrap();
        flow.update_raw(DraftField::BitcoinTxId, "short").unwrap();
        assert!(flow.begin_submit().is_err());
        assert_eq!(flow.error_message(), Some("Rate is less than 0"));

        flow.update_raw(DraftField::Rate, "3").unwrap();

        assert_eq!(flow.error_message(), Some("Rate is less than 0"));
    }

    #[test]
    fn test_submit_only_from_idle() {
        let mut flow = controller(valid_draft(), Ok(()));
        let submission = flow.begin_submit().unwrap();
        assert_eq!(submission.draft().counterparty_bitshares_account_name, "amos");

        let err = flow.begin_submit().unwrap_err();
        assert!(matches!(err, SwapchainError::SubmitNotAllowed { .. }));
        assert_eq!(flow.state(), &LifecycleState::Running);
    }

    #[test]
    fn test_edits_locked_while_running() {
        let mut flow = controller(valid_draft(), Ok(()));
        let submission = flow.begin_submit().unwrap();

        let err = flow.update_raw(DraftField::Rate, "5").unwrap_err();

        assert!(matches!(err, SwapchainError::DraftLocked { .. }));
        assert_eq!(submission.draft().rate, flow.snapshot().rate);
    }

    #[test]
    fn test_complete_requires_running() {
        let mut flow = controller(valid_draft(), Ok(()));
        let err = flow.complete(Ok(())).unwrap_err();
        assert!(matches!(err, SwapchainError::InvalidTransition { .. }));

        flow.begin_submit().unwrap();
        flow.complete(Ok(())).unwrap();
        assert!(flow.complete(Ok(())).is_err());
        assert_eq!(flow.state(), &LifecycleState::Success);
    }

    #[test]
    fn test_new_settles_derived_fields() {
        let mut draft = valid_draft();
        draft.amount_to_receive = dec!(42);

        let flow = controller(draft, Ok(()));

        assert_eq!(flow.snapshot().amount_to_receive, dec!(1));
    }

    #[test]
    fn test_create_generates_secret() {
        struct Fixed;
        impl SecretGenerator for Fixed {
            fn generate(&self) -> Secret {
                secret_from_preimage([3u8; 32])
            }
        }

        let flow: ProposalController<ChainKeyValidator, Scripted> = ProposalController::create(
            &Fixed,
            ChainKeyValidator::new(),
            Arc::new(Scripted(Ok(()))),
        );

        assert_eq!(flow.snapshot().secret, secret_from_preimage([3u8; 32]));
        assert_eq!(flow.state(), &LifecycleState::Idle);
    }
}
