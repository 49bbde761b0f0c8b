//! The field store: the current draft snapshot and its change feed.

use std::sync::Arc;

use chrono::Utc;
use swapchain_core::{DraftField, FieldValue, ProposalDraft, Result};
use tracing::debug;

use crate::subscription::{
    ChangeType, DraftChange, DraftSubscription, SubscriptionFilter, SubscriptionManager,
};

/// Holds the current draft as an immutable, shared snapshot.
///
/// Every commit swaps in a new snapshot; readers holding an older `Arc`
/// keep seeing the value they were given. No field-level constraints are
/// enforced here.
pub struct FieldStore {
    current: Arc<ProposalDraft>,
    version: u64,
    subscriptions: SubscriptionManager,
}

impl FieldStore {
    /// Create a store holding `draft` at version 0.
    pub fn new(draft: ProposalDraft) -> Self {
        Self {
            current: Arc::new(draft),
            version: 0,
            subscriptions: SubscriptionManager::new(),
        }
    }

    /// The current snapshot.
    pub fn snapshot(&self) -> Arc<ProposalDraft> {
        Arc::clone(&self.current)
    }

    /// Number of commits so far.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Replace the whole draft.
    ///
    /// Replacing with an equal draft commits nothing and returns `false`.
    pub fn replace(&mut self, next: ProposalDraft) -> bool {
        if *self.current == next {
            return false;
        }
        self.commit(next, None, ChangeType::Replaced);
        true
    }

    /// Overwrite a single field, producing a new snapshot.
    pub fn update_key(&mut self, field: DraftField, value: FieldValue) -> Result<Arc<ProposalDraft>> {
        let next = self.current.with_field(field, value)?;
        self.commit(next, Some(field), ChangeType::FieldUpdated);
        Ok(self.snapshot())
    }

    /// Subscribe to committed changes.
    pub fn subscribe(&self, filter: SubscriptionFilter) -> DraftSubscription {
        self.subscriptions.subscribe(filter)
    }

    /// Number of live subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.subscriptions.subscription_count()
    }

    fn commit(&mut self, next: ProposalDraft, field: Option<DraftField>, change_type: ChangeType) {
        self.version += 1;
        self.current = Arc::new(next);

        match field {
            Some(field) => debug!("Draft v{}: updated {}", self.version, field),
            None => debug!("Draft v{}: replaced", self.version),
        }

        self.subscriptions.publish(DraftChange {
            version: self.version,
            field,
            change_type,
            draft: self.snapshot(),
            timestamp: Utc::now(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use swapchain_core::{Decimal, Secret};

    fn store() -> FieldStore {
        FieldStore::new(ProposalDraft::new(Secret::new([5u8; 32], [6u8; 32])))
    }

    #[test]
    fn test_update_key_produces_new_snapshot() {
        let mut store = store();
        let before = store.snapshot();

        let after = store
            .update_key(DraftField::AmountToSend, FieldValue::Quantity(dec!(3)))
            .unwrap();

        assert_eq!(after.amount_to_send, dec!(3));
        assert_eq!(before.amount_to_send, dec!(1));
        assert_eq!(store.version(), 1);
    }

    #[test]
    fn test_transiently_invalid_values_are_stored() {
        let mut store = store();
        store
            .update_key(DraftField::Rate, FieldValue::Quantity(dec!(-4)))
            .unwrap();
        store
            .update_key(DraftField::BitcoinTxId, FieldValue::Text(String::new()))
            .unwrap();

        assert_eq!(store.snapshot().rate, dec!(-4));
        assert_eq!(store.version(), 2);
    }

    #[test]
    fn test_mismatched_value_commits_nothing() {
        let mut store = store();
        let result = store.update_key(DraftField::Rate, FieldValue::Text("x".to_string()));

        assert!(result.is_err());
        assert_eq!(store.version(), 0);
    }

    #[test]
    fn test_replace_with_equal_draft_is_noop() {
        let mut store = store();
        let same = (*store.snapshot()).clone();

        assert!(!store.replace(same));
        assert_eq!(store.version(), 0);
    }

    #[test]
    fn test_replace_commits_different_draft() {
        let mut store = store();
        let next = ProposalDraft {
            amount_to_receive: Decimal::ZERO,
            ..(*store.snapshot()).clone()
        };

        assert!(store.replace(next));
        assert_eq!(store.snapshot().amount_to_receive, Decimal::ZERO);
    }

    #[tokio::test]
    async fn test_subscribers_see_each_commit() {
        let mut store = store();
        let mut all = store.subscribe(SubscriptionFilter::default());
        let mut rate_only = store.subscribe(SubscriptionFilter::fields(vec![DraftField::Rate]));
        assert_eq!(store.subscriber_count(), 2);

        store
            .update_key(DraftField::AmountToSend, FieldValue::Quantity(dec!(2)))
            .unwrap();
        store
            .update_key(DraftField::Rate, FieldValue::Quantity(dec!(5)))
            .unwrap();

        let first = all.recv().await.unwrap();
        assert_eq!(first.version, 1);
        assert_eq!(first.field, Some(DraftField::AmountToSend));

        let second = all.recv().await.unwrap();
        assert_eq!(second.draft.rate, dec!(5));

        let rate_change = rate_only.recv().await.unwrap();
        assert_eq!(rate_change.version, 2);
        assert!(rate_only.try_recv().is_none());

        drop(all);
        assert_eq!(store.subscriber_count(), 1);
    }
}
