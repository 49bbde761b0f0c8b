//! Draft change subscriptions.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use swapchain_core::{DraftField, ProposalDraft};
use tokio::sync::broadcast;

/// A committed change to the draft.
#[derive(Debug, Clone)]
pub struct DraftChange {
    /// Store version after the change.
    pub version: u64,

    /// The edited field, or `None` for a whole-draft replacement.
    pub field: Option<DraftField>,

    /// Type of change.
    pub change_type: ChangeType,

    /// The new snapshot.
    pub draft: Arc<ProposalDraft>,

    /// Timestamp of the change.
    pub timestamp: DateTime<Utc>,
}

/// Type of draft change.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ChangeType {
    /// A single field was overwritten.
    FieldUpdated,
    /// The whole draft was swapped for another value.
    Replaced,
}

/// Filter for subscriptions.
#[derive(Debug, Clone, Default)]
pub struct SubscriptionFilter {
    /// Fields to watch. Replacements always match.
    pub fields: Option<Vec<DraftField>>,

    /// Change types to watch.
    pub change_types: Option<Vec<ChangeType>>,
}

impl SubscriptionFilter {
    /// Create a filter for specific fields.
    pub fn fields(fields: Vec<DraftField>) -> Self {
        Self {
            fields: Some(fields),
            ..Default::default()
        }
    }

    /// Create a filter for specific change types.
    pub fn change_types(types: Vec<ChangeType>) -> Self {
        Self {
            change_types: Some(types),
            ..Default::default()
        }
    }

    /// Check if a change matches this filter.
    pub fn matches(&self, change: &DraftChange) -> bool {
        if let (Some(fields), Some(field)) = (&self.fields, change.field) {
            if !fields.contains(&field) {
                return false;
            }
        }

        if let Some(ref types) = self.change_types {
            if !types.contains(&change.change_type) {
                return false;
            }
        }

        true
    }
}

/// A subscription to draft changes.
pub struct DraftSubscription {
    /// Filter for this subscription.
    pub filter: SubscriptionFilter,

    receiver: broadcast::Receiver<DraftChange>,
}

impl DraftSubscription {
    /// Wait for the next matching change.
    ///
    /// Returns `None` once the store is gone. Changes dropped because the
    /// subscriber lagged behind are skipped.
    pub async fn recv(&mut self) -> Option<DraftChange> {
        loop {
            match self.receiver.recv().await {
                Ok(change) if self.filter.matches(&change) => return Some(change),
                Ok(_) => continue,
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!("Draft subscriber lagged, skipped {} changes", skipped);
                    continue;
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    /// Take the next matching change without waiting.
    pub fn try_recv(&mut self) -> Option<DraftChange> {
        loop {
            match self.receiver.try_recv() {
                Ok(change) if self.filter.matches(&change) => return Some(change),
                Ok(_) => continue,
                Err(broadcast::error::TryRecvError::Lagged(_)) => continue,
                Err(_) => return None,
            }
        }
    }
}

/// Fan-out of draft changes to subscribers.
pub struct SubscriptionManager {
    sender: broadcast::Sender<DraftChange>,
}

impl SubscriptionManager {
    /// Create a new subscription manager.
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(256);
        Self { sender }
    }

    /// Subscribe to draft changes with a filter.
    pub fn subscribe(&self, filter: SubscriptionFilter) -> DraftSubscription {
        DraftSubscription {
            filter,
            receiver: self.sender.subscribe(),
        }
    }

    /// Publish a change. Having no subscribers is not an error.
    pub fn publish(&self, change: DraftChange) {
        let _ = self.sender.send(change);
    }

    /// Get the number of live subscriptions.
    pub fn subscription_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for SubscriptionManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use swapchain_core::Secret;

    fn change(field: Option<DraftField>, change_type: ChangeType) -> DraftChange {
        DraftChange {
            version: 1,
            field,
            change_type,
            draft: Arc::new(ProposalDraft::new(Secret::new([0u8; 32], [0u8; 32]))),
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn test_filter_fields() {
        let filter = SubscriptionFilter::fields(vec![DraftField::Rate]);

        assert!(filter.matches(&change(Some(DraftField::Rate), ChangeType::FieldUpdated)));
        assert!(!filter.matches(&change(Some(DraftField::Priority), ChangeType::FieldUpdated)));
        assert!(filter.matches(&change(None, ChangeType::Replaced)));
    }

    #[test]
    fn test_filter_change_types() {
        let filter = SubscriptionFilter::change_types(vec![ChangeType::Replaced]);

        assert!(filter.matches(&change(None, ChangeType::Replaced)));
        assert!(!filter.matches(&change(Some(DraftField::Rate), ChangeType::FieldUpdated)));
    }

    #[tokio::test]
    async fn test_subscription_manager() {
        let manager = SubscriptionManager::new();

        let mut sub = manager.subscribe(SubscriptionFilter::default());
        assert_eq!(manager.subscription_count(), 1);

        manager.publish(change(Some(DraftField::Rate), ChangeType::FieldUpdated));
        let received = sub.recv().await.unwrap();
        assert_eq!(received.field, Some(DraftField::Rate));

        drop(sub);
        assert_eq!(manager.subscription_count(), 0);
    }
}
