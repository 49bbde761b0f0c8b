//! # Swapchain State
//!
//! The field store that owns the current proposal draft.

pub mod store;
pub mod subscription;

pub use store::FieldStore;
pub use subscription::{ChangeType, DraftChange, DraftSubscription, SubscriptionFilter, SubscriptionManager};
