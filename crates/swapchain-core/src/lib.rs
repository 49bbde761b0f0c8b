//! # Swapchain Core
//!
//! Core primitives for proposing an atomic cross-chain swap.
//!
//! This crate provides the fundamental building blocks:
//! - [`ProposalDraft`] - The trade parameters entered so far
//! - [`derive`] - Keeps the received amount in step with its inputs
//! - [`DraftValidator`] - First-failure validation of a whole draft
//! - [`SwapchainError`] - Error types

pub mod derive;
pub mod draft;
pub mod error;
pub mod types;
pub mod validate;

// Re-exports for convenience
pub use draft::{DraftField, FieldKind, FieldValue, ProposalDraft, ProposalDraftBuilder, Secret};
pub use error::{Result, SwapchainError};
pub use types::*;
pub use validate::{DraftValidator, KeyValidator, ValidationFailure};

pub use rust_decimal::Decimal;

/// Prelude module for common imports
pub mod prelude {
    pub use crate::draft::{DraftField, FieldValue, ProposalDraft, Secret};
    pub use crate::error::{Result, SwapchainError};
    pub use crate::types::{Currency, Network, Priority, Timelock};
    pub use crate::validate::{DraftValidator, KeyValidator, ValidationFailure};
}
