//! Derivation of dependent draft fields.
//!
//! The only derived field is `amount_to_receive = amount_to_send * rate`.
//! The direction is fixed: the received amount is never edited directly, so
//! nothing is ever derived back from it.

use rust_decimal::Decimal;
use tracing::{debug, warn};

use crate::draft::ProposalDraft;

/// The received amount implied by the draft's inputs.
///
/// Saturates at `Decimal::MAX`/`Decimal::MIN` instead of overflowing.
pub fn expected_receive(draft: &ProposalDraft) -> Decimal {
    draft.amount_to_send.saturating_mul(draft.rate)
}

/// Recompute derived fields.
///
/// Returns a corrected draft only when something changed, so calling this
/// again on its own output yields `None`.
pub fn reconcile(draft: &ProposalDraft) -> Option<ProposalDraft> {
    let expected = expected_receive(draft);
    if expected == draft.amount_to_receive {
        return None;
    }

    debug!(
        "Re-deriving amount to receive: {} -> {}",
        draft.amount_to_receive, expected
    );

    Some(ProposalDraft {
        amount_to_receive: expected,
        ..draft.clone()
    })
}

/// Run [`reconcile`] to its fixpoint.
///
/// A corrected draft is already consistent, so at most one extra pass is
/// made before giving up.
pub fn settle(draft: ProposalDraft) -> ProposalDraft {
    let Some(corrected) = reconcile(&draft) else {
        return draft;
    };

    match reconcile(&corrected) {
        None => corrected,
        Some(again) => {
            warn!("Derivation did not converge after one correction");
            again
        }
    }
}

/// Whether the derived fields agree with their inputs.
pub fn is_consistent(draft: &ProposalDraft) -> bool {
    reconcile(draft).is_none()
}
