//! Presentation model of a proposal.
//!
//! Everything a front end needs to draw the proposal is computed here from
//! the draft snapshot and the lifecycle state. Private keys and the secret
//! preimage are never part of the view.

use serde::{Deserialize, Serialize};
use swapchain_core::{Currency, Decimal, Network, Priority, ProposalDraft, Timelock};
use swapchain_keys::derive_public_key;

use crate::state::LifecycleState;

/// Shown under the swap details while the swap runs.
pub const PARTNER_NOTICE: &str = "Please give these to your trading partner.";

/// Shown once the swap has completed.
pub const FAREWELL: &str = "Thank you for using swapchain.";

/// Heading of the proposal form.
pub const TITLE: &str = "Propose a new Atomic Cross Chain Swap";

/// Full presentation of a proposal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposalView {
    pub title: String,
    #[serde(flatten)]
    pub state: LifecycleState,
    pub draft_version: u64,
    pub screen: Screen,
    pub footer: Footer,
}

/// Main area of the proposal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Screen {
    /// The editable form, shown in Idle and Error.
    Form(FormFields),
    /// What the trading partner needs while the swap runs.
    #[serde(rename_all = "camelCase")]
    Running {
        secret_hash: String,
        /// `None` if the key cannot be decoded.
        bitcoin_public_key: Option<String>,
        timelock: String,
    },
    Success,
    Failure,
}

/// Bottom area of the proposal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Footer {
    SubmitButton { label: String },
    ErrorMessage { text: String },
    Notice { text: String },
}

/// Form contents as displayed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormFields {
    pub network_to_trade: Network,
    pub network_description: String,
    pub currency_to_give: Currency,
    pub currency_to_receive: Currency,
    pub amount_to_send: Decimal,
    pub rate: Decimal,
    /// Label of the rate input, e.g. `BTC/BTS`.
    pub rate_unit: String,
    pub amount_to_receive: Decimal,
    pub bitcoin_private_key_set: bool,
    pub bitshares_private_key_set: bool,
    pub counterparty_bitcoin_public_key: String,
    pub counterparty_bitshares_account_name: String,
    #[serde(rename = "bitcoinTxID")]
    pub bitcoin_tx_id: String,
    pub bitcoin_tx_id_is_hex: bool,
    pub timelock: Timelock,
    pub timelock_description: String,
    pub priority: Priority,
    pub priority_description: String,
    pub secret_hash: String,
}

impl FormFields {
    fn from_draft(draft: &ProposalDraft) -> Self {
        let (give, receive) = draft.rate_unit();
        Self {
            network_to_trade: draft.network_to_trade,
            network_description: draft.network_to_trade.description().to_string(),
            currency_to_give: give,
            currency_to_receive: receive,
            amount_to_send: draft.amount_to_send,
            rate: draft.rate,
            rate_unit: draft.rate_unit_label(),
            amount_to_receive: draft.amount_to_receive,
            bitcoin_private_key_set: !draft.bitcoin_private_key.is_empty(),
            bitshares_private_key_set: !draft.bitshares_private_key.is_empty(),
            counterparty_bitcoin_public_key: draft.counterparty_bitcoin_public_key.clone(),
            counterparty_bitshares_account_name: draft.counterparty_bitshares_account_name.clone(),
            bitcoin_tx_id: draft.bitcoin_tx_id.clone(),
            bitcoin_tx_id_is_hex: draft.tx_id_is_hex(),
            timelock: draft.timelock,
            timelock_description: draft.timelock.description().to_string(),
            priority: draft.priority,
            priority_description: draft.priority.description().to_string(),
            secret_hash: draft.secret.hash_hex(),
        }
    }
}

impl ProposalView {
    /// Render `draft` in `state`.
    pub fn render(draft: &ProposalDraft, state: &LifecycleState, draft_version: u64) -> Self {
        let screen = match state {
            LifecycleState::Idle | LifecycleState::Error { .. } => {
                Screen::Form(FormFields::from_draft(draft))
            }
            LifecycleState::Running => Screen::Running {
                secret_hash: draft.secret.hash_hex(),
                bitcoin_public_key: derive_public_key(&draft.bitcoin_private_key).ok(),
                timelock: draft.timelock.label().to_string(),
            },
            LifecycleState::Success => Screen::Success,
            LifecycleState::Failure { .. } => Screen::Failure,
        };

        let footer = match state {
            LifecycleState::Idle => Footer::SubmitButton {
                label: "Submit".to_string(),
            },
            LifecycleState::Error { message } => Footer::ErrorMessage {
                text: message.clone(),
            },
            LifecycleState::Running => Footer::Notice {
                text: PARTNER_NOTICE.to_string(),
            },
            LifecycleState::Success => Footer::Notice {
                text: FAREWELL.to_string(),
            },
            LifecycleState::Failure { message } => Footer::Notice {
                text: message.clone(),
            },
        };

        Self {
            title: TITLE.to_string(),
            state: state.clone(),
            draft_version,
            screen,
            footer,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::tests::BITCOIN_KEY;
    use swapchain_keys::secret_from_preimage;

    fn draft() -> ProposalDraft {
        ProposalDraft::builder()
            .currency_to_give(Currency::Bts)
            .bitcoin_private_key(BITCOIN_KEY)
            .bitshares_private_key("5HpHagT65TZzG1PH3CSu63k8DbpvD8s5ip4nEB3kEsreAnchuDf")
            .timelock(Timelock::Medium)
            .secret(secret_from_preimage([0u8; 32]))
            .build()
            .unwrap()
    }

    #[test]
    fn test_form_hides_private_keys() {
        let view = ProposalView::render(&draft(), &LifecycleState::Idle, 3);

        let Screen::Form(fields) = &view.screen else {
            panic!("expected form, got {:?}", view.screen);
        };
        assert_eq!(fields.rate_unit, "BTS/BTC");
        assert!(fields.bitcoin_private_key_set);

        let json = serde_json::to_string(&view).unwrap();
        assert!(!json.contains(BITCOIN_KEY));
        assert!(!json.contains(&"00".repeat(32)));
        assert_eq!(
            view.footer,
            Footer::SubmitButton {
                label: "Submit".to_string()
            }
        );
    }

    #[test]
    fn test_form_explains_network_and_priority() {
        let mainnet = ProposalDraft {
            network_to_trade: Network::Mainnet,
            priority: Priority::Low,
            ..draft()
        };
        let view = ProposalView::render(&mainnet, &LifecycleState::Idle, 0);

        let Screen::Form(fields) = &view.screen else {
            panic!("expected form, got {:?}", view.screen);
        };
        assert_eq!(fields.network_description, "You are sending real money!");
        assert_eq!(fields.priority_description, Priority::Low.description());
        assert_eq!(fields.timelock_description, Timelock::Medium.description());
    }

    #[test]
    fn test_running_shows_partner_details() {
        let view = ProposalView::render(&draft(), &LifecycleState::Running, 3);

        assert_eq!(
            view.screen,
            Screen::Running {
                secret_hash: "66687aadf862bd776c8fc18b8e9f8e20089714856ee233b3902a591d0d5f2925"
                    .to_string(),
                bitcoin_public_key: Some(
                    "0279be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798"
                        .to_string()
                ),
                timelock: "MEDIUM".to_string(),
            }
        );
        assert_eq!(
            view.footer,
            Footer::Notice {
                text: PARTNER_NOTICE.to_string()
            }
        );
    }

    #[test]
    fn test_footer_per_state() {
        let draft = draft();

        let error = ProposalView::render(
            &draft,
            &LifecycleState::Error {
                message: "Rate is less than 0".to_string(),
            },
            0,
        );
        assert!(matches!(error.screen, Screen::Form(_)));
        assert_eq!(
            error.footer,
            Footer::ErrorMessage {
                text: "Rate is less than 0".to_string()
            }
        );

        let success = ProposalView::render(&draft, &LifecycleState::Success, 0);
        assert_eq!(success.screen, Screen::Success);
        assert_eq!(
            success.footer,
            Footer::Notice {
                text: FAREWELL.to_string()
            }
        );

        let failure = ProposalView::render(
            &draft,
            &LifecycleState::Failure {
                message: "insufficient funds".to_string(),
            },
            0,
        );
        assert_eq!(failure.screen, Screen::Failure);
        assert_eq!(
            failure.footer,
            Footer::Notice {
                text: "insufficient funds".to_string()
            }
        );
    }
}
