//! First-failure validation of a proposal draft.
//!
//! Checks run in a fixed priority order and stop at the first one that
//! fails; only that check's message is reported.

use std::fmt;
use std::sync::Arc;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::draft::{DraftField, ProposalDraft};
use crate::error::SwapchainError;
use crate::types::Network;

/// Well-formedness checks for key material, supplied by a crypto backend.
pub trait KeyValidator: Send + Sync {
    /// Whether `key` is a private key for `network`.
    fn is_valid_bitcoin_private_key(&self, key: &str, network: Network) -> bool;

    /// Whether `key` is a Bitshares private key.
    fn is_valid_bitshares_private_key(&self, key: &str) -> bool;

    /// Whether `key` is a Bitcoin public key.
    fn is_valid_bitcoin_public_key(&self, key: &str) -> bool;
}

impl<T: KeyValidator + ?Sized> KeyValidator for Arc<T> {
    fn is_valid_bitcoin_private_key(&self, key: &str, network: Network) -> bool {
        (**self).is_valid_bitcoin_private_key(key, network)
    }

    fn is_valid_bitshares_private_key(&self, key: &str) -> bool {
        (**self).is_valid_bitshares_private_key(key)
    }

    fn is_valid_bitcoin_public_key(&self, key: &str) -> bool {
        (**self).is_valid_bitcoin_public_key(key)
    }
}

/// A failed check. Variants are declared in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationFailure {
    AmountToSendEmpty,
    RateNotPositive,
    AmountToReceiveNotPositive,
    BitcoinPrivateKeyInvalid,
    BitsharesPrivateKeyInvalid,
    CounterpartyPublicKeyInvalid,
    CounterpartyAccountNameEmpty,
    TxIdWrongLength,
}

impl ValidationFailure {
    /// All checks, highest priority first.
    pub const ALL: [ValidationFailure; 8] = [
        ValidationFailure::AmountToSendEmpty,
        ValidationFailure::RateNotPositive,
        ValidationFailure::AmountToReceiveNotPositive,
        ValidationFailure::BitcoinPrivateKeyInvalid,
        ValidationFailure::BitsharesPrivateKeyInvalid,
        ValidationFailure::CounterpartyPublicKeyInvalid,
        ValidationFailure::CounterpartyAccountNameEmpty,
        ValidationFailure::TxIdWrongLength,
    ];

    /// User-facing message, unique per check.
    pub fn message(&self) -> &'static str {
        match self {
            ValidationFailure::AmountToSendEmpty => "Amount to send is empty",
            ValidationFailure::RateNotPositive => "Rate is less than 0",
            ValidationFailure::AmountToReceiveNotPositive => "Amount you receive is less than 0",
            ValidationFailure::BitcoinPrivateKeyInvalid => "Bitcoin private key is invalid",
            ValidationFailure::BitsharesPrivateKeyInvalid => "Bitshares private key is invalid",
            ValidationFailure::CounterpartyPublicKeyInvalid => {
                "Counterparty bitcoin public key is invalid"
            }
            ValidationFailure::CounterpartyAccountNameEmpty => {
                "Counterparty bitshares account name is empty"
            }
            ValidationFailure::TxIdWrongLength => {
                "Bitcoin Transaction ID to spend is not 64 chars long"
            }
        }
    }

    /// The editable field to correct, if there is one.
    ///
    /// The received amount is derived, so its check points at nothing.
    pub fn field(&self) -> Option<DraftField> {
        match self {
            ValidationFailure::AmountToSendEmpty => Some(DraftField::AmountToSend),
            ValidationFailure::RateNotPositive => Some(DraftField::Rate),
            ValidationFailure::AmountToReceiveNotPositive => None,
            ValidationFailure::BitcoinPrivateKeyInvalid => Some(DraftField::BitcoinPrivateKey),
            ValidationFailure::BitsharesPrivateKeyInvalid => Some(DraftField::BitsharesPrivateKey),
            ValidationFailure::CounterpartyPublicKeyInvalid => {
                Some(DraftField::CounterpartyBitcoinPublicKey)
            }
            ValidationFailure::CounterpartyAccountNameEmpty => {
                Some(DraftField::CounterpartyBitsharesAccountName)
            }
            ValidationFailure::TxIdWrongLength => Some(DraftField::BitcoinTxId),
        }
    }
}

impl fmt::Display for ValidationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

impl std::error::Error for ValidationFailure {}

impl From<ValidationFailure> for SwapchainError {
    fn from(failure: ValidationFailure) -> Self {
        SwapchainError::ValidationFailed {
            message: failure.message().to_string(),
        }
    }
}

/// Length a Bitcoin transaction id must have.
pub const TX_ID_LEN: usize = 64;

/// Validates whole drafts against a key backend.
#[derive(Debug, Clone)]
pub struct DraftValidator<K> {
    keys: K,
}

impl<K: KeyValidator> DraftValidator<K> {
    /// Create a new validator.
    pub fn new(keys: K) -> Self {
        Self { keys }
    }

    /// The key backend in use.
    pub fn keys(&self) -> &K {
        &self.keys
    }

    /// Validate the draft, reporting only the highest-priority failure.
    pub fn validate(&self, draft: &ProposalDraft) -> Result<(), ValidationFailure> {
        match ValidationFailure::ALL
            .into_iter()
            .find(|check| !self.passes(*check, draft))
        {
            Some(failure) => Err(failure),
            None => Ok(()),
        }
    }

    /// Whether the draft passes every check.
    pub fn is_valid(&self, draft: &ProposalDraft) -> bool {
        self.validate(draft).is_ok()
    }

    fn passes(&self, check: ValidationFailure, draft: &ProposalDraft) -> bool {
        match check {
            ValidationFailure::AmountToSendEmpty => draft.amount_to_send > Decimal::ZERO,
            ValidationFailure::RateNotPositive => draft.rate > Decimal::ZERO,
            ValidationFailure::AmountToReceiveNotPositive => draft.amount_to_receive > Decimal::ZERO,
            ValidationFailure::BitcoinPrivateKeyInvalid => self
                .keys
                .is_valid_bitcoin_private_key(&draft.bitcoin_private_key, draft.network_to_trade),
            ValidationFailure::BitsharesPrivateKeyInvalid => self
                .keys
                .is_valid_bitshares_private_key(&draft.bitshares_private_key),
            ValidationFailure::CounterpartyPublicKeyInvalid => self
                .keys
                .is_valid_bitcoin_public_key(&draft.counterparty_bitcoin_public_key),
            ValidationFailure::CounterpartyAccountNameEmpty => {
                !draft.counterparty_bitshares_account_name.is_empty()
            }
            ValidationFailure::TxIdWrongLength => draft.bitcoin_tx_id.chars().count() == TX_ID_LEN,
        }
    }
}
