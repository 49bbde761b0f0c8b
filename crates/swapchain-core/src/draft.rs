//! The proposal draft and its field-level update vocabulary.
//!
//! A [`ProposalDraft`] is a value: every edit produces a new draft and the
//! previous one is never mutated in place. Only the fields listed in
//! [`DraftField`] can be edited; `mode`, `amount_to_receive` and `secret` are
//! owned by the system.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SwapchainError};
use crate::types::{Currency, Mode, Network, Priority, Timelock};

/// HTLC secret: a random preimage and its SHA-256 hash.
///
/// Generated once when the draft is created and never edited afterwards.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Secret {
    #[serde(with = "hex")]
    pub hash: [u8; 32],
    #[serde(with = "hex")]
    pub preimage: [u8; 32],
}

impl Secret {
    pub fn new(hash: [u8; 32], preimage: [u8; 32]) -> Self {
        Self { hash, preimage }
    }

    /// Hex encoding of the hash, the only part shared with the counterparty.
    pub fn hash_hex(&self) -> String {
        hex::encode(self.hash)
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Secret")
            .field("hash", &self.hash_hex())
            .field("preimage", &"<redacted>")
            .finish()
    }
}

/// Parameters of a proposed cross-chain trade, as entered so far.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposalDraft {
    pub mode: Mode,
    pub network_to_trade: Network,
    pub currency_to_give: Currency,
    pub amount_to_send: Decimal,
    pub rate: Decimal,
    /// Always `amount_to_send * rate` once derivation has settled.
    pub amount_to_receive: Decimal,
    pub bitcoin_private_key: String,
    pub bitshares_private_key: String,
    pub counterparty_bitcoin_public_key: String,
    pub counterparty_bitshares_account_name: String,
    #[serde(rename = "bitcoinTxID")]
    pub bitcoin_tx_id: String,
    pub timelock: Timelock,
    pub priority: Priority,
    pub secret: Secret,
}

impl ProposalDraft {
    /// Create a draft with default values around a freshly generated secret.
    pub fn new(secret: Secret) -> Self {
        Self {
            mode: Mode::Proposer,
            network_to_trade: Network::Testnet,
            currency_to_give: Currency::Btc,
            amount_to_send: Decimal::ONE,
            rate: Decimal::ONE,
            amount_to_receive: Decimal::ONE,
            bitcoin_private_key: String::new(),
            bitshares_private_key: String::new(),
            counterparty_bitcoin_public_key: String::new(),
            counterparty_bitshares_account_name: String::new(),
            bitcoin_tx_id: String::new(),
            timelock: Timelock::Short,
            priority: Priority::High,
            secret,
        }
    }

    /// Create a new ProposalDraftBuilder.
    pub fn builder() -> ProposalDraftBuilder {
        ProposalDraftBuilder::new()
    }

    /// Return a copy of this draft with exactly one field overwritten.
    pub fn with_field(&self, field: DraftField, value: FieldValue) -> Result<Self> {
        let mut next = self.clone();
        match (field, value) {
            (DraftField::NetworkToTrade, FieldValue::Network(v)) => next.network_to_trade = v,
            (DraftField::CurrencyToGive, FieldValue::Currency(v)) => next.currency_to_give = v,
            (DraftField::AmountToSend, FieldValue::Quantity(v)) => next.amount_to_send = v,
            (DraftField::Rate, FieldValue::Quantity(v)) => next.rate = v,
            (DraftField::BitcoinPrivateKey, FieldValue::Text(v)) => next.bitcoin_private_key = v,
            (DraftField::BitsharesPrivateKey, FieldValue::Text(v)) => next.bitshares_private_key = v,
            (DraftField::CounterpartyBitcoinPublicKey, FieldValue::Text(v)) => {
                next.counterparty_bitcoin_public_key = v
            }
            (DraftField::CounterpartyBitsharesAccountName, FieldValue::Text(v)) => {
                next.counterparty_bitshares_account_name = v
            }
            (DraftField::BitcoinTxId, FieldValue::Text(v)) => next.bitcoin_tx_id = v,
            (DraftField::Timelock, FieldValue::Timelock(v)) => next.timelock = v,
            (DraftField::Priority, FieldValue::Priority(v)) => next.priority = v,
            (field, _) => {
                return Err(SwapchainError::FieldTypeMismatch {
                    field: field.as_str().to_string(),
                    expected: field.kind().as_str().to_string(),
                })
            }
        }
        Ok(next)
    }

    /// Currency pair as (give, receive).
    pub fn rate_unit(&self) -> (Currency, Currency) {
        (self.currency_to_give, self.currency_to_give.counter())
    }

    /// Label for the rate field, e.g. `BTC/BTS`.
    pub fn rate_unit_label(&self) -> String {
        let (give, receive) = self.rate_unit();
        format!("{}/{}", give, receive)
    }

    /// Whether the transaction id is made of hex digits only.
    pub fn tx_id_is_hex(&self) -> bool {
        !self.bitcoin_tx_id.is_empty() && self.bitcoin_tx_id.chars().all(|c| c.is_ascii_hexdigit())
    }
}

impl fmt::Debug for ProposalDraft {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProposalDraft")
            .field("mode", &self.mode)
            .field("network_to_trade", &self.network_to_trade)
            .field("currency_to_give", &self.currency_to_give)
            .field("amount_to_send", &self.amount_to_send)
            .field("rate", &self.rate)
            .field("amount_to_receive", &self.amount_to_receive)
            .field("bitcoin_private_key", &"<redacted>")
            .field("bitshares_private_key", &"<redacted>")
            .field("counterparty_bitcoin_public_key", &self.counterparty_bitcoin_public_key)
            .field(
                "counterparty_bitshares_account_name",
                &self.counterparty_bitshares_account_name,
            )
            .field("bitcoin_tx_id", &self.bitcoin_tx_id)
            .field("timelock", &self.timelock)
            .field("priority", &self.priority)
            .field("secret", &self.secret)
            .finish()
    }
}

/// User-editable keys of a [`ProposalDraft`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DraftField {
    NetworkToTrade,
    CurrencyToGive,
    AmountToSend,
    Rate,
    BitcoinPrivateKey,
    BitsharesPrivateKey,
    CounterpartyBitcoinPublicKey,
    CounterpartyBitsharesAccountName,
    #[serde(rename = "bitcoinTxID")]
    BitcoinTxId,
    Timelock,
    Priority,
}

impl DraftField {
    pub const ALL: [DraftField; 11] = [
        DraftField::NetworkToTrade,
        DraftField::CurrencyToGive,
        DraftField::AmountToSend,
        DraftField::Rate,
        DraftField::BitcoinPrivateKey,
        DraftField::BitsharesPrivateKey,
        DraftField::CounterpartyBitcoinPublicKey,
        DraftField::CounterpartyBitsharesAccountName,
        DraftField::BitcoinTxId,
        DraftField::Timelock,
        DraftField::Priority,
    ];

    /// Wire name of the field.
    pub fn as_str(&self) -> &'static str {
        match self {
            DraftField::NetworkToTrade => "networkToTrade",
            DraftField::CurrencyToGive => "currencyToGive",
            DraftField::AmountToSend => "amountToSend",
            DraftField::Rate => "rate",
            DraftField::BitcoinPrivateKey => "bitcoinPrivateKey",
            DraftField::BitsharesPrivateKey => "bitsharesPrivateKey",
            DraftField::CounterpartyBitcoinPublicKey => "counterpartyBitcoinPublicKey",
            DraftField::CounterpartyBitsharesAccountName => "counterpartyBitsharesAccountName",
            DraftField::BitcoinTxId => "bitcoinTxID",
            DraftField::Timelock => "timelock",
            DraftField::Priority => "priority",
        }
    }

    pub fn kind(&self) -> FieldKind {
        match self {
            DraftField::NetworkToTrade => FieldKind::Network,
            DraftField::CurrencyToGive => FieldKind::Currency,
            DraftField::AmountToSend | DraftField::Rate => FieldKind::Quantity,
            DraftField::Timelock => FieldKind::Timelock,
            DraftField::Priority => FieldKind::Priority,
            DraftField::BitcoinPrivateKey
            | DraftField::BitsharesPrivateKey
            | DraftField::CounterpartyBitcoinPublicKey
            | DraftField::CounterpartyBitsharesAccountName
            | DraftField::BitcoinTxId => FieldKind::Text,
        }
    }

    /// Whether the field holds a secret that must never be logged.
    pub fn is_sensitive(&self) -> bool {
        matches!(self, DraftField::BitcoinPrivateKey | DraftField::BitsharesPrivateKey)
    }
}

impl fmt::Display for DraftField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DraftField {
    type Err = SwapchainError;

    fn from_str(s: &str) -> Result<Self> {
        DraftField::ALL
            .into_iter()
            .find(|field| field.as_str() == s)
            .ok_or_else(|| SwapchainError::NotFound {
                resource_type: "DraftField".to_string(),
                id: s.to_string(),
            })
    }
}

/// The kind of value a field holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Network,
    Currency,
    Quantity,
    Text,
    Timelock,
    Priority,
}

impl FieldKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldKind::Network => "network",
            FieldKind::Currency => "currency",
            FieldKind::Quantity => "quantity",
            FieldKind::Text => "text",
            FieldKind::Timelock => "timelock",
            FieldKind::Priority => "priority",
        }
    }
}

/// A typed value for a single field update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum FieldValue {
    Network(Network),
    Currency(Currency),
    Quantity(Decimal),
    Text(String),
    Timelock(Timelock),
    Priority(Priority),
}

impl FieldValue {
    /// Convert raw form input into a value for `field`.
    ///
    /// An emptied quantity input reads as zero, the same value an empty
    /// numeric input produces; validation then reports it.
    pub fn parse(field: DraftField, raw: &str) -> Result<Self> {
        match field.kind() {
            FieldKind::Quantity => {
                let trimmed = raw.trim();
                if trimmed.is_empty() {
                    return Ok(FieldValue::Quantity(Decimal::ZERO));
                }
                Decimal::from_str(trimmed)
                    .map(FieldValue::Quantity)
                    .map_err(|e| SwapchainError::invalid_value(field.as_str(), e.to_string()))
            }
            FieldKind::Network => raw.parse().map(FieldValue::Network),
            FieldKind::Currency => raw.parse().map(FieldValue::Currency),
            FieldKind::Timelock => raw.parse().map(FieldValue::Timelock),
            FieldKind::Priority => raw.parse().map(FieldValue::Priority),
            FieldKind::Text => Ok(FieldValue::Text(raw.to_string())),
        }
    }
}

/// Builder for creating drafts with a fluent API.
#[derive(Default)]
pub struct ProposalDraftBuilder {
    network_to_trade: Network,
    currency_to_give: Currency,
    amount_to_send: Option<Decimal>,
    rate: Option<Decimal>,
    bitcoin_private_key: String,
    bitshares_private_key: String,
    counterparty_bitcoin_public_key: String,
    counterparty_bitshares_account_name: String,
    bitcoin_tx_id: String,
    timelock: Timelock,
    priority: Priority,
    secret: Option<Secret>,
}

impl ProposalDraftBuilder {
    /// Create a new ProposalDraftBuilder.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn network(mut self, network: Network) -> Self {
        self.network_to_trade = network;
        self
    }

    pub fn currency_to_give(mut self, currency: Currency) -> Self {
        self.currency_to_give = currency;
        self
    }

    pub fn amount_to_send(mut self, amount: Decimal) -> Self {
        self.amount_to_send = Some(amount);
        self
    }

    pub fn rate(mut self, rate: Decimal) -> Self {
        self.rate = Some(rate);
        self
    }

    pub fn bitcoin_private_key(mut self, key: impl Into<String>) -> Self {
        self.bitcoin_private_key = key.into();
        self
    }

    pub fn bitshares_private_key(mut self, key: impl Into<String>) -> Self {
        self.bitshares_private_key = key.into();
        self
    }

    pub fn counterparty_bitcoin_public_key(mut self, key: impl Into<String>) -> Self {
        self.counterparty_bitcoin_public_key = key.into();
        self
    }

    pub fn counterparty_bitshares_account_name(mut self, name: impl Into<String>) -> Self {
        self.counterparty_bitshares_account_name = name.into();
        self
    }

    pub fn bitcoin_tx_id(mut self, tx_id: impl Into<String>) -> Self {
        self.bitcoin_tx_id = tx_id.into();
        self
    }

    pub fn timelock(mut self, timelock: Timelock) -> Self {
        self.timelock = timelock;
        self
    }

    pub fn priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn secret(mut self, secret: Secret) -> Self {
        self.secret = Some(secret);
        self
    }

    /// Build the draft. The received amount is derived, never supplied.
    pub fn build(self) -> Result<ProposalDraft> {
        let secret = self
            .secret
            .ok_or_else(|| SwapchainError::MissingField("secret".to_string()))?;

        let amount_to_send = self.amount_to_send.unwrap_or(Decimal::ONE);
        let rate = self.rate.unwrap_or(Decimal::ONE);

        Ok(ProposalDraft {
            mode: Mode::Proposer,
            network_to_trade: self.network_to_trade,
            currency_to_give: self.currency_to_give,
            amount_to_send,
            rate,
            amount_to_receive: amount_to_send.saturating_mul(rate),
            bitcoin_private_key: self.bitcoin_private_key,
            bitshares_private_key: self.bitshares_private_key,
            counterparty_bitcoin_public_key: self.counterparty_bitcoin_public_key,
            counterparty_bitshares_account_name: self.counterparty_bitshares_account_name,
            bitcoin_tx_id: self.bitcoin_tx_id,
            timelock: self.timelock,
            priority: self.priority,
            secret,
        })
    }
}
