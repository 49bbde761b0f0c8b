//! # Swapchain Keys
//!
//! Crypto collaborators of the proposal flow: key validation, HTLC secret
//! generation and public key derivation. Private keys only ever pass through
//! these functions locally; nothing here logs or transmits them.

pub mod error;
pub mod secret;
pub mod validator;
pub mod wif;

pub use error::{KeyError, KeyResult};
pub use secret::{secret_from_preimage, RandomSecretGenerator, SecretGenerator};
pub use validator::ChainKeyValidator;
pub use wif::{derive_public_key, Wif};
