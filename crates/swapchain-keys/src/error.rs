//! Error types for key handling.

use thiserror::Error;

/// Why a key could not be decoded.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KeyError {
    #[error("Base58Check decoding failed: {0}")]
    Base58(String),

    #[error("Hex decoding failed: {0}")]
    Hex(String),

    #[error("Unexpected key payload length {0}")]
    Length(usize),

    #[error("Unexpected version byte 0x{0:02x}")]
    Version(u8),

    #[error("Not a valid secp256k1 key: {0}")]
    Curve(String),
}

/// Result type for key operations.
pub type KeyResult<T> = Result<T, KeyError>;
