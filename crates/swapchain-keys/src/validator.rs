//! Key validation backed by Base58Check and secp256k1.

use secp256k1::PublicKey;
use swapchain_core::{KeyValidator, Network};
use tracing::debug;

use crate::error::{KeyError, KeyResult};
use crate::wif::{version_for, Wif, MAINNET_VERSION};

/// Validates Bitcoin and Bitshares key material.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChainKeyValidator;

impl ChainKeyValidator {
    pub fn new() -> Self {
        Self
    }

    /// Decode a Bitcoin WIF key and check it belongs to `network`.
    pub fn check_bitcoin_private_key(&self, key: &str, network: Network) -> KeyResult<Wif> {
        let wif = Wif::decode(key)?;
        if wif.version != version_for(network) {
            return Err(KeyError::Version(wif.version));
        }
        Ok(wif)
    }

    /// Decode a Bitshares WIF key. Bitshares only uses the uncompressed form.
    pub fn check_bitshares_private_key(&self, key: &str) -> KeyResult<Wif> {
        let wif = Wif::decode(key)?;
        if wif.version != MAINNET_VERSION {
            return Err(KeyError::Version(wif.version));
        }
        if wif.compressed {
            return Err(KeyError::Length(33));
        }
        Ok(wif)
    }

    /// Parse a hex SEC1 public key, compressed or uncompressed.
    pub fn check_bitcoin_public_key(&self, key: &str) -> KeyResult<PublicKey> {
        let bytes = hex::decode(key).map_err(|e| KeyError::Hex(e.to_string()))?;
        if bytes.len() != 33 && bytes.len() != 65 {
            return Err(KeyError::Length(bytes.len()));
        }
        PublicKey::from_slice(&bytes).map_err(|e| KeyError::Curve(e.to_string()))
    }
}

impl KeyValidator for ChainKeyValidator {
    fn is_valid_bitcoin_private_key(&self, key: &str, network: Network) -> bool {
        match self.check_bitcoin_private_key(key, network) {
            Ok(_) => true,
            Err(e) => {
                debug!("Rejected bitcoin private key for {}: {}", network.as_str(), e);
                false
            }
        }
    }

    fn is_valid_bitshares_private_key(&self, key: &str) -> bool {
        match self.check_bitshares_private_key(key) {
            Ok(_) => true,
            Err(e) => {
                debug!("Rejected bitshares private key: {}", e);
                false
            }
        }
    }

    fn is_valid_bitcoin_public_key(&self, key: &str) -> bool {
        match self.check_bitcoin_public_key(key) {
            Ok(_) => true,
            Err(e) => {
                debug!("Rejected counterparty public key: {}", e);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wif::tests::wif;
    use crate::wif::TESTNET_VERSION;

    const GENERATOR_COMPRESSED: &str =
        "0279be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798";
    const GENERATOR_UNCOMPRESSED: &str = "0479be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798483ada7726a3c4655da4fbfc0e1108a8fd17b448a68554199c47d08ffb10d4b8";

    #[test]
    fn test_bitcoin_key_must_match_network() {
        let validator = ChainKeyValidator::new();
        let testnet = wif(TESTNET_VERSION, true);
        let mainnet = wif(MAINNET_VERSION, true);

        assert!(validator.is_valid_bitcoin_private_key(&testnet, Network::Testnet));
        assert!(!validator.is_valid_bitcoin_private_key(&testnet, Network::Mainnet));
        assert!(validator.is_valid_bitcoin_private_key(&mainnet, Network::Mainnet));
        assert!(!validator.is_valid_bitcoin_private_key(&mainnet, Network::Testnet));
    }

    #[test]
    fn test_bitcoin_key_garbage() {
        let validator = ChainKeyValidator::new();
        assert!(!validator.is_valid_bitcoin_private_key("", Network::Testnet));
        assert!(!validator.is_valid_bitcoin_private_key("not a key", Network::Testnet));
    }

    #[test]
    fn test_bitshares_key() {
        let validator = ChainKeyValidator::new();
        assert!(validator.is_valid_bitshares_private_key(&wif(MAINNET_VERSION, false)));
        assert!(!validator.is_valid_bitshares_private_key(&wif(MAINNET_VERSION, true)));
        assert!(!validator.is_valid_bitshares_private_key(&wif(TESTNET_VERSION, false)));
        // 'O' is outside the Base58 alphabet.
        assert!(!validator.is_valid_bitshares_private_key(
            "5Z89Ve18ttnu7Ymd1nnCMsnGkfKk4KQnsfFrYEz7Cmw39FAMOSS"
        ));
    }

    #[test]
    fn test_public_key_forms() {
        let validator = ChainKeyValidator::new();
        assert!(validator.is_valid_bitcoin_public_key(GENERATOR_COMPRESSED));
        assert!(validator.is_valid_bitcoin_public_key(GENERATOR_UNCOMPRESSED));
    }

    #[test]
    fn test_public_key_rejections() {
        let validator = ChainKeyValidator::new();
        assert!(!validator.is_valid_bitcoin_public_key(""));
        assert!(!validator.is_valid_bitcoin_public_key("zz"));
        // Valid hex, wrong prefix byte.
        let bad_prefix = format!("05{}", &GENERATOR_COMPRESSED[2..]);
        assert!(!validator.is_valid_bitcoin_public_key(&bad_prefix));
        // Truncated.
        assert!(!validator.is_valid_bitcoin_public_key(&GENERATOR_COMPRESSED[..64]));
    }
}
