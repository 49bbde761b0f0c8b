//! Wallet Import Format private keys.
//!
//! A WIF string is Base58Check over `version || key[32] || [0x01]`, where the
//! trailing byte is present only for keys whose public key is compressed.

use secp256k1::{PublicKey, Secp256k1, SecretKey};
use swapchain_core::Network;

use crate::error::{KeyError, KeyResult};

/// Version byte of mainnet WIF keys. Bitshares uses the same byte.
pub const MAINNET_VERSION: u8 = 0x80;

/// Version byte of testnet WIF keys.
pub const TESTNET_VERSION: u8 = 0xef;

const COMPRESSED_FLAG: u8 = 0x01;

/// WIF version byte for a network.
pub fn version_for(network: Network) -> u8 {
    match network {
        Network::Mainnet => MAINNET_VERSION,
        Network::Testnet => TESTNET_VERSION,
    }
}

/// A decoded WIF private key.
#[derive(Clone, Copy)]
pub struct Wif {
    pub version: u8,
    pub secret: SecretKey,
    pub compressed: bool,
}

impl Wif {
    /// Decode and check a WIF string.
    pub fn decode(encoded: &str) -> KeyResult<Self> {
        let bytes = bs58::decode(encoded)
            .with_check(None)
            .into_vec()
            .map_err(|e| KeyError::Base58(e.to_string()))?;

        let (version, payload) = bytes.split_first().ok_or(KeyError::Length(0))?;

        let (key, compressed) = match payload.len() {
            32 => (payload, false),
            33 if payload[32] == COMPRESSED_FLAG => (&payload[..32], true),
            n => return Err(KeyError::Length(n)),
        };

        let secret = SecretKey::from_slice(key).map_err(|e| KeyError::Curve(e.to_string()))?;

        Ok(Self {
            version: *version,
            secret,
            compressed,
        })
    }

    /// Encode back to a WIF string.
    pub fn encode(&self) -> String {
        let mut payload = Vec::with_capacity(34);
        payload.push(self.version);
        payload.extend_from_slice(&self.secret.secret_bytes());
        if self.compressed {
            payload.push(COMPRESSED_FLAG);
        }
        bs58::encode(payload).with_check().into_string()
    }

    /// The matching public key, SEC1 compressed.
    pub fn public_key(&self) -> PublicKey {
        PublicKey::from_secret_key(&Secp256k1::signing_only(), &self.secret)
    }
}

/// Compressed hex public key of a WIF private key on either network.
pub fn derive_public_key(encoded: &str) -> KeyResult<String> {
    let wif = Wif::decode(encoded)?;
    if wif.version != MAINNET_VERSION && wif.version != TESTNET_VERSION {
        return Err(KeyError::Version(wif.version));
    }
    Ok(hex::encode(wif.public_key().serialize()))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn key_one() -> SecretKey {
        let mut bytes = [0u8; 32];
        bytes[31] = 1;
        SecretKey::from_slice(&bytes).unwrap()
    }

    pub(crate) fn wif(version: u8, compressed: bool) -> String {
        Wif {
            version,
            secret: key_one(),
            compressed,
        }
        .encode()
    }

    const GENERATOR_COMPRESSED: &str =
        "0279be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798";

    #[test]
    fn test_known_mainnet_vectors() {
        assert_eq!(
            wif(MAINNET_VERSION, false),
            "5HpHagT65TZzG1PH3CSu63k8DbpvD8s5ip4nEB3kEsreAnchuDf"
        );
        assert_eq!(
            wif(MAINNET_VERSION, true),
            "KwDiBf89QgGbjEhKnhXJuH7LrciVrZi3qYjgd9M7rFU73sVHnoWn"
        );
    }

    #[test]
    fn test_decode_round_trip() {
        let encoded = wif(TESTNET_VERSION, true);
        let decoded = Wif::decode(&encoded).unwrap();
        assert_eq!(decoded.version, TESTNET_VERSION);
        assert!(decoded.compressed);
        assert_eq!(decoded.secret, key_one());
    }

    #[test]
    fn test_checksum_is_enforced() {
        let mut encoded = wif(MAINNET_VERSION, true);
        let last = encoded.pop().unwrap();
        encoded.push(if last == 'n' { 'm' } else { 'n' });
        assert!(matches!(Wif::decode(&encoded), Err(KeyError::Base58(_))));
    }

    #[test]
    fn test_zero_scalar_is_rejected() {
        let mut payload = vec![MAINNET_VERSION];
        payload.extend_from_slice(&[0u8; 32]);
        let encoded = bs58::encode(payload).with_check().into_string();
        assert!(matches!(Wif::decode(&encoded), Err(KeyError::Curve(_))));
    }

    #[test]
    fn test_bad_length_is_rejected() {
        let encoded = bs58::encode(vec![MAINNET_VERSION, 1, 2, 3]).with_check().into_string();
        assert_eq!(Wif::decode(&encoded).err(), Some(KeyError::Length(3)));
    }

    #[test]
    fn test_derive_public_key() {
        assert_eq!(
            derive_public_key(&wif(MAINNET_VERSION, true)).unwrap(),
            GENERATOR_COMPRESSED
        );
        assert_eq!(
            derive_public_key(&wif(TESTNET_VERSION, false)).unwrap(),
            GENERATOR_COMPRESSED
        );
    }

    #[test]
    fn test_derive_public_key_rejects_unknown_version() {
        assert_eq!(
            derive_public_key(&wif(0x42, true)),
            Err(KeyError::Version(0x42))
        );
    }
}
