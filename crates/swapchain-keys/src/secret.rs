//! HTLC secret generation.

use std::sync::Arc;

use rand::rngs::OsRng;
use rand::RngCore;
use sha2::{Digest, Sha256};
use swapchain_core::Secret;

/// Produces the secret that locks both legs of the swap.
pub trait SecretGenerator: Send + Sync {
    /// Called exactly once per draft.
    fn generate(&self) -> Secret;
}

impl<T: SecretGenerator + ?Sized> SecretGenerator for Arc<T> {
    fn generate(&self) -> Secret {
        (**self).generate()
    }
}

/// 32 bytes from the operating system RNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomSecretGenerator;

impl SecretGenerator for RandomSecretGenerator {
    fn generate(&self) -> Secret {
        let mut preimage = [0u8; 32];
        OsRng.fill_bytes(&mut preimage);
        secret_from_preimage(preimage)
    }
}

/// Build a secret whose hash is SHA-256 of `preimage`.
pub fn secret_from_preimage(preimage: [u8; 32]) -> Secret {
    let hash: [u8; 32] = Sha256::digest(preimage).into();
    Secret::new(hash, preimage)
}
