// Copyright (c) 2024-2025 The PicoPot Developers

//! Cryptographic primitives for the PicoPot engine.
//!
//! One curve, one hash, one cipher construction: from-scratch SHA-512 and
//! Ed25519 plus the repeating-key XOR stream protecting the stored seed.
//! This is deliberately not a general-purpose cryptographic library.

use rand_core::CryptoRngCore;
use zeroize::{Zeroize, ZeroizeOnDrop};

pub mod ed25519;
pub mod field;
pub mod scalar;
pub mod sha512;
pub mod xor;

pub use ed25519::{clamp_scalar, public_key, sign, verify, Point};
pub use sha512::Sha512;

/// Crypto-layer errors
#[derive(Copy, Clone, PartialEq, Debug, thiserror::Error)]
pub enum CryptoError {
    /// Point encoding failed the curve-equation or sign recovery checks
    #[error("invalid point encoding")]
    InvalidPoint,

    /// Signature is not 64 bytes
    #[error("invalid signature length")]
    InvalidSignatureLength,
}

/// 32 raw secret bytes, the sole root secret.
///
/// Exists only transiently in memory during decryption-to-use and signing;
/// wiped on drop (best-effort overwriting, no stronger erasure guarantee).
#[derive(Clone, PartialEq, Zeroize, ZeroizeOnDrop)]
pub struct Seed(pub [u8; 32]);

impl Seed {
    /// Generate a fresh random seed
    pub fn random(rng: &mut impl CryptoRngCore) -> Seed {
        let mut bytes = [0u8; 32];
        rng.fill_bytes(&mut bytes);
        Seed(bytes)
    }

    /// Derive the canonical public key for this seed
    pub fn public_key(&self) -> [u8; 32] {
        ed25519::public_key(&self.0)
    }
}

impl core::fmt::Debug for Seed {
    // Never print seed material
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("Seed(..)")
    }
}
