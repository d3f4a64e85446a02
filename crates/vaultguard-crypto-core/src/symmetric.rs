//! AES-256-GCM authenticated encryption of the vault payload.
//!
//! This module provides:
//! - [`encrypt`]: encrypt plaintext under a fresh random IV, returning [`SealedData`]
//! - [`decrypt`]: authenticate and decrypt [`SealedData`], returning [`SecretBuffer`]
//! - [`SealedData`]: IV + ciphertext-with-tag container
//!
//! The ciphertext carries the 16-byte GCM tag at its end, so the stored
//! vault record only needs two fields (`iv`, `ciphertext`).

use ring::aead;
use zeroize::Zeroize;

use crate::error::CryptoError;
use crate::memory::{SecretBuffer, SecretBytes};
use crate::random::{random_array, RandomSource};

/// AES-256-GCM IV length in bytes (96 bits).
pub const IV_LEN: usize = 12;

/// AES-256-GCM authentication tag length in bytes (128 bits).
pub const TAG_LEN: usize = 16;

/// AES-256-GCM key length in bytes (256 bits).
pub const KEY_LEN: usize = 32;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Authenticated ciphertext and the IV it was sealed under.
///
/// `ciphertext` is `encrypted bytes || tag`. Any change to either field
/// makes [`decrypt`] fail.
#[must_use = "encrypted data must be stored or transmitted"]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SealedData {
    /// 96-bit random IV, unique per encryption.
    pub iv: [u8; IV_LEN],
    /// Encrypted data followed by the 128-bit tag.
    pub ciphertext: Vec<u8>,
}

impl SealedData {
    /// Rebuild sealed data from stored parts.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::InvalidKeyMaterial` if the IV is not 12 bytes or
    /// the ciphertext is shorter than a tag.
    pub fn from_parts(iv: &[u8], ciphertext: Vec<u8>) -> Result<Self, CryptoError> {
        let iv: [u8; IV_LEN] = iv.try_into().map_err(|_| {
            CryptoError::InvalidKeyMaterial(format!(
                "IV must be {IV_LEN} bytes, got {}",
                iv.len()
            ))
        })?;
        if ciphertext.len() < TAG_LEN {
            return Err(CryptoError::InvalidKeyMaterial(format!(
                "ciphertext too short: {} bytes (minimum {TAG_LEN})",
                ciphertext.len()
            )));
        }
        Ok(Self { iv, ciphertext })
    }
}

// ---------------------------------------------------------------------------
// Core encryption
// ---------------------------------------------------------------------------

fn aead_key(key: &SecretBytes<KEY_LEN>) -> Result<aead::LessSafeKey, CryptoError> {
    let unbound = aead::UnboundKey::new(&aead::AES_256_GCM, key.expose())
        .map_err(|_| CryptoError::Encryption("failed to create AES-256-GCM key".into()))?;
    Ok(aead::LessSafeKey::new(unbound))
}

/// Encrypt `plaintext` with AES-256-GCM under a fresh IV drawn from `rng`.
///
/// # Errors
///
/// Returns `CryptoError::Random` if the IV cannot be drawn, or
/// `CryptoError::Encryption` if sealing fails.
pub fn encrypt(
    plaintext: &[u8],
    key: &SecretBytes<KEY_LEN>,
    rng: &dyn RandomSource,
) -> Result<SealedData, CryptoError> {
    let less_safe_key = aead_key(key)?;

    let iv = random_array::<IV_LEN>(rng)?;
    let nonce = aead::Nonce::assume_unique_for_key(iv);

    // Encrypt in place, then append the tag.
    let mut in_out = plaintext.to_vec();
    let Ok(tag) = less_safe_key.seal_in_place_separate_tag(nonce, aead::Aad::empty(), &mut in_out)
    else {
        in_out.zeroize();
        return Err(CryptoError::Encryption(
            "AES-256-GCM encryption failed".into(),
        ));
    };
    in_out.extend_from_slice(tag.as_ref());

    Ok(SealedData {
        iv,
        ciphertext: in_out,
    })
}

/// Authenticate and decrypt `sealed`.
///
/// Returns the plaintext only when the tag verifies; a failed open never
/// yields partial output.
///
/// # Errors
///
/// Returns `CryptoError::Decryption` on a wrong key or any tampering.
pub fn decrypt(
    sealed: &SealedData,
    key: &SecretBytes<KEY_LEN>,
) -> Result<SecretBuffer, CryptoError> {
    let less_safe_key = aead_key(key)?;
    let nonce = aead::Nonce::assume_unique_for_key(sealed.iv);

    let mut in_out = sealed.ciphertext.clone();
    let result = less_safe_key
        .open_in_place(nonce, aead::Aad::empty(), &mut in_out)
        .map(|plaintext| SecretBuffer::new(plaintext))
        .map_err(|_| CryptoError::Decryption);
    in_out.zeroize();
    result
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
