//! PBKDF2-HMAC-SHA256 key derivation.
//!
//! One passphrase and one vault salt yield two independent 256-bit keys:
//! - the **encryption key**: the first PBKDF2 output block
//! - the **HMAC key**: the second PBKDF2 output block
//!
//! PBKDF2 computes each 32-byte output block independently, so a 64-byte
//! derivation is the encryption key followed by a key no cheaper to reach
//! than the first.
//!
//! This module provides:
//! - [`derive_vault_keys`]: both keys in one pass
//! - [`derive_encryption_key`] / [`derive_mac_key`]: a single key
//! - [`VaultKeys`]: the pair, zeroized on drop

use std::fmt;
use std::num::NonZeroU32;

use ring::pbkdf2;
use zeroize::Zeroize;

use crate::error::CryptoError;
use crate::memory::SecretBytes;

/// Default PBKDF2 iteration count.
pub const PBKDF2_ITERATIONS: u32 = 600_000;

/// Vault salt length in bytes (128 bits).
pub const SALT_LEN: usize = 16;

/// Length of each derived key in bytes (256 bits).
pub const DERIVED_KEY_LEN: usize = 32;

/// Both keys, back to back.
const OUTPUT_LEN: usize = DERIVED_KEY_LEN * 2;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// The encryption/HMAC key pair of an unlocked vault.
#[derive(Clone)]
pub struct VaultKeys {
    encryption: SecretBytes<DERIVED_KEY_LEN>,
    mac: SecretBytes<DERIVED_KEY_LEN>,
}

impl VaultKeys {
    /// AES-256-GCM key.
    #[must_use]
    pub const fn encryption_key(&self) -> &SecretBytes<DERIVED_KEY_LEN> {
        &self.encryption
    }

    /// HMAC-SHA256 key.
    #[must_use]
    pub const fn mac_key(&self) -> &SecretBytes<DERIVED_KEY_LEN> {
        &self.mac
    }
}

impl fmt::Debug for VaultKeys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("VaultKeys(***)")
    }
}

// ---------------------------------------------------------------------------
// Core KDF
// ---------------------------------------------------------------------------

/// Derive the encryption and HMAC keys for a vault.
///
/// Deterministic: the same passphrase, salt, and iteration count always
/// produce the same pair. Any passphrase is accepted, including empty.
///
/// # Errors
///
/// Returns `CryptoError::KeyDerivation` if the salt is not [`SALT_LEN`]
/// bytes or `iterations` is zero.
pub fn derive_vault_keys(
    passphrase: &[u8],
    salt: &[u8],
    iterations: u32,
) -> Result<VaultKeys, CryptoError> {
    let iterations = check_params(salt, iterations)?;

    let mut output = [0u8; OUTPUT_LEN];
    pbkdf2_sha256(passphrase, salt, iterations, &mut output);

    let keys = SecretBytes::from_slice(&output[..DERIVED_KEY_LEN]).and_then(|encryption| {
        SecretBytes::from_slice(&output[DERIVED_KEY_LEN..]).map(|mac| VaultKeys { encryption, mac })
    });
    output.zeroize();
    keys
}

/// Derive only the AES-256-GCM key (first output block).
///
/// # Errors
///
/// Same conditions as [`derive_vault_keys`].
pub fn derive_encryption_key(
    passphrase: &[u8],
    salt: &[u8],
    iterations: u32,
) -> Result<SecretBytes<DERIVED_KEY_LEN>, CryptoError> {
    let iterations = check_params(salt, iterations)?;

    let mut output = [0u8; DERIVED_KEY_LEN];
    pbkdf2_sha256(passphrase, salt, iterations, &mut output);
    let key = SecretBytes::new(output);
    output.zeroize();
    Ok(key)
}

/// Derive only the HMAC-SHA256 key (second output block).
///
/// # Errors
///
/// Same conditions as [`derive_vault_keys`].
pub fn derive_mac_key(
    passphrase: &[u8],
    salt: &[u8],
    iterations: u32,
) -> Result<SecretBytes<DERIVED_KEY_LEN>, CryptoError> {
    derive_vault_keys(passphrase, salt, iterations).map(|keys| keys.mac)
}

fn check_params(salt: &[u8], iterations: u32) -> Result<NonZeroU32, CryptoError> {
    if salt.len() != SALT_LEN {
        return Err(CryptoError::KeyDerivation(format!(
            "salt must be exactly {SALT_LEN} bytes, got {}",
            salt.len()
        )));
    }
    NonZeroU32::new(iterations)
        .ok_or_else(|| CryptoError::KeyDerivation("iteration count must be non-zero".into()))
}

/// Raw PBKDF2-HMAC-SHA256 into `out`, any salt length.
pub(crate) fn pbkdf2_sha256(passphrase: &[u8], salt: &[u8], iterations: NonZeroU32, out: &mut [u8]) {
    pbkdf2::derive(
        pbkdf2::PBKDF2_HMAC_SHA256,
        iterations,
        salt,
        passphrase,
        out,
    );
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
