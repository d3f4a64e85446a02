//! The encrypted vault record: the only form the vault is ever persisted in.
//!
//! ```json
//! { "ciphertext": b64, "iv": b64(12), "salt": b64(16), "hmac": b64(32), "timestamp": iso8601 }
//! ```
//!
//! The HMAC is computed over the UTF-8 bytes of the base64 `ciphertext`
//! field, so a record can be verified without decoding it first.

use data_encoding::BASE64;
use serde::{Deserialize, Serialize};
use vaultguard_crypto_core::mac::MAC_LEN;
use vaultguard_crypto_core::{SealedData, IV_LEN, SALT_LEN};

use crate::error::VaultError;

/// Storage key the record lives under.
pub const VAULT_RECORD_KEY: &str = "vaultData";

/// Serialized, encrypted vault.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedVaultRecord {
    /// Base64 AES-256-GCM output (ciphertext followed by tag).
    pub ciphertext: String,
    /// Base64 96-bit IV.
    pub iv: String,
    /// Base64 128-bit KDF salt. Fixed for the vault's lifetime.
    pub salt: String,
    /// Base64 HMAC-SHA256 over the `ciphertext` field.
    pub hmac: String,
    /// ISO-8601 time of the save that produced this record.
    pub timestamp: String,
}

impl EncryptedVaultRecord {
    /// Assemble a record from a sealed payload and the vault salt. `sign`
    /// receives the encoded ciphertext and returns its HMAC tag.
    #[must_use]
    pub fn seal(
        sealed: &SealedData,
        salt: &[u8],
        timestamp: String,
        sign: impl FnOnce(&[u8]) -> [u8; MAC_LEN],
    ) -> Self {
        let ciphertext = BASE64.encode(&sealed.ciphertext);
        let hmac = BASE64.encode(&sign(ciphertext.as_bytes()));
        Self {
            ciphertext,
            iv: BASE64.encode(&sealed.iv),
            salt: BASE64.encode(salt),
            hmac,
            timestamp,
        }
    }

    /// Bytes the HMAC is computed over.
    #[must_use]
    pub fn authenticated_bytes(&self) -> &[u8] {
        self.ciphertext.as_bytes()
    }

    /// Decoded salt.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::Serialization`] if the field is not base64 or is
    /// not 16 bytes.
    pub fn salt_bytes(&self) -> Result<[u8; SALT_LEN], VaultError> {
        decode_fixed::<SALT_LEN>("salt", &self.salt)
    }

    /// Decoded HMAC tag.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::Serialization`] if the field is not base64 or is
    /// not 32 bytes.
    pub fn hmac_bytes(&self) -> Result<[u8; MAC_LEN], VaultError> {
        decode_fixed::<MAC_LEN>("hmac", &self.hmac)
    }

    /// Decoded IV and ciphertext, ready for decryption.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::Serialization`] on bad base64 or a malformed IV
    /// or ciphertext.
    pub fn sealed_data(&self) -> Result<SealedData, VaultError> {
        let iv = decode_fixed::<IV_LEN>("iv", &self.iv)?;
        let ciphertext = decode("ciphertext", &self.ciphertext)?;
        SealedData::from_parts(&iv, ciphertext)
            .map_err(|e| VaultError::Serialization(e.to_string()))
    }

    /// Parse a stored record.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::Serialization`] if `json` is not a record.
    pub fn from_json(json: &str) -> Result<Self, VaultError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize for storage.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::Serialization`] if serialization fails.
    pub fn to_json(&self) -> Result<String, VaultError> {
        Ok(serde_json::to_string(self)?)
    }
}

fn decode(field: &str, value: &str) -> Result<Vec<u8>, VaultError> {
    BASE64
        .decode(value.as_bytes())
        .map_err(|e| VaultError::Serialization(format!("{field} is not valid base64: {e}")))
}

fn decode_fixed<const N: usize>(field: &str, value: &str) -> Result<[u8; N], VaultError> {
    let bytes = decode(field, value)?;
    bytes.as_slice().try_into().map_err(|_| {
        VaultError::Serialization(format!("{field} must be {N} bytes, got {}", bytes.len()))
    })
}
