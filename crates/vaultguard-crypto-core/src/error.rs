//! Cryptographic error types for `vaultguard-crypto-core`.

use thiserror::Error;

/// Errors produced by cryptographic operations.
#[derive(Debug, Error)]
pub enum CryptoError {
    /// Key derivation failed (salt length, iteration count).
    #[error("key derivation failed: {0}")]
    KeyDerivation(String),

    /// Symmetric encryption failure (AES-256-GCM).
    #[error("encryption error: {0}")]
    Encryption(String),

    /// Authentication tag verification failed: tampered ciphertext or wrong key.
    #[error("decryption failed: authentication tag mismatch")]
    Decryption,

    /// HMAC tag did not match the data.
    #[error("integrity check failed: HMAC mismatch")]
    Integrity,

    /// Invalid key material (wrong length, corrupted bytes, bad encoding).
    #[error("invalid key material: {0}")]
    InvalidKeyMaterial(String),

    /// The random source could not produce bytes.
    #[error("random source failure: {0}")]
    Random(String),

    /// Secure memory allocation failure (mlock).
    #[error("secure memory error: {0}")]
    SecureMemory(String),

    /// Password generation failure (invalid parameters).
    #[error("password generation error: {0}")]
    PasswordGeneration(String),
}
