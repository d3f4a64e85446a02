//! Vault error types for `vaultguard-vault`.

use thiserror::Error;
use vaultguard_crypto_core::CryptoError;

/// Errors produced by vault operations.
#[derive(Debug, Error)]
pub enum VaultError {
    /// Cryptographic operation failed (delegated from crypto-core).
    #[error(transparent)]
    Crypto(#[from] CryptoError),

    /// Invalid configuration or generator options.
    #[error("configuration error: {0}")]
    Config(String),

    /// Wrong master passphrase or unreadable vault. The cause is never
    /// distinguished.
    #[error("wrong master password or corrupted vault")]
    AuthenticationFailed,

    /// An imported record failed HMAC verification.
    #[error("integrity check failed: {0}")]
    IntegrityFailure(String),

    /// The persistent store could not be read or written.
    #[error("storage error: {0}")]
    Storage(String),

    /// The breach lookup service could not be reached or answered badly.
    #[error("network error: {0}")]
    Network(String),

    /// Entry not found by ID.
    #[error("entry not found: {0}")]
    EntryNotFound(String),

    /// Operation requires an unlocked vault.
    #[error("vault is locked")]
    Locked,

    /// `create_vault` was called while a record already exists.
    #[error("vault already exists")]
    VaultAlreadyExists,

    /// No vault record is stored.
    #[error("vault not found: {0}")]
    NotFound(String),

    /// The import file is not a vault export.
    #[error("import error: {0}")]
    Import(String),

    /// Vault contents could not be serialized or parsed.
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for VaultError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
