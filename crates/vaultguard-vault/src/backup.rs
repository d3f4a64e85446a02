//! Export envelope for moving an encrypted vault between installs.
//!
//! The envelope wraps the stored record unchanged. Nothing is decrypted on
//! export, and import verifies the record before it replaces anything
//! (see [`crate::lifecycle::VaultStore::import_vault`]).

use serde::{Deserialize, Serialize};

use crate::error::VaultError;
use crate::record::EncryptedVaultRecord;

/// Envelope format version.
pub const EXPORT_VERSION: &str = "1.0";

/// `{ version, exportDate, vault }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportEnvelope {
    pub version: String,
    pub export_date: String,
    pub vault: EncryptedVaultRecord,
}

impl ExportEnvelope {
    #[must_use]
    pub fn new(vault: EncryptedVaultRecord, export_date: String) -> Self {
        Self {
            version: EXPORT_VERSION.into(),
            export_date,
            vault,
        }
    }

    /// Parse an export file.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::Import`] when the text is not JSON or carries no
    /// usable `vault` record.
    pub fn parse(json: &str) -> Result<Self, VaultError> {
        let value: serde_json::Value = serde_json::from_str(json)
            .map_err(|e| VaultError::Import(format!("not a JSON document: {e}")))?;
        if matches!(value.get("vault"), None | Some(serde_json::Value::Null)) {
            return Err(VaultError::Import("invalid import file: no vault".into()));
        }
        serde_json::from_value(value)
            .map_err(|e| VaultError::Import(format!("invalid import file: {e}")))
    }

    /// Pretty-printed JSON for writing to disk.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::Serialization`] if serialization fails.
    pub fn to_json(&self) -> Result<String, VaultError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
