//! Vault engine configuration, stored as plain JSON next to the vault.
//!
//! Nothing here is secret. The file is read before unlock so the KDF cost
//! and breach-check settings apply from the first operation.

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use vaultguard_crypto_core::{Sampling, PBKDF2_ITERATIONS};

use crate::error::VaultError;

/// Shortest spacing allowed between two breach lookups.
pub const MIN_BREACH_INTERVAL_MS: u64 = 1_500;

/// Public k-anonymity range endpoint.
pub const DEFAULT_BREACH_API_URL: &str = "https://api.pwnedpasswords.com/range/";

// ── Configuration ──────────────────────────────────────────────────

/// Tunable settings for the vault, generator, and auditor.
///
/// Persisted to `{data_dir}/vaultguard.json`. All fields have defaults via
/// [`Default`], so a partial file is valid.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VaultConfig {
    /// PBKDF2-HMAC-SHA256 iteration count for both derived keys.
    #[serde(default = "default_kdf_iterations")]
    pub kdf_iterations: u32,

    /// Days after which an unchanged password is reported as old.
    #[serde(default = "default_old_password_days")]
    pub old_password_days: u32,

    /// Minimum milliseconds between breach lookups (at least 1500).
    #[serde(default = "default_breach_interval")]
    pub breach_check_interval_ms: u64,

    /// Range endpoint; the 5-character hash prefix is appended.
    #[serde(default = "default_breach_api_url")]
    pub breach_api_url: String,

    /// Per-request timeout for breach lookups, in seconds.
    #[serde(default = "default_breach_timeout")]
    pub breach_request_timeout_secs: u64,

    /// Index sampling used by the password generator.
    #[serde(default)]
    pub password_sampling: Sampling,
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            kdf_iterations: default_kdf_iterations(),
            old_password_days: default_old_password_days(),
            breach_check_interval_ms: default_breach_interval(),
            breach_api_url: default_breach_api_url(),
            breach_request_timeout_secs: default_breach_timeout(),
            password_sampling: Sampling::default(),
        }
    }
}

const fn default_kdf_iterations() -> u32 {
    PBKDF2_ITERATIONS
}
const fn default_old_password_days() -> u32 {
    90
}
const fn default_breach_interval() -> u64 {
    MIN_BREACH_INTERVAL_MS
}
fn default_breach_api_url() -> String {
    DEFAULT_BREACH_API_URL.into()
}
const fn default_breach_timeout() -> u64 {
    10
}

impl VaultConfig {
    /// Spacing between breach lookups.
    #[must_use]
    pub const fn breach_interval(&self) -> Duration {
        Duration::from_millis(self.breach_check_interval_ms)
    }

    /// Breach request timeout.
    #[must_use]
    pub const fn breach_timeout(&self) -> Duration {
        Duration::from_secs(self.breach_request_timeout_secs)
    }

    /// Reject values the engine cannot honour.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::Config`] naming the first invalid field.
    pub fn validate(&self) -> Result<(), VaultError> {
        if self.kdf_iterations == 0 {
            return Err(VaultError::Config("kdfIterations must be at least 1".into()));
        }
        if self.old_password_days == 0 {
            return Err(VaultError::Config(
                "oldPasswordDays must be at least 1".into(),
            ));
        }
        if self.breach_check_interval_ms < MIN_BREACH_INTERVAL_MS {
            return Err(VaultError::Config(format!(
                "breachCheckIntervalMs must be at least {MIN_BREACH_INTERVAL_MS}, got {}",
                self.breach_check_interval_ms
            )));
        }
        if !self.breach_api_url.starts_with("https://") && !self.breach_api_url.starts_with("http://") {
            return Err(VaultError::Config(format!(
                "breachApiUrl must be an http(s) URL, got {:?}",
                self.breach_api_url
            )));
        }
        if self.breach_request_timeout_secs == 0 {
            return Err(VaultError::Config(
                "breachRequestTimeoutSecs must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

// ── File I/O ───────────────────────────────────────────────────────

const CONFIG_FILE: &str = "vaultguard.json";

impl VaultConfig {
    /// Load the configuration from `{data_dir}/vaultguard.json`.
    ///
    /// Returns [`Default::default()`] when the file is missing or is not
    /// valid JSON.
    #[must_use]
    pub fn load(data_dir: &Path) -> Self {
        let path = data_dir.join(CONFIG_FILE);
        fs::read_to_string(&path).map_or_else(
            |_| Self::default(),
            |contents| serde_json::from_str(&contents).unwrap_or_default(),
        )
    }

    /// Persist the configuration to `{data_dir}/vaultguard.json`.
    ///
    /// Writes to a `.tmp` file and renames it over the target.
    ///
    /// # Errors
    ///
    /// Returns `VaultError::Config` if the configuration is invalid, or
    /// `VaultError::Storage` if the write or rename fails.
    pub fn save(&self, data_dir: &Path) -> Result<(), VaultError> {
        self.validate()?;

        let path = data_dir.join(CONFIG_FILE);
        let tmp = data_dir.join(".vaultguard.json.tmp");

        let json = serde_json::to_string_pretty(self)?;
        fs::write(&tmp, &json).map_err(|e| VaultError::Storage(e.to_string()))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&tmp, fs::Permissions::from_mode(0o600))
                .map_err(|e| VaultError::Storage(e.to_string()))?;
        }

        fs::rename(&tmp, &path).map_err(|e| VaultError::Storage(e.to_string()))
    }
}

// ── Tests ──────────────────────────────────────────────────────────
