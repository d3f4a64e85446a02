//! k-anonymity breach lookup.
//!
//! Only the first 5 hex characters of the password's SHA-1 ever leave the
//! process. The service answers with every known suffix under that prefix as
//! `SUFFIX:COUNT` lines, and the match happens locally.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;
use vaultguard_crypto_core::CryptoEngine;

use crate::config::VaultConfig;
use crate::error::VaultError;

/// Hex characters sent to the lookup service.
pub const PREFIX_LEN: usize = 5;

/// Range query collaborator.
#[async_trait]
pub trait BreachLookup: Send + Sync {
    /// Fetch the raw `SUFFIX:COUNT` body for a 5-hex-character `prefix`.
    async fn query(&self, prefix: &str) -> Result<String, VaultError>;
}

/// Outcome of a single breach check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "status")]
pub enum BreachStatus {
    /// The password appears in `count` breaches.
    Breached { count: u64 },
    NotBreached,
    /// The lookup failed, so nothing is known.
    Unknown { reason: String },
}

impl BreachStatus {
    #[must_use]
    pub const fn is_breached(&self) -> bool {
        matches!(self, Self::Breached { .. })
    }
}

// ---------------------------------------------------------------------------
// Protocol
// ---------------------------------------------------------------------------

/// Split an uppercase SHA-1 hex digest into `(prefix, suffix)`.
#[must_use]
pub fn split_digest(digest: &str) -> (&str, &str) {
    digest.split_at(PREFIX_LEN.min(digest.len()))
}

/// Breach count for `suffix` in a range response body, 0 when absent.
///
/// Lines that do not parse are skipped.
#[must_use]
pub fn parse_range_response(body: &str, suffix: &str) -> u64 {
    body.lines()
        .filter_map(|line| line.trim().split_once(':'))
        .find(|(candidate, _)| candidate.eq_ignore_ascii_case(suffix))
        .and_then(|(_, count)| count.trim().parse().ok())
        .unwrap_or(0)
}

/// Hash `password`, query by prefix, and match the suffix locally.
///
/// # Errors
///
/// Propagates the lookup's error, typically [`VaultError::Network`].
pub async fn breach_count(
    engine: &CryptoEngine,
    lookup: &dyn BreachLookup,
    password: &str,
) -> Result<u64, VaultError> {
    let digest = engine.sha1_digest(password.as_bytes());
    let (prefix, suffix) = split_digest(&digest);
    let body = lookup.query(prefix).await?;
    let count = parse_range_response(&body, suffix);
    debug!(prefix, found = count > 0, "breach range checked");
    Ok(count)
}

// ---------------------------------------------------------------------------
// HTTP client
// ---------------------------------------------------------------------------

/// [`BreachLookup`] over the public range API.
#[derive(Debug, Clone)]
pub struct HibpClient {
    client: reqwest::Client,
    base_url: String,
}

impl HibpClient {
    /// Client for `config.breach_api_url` with the configured timeout.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::Network`] if the HTTP client cannot be built.
    pub fn new(config: &VaultConfig) -> Result<Self, VaultError> {
        Self::with_endpoint(config.breach_api_url.clone(), config.breach_timeout())
    }

    /// Client for an explicit endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::Network`] if the HTTP client cannot be built.
    pub fn with_endpoint(base_url: String, timeout: Duration) -> Result<Self, VaultError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("vaultguard/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| VaultError::Network(format!("failed to create HTTP client: {e}")))?;
        Ok(Self { client, base_url })
    }

    fn url_for(&self, prefix: &str) -> String {
        format!("{}{prefix}", self.base_url)
    }
}

#[async_trait]
impl BreachLookup for HibpClient {
    async fn query(&self, prefix: &str) -> Result<String, VaultError> {
        let response = self
            .client
            .get(self.url_for(prefix))
            .send()
            .await
            .map_err(|e| VaultError::Network(format!("breach lookup failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(VaultError::Network(format!(
                "breach lookup returned HTTP {status}"
            )));
        }

        response
            .text()
            .await
            .map_err(|e| VaultError::Network(format!("failed to read breach response: {e}")))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
