//! [`PasswordIntelligence`]: generation, strength scoring, and breach checks
//! behind one service.

use std::sync::Arc;

use tracing::warn;
use vaultguard_crypto_core::{
    assess_strength, generate_password, CryptoEngine, CryptoError, GeneratorOptions,
    Sampling, StrengthAssessment,
};

use crate::breach::{self, BreachLookup, BreachStatus};
use crate::config::VaultConfig;
use crate::error::VaultError;

#[derive(Clone)]
pub struct PasswordIntelligence {
    engine: CryptoEngine,
    lookup: Arc<dyn BreachLookup>,
    sampling: Sampling,
}

impl PasswordIntelligence {
    #[must_use]
    pub fn new(engine: CryptoEngine, lookup: Arc<dyn BreachLookup>, config: &VaultConfig) -> Self {
        Self {
            engine,
            lookup,
            sampling: config.password_sampling,
        }
    }

    /// Default generator options, using the configured sampling.
    #[must_use]
    pub fn default_options(&self) -> GeneratorOptions {
        GeneratorOptions {
            sampling: self.sampling,
            ..GeneratorOptions::default()
        }
    }

    /// Generate a password from `options`.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::Config`] if the length is outside 8..=64, or
    /// [`VaultError::Crypto`] if the random source fails.
    pub fn generate(&self, options: &GeneratorOptions) -> Result<String, VaultError> {
        generate_password(options, self.engine.random_source()).map_err(|e| match e {
            CryptoError::PasswordGeneration(msg) => VaultError::Config(msg),
            other => VaultError::Crypto(other),
        })
    }

    #[must_use]
    pub fn calculate_strength(&self, password: &str) -> StrengthAssessment {
        assess_strength(password)
    }

    /// Check `password` against the breach corpus. Lookup failures come back
    /// as [`BreachStatus::Unknown`].
    pub async fn check_breached(&self, password: &str) -> BreachStatus {
        match self.breach_count(password).await {
            Ok(0) => BreachStatus::NotBreached,
            Ok(count) => BreachStatus::Breached { count },
            Err(e) => {
                warn!(error = %e, "breach check failed");
                BreachStatus::Unknown {
                    reason: e.to_string(),
                }
            }
        }
    }

    /// Raw breach count for `password`.
    ///
    /// # Errors
    ///
    /// Propagates the lookup error.
    pub async fn breach_count(&self, password: &str) -> Result<u64, VaultError> {
        breach::breach_count(&self.engine, self.lookup.as_ref(), password).await
    }
}

impl std::fmt::Debug for PasswordIntelligence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PasswordIntelligence")
            .field("engine", &self.engine)
            .field("sampling", &self.sampling)
            .finish_non_exhaustive()
    }
}
