//! [`CryptoEngine`], the crypto service handed to the vault and the
//! password tools.
//!
//! The engine holds no long-lived secrets: only the random source and the
//! PBKDF2 iteration count. Keys are returned to the caller, who owns their
//! lifetime.

use std::fmt;
use std::sync::Arc;

use crate::digest;
use crate::error::CryptoError;
use crate::kdf::{self, VaultKeys, DERIVED_KEY_LEN, PBKDF2_ITERATIONS, SALT_LEN};
use crate::mac::{self, MAC_LEN};
use crate::memory::{SecretBuffer, SecretBytes};
use crate::random::{random_array, random_bytes, OsRandom, RandomSource};
use crate::symmetric::{self, SealedData};

/// Key derivation, authenticated encryption, HMAC, SHA-1, and randomness
/// behind one injectable service.
#[derive(Clone)]
pub struct CryptoEngine {
    rng: Arc<dyn RandomSource>,
    iterations: u32,
}

impl CryptoEngine {
    /// Engine over `rng` with the default 600 000 PBKDF2 iterations.
    #[must_use]
    pub fn new(rng: Arc<dyn RandomSource>) -> Self {
        Self {
            rng,
            iterations: PBKDF2_ITERATIONS,
        }
    }

    /// Override the PBKDF2 iteration count. Zero is rejected at derivation.
    #[must_use]
    pub fn with_iterations(mut self, iterations: u32) -> Self {
        self.iterations = iterations;
        self
    }

    /// PBKDF2 iteration count in use.
    #[must_use]
    pub const fn iterations(&self) -> u32 {
        self.iterations
    }

    /// The shared random source.
    #[must_use]
    pub fn random_source(&self) -> &dyn RandomSource {
        self.rng.as_ref()
    }

    // -- Key derivation ----------------------------------------------------

    /// Derive the 256-bit AES-GCM key from `passphrase` and `salt`.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::KeyDerivation` on a bad salt or iteration count.
    pub fn derive_key(
        &self,
        passphrase: &[u8],
        salt: &[u8],
    ) -> Result<SecretBytes<DERIVED_KEY_LEN>, CryptoError> {
        kdf::derive_encryption_key(passphrase, salt, self.iterations)
    }

    /// Derive the HMAC-SHA256 key from the same passphrase and salt.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::KeyDerivation` on a bad salt or iteration count.
    pub fn derive_hmac_key(
        &self,
        passphrase: &[u8],
        salt: &[u8],
    ) -> Result<SecretBytes<DERIVED_KEY_LEN>, CryptoError> {
        kdf::derive_mac_key(passphrase, salt, self.iterations)
    }

    /// Derive both keys in a single PBKDF2 pass.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::KeyDerivation` on a bad salt or iteration count.
    pub fn derive_keys(&self, passphrase: &[u8], salt: &[u8]) -> Result<VaultKeys, CryptoError> {
        kdf::derive_vault_keys(passphrase, salt, self.iterations)
    }

    /// Fresh random vault salt.
    ///
    /// # Errors
    ///
    /// Propagates [`CryptoError::Random`] from the source.
    pub fn generate_salt(&self) -> Result<[u8; SALT_LEN], CryptoError> {
        random_array::<SALT_LEN>(self.rng.as_ref())
    }

    // -- Encryption --------------------------------------------------------

    /// Encrypt under a fresh 96-bit IV.
    ///
    /// # Errors
    ///
    /// See [`symmetric::encrypt`].
    pub fn encrypt(
        &self,
        plaintext: &[u8],
        key: &SecretBytes<DERIVED_KEY_LEN>,
    ) -> Result<SealedData, CryptoError> {
        symmetric::encrypt(plaintext, key, self.rng.as_ref())
    }

    /// Authenticate and decrypt.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::Decryption` if the tag does not verify.
    pub fn decrypt(
        &self,
        sealed: &SealedData,
        key: &SecretBytes<DERIVED_KEY_LEN>,
    ) -> Result<SecretBuffer, CryptoError> {
        symmetric::decrypt(sealed, key)
    }

    // -- Integrity ---------------------------------------------------------

    /// HMAC-SHA256 tag over `data`.
    #[must_use]
    pub fn generate_hmac(&self, data: &[u8], key: &SecretBytes<DERIVED_KEY_LEN>) -> [u8; MAC_LEN] {
        mac::sign(data, key)
    }

    /// Constant-time HMAC check.
    #[must_use]
    pub fn verify_hmac(&self, data: &[u8], tag: &[u8], key: &SecretBytes<DERIVED_KEY_LEN>) -> bool {
        mac::verify(data, tag, key)
    }

    // -- Misc --------------------------------------------------------------

    /// Uppercase hex SHA-1, for breach lookups only.
    #[must_use]
    pub fn sha1_digest(&self, input: &[u8]) -> String {
        digest::sha1_hex(input)
    }

    /// `n` bytes from the engine's random source.
    ///
    /// # Errors
    ///
    /// Propagates [`CryptoError::Random`] from the source.
    pub fn secure_random_bytes(&self, n: usize) -> Result<Vec<u8>, CryptoError> {
        random_bytes(self.rng.as_ref(), n)
    }
}

impl Default for CryptoEngine {
    fn default() -> Self {
        Self::new(Arc::new(OsRandom))
    }
}

impl fmt::Debug for CryptoEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CryptoEngine")
            .field("iterations", &self.iterations)
            .finish_non_exhaustive()
    }
}
