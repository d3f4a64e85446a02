//! Vault lifecycle: create, unlock, save, lock, export, import.
//!
//! [`VaultStore`] owns the decrypted entries and the two derived keys while
//! unlocked. Every operation takes the per-vault lock, so saves are
//! read-modify-write atomic and nothing ever runs against purged keys.
//!
//! Save protocol:
//! 1. Serialize `{entries, metadata}` and encrypt under a fresh IV
//! 2. HMAC the base64 ciphertext with the independent MAC key
//! 3. Check the stored salt still matches the session (compare-before-write)
//! 4. Write `{ciphertext, iv, salt, hmac, timestamp}` as one record
//!
//! Mutations are applied to a draft and committed only after the write
//! succeeds, so a failed save leaves the in-memory vault unchanged.

use std::fmt;
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, info};
use vaultguard_crypto_core::{CryptoEngine, CryptoError, VaultKeys, SALT_LEN};
use zeroize::Zeroizing;

use crate::backup::ExportEnvelope;
use crate::clock::{to_iso8601, Clock, SystemClock};
use crate::config::VaultConfig;
use crate::entries::{
    self, EntryUpdate, NewEntry, SortField, SortOrder, VaultContents, VaultEntry, VaultMetadata,
};
use crate::error::VaultError;
use crate::record::{EncryptedVaultRecord, VAULT_RECORD_KEY};
use crate::storage::PersistentStore;

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

/// Observable lock state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockState {
    /// No record is stored.
    NoVault,
    /// A record exists; keys and entries are not in memory.
    Locked,
    /// Keys and entries are in memory.
    Unlocked,
}

/// Material held only while unlocked. Dropping it zeroizes keys and
/// passwords.
struct Session {
    keys: VaultKeys,
    salt: [u8; SALT_LEN],
    contents: VaultContents,
}

enum VaultState {
    NoVault,
    Locked,
    Unlocked(Session),
}

impl VaultState {
    const fn lock_state(&self) -> LockState {
        match self {
            Self::NoVault => LockState::NoVault,
            Self::Locked => LockState::Locked,
            Self::Unlocked(_) => LockState::Unlocked,
        }
    }

    fn session(&self) -> Option<&Session> {
        match self {
            Self::Unlocked(session) => Some(session),
            Self::NoVault | Self::Locked => None,
        }
    }

    fn session_mut(&mut self) -> Result<&mut Session, VaultError> {
        match self {
            Self::Unlocked(session) => Ok(session),
            Self::NoVault | Self::Locked => Err(VaultError::Locked),
        }
    }
}

// ---------------------------------------------------------------------------
// VaultStore
// ---------------------------------------------------------------------------

/// A single vault behind one master passphrase.
pub struct VaultStore {
    engine: CryptoEngine,
    store: Arc<dyn PersistentStore>,
    clock: Arc<dyn Clock>,
    state: Mutex<VaultState>,
}

impl fmt::Debug for VaultStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VaultStore")
            .field("engine", &self.engine)
            .finish_non_exhaustive()
    }
}

impl VaultStore {
    /// Open the vault held in `store`. The initial state is `Locked` when a
    /// record exists and `NoVault` otherwise.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::Storage`] if the store cannot be read.
    pub async fn open(
        engine: CryptoEngine,
        store: Arc<dyn PersistentStore>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, VaultError> {
        let state = if store.get(VAULT_RECORD_KEY).await?.is_some() {
            VaultState::Locked
        } else {
            VaultState::NoVault
        };
        Ok(Self {
            engine,
            store,
            clock,
            state: Mutex::new(state),
        })
    }

    /// Open with the system clock and an OS-backed engine tuned by `config`.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::Config`] for an invalid configuration, or
    /// [`VaultError::Storage`] if the store cannot be read.
    pub async fn with_config(
        config: &VaultConfig,
        store: Arc<dyn PersistentStore>,
    ) -> Result<Self, VaultError> {
        config.validate()?;
        let engine = CryptoEngine::default().with_iterations(config.kdf_iterations);
        Self::open(engine, store, Arc::new(SystemClock)).await
    }

    /// Whether a record is stored.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::Storage`] if the store cannot be read.
    pub async fn vault_exists(&self) -> Result<bool, VaultError> {
        Ok(self.store.get(VAULT_RECORD_KEY).await?.is_some())
    }

    /// Current lock state, as last observed under the vault lock.
    pub async fn state(&self) -> LockState {
        self.state.lock().await.lock_state()
    }

    // ── Lifecycle ──────────────────────────────────────────────────

    /// Create a new vault and leave it unlocked.
    ///
    /// # Errors
    ///
    /// - [`VaultError::VaultAlreadyExists`] if a record is stored
    /// - [`VaultError::Config`] for an empty passphrase
    /// - [`VaultError::Crypto`] / [`VaultError::Storage`] on failure
    pub async fn create_vault(
        &self,
        passphrase: &str,
        hint: Option<String>,
    ) -> Result<(), VaultError> {
        let mut state = self.state.lock().await;

        if self.store.get(VAULT_RECORD_KEY).await?.is_some() {
            return Err(VaultError::VaultAlreadyExists);
        }
        if passphrase.is_empty() {
            return Err(VaultError::Config("master passphrase must not be empty".into()));
        }

        let salt = self.engine.generate_salt()?;
        let keys = self.derive_keys(passphrase, salt).await?;
        let mut contents = VaultContents::empty(self.clock.now(), hint);

        self.persist(&keys, &salt, &mut contents).await?;
        *state = VaultState::Unlocked(Session {
            keys,
            salt,
            contents,
        });
        info!("vault created");
        Ok(())
    }

    /// Unlock with `passphrase`.
    ///
    /// Order: load record, derive keys from the stored salt, verify the HMAC,
    /// decrypt, parse. Any failure after loading is reported as
    /// [`VaultError::AuthenticationFailed`] and the state is left as it was.
    ///
    /// # Errors
    ///
    /// [`VaultError::AuthenticationFailed`], or [`VaultError::Storage`] if the
    /// store cannot be read.
    pub async fn unlock_vault(&self, passphrase: &str) -> Result<(), VaultError> {
        let mut state = self.state.lock().await;

        let Some(stored) = self.store.get(VAULT_RECORD_KEY).await? else {
            debug!(cause = "no record", "unlock rejected");
            return Err(VaultError::AuthenticationFailed);
        };

        match self.open_record(&stored, passphrase).await {
            Ok(session) => {
                *state = VaultState::Unlocked(session);
                info!("vault unlocked");
                Ok(())
            }
            Err(cause) => {
                debug!(cause = %cause, "unlock rejected");
                Err(VaultError::AuthenticationFailed)
            }
        }
    }

    /// Purge entries, metadata, and keys.
    pub async fn lock_vault(&self) {
        let mut state = self.state.lock().await;
        if matches!(*state, VaultState::Unlocked(_)) {
            *state = VaultState::Locked;
            info!("vault locked");
        }
    }

    // ── Entries ────────────────────────────────────────────────────

    /// Add an entry and save.
    ///
    /// # Errors
    ///
    /// [`VaultError::Locked`] unless unlocked, or any save failure.
    pub async fn add_entry(&self, new: NewEntry) -> Result<VaultEntry, VaultError> {
        let id = self.generate_id()?;
        let now = self.clock.now();
        let entry = VaultEntry::create(id, new, now);
        let added = entry.clone();
        self.mutate(move |contents| {
            contents.entries.push(entry);
            Ok(())
        })
        .await?;
        Ok(added)
    }

    /// Apply `update` to the entry with `id` and save.
    ///
    /// # Errors
    ///
    /// [`VaultError::Locked`], [`VaultError::EntryNotFound`], or any save
    /// failure.
    pub async fn update_entry(&self, id: &str, update: EntryUpdate) -> Result<VaultEntry, VaultError> {
        let now = self.clock.now();
        let mut updated = None;
        self.mutate(|contents| {
            let entry = contents
                .find_mut(id)
                .ok_or_else(|| VaultError::EntryNotFound(id.to_owned()))?;
            entry.apply(update, now);
            updated = Some(entry.clone());
            Ok(())
        })
        .await?;
        updated.ok_or_else(|| VaultError::EntryNotFound(id.to_owned()))
    }

    /// Remove the entry with `id` and save.
    ///
    /// # Errors
    ///
    /// [`VaultError::Locked`], [`VaultError::EntryNotFound`], or any save
    /// failure.
    pub async fn delete_entry(&self, id: &str) -> Result<(), VaultError> {
        self.mutate(|contents| {
            if contents.remove(id) {
                Ok(())
            } else {
                Err(VaultError::EntryNotFound(id.to_owned()))
            }
        })
        .await
    }

    /// All entries; empty while locked.
    pub async fn get_entries(&self) -> Vec<VaultEntry> {
        self.read(|contents| contents.entries.clone()).await.unwrap_or_default()
    }

    /// The entry with `id`; `None` while locked.
    pub async fn get_entry(&self, id: &str) -> Option<VaultEntry> {
        self.read(|contents| contents.find(id).cloned()).await.flatten()
    }

    /// Case-insensitive search; empty while locked.
    pub async fn search_entries(&self, query: &str) -> Vec<VaultEntry> {
        self.read(|contents| entries::search(&contents.entries, query))
            .await
            .unwrap_or_default()
    }

    /// Entries in `category` (`None` or `"All"` for every entry); empty while
    /// locked.
    pub async fn filter_by_category(&self, category: Option<&str>) -> Vec<VaultEntry> {
        self.read(|contents| entries::filter_by_category(&contents.entries, category))
            .await
            .unwrap_or_default()
    }

    /// Sorted copy of the entries; empty while locked.
    pub async fn sort_entries(&self, field: SortField, order: SortOrder) -> Vec<VaultEntry> {
        self.read(|contents| entries::sort(&contents.entries, field, order))
            .await
            .unwrap_or_default()
    }

    /// Vault metadata; `None` while locked.
    pub async fn metadata(&self) -> Option<VaultMetadata> {
        self.read(|contents| contents.metadata.clone()).await
    }

    // ── Export / import ────────────────────────────────────────────

    /// Wrap the stored record, unchanged, in an export envelope. Works in
    /// any state once a record exists.
    ///
    /// # Errors
    ///
    /// [`VaultError::NotFound`] if no record is stored, or a storage or
    /// parse failure.
    pub async fn export_vault(&self) -> Result<ExportEnvelope, VaultError> {
        let _state = self.state.lock().await;
        let stored = self
            .store
            .get(VAULT_RECORD_KEY)
            .await?
            .ok_or_else(|| VaultError::NotFound("no vault data to export".into()))?;
        let record = EncryptedVaultRecord::from_json(&stored)?;
        Ok(ExportEnvelope::new(record, to_iso8601(self.clock.now())))
    }

    /// Replace the stored vault with an exported one after proving
    /// `passphrase` opens it. On success the vault is `Locked`; on failure
    /// nothing changes.
    ///
    /// # Errors
    ///
    /// - [`VaultError::Import`] if the record is malformed
    /// - [`VaultError::IntegrityFailure`] if the HMAC does not verify
    /// - [`VaultError::AuthenticationFailed`] if decryption fails
    /// - [`VaultError::Storage`] if the write fails
    pub async fn import_vault(
        &self,
        envelope: &ExportEnvelope,
        passphrase: &str,
    ) -> Result<(), VaultError> {
        let mut state = self.state.lock().await;
        let record = &envelope.vault;

        let salt = record
            .salt_bytes()
            .map_err(|e| VaultError::Import(e.to_string()))?;
        let sealed = record
            .sealed_data()
            .map_err(|e| VaultError::Import(e.to_string()))?;
        let keys = self.derive_keys(passphrase, salt).await?;

        let tag_ok = record
            .hmac_bytes()
            .is_ok_and(|tag| self.engine.verify_hmac(record.authenticated_bytes(), &tag, keys.mac_key()));
        if !tag_ok {
            return Err(VaultError::IntegrityFailure(
                "import file integrity check failed".into(),
            ));
        }

        let plaintext = self
            .engine
            .decrypt(&sealed, keys.encryption_key())
            .map_err(|_| VaultError::AuthenticationFailed)?;
        serde_json::from_slice::<VaultContents>(plaintext.expose())
            .map_err(|e| VaultError::Import(format!("import file holds no vault: {e}")))?;

        self.store.put(VAULT_RECORD_KEY, record.to_json()?).await?;
        *state = VaultState::Locked;
        info!("vault imported");
        Ok(())
    }

    // ── Internals ──────────────────────────────────────────────────

    /// PBKDF2 off the async runtime.
    async fn derive_keys(&self, passphrase: &str, salt: [u8; SALT_LEN]) -> Result<VaultKeys, VaultError> {
        let engine = self.engine.clone();
        let passphrase = Zeroizing::new(passphrase.as_bytes().to_vec());
        let keys = tokio::task::spawn_blocking(move || engine.derive_keys(&passphrase, &salt))
            .await
            .map_err(|e| {
                CryptoError::KeyDerivation(format!("key derivation task failed: {e}"))
            })??;
        Ok(keys)
    }

    async fn open_record(&self, stored: &str, passphrase: &str) -> Result<Session, VaultError> {
        let record = EncryptedVaultRecord::from_json(stored)?;
        let salt = record.salt_bytes()?;
        let keys = self.derive_keys(passphrase, salt).await?;

        let tag = record.hmac_bytes()?;
        if !self
            .engine
            .verify_hmac(record.authenticated_bytes(), &tag, keys.mac_key())
        {
            return Err(VaultError::IntegrityFailure("record HMAC mismatch".into()));
        }

        let plaintext = self.engine.decrypt(&record.sealed_data()?, keys.encryption_key())?;
        let contents: VaultContents = serde_json::from_slice(plaintext.expose())?;
        Ok(Session {
            keys,
            salt,
            contents,
        })
    }

    /// Encrypt `contents` and write the record. Refreshes the metadata
    /// timestamp.
    async fn persist(
        &self,
        keys: &VaultKeys,
        salt: &[u8; SALT_LEN],
        contents: &mut VaultContents,
    ) -> Result<(), VaultError> {
        let now = self.clock.now();
        contents.metadata.last_updated_at = now;

        let plaintext = Zeroizing::new(serde_json::to_vec(contents)?);
        let sealed = self.engine.encrypt(&plaintext, keys.encryption_key())?;
        let record = EncryptedVaultRecord::seal(&sealed, salt, to_iso8601(now), |ciphertext| {
            self.engine.generate_hmac(ciphertext, keys.mac_key())
        });

        if let Some(existing) = self.store.get(VAULT_RECORD_KEY).await? {
            if EncryptedVaultRecord::from_json(&existing)?.salt_bytes()? != *salt {
                return Err(VaultError::Storage(
                    "stored vault was replaced since unlock".into(),
                ));
            }
        }

        self.store.put(VAULT_RECORD_KEY, record.to_json()?).await?;
        debug!(entries = contents.entries.len(), "vault saved");
        Ok(())
    }

    /// Run `change` on a draft of the unlocked contents, save, then commit.
    async fn mutate<F>(&self, change: F) -> Result<(), VaultError>
    where
        F: FnOnce(&mut VaultContents) -> Result<(), VaultError>,
    {
        let mut state = self.state.lock().await;
        let session = state.session_mut()?;

        let mut draft = session.contents.clone();
        change(&mut draft)?;
        self.persist(&session.keys, &session.salt, &mut draft).await?;
        session.contents = draft;
        Ok(())
    }

    async fn read<T>(&self, view: impl FnOnce(&VaultContents) -> T) -> Option<T> {
        let state = self.state.lock().await;
        state.session().map(|session| view(&session.contents))
    }

    fn generate_id(&self) -> Result<String, VaultError> {
        let bytes: [u8; 16] = self
            .engine
            .secure_random_bytes(16)?
            .try_into()
            .map_err(|_| CryptoError::Random("short read for entry id".into()))?;
        Ok(uuid::Builder::from_random_bytes(bytes).into_uuid().to_string())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
