//! `vaultguard-vault`: Vault business logic for VaultGuard.
//!
//! Lock-state machine and persistence protocol for the encrypted vault,
//! entry CRUD and search, export/import, password intelligence, and the
//! security auditor with its rate-limited breach checks.

#![cfg_attr(test, allow(clippy::unwrap_used, clippy::arithmetic_side_effects))]

pub mod clock;
pub mod config;
pub mod error;
pub mod storage;

pub mod entries;
pub mod record;

pub mod backup;
pub mod lifecycle;

pub mod breach;
pub mod rate_limit;

pub mod intelligence;

pub mod health;

pub use backup::ExportEnvelope;
pub use breach::{BreachLookup, BreachStatus, HibpClient};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::VaultConfig;
pub use entries::{
    EntryUpdate, NewEntry, SortField, SortOrder, VaultContents, VaultEntry, VaultMetadata,
};
pub use error::VaultError;
pub use health::{
    AuditReport, BreachBatchReport, BreachedItem, Grade, OldItem, Priority, Recommendation,
    RecommendationKind, ReusedItem, SecurityAuditor, VaultStatistics, WeakItem,
};
pub use intelligence::PasswordIntelligence;
pub use lifecycle::{LockState, VaultStore};
pub use rate_limit::RateLimiter;
pub use record::EncryptedVaultRecord;
pub use storage::{FileStore, MemoryStore, PersistentStore};
