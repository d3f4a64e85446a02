//! `vaultguard-crypto-core`: Pure cryptographic primitives for VaultGuard.
//!
//! Key derivation, authenticated encryption, HMAC, SHA-1 digests, and the
//! password generator and strength meter. No I/O, no async, no logging.

#![cfg_attr(test, allow(clippy::unwrap_used, clippy::arithmetic_side_effects))]

pub mod error;
pub mod memory;
pub mod random;

pub mod digest;
pub mod kdf;
pub mod mac;
pub mod symmetric;

pub mod engine;

pub mod password;

pub use engine::CryptoEngine;
pub use error::CryptoError;
pub use kdf::{VaultKeys, DERIVED_KEY_LEN, PBKDF2_ITERATIONS, SALT_LEN};
pub use memory::{SecretBuffer, SecretBytes};
pub use password::strength::{assess_strength, StrengthAssessment, StrengthLevel, STRONG_SCORE};
pub use password::{
    generate_password, CharsetConfig, GeneratorOptions, DEFAULT_PASSWORD_LENGTH,
    MAX_PASSWORD_LENGTH, MIN_PASSWORD_LENGTH,
};
pub use random::{OsRandom, RandomSource, Sampling, SeededRandom};
pub use symmetric::{SealedData, IV_LEN, TAG_LEN};
