//! SHA-1 hex digest for k-anonymity breach lookups.
//!
//! SHA-1 is used only because the breach range API is keyed by it. Nothing
//! in the vault format depends on SHA-1.

use data_encoding::HEXUPPER;
use ring::digest;

/// Length of a SHA-1 digest in hex characters.
pub const SHA1_HEX_LEN: usize = 40;

/// Uppercase hex SHA-1 digest of `input`.
#[must_use]
pub fn sha1_hex(input: &[u8]) -> String {
    let hash = digest::digest(&digest::SHA1_FOR_LEGACY_USE_ONLY, input);
    HEXUPPER.encode(hash.as_ref())
}
