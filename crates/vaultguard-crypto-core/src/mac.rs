//! HMAC-SHA256 over stored ciphertext (encrypt-then-MAC).
//!
//! Verification runs before any decryption attempt, so a record altered at
//! rest is rejected without touching the AEAD layer.

use ring::hmac;

use crate::memory::SecretBytes;

/// HMAC-SHA256 key length in bytes.
pub const MAC_KEY_LEN: usize = 32;

/// HMAC-SHA256 tag length in bytes.
pub const MAC_LEN: usize = 32;

/// Compute the HMAC-SHA256 tag of `data`.
#[must_use]
pub fn sign(data: &[u8], key: &SecretBytes<MAC_KEY_LEN>) -> [u8; MAC_LEN] {
    let key = hmac::Key::new(hmac::HMAC_SHA256, key.expose());
    let tag = hmac::sign(&key, data);
    let mut out = [0u8; MAC_LEN];
    out.copy_from_slice(tag.as_ref());
    out
}

/// Check `tag` against `data` in constant time.
///
/// A tag of the wrong length simply fails to verify.
#[must_use]
pub fn verify(data: &[u8], tag: &[u8], key: &SecretBytes<MAC_KEY_LEN>) -> bool {
    let key = hmac::Key::new(hmac::HMAC_SHA256, key.expose());
    hmac::verify(&key, data, tag).is_ok()
}
