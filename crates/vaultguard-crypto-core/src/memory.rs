//! Secure memory types for derived keys and decrypted vault content.
//!
//! - [`SecretBuffer`]: variable-length plaintext (decrypted vault JSON)
//! - [`SecretBytes`]: fixed-size key material (encryption and HMAC keys)
//!
//! Both zero their bytes on drop, mask `Debug`/`Display` output, and try to
//! `mlock` their pages so they are not swapped to disk.

use std::fmt;

use secrecy::{ExposeSecret, SecretSlice};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::CryptoError;
use crate::random::RandomSource;

// ---------------------------------------------------------------------------
// Platform-specific memory locking
// ---------------------------------------------------------------------------

/// RAII guard that `munlock`s a region on drop.
///
/// Locking is best-effort: if `mlock` fails the guard simply records that
/// the region is not locked.
pub struct LockedRegion {
    ptr: *const u8,
    len: usize,
    locked: bool,
}

// SAFETY: The pointer is only handed to mlock/munlock, which are
// thread-safe. The bytes themselves are owned and accessed through the
// enclosing SecretBuffer/SecretBytes, never through LockedRegion.
unsafe impl Send for LockedRegion {}
unsafe impl Sync for LockedRegion {}

impl LockedRegion {
    /// Callers must keep `ptr..ptr+len` alive for the guard's lifetime.
    #[must_use]
    pub(crate) fn try_lock(ptr: *const u8, len: usize) -> Self {
        let locked = platform::try_mlock(ptr, len);
        Self { ptr, len, locked }
    }

    const fn unlocked() -> Self {
        Self {
            ptr: std::ptr::null(),
            len: 0,
            locked: false,
        }
    }

    /// Whether `mlock` succeeded for this region.
    #[must_use]
    pub const fn is_locked(&self) -> bool {
        self.locked
    }
}

impl Drop for LockedRegion {
    fn drop(&mut self) {
        if self.locked {
            platform::try_munlock(self.ptr, self.len);
        }
    }
}

// ---------------------------------------------------------------------------
// SecretBuffer (variable length)
// ---------------------------------------------------------------------------

/// Variable-length buffer for decrypted data.
///
/// Wraps [`SecretSlice<u8>`] from `secrecy`; the slice is zeroized when the
/// buffer drops.
pub struct SecretBuffer {
    inner: SecretSlice<u8>,
    lock: LockedRegion,
}

impl SecretBuffer {
    /// Copy `data` into a new locked allocation.
    ///
    /// The caller should zeroize its own copy afterwards.
    #[must_use]
    pub fn new(data: &[u8]) -> Self {
        let inner: SecretSlice<u8> = data.to_vec().into();
        let exposed = inner.expose_secret();
        let lock = LockedRegion::try_lock(exposed.as_ptr(), exposed.len());
        Self { inner, lock }
    }

    /// Expose the underlying bytes. Keep the borrow short.
    #[must_use]
    pub fn expose(&self) -> &[u8] {
        self.inner.expose_secret()
    }

    /// Interpret the buffer as UTF-8.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::InvalidKeyMaterial` if the bytes are not UTF-8.
    pub fn expose_str(&self) -> Result<&str, CryptoError> {
        std::str::from_utf8(self.expose())
            .map_err(|_| CryptoError::InvalidKeyMaterial("plaintext is not valid UTF-8".into()))
    }

    /// Plaintext length in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.expose_secret().len()
    }

    /// `true` for an empty plaintext.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether the plaintext pages are pinned in RAM.
    #[must_use]
    pub const fn is_mlocked(&self) -> bool {
        self.lock.is_locked()
    }
}

impl fmt::Debug for SecretBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretBuffer(***)")
    }
}

impl fmt::Display for SecretBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretBuffer(***)")
    }
}

// ---------------------------------------------------------------------------
// SecretBytes<N> (fixed size)
// ---------------------------------------------------------------------------

/// Fixed-size secret such as a derived 256-bit key.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct SecretBytes<const N: usize> {
    bytes: [u8; N],
    #[zeroize(skip)]
    lock: LockedRegion,
}

impl<const N: usize> SecretBytes<N> {
    /// Move `data` into a new secret.
    ///
    /// The lock covers the address at construction time. Later moves leave
    /// it stale, which only makes the eventual `munlock` a no-op.
    #[must_use]
    pub fn new(data: [u8; N]) -> Self {
        let mut s = Self {
            bytes: data,
            lock: LockedRegion::unlocked(),
        };
        s.lock = LockedRegion::try_lock(s.bytes.as_ptr(), N);
        s
    }

    /// Copy a slice of exactly `N` bytes into a new secret.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::InvalidKeyMaterial` on a length mismatch.
    pub fn from_slice(data: &[u8]) -> Result<Self, CryptoError> {
        let mut bytes: [u8; N] = data.try_into().map_err(|_| {
            CryptoError::InvalidKeyMaterial(format!(
                "expected {N} bytes, got {}",
                data.len()
            ))
        })?;
        let secret = Self::new(bytes);
        bytes.zeroize();
        Ok(secret)
    }

    /// Fill a new secret from `rng`.
    ///
    /// # Errors
    ///
    /// Propagates [`CryptoError::Random`] from the source.
    pub fn random(rng: &dyn RandomSource) -> Result<Self, CryptoError> {
        let mut bytes = [0u8; N];
        rng.fill(&mut bytes)?;
        let secret = Self::new(bytes);
        bytes.zeroize();
        Ok(secret)
    }

    /// Raw key bytes, for handing to the cipher or MAC.
    #[must_use]
    pub const fn expose(&self) -> &[u8; N] {
        &self.bytes
    }
}

impl<const N: usize> Clone for SecretBytes<N> {
    fn clone(&self) -> Self {
        Self::new(self.bytes)
    }
}

impl<const N: usize> fmt::Debug for SecretBytes<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SecretBytes<{N}>(***)")
    }
}

impl<const N: usize> fmt::Display for SecretBytes<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SecretBytes<{N}>(***)")
    }
}

// ---------------------------------------------------------------------------
// Platform-specific implementations
// ---------------------------------------------------------------------------

#[cfg(unix)]
mod platform {
    pub(super) fn try_mlock(ptr: *const u8, len: usize) -> bool {
        if len == 0 {
            return true;
        }
        // SAFETY: mlock accepts any pointer/length pair; an invalid range
        // yields ENOMEM, which we report as "not locked".
        unsafe { libc::mlock(ptr.cast(), len) == 0 }
    }

    pub(super) fn try_munlock(ptr: *const u8, len: usize) {
        if len == 0 {
            return;
        }
        // SAFETY: munlock on a stale or unlocked range is a harmless no-op.
        unsafe {
            libc::munlock(ptr.cast(), len);
        }
    }
}

#[cfg(not(unix))]
mod platform {
    pub(super) fn try_mlock(_ptr: *const u8, _len: usize) -> bool {
        false
    }

    pub(super) fn try_munlock(_ptr: *const u8, _len: usize) {}
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
