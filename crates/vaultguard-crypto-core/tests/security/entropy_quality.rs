//! Entropy checks on CSPRNG-backed outputs of the engine.
//!
//! Shannon entropy of truly random bytes approaches 8 bits/byte only for
//! large samples, so each threshold is set well below the expected value
//! for its sample size. The checks catch degenerate output (zeros, repeats),
//! not subtle bias.

use std::collections::HashSet;

use vaultguard_crypto_core::CryptoEngine;

/// H = -Σ p(x) log2 p(x) over byte values, in bits per byte.
#[allow(clippy::cast_precision_loss)]
fn shannon_entropy(data: &[u8]) -> f64 {
    if data.is_empty() {
        return 0.0;
    }
    let mut freq = [0u64; 256];
    for &b in data {
        freq[b as usize] = freq[b as usize].saturating_add(1);
    }
    let len = data.len() as f64;
    freq.iter()
        .filter(|&&f| f > 0)
        .map(|&f| {
            let p = f as f64 / len;
            -p * p.log2()
        })
        .sum()
}

#[test]
fn random_bytes_64kb_entropy() {
    let bytes = CryptoEngine::default().secure_random_bytes(65_536).unwrap();
    let entropy = shannon_entropy(&bytes);
    assert!(entropy > 7.99, "entropy too low: {entropy:.4}");
}

#[test]
fn random_bytes_1kb_entropy() {
    let bytes = CryptoEngine::default().secure_random_bytes(1_024).unwrap();
    let entropy = shannon_entropy(&bytes);
    assert!(entropy > 7.5, "entropy too low: {entropy:.4}");
}

/// 16 bytes per salt is too small to measure alone; pool 64 of them.
#[test]
fn pooled_salts_entropy() {
    let engine = CryptoEngine::default();
    let mut pool = Vec::with_capacity(1_024);
    for _ in 0..64 {
        pool.extend_from_slice(&engine.generate_salt().unwrap());
    }
    let entropy = shannon_entropy(&pool);
    assert!(entropy > 7.5, "entropy too low: {entropy:.4}");
}

#[test]
fn salts_never_repeat() {
    let engine = CryptoEngine::default();
    let salts: HashSet<[u8; 16]> = (0..1_000).map(|_| engine.generate_salt().unwrap()).collect();
    assert_eq!(salts.len(), 1_000);
}

#[test]
fn ivs_never_repeat_under_one_key() {
    let engine = CryptoEngine::default().with_iterations(1_000);
    let keys = engine.derive_keys(b"passphrase", &[7u8; 16]).unwrap();
    let ivs: HashSet<[u8; 12]> = (0..1_000)
        .map(|_| engine.encrypt(b"{}", keys.encryption_key()).unwrap().iv)
        .collect();
    assert_eq!(ivs.len(), 1_000);
}
