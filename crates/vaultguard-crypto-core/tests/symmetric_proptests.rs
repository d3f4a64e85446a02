#![allow(clippy::unwrap_used, clippy::arithmetic_side_effects)]

//! Property-based tests for AES-256-GCM and encrypt-then-MAC.

use proptest::prelude::*;
use vaultguard_crypto_core::symmetric::{decrypt, encrypt, KEY_LEN};
use vaultguard_crypto_core::{mac, CryptoError, OsRandom, SecretBytes};

/// Fixed key for property tests.
const PROP_KEY: [u8; KEY_LEN] = [0xCC; KEY_LEN];

proptest! {
    /// Encrypt→decrypt roundtrip recovers any printable Unicode string.
    #[test]
    fn encrypt_decrypt_roundtrip_unicode(plaintext in "\\PC{0,512}") {
        let key = SecretBytes::new(PROP_KEY);
        let sealed = encrypt(plaintext.as_bytes(), &key, &OsRandom)
            .expect("encrypt should succeed");
        let decrypted = decrypt(&sealed, &key).expect("decrypt should succeed");
        prop_assert_eq!(decrypted.expose_str().unwrap(), plaintext.as_str());
    }

    /// Encrypt→decrypt roundtrip for arbitrary bytes.
    #[test]
    fn encrypt_decrypt_roundtrip_bytes(
        plaintext in proptest::collection::vec(any::<u8>(), 0..4096),
    ) {
        let key = SecretBytes::new(PROP_KEY);
        let sealed = encrypt(&plaintext, &key, &OsRandom).expect("encrypt should succeed");
        let decrypted = decrypt(&sealed, &key).expect("decrypt should succeed");
        prop_assert_eq!(decrypted.expose(), plaintext.as_slice());
    }

    /// Flipping any single ciphertext bit fails the HMAC before decryption
    /// is ever attempted, and also fails decryption on its own.
    #[test]
    fn single_bit_flip_detected(
        plaintext in proptest::collection::vec(any::<u8>(), 1..256),
        bit in any::<prop::sample::Index>(),
    ) {
        let enc_key = SecretBytes::new(PROP_KEY);
        let mac_key = SecretBytes::new([0x5A; KEY_LEN]);

        let mut sealed = encrypt(&plaintext, &enc_key, &OsRandom).unwrap();
        let tag = mac::sign(&sealed.ciphertext, &mac_key);

        let total_bits = sealed.ciphertext.len() * 8;
        let flip = bit.index(total_bits);
        sealed.ciphertext[flip / 8] ^= 1 << (flip % 8);

        prop_assert!(!mac::verify(&sealed.ciphertext, &tag, &mac_key));
        prop_assert!(matches!(decrypt(&sealed, &enc_key), Err(CryptoError::Decryption)));
    }
}
