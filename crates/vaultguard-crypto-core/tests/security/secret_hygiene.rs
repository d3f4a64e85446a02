//! Key material stays out of formatted output, and tampered or mis-keyed
//! ciphertext never decrypts.

use vaultguard_crypto_core::{CryptoEngine, CryptoError, SecretBytes};

fn engine() -> CryptoEngine {
    CryptoEngine::default().with_iterations(1_000)
}

#[test]
fn derived_keys_do_not_format() {
    let keys = engine().derive_keys(b"hunter2", &[1u8; 16]).unwrap();
    assert_eq!(format!("{keys:?}"), "VaultKeys(***)");
    assert_eq!(format!("{:?}", keys.encryption_key()), "SecretBytes<32>(***)");
    assert_eq!(format!("{}", keys.mac_key()), "SecretBytes<32>(***)");
}

#[test]
fn decrypted_plaintext_does_not_format() {
    let engine = engine();
    let keys = engine.derive_keys(b"hunter2", &[1u8; 16]).unwrap();
    let sealed = engine.encrypt(b"top secret", keys.encryption_key()).unwrap();
    let plain = engine.decrypt(&sealed, keys.encryption_key()).unwrap();
    assert!(!format!("{plain:?}").contains("top secret"));
    assert_eq!(plain.expose(), b"top secret");
}

#[test]
fn wrong_key_is_rejected() {
    let engine = engine();
    let keys = engine.derive_keys(b"hunter2", &[1u8; 16]).unwrap();
    let sealed = engine.encrypt(b"payload", keys.encryption_key()).unwrap();
    let other = SecretBytes::new([0x5A; 32]);
    assert!(matches!(
        engine.decrypt(&sealed, &other),
        Err(CryptoError::Decryption)
    ));
}

#[test]
fn every_flipped_ciphertext_bit_is_rejected() {
    let engine = engine();
    let keys = engine.derive_keys(b"hunter2", &[1u8; 16]).unwrap();
    let sealed = engine.encrypt(b"payload", keys.encryption_key()).unwrap();

    for byte in 0..sealed.ciphertext.len() {
        let mut tampered = sealed.clone();
        tampered.ciphertext[byte] ^= 0x01;
        assert!(
            engine.decrypt(&tampered, keys.encryption_key()).is_err(),
            "bit flip in byte {byte} went undetected"
        );
    }
}

#[test]
fn hmac_rejects_truncated_and_altered_tags() {
    let engine = engine();
    let keys = engine.derive_keys(b"hunter2", &[1u8; 16]).unwrap();
    let tag = engine.generate_hmac(b"record", keys.mac_key());

    assert!(engine.verify_hmac(b"record", &tag, keys.mac_key()));
    assert!(!engine.verify_hmac(b"record", &tag[..16], keys.mac_key()));
    assert!(!engine.verify_hmac(b"Record", &tag, keys.mac_key()));

    let mut altered = tag;
    altered[31] ^= 0x80;
    assert!(!engine.verify_hmac(b"record", &altered, keys.mac_key()));
}
