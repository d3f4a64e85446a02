//! NIST SP 800-38D: AES-256-GCM Known-Answer Test vectors.

use vaultguard_crypto_core::symmetric::{decrypt, SealedData, TAG_LEN};
use vaultguard_crypto_core::SecretBytes;

/// NIST SP 800-38D Test Case 14: AES-256-GCM, zero key, zero IV,
/// 16 zero bytes of plaintext, no AAD.
///
/// CT:  cea7403d4d606b6e074ec5d3baf39d18
/// Tag: d0d1c8a799996bf0265b98b5d48ab919
#[test]
fn nist_test_case_14_decrypts_through_wrapper() {
    let ciphertext_and_tag: Vec<u8> = [
        0xce, 0xa7, 0x40, 0x3d, 0x4d, 0x60, 0x6b, 0x6e, 0x07, 0x4e, 0xc5, 0xd3, 0xba, 0xf3, 0x9d,
        0x18, 0xd0, 0xd1, 0xc8, 0xa7, 0x99, 0x99, 0x6b, 0xf0, 0x26, 0x5b, 0x98, 0xb5, 0xd4, 0x8a,
        0xb9, 0x19,
    ]
    .to_vec();
    assert_eq!(ciphertext_and_tag.len(), 16 + TAG_LEN);

    let sealed = SealedData::from_parts(&[0u8; 12], ciphertext_and_tag).unwrap();
    let plaintext = decrypt(&sealed, &SecretBytes::new([0u8; 32])).unwrap();
    assert_eq!(plaintext.expose(), &[0u8; 16]);
}

/// NIST SP 800-38D Test Case 13: empty plaintext, tag only.
///
/// Tag: 530f8afbc74536b9a963b4f1c4cb738b
#[test]
fn nist_test_case_13_empty_plaintext() {
    let tag = vec![
        0x53, 0x0f, 0x8a, 0xfb, 0xc7, 0x45, 0x36, 0xb9, 0xa9, 0x63, 0xb4, 0xf1, 0xc4, 0xcb, 0x73,
        0x8b,
    ];
    let sealed = SealedData::from_parts(&[0u8; 12], tag).unwrap();
    let plaintext = decrypt(&sealed, &SecretBytes::new([0u8; 32])).unwrap();
    assert!(plaintext.is_empty());
}
