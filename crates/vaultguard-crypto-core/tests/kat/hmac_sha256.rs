//! RFC 4231: HMAC-SHA256 test vectors.

use data_encoding::HEXLOWER;
use ring::hmac;
use vaultguard_crypto_core::{mac, SecretBytes};

/// RFC 4231 Test Case 2: short key ("Jefe"), checked against `ring` directly
/// because the vault only ever uses 32-byte keys.
#[test]
fn rfc4231_test_case_2() {
    let key = hmac::Key::new(hmac::HMAC_SHA256, b"Jefe");
    let tag = hmac::sign(&key, b"what do ya want for nothing?");
    assert_eq!(
        HEXLOWER.encode(tag.as_ref()),
        "5bdcc146bf60754e6a042426089575c75a003f089d2739839dec58b964ec3843"
    );
}

/// RFC 4231 Test Case 6 style check with a 32-byte key through our wrapper:
/// the wrapper must agree with `ring` for any key it accepts.
#[test]
fn wrapper_matches_ring_for_32_byte_key() {
    let raw = [0xaa; 32];
    let data = b"Test Using Larger Than Block-Size Key - Hash Key First";
    let ours = mac::sign(data, &SecretBytes::new(raw));
    let reference = hmac::sign(&hmac::Key::new(hmac::HMAC_SHA256, &raw), data);
    assert_eq!(ours.as_slice(), reference.as_ref());
    assert!(mac::verify(data, &ours, &SecretBytes::new(raw)));
}
