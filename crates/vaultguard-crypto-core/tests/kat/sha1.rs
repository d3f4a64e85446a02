//! FIPS 180: SHA-1 test vectors (breach lookup digest).

use vaultguard_crypto_core::digest::sha1_hex;

#[test]
fn fips_180_abc() {
    assert_eq!(sha1_hex(b"abc"), "A9993E364706816ABA3E25717850C26C9CD0D89D");
}

#[test]
fn fips_180_two_block_message() {
    assert_eq!(
        sha1_hex(b"abcdbcdecdefdefgefghfghighijhijkijkljklmklmnlmnomnopnopq"),
        "84983E441C3BD26EBAAE4AA1F95129E5E54670F1"
    );
}

#[test]
fn breach_range_prefix_of_password() {
    let hex = sha1_hex(b"password");
    assert_eq!(&hex[..5], "5BAA6");
    assert_eq!(&hex[5..], "1E4C9B93F3F0682250B6CF8331B7EE68FD8");
}
