//! Proptest generators for property-based testing.

use proptest::prelude::*;

use certledger_core::CertificateDigest;

/// Arbitrary certificate file contents, including empty files.
pub fn certificate_bytes(max_len: usize) -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 0..=max_len)
}

/// Two distinct certificate files.
pub fn distinct_certificates(max_len: usize) -> impl Strategy<Value = (Vec<u8>, Vec<u8>)> {
    (certificate_bytes(max_len), certificate_bytes(max_len)).prop_filter("distinct", |(a, b)| a != b)
}

/// Free-text metadata, sometimes blank.
pub fn metadata() -> impl Strategy<Value = String> {
    prop_oneof![
        Just(String::new()),
        Just("   ".to_string()),
        "[A-Za-z0-9 .,:-]{1,64}",
    ]
}

/// Generate a random digest.
pub fn certificate_digest() -> impl Strategy<Value = CertificateDigest> {
    any::<[u8; 32]>().prop_map(CertificateDigest::from_bytes)
}
