//! Golden digest vectors.
//!
//! Certificate digests are Keccak-256 over the raw file bytes, so they must
//! match what the registry contract and any other client compute.

use certledger_core::digest;

/// A golden digest vector.
#[derive(Debug, Clone)]
pub struct GoldenVector {
    /// Human-readable name for the vector.
    pub name: &'static str,
    /// Certificate bytes.
    pub input: &'static [u8],
    /// Expected digest, `0x`-prefixed lowercase hex.
    pub expected_digest: &'static str,
}

/// Get all golden vectors.
pub fn all_vectors() -> Vec<GoldenVector> {
    vec![
        GoldenVector {
            name: "empty file",
            input: b"",
            expected_digest: "0xc5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470",
        },
        GoldenVector {
            name: "abc",
            input: b"abc",
            expected_digest: "0x4e03657aea45a94fc7d47ba826c8d667c0d1e6e33a64a036ec44f58fa12d6c45",
        },
        GoldenVector {
            name: "quick brown fox",
            input: b"The quick brown fox jumps over the lazy dog",
            expected_digest: "0x4d741b6f1eb29cb2a9b9911c82f56fa8d73b04959d3d9d222895df6c0b28aa15",
        },
    ]
}

/// Check every vector, returning `(name, matches, computed_hex)`.
pub fn verify_all_vectors() -> Vec<(String, bool, String)> {
    all_vectors()
        .iter()
        .map(|v| {
            let hex = digest(v.input).to_hex();
            (v.name.to_string(), hex == v.expected_digest, hex)
        })
        .collect()
}
