//! Content hashing: certificate bytes to a fixed-width identity.
//!
//! The digest is Keccak-256 over the raw file bytes, with no salt and no
//! framing. It is the same function the ledger contract uses for its
//! `bytes32` keys, so a digest computed here can be passed to the contract
//! directly.

use serde::{Deserialize, Serialize};
use sha3::{Digest, Keccak256};
use std::fmt;
use std::str::FromStr;

use crate::error::{decode_fixed, CoreError};

/// A 32-byte certificate digest, computed as Keccak256(file_bytes).
///
/// This is the only notion of certificate identity: byte-identical files
/// have the same digest and are indistinguishable.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CertificateDigest(pub [u8; 32]);

impl CertificateDigest {
    /// Hash the given bytes.
    pub fn of(bytes: &[u8]) -> Self {
        let out = Keccak256::digest(bytes);
        let mut arr = [0u8; 32];
        arr.copy_from_slice(&out);
        Self(arr)
    }

    /// Create from raw bytes.
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Lowercase hex with a `0x` prefix.
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }

    /// Parse from hex, with or without `0x`.
    pub fn from_hex(s: &str) -> Result<Self, CoreError> {
        decode_fixed(s).map(Self)
    }
}

/// Compute the digest of a certificate file.
///
/// Total over all inputs, including the empty slice.
pub fn digest(bytes: &[u8]) -> CertificateDigest {
    CertificateDigest::of(bytes)
}

impl fmt::Debug for CertificateDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CertificateDigest({})", &self.to_hex()[..18])
    }
}

impl fmt::Display for CertificateDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for CertificateDigest {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl AsRef<[u8]> for CertificateDigest {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<[u8; 32]> for CertificateDigest {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}
