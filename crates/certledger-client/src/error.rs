//! Error types for ledger operations.

use certledger_core::CertificateDigest;
use thiserror::Error;

/// The coarse category of a ledger failure.
///
/// Orchestration branches on this, never on error text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The ledger already holds a record for the digest.
    DuplicateRegistration,
    /// A write was requested without write credentials.
    NoSignerConfigured,
    /// The ledger endpoint could not be reached.
    Unavailable,
    /// The ledger rejected the write.
    Reverted,
    /// Anything else.
    Unknown,
}

/// Errors that can occur during ledger operations.
#[derive(Debug, Clone, Error)]
pub enum LedgerError {
    /// The digest is already registered.
    #[error("certificate {0} is already registered")]
    DuplicateRegistration(CertificateDigest),

    /// No write signer is configured.
    #[error("no write signer configured")]
    NoSignerConfigured,

    /// Endpoint unreachable or transport failure.
    #[error("ledger unavailable: {0}")]
    Unavailable(String),

    /// The ledger rejected the transaction.
    #[error("transaction reverted: {0}")]
    Reverted(String),

    /// JSON-RPC error object that is not a revert.
    #[error("rpc error {code}: {message}")]
    Rpc { code: i64, message: String },

    /// The ledger answered with something we cannot decode.
    #[error("invalid ledger response: {0}")]
    InvalidResponse(String),
}

impl LedgerError {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            LedgerError::DuplicateRegistration(_) => ErrorKind::DuplicateRegistration,
            LedgerError::NoSignerConfigured => ErrorKind::NoSignerConfigured,
            LedgerError::Unavailable(_) => ErrorKind::Unavailable,
            LedgerError::Reverted(_) => ErrorKind::Reverted,
            LedgerError::Rpc { .. } | LedgerError::InvalidResponse(_) => ErrorKind::Unknown,
        }
    }

    /// Whether this is a lost registration race or a repeat registration.
    pub fn is_duplicate(&self) -> bool {
        self.kind() == ErrorKind::DuplicateRegistration
    }
}

impl From<reqwest::Error> for LedgerError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            LedgerError::InvalidResponse(e.to_string())
        } else {
            LedgerError::Unavailable(e.to_string())
        }
    }
}

/// Result type for ledger operations.
pub type Result<T> = std::result::Result<T, LedgerError>;

#[cfg(test)]
mod tests {
    use super::*;
    use certledger_core::digest;

    #[test]
    fn test_kinds() {
        let d = digest(b"x");
        assert_eq!(
            LedgerError::DuplicateRegistration(d).kind(),
            ErrorKind::DuplicateRegistration
        );
        assert_eq!(
            LedgerError::Unavailable("down".into()).kind(),
            ErrorKind::Unavailable
        );
        assert_eq!(
            LedgerError::Rpc {
                code: -32000,
                message: "insufficient funds".into()
            }
            .kind(),
            ErrorKind::Unknown
        );
        assert!(LedgerError::DuplicateRegistration(d).is_duplicate());
        assert!(!LedgerError::Reverted("nope".into()).is_duplicate());
    }

    #[test]
    fn test_display_includes_digest() {
        let d = digest(b"");
        let msg = LedgerError::DuplicateRegistration(d).to_string();
        assert!(msg.contains("0xc5d2460186f7233c"));
    }
}
