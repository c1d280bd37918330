//! Classification of JSON-RPC failures into ledger error kinds.
//!
//! Duplicate detection prefers structured signals: the decoded
//! `Error(string)` revert payload first, the error message last. The
//! RPC ledger additionally re-checks `exists` after any other revert, so a
//! reworded contract message cannot turn a lost race into a hard failure.

use certledger_core::CertificateDigest;
use serde::Deserialize;
use serde_json::Value;

use crate::abi;
use crate::error::LedgerError;

/// Revert reasons that mean "this digest is already on the ledger".
pub const DEFAULT_DUPLICATE_MARKERS: &[&str] = &["already registered", "already exists"];

/// Geth and most nodes use code 3 for `execution reverted`.
const EXECUTION_REVERTED: i64 = 3;

/// A JSON-RPC error object.
#[derive(Debug, Clone, Deserialize)]
pub struct RpcErrorObject {
    pub code: i64,
    pub message: String,
    #[serde(default)]
    pub data: Option<Value>,
}

impl RpcErrorObject {
    /// The revert reason carried in `data`, if any.
    ///
    /// Nodes disagree on placement: some put the payload directly in
    /// `data`, others nest it as `data.data`.
    pub fn revert_reason(&self) -> Option<String> {
        let payload = match self.data.as_ref()? {
            Value::String(s) => s.as_str(),
            Value::Object(map) => map.get("data")?.as_str()?,
            _ => return None,
        };
        let bytes = abi::from_hex_data(payload).ok()?;
        abi::decode_revert_reason(&bytes)
    }

    /// Whether the node reports an execution revert.
    pub fn is_revert(&self) -> bool {
        self.code == EXECUTION_REVERTED || self.message.to_lowercase().contains("revert")
    }
}

/// Whether `text` carries one of the duplicate markers.
pub fn matches_duplicate(text: &str, markers: &[String]) -> bool {
    let lower = text.to_lowercase();
    markers.iter().any(|m| lower.contains(&m.to_lowercase()))
}

/// Map a submission failure to a ledger error.
pub fn classify_submission(
    err: &RpcErrorObject,
    digest: &CertificateDigest,
    markers: &[String],
) -> LedgerError {
    let reason = err.revert_reason();

    if let Some(reason) = &reason {
        if matches_duplicate(reason, markers) {
            return LedgerError::DuplicateRegistration(*digest);
        }
    }

    if err.is_revert() {
        return LedgerError::Reverted(reason.unwrap_or_else(|| err.message.clone()));
    }

    if matches_duplicate(&err.message, markers) {
        return LedgerError::DuplicateRegistration(*digest);
    }

    LedgerError::Rpc {
        code: err.code,
        message: err.message.clone(),
    }
}

/// Map a read failure to a ledger error.
pub fn classify_read(err: &RpcErrorObject) -> LedgerError {
    LedgerError::Rpc {
        code: err.code,
        message: err.message.clone(),
    }
}
