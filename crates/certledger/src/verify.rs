//! Verification: does the ledger know this certificate?

use std::sync::Arc;

use certledger_client::Ledger;
use certledger_core::{digest, CertificateDigest, LedgerRecord};
use chrono::{DateTime, Utc};

use crate::error::Result;

/// Outcome of a verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationResult {
    /// Digest of the submitted bytes.
    pub digest: CertificateDigest,
    /// Whether the ledger holds a record for it.
    pub valid: bool,
    /// Human-readable registration details, when enrichment succeeded.
    pub registration_info: Option<String>,
    /// Whether the answer came from the simulated ledger.
    pub simulated: bool,
}

impl VerificationResult {
    /// Caller-facing message.
    pub fn message(&self) -> &'static str {
        match (self.valid, self.simulated) {
            (true, false) => "Certificate has been successfully verified on the blockchain.",
            (false, false) => "Certificate is not valid or not found on the blockchain.",
            (true, true) => "Certificate is valid (Simulated)",
            (false, true) => "Certificate is invalid (Simulated)",
        }
    }
}

/// Verification orchestrator.
///
/// Read-only and safe to retry. Concurrent calls share nothing but the
/// ledger handle.
#[derive(Clone)]
pub struct Verifier {
    ledger: Arc<dyn Ledger>,
}

impl Verifier {
    /// Create a verifier over the given ledger.
    pub fn new(ledger: Arc<dyn Ledger>) -> Self {
        Self { ledger }
    }

    /// Verify certificate bytes.
    pub async fn verify(&self, bytes: &[u8]) -> Result<VerificationResult> {
        self.verify_digest(digest(bytes)).await
    }

    /// Verify an already computed digest.
    ///
    /// Only the existence check can fail the call. Enrichment is
    /// best-effort: a failed record lookup is logged and dropped.
    pub async fn verify_digest(&self, digest: CertificateDigest) -> Result<VerificationResult> {
        let simulated = self.ledger.is_simulated();
        if simulated {
            tracing::warn!(hash = %digest, "no ledger configured, simulating verification");
        }

        let valid = self.ledger.exists(&digest).await.map_err(|e| {
            tracing::error!(hash = %digest, error = %e, "existence check failed");
            e
        })?;

        let registration_info = if valid {
            match self.ledger.get_record(&digest).await {
                Ok(record) => record.as_ref().map(describe_registration),
                Err(e) => {
                    tracing::warn!(hash = %digest, error = %e, "registration lookup failed");
                    None
                }
            }
        } else {
            None
        };

        tracing::info!(hash = %digest, valid, simulated, "verification complete");
        Ok(VerificationResult {
            digest,
            valid,
            registration_info,
            simulated,
        })
    }
}

/// Render a ledger record for humans.
///
/// `Registered on 2024-05-01 12:00:00 UTC by 0x… (metadata)`
pub fn describe_registration(record: &LedgerRecord) -> String {
    let when = i64::try_from(record.timestamp)
        .ok()
        .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0))
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| format!("unix time {}", record.timestamp));

    let mut info = format!("Registered on {when} by {}", record.registrar);
    if !record.metadata.is_empty() {
        info.push_str(&format!(" ({})", record.metadata));
    }
    info
}

#[cfg(test)]
mod tests {
    use super::*;
    use certledger_client::{ErrorKind, MemoryLedger, SimulatedLedger};
    use certledger_core::Address;
    use std::time::Duration;

    fn record(metadata: &str) -> LedgerRecord {
        LedgerRecord {
            registrar: Address::from_bytes([0x42; 20]),
            timestamp: 1_714_564_800,
            metadata: metadata.to_string(),
            exists: true,
        }
    }

    #[test]
    fn test_describe_registration() {
        assert_eq!(
            describe_registration(&record("")),
            format!(
                "Registered on 2024-05-01 12:00:00 UTC by 0x{}",
                "42".repeat(20)
            )
        );
        assert!(describe_registration(&record("BSc 2024")).ends_with(" (BSc 2024)"));
    }

    proptest::proptest! {
        #[test]
        fn prop_describe_any_timestamp(timestamp in proptest::prelude::any::<u64>(), metadata in ".{0,32}") {
            let info = describe_registration(&LedgerRecord {
                registrar: Address::from_bytes([0x42; 20]),
                timestamp,
                metadata: metadata.clone(),
                exists: true,
            });
            proptest::prop_assert!(info.starts_with("Registered on "));
            proptest::prop_assert!(info.contains(&"42".repeat(20)));
            proptest::prop_assert_eq!(metadata.is_empty(), !info.ends_with(')'));
        }
    }

    #[tokio::test]
    async fn test_unknown_certificate() {
        let verifier = Verifier::new(Arc::new(MemoryLedger::new()));
        let result = verifier.verify(b"").await.unwrap();

        assert!(!result.valid);
        assert!(!result.simulated);
        assert_eq!(result.digest, digest(b""));
        assert!(result.registration_info.is_none());
    }

    #[tokio::test]
    async fn test_known_certificate_enriched() {
        let ledger = Arc::new(MemoryLedger::new());
        ledger.insert_record(digest(b"cert"), record("BSc 2024")).await;

        let result = Verifier::new(ledger).verify(b"cert").await.unwrap();
        assert!(result.valid);
        assert!(result
            .registration_info
            .unwrap()
            .starts_with("Registered on 2024-05-01"));
    }

    #[tokio::test]
    async fn test_enrichment_failure_is_swallowed() {
        let ledger = Arc::new(MemoryLedger::new());
        ledger.insert_record(digest(b"cert"), record("")).await;
        ledger.set_record_lookups_unavailable(true).await;

        let result = Verifier::new(ledger).verify(b"cert").await.unwrap();
        assert!(result.valid);
        assert!(result.registration_info.is_none());
    }

    #[tokio::test]
    async fn test_unavailable_ledger_is_an_error() {
        let ledger = Arc::new(MemoryLedger::new());
        ledger.set_reads_unavailable(true).await;

        let err = Verifier::new(ledger).verify(b"cert").await.unwrap_err();
        match err {
            crate::EngineError::Ledger(e) => assert_eq!(e.kind(), ErrorKind::Unavailable),
            other => panic!("expected ledger error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_simulated_is_labelled() {
        let verifier = Verifier::new(Arc::new(SimulatedLedger::with_seed(3, Duration::ZERO)));
        let result = verifier.verify(b"anything").await.unwrap();

        assert!(result.simulated);
        assert!(result.message().ends_with("(Simulated)"));
        assert!(result.registration_info.is_none());
    }
}
