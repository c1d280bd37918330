//! Registration: check, submit or fall back, confirm.
//!
//! One [`Registrar::register`] call drives one attempt through
//!
//! ```text
//! Start → Checking ─┬─ AlreadyRegistered
//!                   ├─ NoSignerFallback
//!                   └─ Submitting ─┬─ FailedFallback
//!                                  ├─ AlreadyRegistered   (lost race)
//!                                  └─ Confirming ─┬─ Confirmed
//!                                                 ├─ TimedOut
//!                                                 ├─ AlreadyRegistered (lost race)
//!                                                 └─ FailedFallback
//! ```
//!
//! Only a failed pre-check surfaces as an error. Every later failure is
//! folded into the outcome, because once a transaction may have been
//! submitted the caller needs its reference, not an error.

use std::sync::Arc;
use std::time::Duration;

use certledger_client::abi::{REGISTER_FUNCTION, REGISTER_PARAMS};
use certledger_client::{Confirmation, Ledger};
use certledger_core::{digest, CertificateDigest, TxHash, TxReceipt};
use chrono::{DateTime, Local};

use crate::error::Result;
use crate::verify::describe_registration;

/// Shown in place of a contract address when no ledger is configured.
pub const PLACEHOLDER_CONTRACT: &str = "0x... (placeholder: no ledger configured)";

/// States of a registration attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegistrationState {
    Start,
    Checking,
    Submitting,
    Confirming,
    AlreadyRegistered,
    NoSignerFallback,
    FailedFallback,
    Confirmed,
    TimedOut,
}

impl RegistrationState {
    /// Whether the attempt ends in this state.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            RegistrationState::AlreadyRegistered
                | RegistrationState::NoSignerFallback
                | RegistrationState::FailedFallback
                | RegistrationState::Confirmed
                | RegistrationState::TimedOut
        )
    }
}

/// Everything a credentialed signer needs to finish a registration by hand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManualInstructions {
    /// Contract to call (or a placeholder in degraded mode).
    pub contract_address: String,
    /// Network the contract lives on.
    pub network_id: u64,
    /// Digest to pass as `_certificateHash`.
    pub digest: CertificateDigest,
    /// Metadata to pass as `_metadata`.
    pub metadata: String,
}

impl ManualInstructions {
    /// Step 1: where.
    pub fn step1(&self) -> String {
        format!(
            "Open the certificate registry contract at {} on network {} (for example through a block explorer's write interface).",
            self.contract_address, self.network_id
        )
    }

    /// Step 2: who.
    pub fn step2(&self) -> String {
        "Connect a wallet that is authorized to register certificates.".to_string()
    }

    /// Step 3: what.
    pub fn step3(&self) -> String {
        format!(
            "Call {REGISTER_FUNCTION}({REGISTER_PARAMS}) with _certificateHash = {} and _metadata = \"{}\".",
            self.digest, self.metadata
        )
    }
}

/// Terminal outcome of a registration attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrationOutcome {
    /// The ledger already holds a record. No write happened (or ours lost).
    AlreadyRegistered,
    /// Our write was confirmed.
    Confirmed {
        receipt: TxReceipt,
        /// Ledger-recorded registration details, best-effort.
        registration_info: Option<String>,
    },
    /// No signer: the digest is attested, registration is left to a human.
    NoSignerFallback(ManualInstructions),
    /// Automatic registration was tried and failed.
    FailedFallback {
        instructions: ManualInstructions,
        reason: String,
    },
    /// Submitted but not confirmed in time. Not retried, not cancelled.
    TimedOut { tx_hash: TxHash },
}

impl RegistrationOutcome {
    /// The terminal state this outcome corresponds to.
    pub fn state(&self) -> RegistrationState {
        match self {
            RegistrationOutcome::AlreadyRegistered => RegistrationState::AlreadyRegistered,
            RegistrationOutcome::Confirmed { .. } => RegistrationState::Confirmed,
            RegistrationOutcome::NoSignerFallback(_) => RegistrationState::NoSignerFallback,
            RegistrationOutcome::FailedFallback { .. } => RegistrationState::FailedFallback,
            RegistrationOutcome::TimedOut { .. } => RegistrationState::TimedOut,
        }
    }

    /// Caller-facing success flag. Only `AlreadyRegistered` is negative.
    pub fn is_success(&self) -> bool {
        !matches!(self, RegistrationOutcome::AlreadyRegistered)
    }
}

/// Record of one registration attempt. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationAttempt {
    pub digest: CertificateDigest,
    /// Metadata as submitted (after defaulting).
    pub metadata: String,
    /// Set once a transaction was accepted for submission.
    pub submitted_tx: Option<TxHash>,
    /// Set once the transaction was confirmed.
    pub confirmed_block: Option<u64>,
    pub outcome: RegistrationOutcome,
    /// Whether the ledger was simulated.
    pub simulated: bool,
}

/// Registration orchestrator.
#[derive(Clone)]
pub struct Registrar {
    ledger: Arc<dyn Ledger>,
    confirmation_timeout: Duration,
    network_id: u64,
}

impl Registrar {
    /// Create a registrar over the given ledger.
    pub fn new(ledger: Arc<dyn Ledger>, confirmation_timeout: Duration, network_id: u64) -> Self {
        Self {
            ledger,
            confirmation_timeout,
            network_id,
        }
    }

    /// Register certificate bytes.
    ///
    /// Blank or missing metadata is replaced by [`default_metadata`].
    /// Anything else is submitted exactly as given.
    pub async fn register(
        &self,
        bytes: &[u8],
        metadata: Option<&str>,
    ) -> Result<RegistrationAttempt> {
        let metadata = match metadata {
            Some(m) if !m.trim().is_empty() => m.to_string(),
            _ => default_metadata(Local::now()),
        };
        self.register_digest(digest(bytes), metadata).await
    }

    /// Drive one attempt for an already computed digest.
    pub async fn register_digest(
        &self,
        digest: CertificateDigest,
        metadata: String,
    ) -> Result<RegistrationAttempt> {
        let mut state = RegistrationState::Start;
        let mut attempt = RegistrationAttempt {
            digest,
            metadata,
            submitted_tx: None,
            confirmed_block: None,
            outcome: RegistrationOutcome::AlreadyRegistered,
            simulated: self.ledger.is_simulated(),
        };

        // Simulated existence answers never attest to a registration.
        if attempt.simulated && self.ledger.signer().is_none() {
            let instructions = self.instructions(&attempt);
            return Ok(self.finish(attempt, RegistrationOutcome::NoSignerFallback(instructions)));
        }

        advance(&mut state, RegistrationState::Checking, &digest);
        let exists = self.ledger.exists(&digest).await.map_err(|e| {
            tracing::error!(hash = %digest, error = %e, "pre-registration check failed");
            e
        })?;

        if exists {
            return Ok(self.finish(attempt, RegistrationOutcome::AlreadyRegistered));
        }

        if self.ledger.signer().is_none() {
            let instructions = self.instructions(&attempt);
            return Ok(self.finish(attempt, RegistrationOutcome::NoSignerFallback(instructions)));
        }

        advance(&mut state, RegistrationState::Submitting, &digest);
        let pending = match self.ledger.register(&digest, &attempt.metadata).await {
            Ok(pending) => pending,
            Err(e) if e.is_duplicate() => {
                tracing::info!(hash = %digest, "lost registration race at submission");
                return Ok(self.finish(attempt, RegistrationOutcome::AlreadyRegistered));
            }
            Err(e) => return Ok(self.fall_back(attempt, e.to_string())),
        };
        attempt.submitted_tx = Some(pending.tx_hash);

        advance(&mut state, RegistrationState::Confirming, &digest);
        let outcome = match self
            .ledger
            .await_confirmation(&pending, self.confirmation_timeout)
            .await
        {
            Ok(Confirmation::Confirmed(receipt)) => {
                attempt.confirmed_block = Some(receipt.block_number);
                RegistrationOutcome::Confirmed {
                    receipt,
                    registration_info: self.recorded_registration(&digest).await,
                }
            }
            Ok(Confirmation::TimedOut) => RegistrationOutcome::TimedOut {
                tx_hash: pending.tx_hash,
            },
            Ok(Confirmation::Reverted(reason)) => {
                return Ok(self.fall_back(attempt, reason));
            }
            Err(e) if e.is_duplicate() => {
                tracing::info!(hash = %digest, tx = %pending.tx_hash, "lost registration race at confirmation");
                RegistrationOutcome::AlreadyRegistered
            }
            Err(e) => {
                // Submitted, fate unknown: report the reference rather than fail.
                tracing::warn!(hash = %digest, tx = %pending.tx_hash, error = %e, "confirmation wait failed");
                RegistrationOutcome::TimedOut {
                    tx_hash: pending.tx_hash,
                }
            }
        };

        Ok(self.finish(attempt, outcome))
    }

    fn instructions(&self, attempt: &RegistrationAttempt) -> ManualInstructions {
        ManualInstructions {
            contract_address: self
                .ledger
                .contract_address()
                .map(|a| a.to_hex())
                .unwrap_or_else(|| PLACEHOLDER_CONTRACT.to_string()),
            network_id: self.network_id,
            digest: attempt.digest,
            metadata: attempt.metadata.clone(),
        }
    }

    fn fall_back(&self, attempt: RegistrationAttempt, reason: String) -> RegistrationAttempt {
        tracing::warn!(hash = %attempt.digest, reason = %reason, "automatic registration failed, falling back");
        let instructions = self.instructions(&attempt);
        self.finish(
            attempt,
            RegistrationOutcome::FailedFallback {
                instructions,
                reason,
            },
        )
    }

    fn finish(
        &self,
        mut attempt: RegistrationAttempt,
        outcome: RegistrationOutcome,
    ) -> RegistrationAttempt {
        tracing::info!(
            hash = %attempt.digest,
            state = ?outcome.state(),
            tx = ?attempt.submitted_tx,
            "registration finished"
        );
        attempt.outcome = outcome;
        attempt
    }

    async fn recorded_registration(&self, digest: &CertificateDigest) -> Option<String> {
        match self.ledger.get_record(digest).await {
            Ok(record) => record.as_ref().map(describe_registration),
            Err(e) => {
                tracing::warn!(hash = %digest, error = %e, "registration lookup failed");
                None
            }
        }
    }
}

fn advance(state: &mut RegistrationState, next: RegistrationState, digest: &CertificateDigest) {
    tracing::debug!(hash = %digest, from = ?state, to = ?next, "registration state");
    *state = next;
}

/// Metadata used when the caller supplies none.
///
/// Convenience provenance only; the ledger's own timestamp is authoritative.
pub fn default_metadata(now: DateTime<Local>) -> String {
    format!(
        "Registered via certledger at {}",
        now.format("%Y-%m-%d %H:%M:%S %:z")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use certledger_client::memory::MEMORY_CONTRACT;
    use certledger_client::{LedgerError, MemoryLedger, SimulatedLedger};
    use certledger_core::Address;

    const SIGNER: Address = Address([0x11; 20]);

    fn registrar(ledger: Arc<MemoryLedger>) -> Registrar {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
        Registrar::new(ledger, Duration::from_secs(30), 80002)
    }

    #[tokio::test]
    async fn test_confirmed_with_default_metadata() {
        let ledger = Arc::new(MemoryLedger::with_signer(SIGNER));
        let attempt = registrar(ledger.clone())
            .register(b"abc", Some(""))
            .await
            .unwrap();

        assert_eq!(attempt.digest, digest(b"abc"));
        assert!(attempt.metadata.starts_with("Registered via certledger at "));
        assert_eq!(attempt.outcome.state(), RegistrationState::Confirmed);
        assert!(attempt.outcome.is_success());
        assert!(attempt.submitted_tx.is_some());
        assert_eq!(attempt.confirmed_block, Some(1));

        match &attempt.outcome {
            RegistrationOutcome::Confirmed {
                receipt,
                registration_info,
            } => {
                assert_eq!(Some(receipt.tx_hash), attempt.submitted_tx);
                assert!(registration_info.as_ref().unwrap().contains(&SIGNER.to_hex()));
            }
            other => panic!("expected Confirmed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_repeat_registration_does_not_submit() {
        let ledger = Arc::new(MemoryLedger::with_signer(SIGNER));
        let registrar = registrar(ledger.clone());

        registrar.register(b"abc", Some("first")).await.unwrap();
        let again = registrar.register(b"abc", Some("second")).await.unwrap();

        assert_eq!(again.outcome, RegistrationOutcome::AlreadyRegistered);
        assert!(!again.outcome.is_success());
        assert!(again.submitted_tx.is_none());
        assert_eq!(ledger.submission_count().await, 1);
    }

    #[tokio::test]
    async fn test_no_signer_falls_back_without_submitting() {
        let ledger = Arc::new(MemoryLedger::new());
        let attempt = registrar(ledger.clone())
            .register(b"abc", Some("BSc 2024"))
            .await
            .unwrap();

        match &attempt.outcome {
            RegistrationOutcome::NoSignerFallback(instructions) => {
                assert_eq!(instructions.contract_address, MEMORY_CONTRACT.to_hex());
                assert_eq!(instructions.digest, digest(b"abc"));
                assert_eq!(instructions.metadata, "BSc 2024");
                assert!(instructions.step3().contains("registerCertificate(bytes32 _certificateHash, string _metadata)"));
                assert!(instructions.step3().contains(&digest(b"abc").to_hex()));
                assert!(instructions.step1().contains("80002"));
            }
            other => panic!("expected NoSignerFallback, got {other:?}"),
        }
        assert!(attempt.outcome.is_success());
        assert_eq!(ledger.submission_count().await, 0);
    }

    #[tokio::test]
    async fn test_submission_failure_falls_back() {
        let ledger = Arc::new(MemoryLedger::with_signer(SIGNER));
        ledger
            .fail_submissions(Some(LedgerError::Unavailable("rpc down".into())))
            .await;

        let attempt = registrar(ledger).register(b"abc", None).await.unwrap();
        match &attempt.outcome {
            RegistrationOutcome::FailedFallback { reason, instructions } => {
                assert!(reason.contains("rpc down"));
                assert_eq!(instructions.digest, digest(b"abc"));
            }
            other => panic!("expected FailedFallback, got {other:?}"),
        }
        assert!(attempt.submitted_tx.is_none());
    }

    #[tokio::test]
    async fn test_duplicate_at_submission_is_already_registered() {
        let ledger = Arc::new(MemoryLedger::with_signer(SIGNER));
        ledger
            .fail_submissions(Some(LedgerError::DuplicateRegistration(digest(b"abc"))))
            .await;

        let attempt = registrar(ledger).register(b"abc", None).await.unwrap();
        assert_eq!(attempt.outcome, RegistrationOutcome::AlreadyRegistered);
    }

    #[tokio::test]
    async fn test_revert_at_confirmation_falls_back() {
        let ledger = Arc::new(MemoryLedger::with_signer(SIGNER));
        ledger.revert_confirmations(Some("Only owner".into())).await;

        let attempt = registrar(ledger).register(b"abc", None).await.unwrap();
        assert_eq!(attempt.outcome.state(), RegistrationState::FailedFallback);
        assert!(attempt.submitted_tx.is_some());
        assert!(attempt.confirmed_block.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_carries_reference() {
        let ledger = Arc::new(MemoryLedger::with_signer(SIGNER));
        ledger.stall_confirmations(true).await;

        let attempt = registrar(ledger.clone()).register(b"abc", None).await.unwrap();
        match attempt.outcome {
            RegistrationOutcome::TimedOut { tx_hash } => {
                assert_eq!(Some(tx_hash), attempt.submitted_tx);
            }
            other => panic!("expected TimedOut, got {other:?}"),
        }
        assert!(attempt.outcome.is_success());
        // No retry.
        assert_eq!(ledger.submission_count().await, 1);
    }

    #[tokio::test]
    async fn test_duplicate_at_confirmation_is_already_registered() {
        let ledger = Arc::new(MemoryLedger::with_signer(SIGNER));
        ledger
            .fail_confirmations(Some(LedgerError::DuplicateRegistration(digest(b"abc"))))
            .await;

        let attempt = registrar(ledger.clone()).register(b"abc", None).await.unwrap();
        assert_eq!(attempt.outcome, RegistrationOutcome::AlreadyRegistered);
        assert!(!attempt.outcome.is_success());
        assert!(attempt.submitted_tx.is_some());
        assert!(attempt.confirmed_block.is_none());
    }

    #[tokio::test]
    async fn test_confirmation_error_reports_reference() {
        let ledger = Arc::new(MemoryLedger::with_signer(SIGNER));
        ledger
            .fail_confirmations(Some(LedgerError::Unavailable("node restarted".into())))
            .await;

        let attempt = registrar(ledger.clone()).register(b"abc", None).await.unwrap();
        match attempt.outcome {
            RegistrationOutcome::TimedOut { tx_hash } => {
                assert_eq!(Some(tx_hash), attempt.submitted_tx);
            }
            other => panic!("expected TimedOut, got {other:?}"),
        }
        assert_eq!(ledger.submission_count().await, 1);
    }

    #[tokio::test]
    async fn test_metadata_is_submitted_verbatim() {
        let ledger = Arc::new(MemoryLedger::with_signer(SIGNER));
        let registrar = registrar(ledger.clone());

        let attempt = registrar.register(b"abc", Some("  BSc 2024\n")).await.unwrap();
        assert_eq!(attempt.metadata, "  BSc 2024\n");
        let record = ledger.get_record(&digest(b"abc")).await.unwrap().unwrap();
        assert_eq!(record.metadata, "  BSc 2024\n");

        let blank = registrar.register(b"def", Some(" \t ")).await.unwrap();
        assert!(blank.metadata.starts_with("Registered via certledger at "));
    }

    #[tokio::test]
    async fn test_precheck_failure_is_an_error() {
        let ledger = Arc::new(MemoryLedger::with_signer(SIGNER));
        ledger.set_reads_unavailable(true).await;

        assert!(registrar(ledger.clone()).register(b"abc", None).await.is_err());
        assert_eq!(ledger.submission_count().await, 0);
    }

    #[tokio::test]
    async fn test_degraded_uses_placeholder() {
        let registrar = Registrar::new(
            Arc::new(SimulatedLedger::with_seed(9, Duration::ZERO)),
            Duration::from_secs(1),
            80002,
        );

        for i in 0..16u8 {
            let attempt = registrar.register(&[i], None).await.unwrap();
            assert!(attempt.simulated);
            assert!(attempt.outcome.is_success());
            match attempt.outcome {
                RegistrationOutcome::NoSignerFallback(instructions) => {
                    assert_eq!(instructions.contract_address, PLACEHOLDER_CONTRACT);
                }
                other => panic!("expected NoSignerFallback, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_terminal_states() {
        assert!(!RegistrationState::Start.is_terminal());
        assert!(!RegistrationState::Checking.is_terminal());
        assert!(!RegistrationState::Submitting.is_terminal());
        assert!(!RegistrationState::Confirming.is_terminal());
        assert!(RegistrationState::Confirmed.is_terminal());
        assert!(RegistrationState::TimedOut.is_terminal());
    }
}
