//! Caller-facing response shapes.
//!
//! These are the JSON bodies the transport layer sends back. `hash` is
//! always the digest as lowercase hex.

use serde::Serialize;

use crate::register::{ManualInstructions, RegistrationAttempt, RegistrationOutcome};
use crate::verify::VerificationResult;

/// Body of a verification reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyResponse {
    pub success: bool,
    pub message: String,
    pub hash: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub registration_info: Option<String>,
}

impl From<&VerificationResult> for VerifyResponse {
    fn from(result: &VerificationResult) -> Self {
        Self {
            success: result.valid,
            message: result.message().to_string(),
            hash: result.digest.to_hex(),
            registration_info: result.registration_info.clone(),
        }
    }
}

/// The three manual registration steps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstructionSteps {
    pub step1: String,
    pub step2: String,
    pub step3: String,
}

impl From<&ManualInstructions> for InstructionSteps {
    fn from(instructions: &ManualInstructions) -> Self {
        Self {
            step1: instructions.step1(),
            step2: instructions.step2(),
            step3: instructions.step3(),
        }
    }
}

/// Body of a registration reply. Which fields are present depends on the
/// outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponse {
    pub success: bool,
    pub message: String,
    pub hash: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_hash: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_number: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contract_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instructions: Option<InstructionSteps>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub registration_info: Option<String>,
}

impl From<&RegistrationAttempt> for RegisterResponse {
    fn from(attempt: &RegistrationAttempt) -> Self {
        let mut response = Self {
            success: attempt.outcome.is_success(),
            message: String::new(),
            hash: attempt.digest.to_hex(),
            transaction_hash: None,
            block_number: None,
            contract_address: None,
            metadata: None,
            instructions: None,
            registration_info: None,
        };

        match &attempt.outcome {
            RegistrationOutcome::AlreadyRegistered => {
                response.message = "This certificate is already registered on the blockchain.".into();
            }
            RegistrationOutcome::Confirmed {
                receipt,
                registration_info,
            } => {
                response.message = "Certificate successfully registered on the blockchain.".into();
                response.transaction_hash = Some(receipt.tx_hash.to_hex());
                response.block_number = Some(receipt.block_number);
                response.metadata = Some(attempt.metadata.clone());
                response.registration_info = registration_info.clone();
            }
            RegistrationOutcome::TimedOut { tx_hash } => {
                response.message = format!(
                    "Registration transaction {tx_hash} was submitted but not confirmed in time. \
                     Check its status before trying again."
                );
                response.transaction_hash = Some(tx_hash.to_hex());
                response.metadata = Some(attempt.metadata.clone());
            }
            RegistrationOutcome::NoSignerFallback(instructions) => {
                response.message = "Certificate hash computed. This server holds no signing key; \
                                    complete the registration manually with the instructions below."
                    .into();
                fill_instructions(&mut response, instructions);
            }
            RegistrationOutcome::FailedFallback {
                instructions,
                reason,
            } => {
                response.message = format!(
                    "Automatic registration failed ({reason}); falling back to manual \
                     registration with the instructions below."
                );
                fill_instructions(&mut response, instructions);
            }
        }

        if attempt.simulated {
            response.message.push_str(" (Simulated)");
        }
        response
    }
}

fn fill_instructions(response: &mut RegisterResponse, instructions: &ManualInstructions) {
    response.contract_address = Some(instructions.contract_address.clone());
    response.metadata = Some(instructions.metadata.clone());
    response.instructions = Some(instructions.into());
}

/// Body of an input or ledger failure reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>, error: Option<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            error,
        }
    }
}
