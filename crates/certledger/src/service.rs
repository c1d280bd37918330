//! Transport-agnostic request handling.
//!
//! Maps engine results to a status code and a JSON body. An HTTP layer
//! only has to extract the upload and metadata fields and forward the
//! [`Reply`] as-is.

use serde::Serialize;

use crate::engine::Engine;
use crate::health::HealthReport;
use crate::response::{ErrorResponse, RegisterResponse, VerifyResponse};

const NO_UPLOAD: &str = "No certificate file uploaded.";

/// A body ready for serialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ReplyBody {
    Verify(VerifyResponse),
    Register(RegisterResponse),
    Health(HealthReport),
    Error(ErrorResponse),
}

/// Status code plus body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reply {
    pub status: u16,
    pub body: ReplyBody,
}

impl Reply {
    fn ok(body: ReplyBody) -> Self {
        Self { status: 200, body }
    }

    fn error(status: u16, message: &str, error: Option<String>) -> Self {
        Self {
            status,
            body: ReplyBody::Error(ErrorResponse::new(message, error)),
        }
    }
}

/// Request handler over an [`Engine`].
#[derive(Clone)]
pub struct Service {
    engine: Engine,
}

impl Service {
    pub fn new(engine: Engine) -> Self {
        Self { engine }
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    /// Handle a verification request. `upload` is the raw certificate file.
    pub async fn verify(&self, upload: Option<&[u8]>) -> Reply {
        let Some(bytes) = upload else {
            return Reply::error(400, NO_UPLOAD, None);
        };

        match self.engine.verify(bytes).await {
            Ok(result) => Reply::ok(ReplyBody::Verify(VerifyResponse::from(&result))),
            Err(e) => Reply::error(
                500,
                "An error occurred during verification.",
                Some(e.to_string()),
            ),
        }
    }

    /// Handle a registration request.
    pub async fn register(&self, upload: Option<&[u8]>, metadata: Option<&str>) -> Reply {
        let Some(bytes) = upload else {
            return Reply::error(400, NO_UPLOAD, None);
        };

        match self.engine.register(bytes, metadata).await {
            Ok(attempt) => Reply::ok(ReplyBody::Register(RegisterResponse::from(&attempt))),
            Err(e) => Reply::error(
                500,
                "An error occurred during registration.",
                Some(e.to_string()),
            ),
        }
    }

    pub fn health(&self) -> Reply {
        Reply::ok(ReplyBody::Health(self.engine.health()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use certledger_client::MemoryLedger;
    use certledger_core::Address;
    use serde_json::json;
    use std::sync::Arc;

    fn service(ledger: Arc<MemoryLedger>) -> Service {
        Service::new(Engine::with_ledger(EngineConfig::default(), ledger))
    }

    #[tokio::test]
    async fn test_missing_upload() {
        let service = service(Arc::new(MemoryLedger::new()));

        for reply in [service.verify(None).await, service.register(None, Some("x")).await] {
            assert_eq!(reply.status, 400);
            assert_eq!(
                serde_json::to_value(&reply.body).unwrap(),
                json!({"success": false, "message": "No certificate file uploaded."})
            );
        }
    }

    #[tokio::test]
    async fn test_ledger_failure_is_500() {
        let ledger = Arc::new(MemoryLedger::new());
        ledger.set_reads_unavailable(true).await;
        let service = service(ledger);

        let reply = service.verify(Some(b"cert")).await;
        assert_eq!(reply.status, 500);
        let body = serde_json::to_value(&reply.body).unwrap();
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "An error occurred during verification.");
        assert!(body["error"].is_string());

        let reply = service.register(Some(b"cert"), None).await;
        assert_eq!(reply.status, 500);
    }

    #[tokio::test]
    async fn test_register_then_verify() {
        let ledger = Arc::new(MemoryLedger::with_signer(Address::from_bytes([0x11; 20])));
        let service = service(ledger);

        let reply = service.register(Some(b"abc"), Some("")).await;
        assert_eq!(reply.status, 200);
        let body = serde_json::to_value(&reply.body).unwrap();
        assert_eq!(body["success"], true);
        assert!(body["transactionHash"].is_string());
        assert!(body["blockNumber"].is_u64());

        let reply = service.verify(Some(b"abc")).await;
        let body = serde_json::to_value(&reply.body).unwrap();
        assert_eq!(body["success"], true);
        assert_eq!(
            body["hash"],
            "0x4e03657aea45a94fc7d47ba826c8d667c0d1e6e33a64a036ec44f58fa12d6c45"
        );
    }

    #[test]
    fn test_health() {
        let reply = service(Arc::new(MemoryLedger::new())).health();
        assert_eq!(reply.status, 200);
        let body = serde_json::to_value(&reply.body).unwrap();
        assert_eq!(body["status"], "ok");
        assert_eq!(body["ledgerConfigured"], true);
        assert_eq!(body["signerConfigured"], false);
    }
}
