//! Ethereum JSON-RPC implementation of the Ledger trait.
//!
//! Reads go through `eth_call`. Writes go through `eth_sendTransaction`
//! from a signer account the node manages, so no key material lives in
//! this process. Confirmation polls `eth_getTransactionReceipt`.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use certledger_core::{Address, CertificateDigest, LedgerRecord, TxHash, TxReceipt};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::abi;
use crate::error::{LedgerError, Result};
use crate::revert::{self, RpcErrorObject, DEFAULT_DUPLICATE_MARKERS};
use crate::traits::{Confirmation, Ledger, PendingTx};

/// Configuration for the JSON-RPC ledger.
#[derive(Debug, Clone)]
pub struct RpcConfig {
    /// JSON-RPC endpoint URL.
    pub rpc_url: String,
    /// Address of the certificate registry contract.
    pub contract: Address,
    /// Node-managed account used for writes.
    pub signer: Option<Address>,
    /// Delay between receipt polls while confirming.
    pub poll_interval: Duration,
    /// Per-request HTTP timeout.
    pub request_timeout: Duration,
    /// Revert reasons treated as duplicate registrations.
    pub duplicate_markers: Vec<String>,
}

impl RpcConfig {
    /// Configuration with default timings and no signer.
    pub fn new(rpc_url: impl Into<String>, contract: Address) -> Self {
        Self {
            rpc_url: rpc_url.into(),
            contract,
            signer: None,
            poll_interval: Duration::from_secs(1),
            request_timeout: Duration::from_secs(10),
            duplicate_markers: DEFAULT_DUPLICATE_MARKERS
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }

    /// Set the write signer.
    pub fn with_signer(mut self, signer: Option<Address>) -> Self {
        self.signer = signer;
        self
    }

    /// Set the receipt polling interval.
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }
}

#[derive(Serialize)]
struct RpcRequest<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: Value,
}

#[derive(Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcErrorObject>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawReceipt {
    block_number: Option<String>,
    status: Option<String>,
}

/// JSON-RPC ledger client.
///
/// Cheap to share: the underlying HTTP client pools connections and every
/// method takes `&self`, so concurrent reads and submissions need no
/// coordination.
pub struct RpcLedger {
    config: RpcConfig,
    client: reqwest::Client,
    next_id: AtomicU64,
}

impl RpcLedger {
    /// Build a client for the given endpoint. No network I/O happens here.
    pub fn new(config: RpcConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self {
            config,
            client,
            next_id: AtomicU64::new(1),
        })
    }

    /// The configuration this client was built with.
    pub fn config(&self) -> &RpcConfig {
        &self.config
    }

    /// Issue one JSON-RPC request.
    ///
    /// The outer `Result` carries transport failures; the inner one carries
    /// the node's error object.
    async fn request(
        &self,
        method: &str,
        params: Value,
    ) -> Result<std::result::Result<Option<Value>, RpcErrorObject>> {
        let body = RpcRequest {
            jsonrpc: "2.0",
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            method,
            params,
        };

        let resp = self
            .client
            .post(&self.config.rpc_url)
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(LedgerError::Unavailable(format!(
                "{method} returned HTTP {status}"
            )));
        }

        let parsed: RpcResponse = resp.json().await?;
        match parsed.error {
            Some(err) => Ok(Err(err)),
            None => Ok(Ok(parsed.result)),
        }
    }

    async fn call_contract(&self, data: Vec<u8>) -> Result<Vec<u8>> {
        let params = json!([
            { "to": self.config.contract.to_hex(), "data": abi::to_hex_data(&data) },
            "latest"
        ]);
        match self.request("eth_call", params).await? {
            Ok(Some(Value::String(hex))) => abi::from_hex_data(&hex),
            Ok(other) => Err(LedgerError::InvalidResponse(format!(
                "eth_call returned {other:?}"
            ))),
            Err(err) => Err(revert::classify_read(&err)),
        }
    }

    async fn fetch_receipt(&self, tx_hash: &TxHash) -> Result<Option<RawReceipt>> {
        match self
            .request("eth_getTransactionReceipt", json!([tx_hash.to_hex()]))
            .await?
        {
            Ok(None) | Ok(Some(Value::Null)) => Ok(None),
            Ok(Some(value)) => serde_json::from_value(value)
                .map(Some)
                .map_err(|e| LedgerError::InvalidResponse(e.to_string())),
            Err(err) => Err(revert::classify_read(&err)),
        }
    }

    /// Poll until a mined receipt appears. Transient errors are logged and
    /// polling continues; the caller bounds the whole loop.
    async fn poll_receipt(&self, tx_hash: &TxHash) -> (u64, bool) {
        loop {
            match self.fetch_receipt(tx_hash).await {
                Ok(Some(RawReceipt {
                    block_number: Some(block),
                    status,
                })) => match abi::parse_quantity(&block) {
                    Ok(block_number) => {
                        let succeeded = status.as_deref().map_or(true, |s| s == "0x1");
                        return (block_number, succeeded);
                    }
                    Err(e) => tracing::warn!(tx = %tx_hash, error = %e, "unparsable receipt"),
                },
                Ok(_) => {}
                Err(e) => tracing::warn!(tx = %tx_hash, error = %e, "receipt poll failed"),
            }
            tokio::time::sleep(self.config.poll_interval).await;
        }
    }

    /// After a revert, ask the ledger whether someone else registered.
    async fn duplicate_or(&self, digest: &CertificateDigest, err: LedgerError) -> LedgerError {
        match self.exists(digest).await {
            Ok(true) => LedgerError::DuplicateRegistration(*digest),
            Ok(false) => err,
            Err(check) => {
                tracing::warn!(hash = %digest, error = %check, "post-revert existence check failed");
                err
            }
        }
    }
}

#[async_trait]
impl Ledger for RpcLedger {
    async fn exists(&self, digest: &CertificateDigest) -> Result<bool> {
        let data = self
            .call_contract(abi::encode_digest_call(abi::VERIFY_SIGNATURE, digest))
            .await?;
        abi::decode_bool(&data)
    }

    async fn get_record(&self, digest: &CertificateDigest) -> Result<Option<LedgerRecord>> {
        let data = self
            .call_contract(abi::encode_digest_call(abi::INFO_SIGNATURE, digest))
            .await?;
        let record = abi::decode_certificate_info(&data)?;
        Ok(record.exists.then_some(record))
    }

    async fn register(&self, digest: &CertificateDigest, metadata: &str) -> Result<PendingTx> {
        let signer = self.config.signer.ok_or(LedgerError::NoSignerConfigured)?;

        let params = json!([{
            "from": signer.to_hex(),
            "to": self.config.contract.to_hex(),
            "data": abi::to_hex_data(&abi::encode_register(digest, metadata)),
        }]);

        match self.request("eth_sendTransaction", params).await? {
            Ok(Some(Value::String(hash))) => {
                let tx_hash = TxHash::from_hex(&hash)
                    .map_err(|e| LedgerError::InvalidResponse(e.to_string()))?;
                tracing::debug!(hash = %digest, tx = %tx_hash, "registration submitted");
                Ok(PendingTx {
                    tx_hash,
                    digest: *digest,
                })
            }
            Ok(other) => Err(LedgerError::InvalidResponse(format!(
                "eth_sendTransaction returned {other:?}"
            ))),
            Err(err) => {
                let classified =
                    revert::classify_submission(&err, digest, &self.config.duplicate_markers);
                match classified {
                    LedgerError::Reverted(_) => Err(self.duplicate_or(digest, classified).await),
                    other => Err(other),
                }
            }
        }
    }

    async fn await_confirmation(
        &self,
        pending: &PendingTx,
        timeout: Duration,
    ) -> Result<Confirmation> {
        let (block_number, succeeded) =
            match tokio::time::timeout(timeout, self.poll_receipt(&pending.tx_hash)).await {
                Ok(mined) => mined,
                Err(_) => return Ok(Confirmation::TimedOut),
            };

        if succeeded {
            return Ok(Confirmation::Confirmed(TxReceipt {
                tx_hash: pending.tx_hash,
                block_number,
            }));
        }

        let reason = format!("transaction reverted in block {block_number}");
        match self
            .duplicate_or(&pending.digest, LedgerError::Reverted(reason.clone()))
            .await
        {
            dup @ LedgerError::DuplicateRegistration(_) => Err(dup),
            _ => Ok(Confirmation::Reverted(reason)),
        }
    }

    fn signer(&self) -> Option<Address> {
        self.config.signer
    }

    fn contract_address(&self) -> Option<Address> {
        Some(self.config.contract)
    }
}
