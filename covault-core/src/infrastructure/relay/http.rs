use crate::domain::operation::UserOperation;
use crate::foundation::util::encoding::strip_0x;
use crate::foundation::{CovaultError, OperationHash, SettlementHash};
use crate::infrastructure::rpc::abi;
use alloy_primitives::{Address, Bytes, U256};
use async_trait::async_trait;
use log::{debug, info, trace};
use serde::Deserialize;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// JSON-RPC client for the account-abstraction bundler.
///
/// Not built on `HttpRpcClient`: a JSON-RPC error here is the relay
/// *rejecting* the operation (`RelaySubmission`), which callers must be able
/// to tell apart from the transport being down (`UpstreamUnavailable`).
pub struct HttpRelayClient {
    url: String,
    client: reqwest::Client,
    next_id: AtomicU64,
}

const ENDPOINT_LABEL: &str = "bundler";

#[derive(Debug, Deserialize)]
struct RelayReply {
    #[serde(default)]
    result: Option<serde_json::Value>,
    #[serde(default)]
    error: Option<RelayErrorBody>,
}

#[derive(Debug, Deserialize)]
struct RelayErrorBody {
    code: i64,
    message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReceiptWire {
    #[serde(default)]
    success: Option<bool>,
    receipt: InnerReceipt,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InnerReceipt {
    transaction_hash: String,
}

impl HttpRelayClient {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, CovaultError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| CovaultError::Message(format!("http client build failed: {err}")))?;
        Ok(Self { url: url.into(), client, next_id: AtomicU64::new(1) })
    }

    async fn request(&self, method: &str, params: serde_json::Value) -> Result<serde_json::Value, CovaultError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = serde_json::json!({ "jsonrpc": "2.0", "id": id, "method": method, "params": params });
        trace!("relay request method={} id={}", method, id);

        let response = self
            .client
            .post(&self.url)
            .json(&body)
            .send()
            .await
            .map_err(|err| CovaultError::upstream(ENDPOINT_LABEL, err))?;
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(CovaultError::upstream(ENDPOINT_LABEL, format!("http {status}: {text}")));
        }
        let reply: RelayReply = response.json().await.map_err(|err| CovaultError::upstream(ENDPOINT_LABEL, err))?;
        if let Some(error) = reply.error {
            debug!("relay rejected method={} code={} message={}", method, error.code, error.message);
            return Err(CovaultError::RelaySubmission { details: format!("{} ({}): {}", method, error.code, error.message) });
        }
        reply.result.ok_or_else(|| CovaultError::upstream(ENDPOINT_LABEL, format!("{method} returned no result")))
    }

    /// Wire form of an operation for `eth_sendUserOperation`. The paymaster
    /// and remaining gas estimates are filled server-side by the relay.
    fn operation_wire(operation: &UserOperation, signature: &Bytes) -> Result<serde_json::Value, CovaultError> {
        let call = match operation.calls.as_slice() {
            [call] => call,
            [] => return Err(CovaultError::InvalidRequest("operation carries no calls".to_string())),
            _ => {
                return Err(CovaultError::RelaySubmission {
                    details: "relay client only submits single-call operations".to_string(),
                })
            }
        };
        let call_data = abi::encode_execute_call(call.target, call.value, &call.data);
        Ok(serde_json::json!({
            "sender": operation.sender,
            "callData": call_data,
            "maxFeePerGas": quantity(operation.max_fee_per_gas),
            "maxPriorityFeePerGas": quantity(operation.max_priority_fee_per_gas),
            "verificationGasLimit": quantity(U256::from(operation.verification_gas_limit)),
            "signature": signature,
        }))
    }
}

fn quantity(value: U256) -> String {
    format!("0x{:x}", value)
}

#[async_trait]
impl super::RelayRpc for HttpRelayClient {
    async fn submit_operation(
        &self,
        entry_point: Address,
        operation: &UserOperation,
        signature: &Bytes,
    ) -> Result<OperationHash, CovaultError> {
        let wire = Self::operation_wire(operation, signature)?;
        let result = self.request("eth_sendUserOperation", serde_json::json!([wire, entry_point])).await?;
        let hash_text = result
            .as_str()
            .ok_or_else(|| CovaultError::upstream(ENDPOINT_LABEL, format!("expected operation hash, got {result}")))?;
        let hash = OperationHash::from_str(hash_text)?;
        info!("operation accepted by relay operation_hash={:#x} sender={}", hash, operation.sender);
        Ok(hash)
    }

    async fn settlement(&self, operation_hash: OperationHash) -> Result<Option<SettlementHash>, CovaultError> {
        let result = self
            .request("eth_getUserOperationReceipt", serde_json::json!([format!("{:#x}", operation_hash)]))
            .await?;
        if result.is_null() {
            return Ok(None);
        }
        let receipt: ReceiptWire = serde_json::from_value(result)?;
        if receipt.success == Some(false) {
            return Err(CovaultError::RelaySubmission {
                details: format!("operation {:#x} reverted on-chain", operation_hash),
            });
        }
        let settlement = SettlementHash::from_str(strip_0x(&receipt.receipt.transaction_hash))?;
        Ok(Some(settlement))
    }
}
