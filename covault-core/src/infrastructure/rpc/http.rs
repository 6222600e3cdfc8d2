use crate::foundation::util::encoding::strip_0x;
use crate::foundation::CovaultError;
use crate::infrastructure::rpc::{abi, CoordinatorRpc, ExecutionRpc};
use alloy_primitives::{Address, Bytes, U256};
use async_trait::async_trait;
use log::{debug, trace};
use serde::Deserialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// JSON-RPC 2.0 client over HTTP for Ethereum-style endpoints.
///
/// One instance per endpoint; reqwest pools connections internally and the
/// client is safe to share across request tasks.
pub struct HttpRpcClient {
    label: String,
    url: String,
    client: reqwest::Client,
    next_id: AtomicU64,
}

#[derive(Debug, Deserialize)]
struct JsonRpcReply {
    #[serde(default)]
    result: Option<serde_json::Value>,
    #[serde(default)]
    error: Option<JsonRpcErrorBody>,
}

#[derive(Debug, Deserialize)]
struct JsonRpcErrorBody {
    code: i64,
    message: String,
}

impl HttpRpcClient {
    pub fn new(label: impl Into<String>, url: impl Into<String>, timeout: Duration) -> Result<Self, CovaultError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| CovaultError::Message(format!("http client build failed: {err}")))?;
        Ok(Self { label: label.into(), url: url.into(), client, next_id: AtomicU64::new(1) })
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub async fn request(&self, method: &str, params: serde_json::Value) -> Result<serde_json::Value, CovaultError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = serde_json::json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        });
        trace!("rpc request endpoint={} method={} id={}", self.label, method, id);

        let response = self
            .client
            .post(&self.url)
            .json(&body)
            .send()
            .await
            .map_err(|err| CovaultError::upstream(&self.label, err))?;
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(CovaultError::upstream(&self.label, format!("http {status}: {text}")));
        }

        let reply: JsonRpcReply = response.json().await.map_err(|err| CovaultError::upstream(&self.label, err))?;
        if let Some(error) = reply.error {
            debug!("rpc error endpoint={} method={} code={} message={}", self.label, method, error.code, error.message);
            return Err(CovaultError::upstream(&self.label, format!("{method} reverted ({}): {}", error.code, error.message)));
        }
        reply.result.ok_or_else(|| CovaultError::upstream(&self.label, format!("{method} returned no result")))
    }

    async fn eth_call(&self, to: Address, data: Bytes) -> Result<Vec<u8>, CovaultError> {
        let params = serde_json::json!([{ "to": to, "data": data }, "latest"]);
        let result = self.request("eth_call", params).await?;
        decode_hex_value(&self.label, &result)
    }
}

fn decode_hex_value(label: &str, value: &serde_json::Value) -> Result<Vec<u8>, CovaultError> {
    let text = value
        .as_str()
        .ok_or_else(|| CovaultError::upstream(label, format!("expected hex string, got {value}")))?;
    hex::decode(strip_0x(text)).map_err(|err| CovaultError::upstream(label, format!("bad hex in response: {err}")))
}

fn parse_quantity(label: &str, value: &serde_json::Value) -> Result<U256, CovaultError> {
    let text = value
        .as_str()
        .ok_or_else(|| CovaultError::upstream(label, format!("expected quantity string, got {value}")))?;
    U256::from_str_radix(strip_0x(text), 16).map_err(|err| CovaultError::upstream(label, format!("bad quantity {text}: {err}")))
}

#[async_trait]
impl ExecutionRpc for HttpRpcClient {
    async fn get_balance(&self, address: Address) -> Result<U256, CovaultError> {
        let result = self.request("eth_getBalance", serde_json::json!([address, "latest"])).await?;
        parse_quantity(&self.label, &result)
    }

    async fn base_fee_per_gas(&self) -> Result<U256, CovaultError> {
        let result = self.request("eth_getBlockByNumber", serde_json::json!(["latest", false])).await?;
        let base_fee = result
            .get("baseFeePerGas")
            .ok_or_else(|| CovaultError::upstream(&self.label, "latest block carries no baseFeePerGas"))?;
        parse_quantity(&self.label, base_fee)
    }

    async fn get_code(&self, address: Address) -> Result<Bytes, CovaultError> {
        let result = self.request("eth_getCode", serde_json::json!([address, "latest"])).await?;
        decode_hex_value(&self.label, &result).map(Bytes::from)
    }
}

#[async_trait]
impl CoordinatorRpc for HttpRpcClient {
    async fn cohort_multisig(&self, coordinator: Address, cohort_id: u32) -> Result<Address, CovaultError> {
        let data = abi::encode_call_u32("cohortMultisigs(uint32)", cohort_id);
        let raw = self.eth_call(coordinator, data).await?;
        abi::decode_address(&raw)
    }

    async fn multisig_signers(&self, multisig: Address) -> Result<Vec<Address>, CovaultError> {
        let raw = self.eth_call(multisig, abi::encode_call_no_args("getSigners()")).await?;
        abi::decode_address_array(&raw)
    }

    async fn multisig_threshold(&self, multisig: Address) -> Result<u16, CovaultError> {
        let raw = self.eth_call(multisig, abi::encode_call_no_args("threshold()")).await?;
        abi::decode_u16(&raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_quantity_accepts_prefixed_hex() {
        assert_eq!(parse_quantity("t", &serde_json::json!("0x0")).expect("parse"), U256::ZERO);
        assert_eq!(parse_quantity("t", &serde_json::json!("0x2fAf080")).expect("parse"), U256::from(50_000_000u64));
        assert!(parse_quantity("t", &serde_json::json!(12)).is_err());
        assert!(parse_quantity("t", &serde_json::json!("0xZZ")).is_err());
    }

    #[test]
    fn decode_hex_value_handles_empty_code() {
        assert_eq!(decode_hex_value("t", &serde_json::json!("0x")).expect("decode"), Vec::<u8>::new());
        assert_eq!(decode_hex_value("t", &serde_json::json!("0x6080")).expect("decode"), vec![0x60, 0x80]);
    }
}
