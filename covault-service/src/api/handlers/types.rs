use axum::http::StatusCode;
use axum::Json;
use covault_core::foundation::{CovaultError, ErrorCode};
use serde::{Deserialize, Serialize};

/// `?chain=` selector shared by all v1 routes; the body may carry the same
/// field, and the query wins when both are present.
#[derive(Debug, Default, Deserialize)]
pub struct ChainQuery {
    pub chain: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAccountRequest {
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub chain: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AccountResponse {
    pub address: alloy_primitives::Address,
    pub threshold: u16,
    pub deployed: bool,
}

#[derive(Debug, Serialize)]
pub struct BalanceResponse {
    pub address: alloy_primitives::Address,
    pub balance: String,
    pub symbol: &'static str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecuteRequest {
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub to: Option<String>,
    /// Decimal ETH amount; accepted as string or number.
    #[serde(default)]
    pub amount_eth: Option<serde_json::Value>,
    #[serde(default)]
    pub discord_timestamp: Option<serde_json::Value>,
    #[serde(default)]
    pub discord_signature: Option<String>,
    #[serde(default)]
    pub discord_payload: Option<serde_json::Value>,
    #[serde(default)]
    pub chain: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecuteResponse {
    pub status: &'static str,
    pub sender_smart_account: alloy_primitives::Address,
    pub receiver: alloy_primitives::Address,
    pub amount_eth: String,
    pub user_op_hash: String,
    pub transaction_hash: String,
}

pub fn status_for(err: &CovaultError) -> StatusCode {
    match err.code() {
        ErrorCode::InvalidRequest | ErrorCode::MissingAuthorization => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

pub fn error_response(err: &CovaultError) -> (StatusCode, Json<serde_json::Value>) {
    (status_for(err), Json(serde_json::json!({ "error": err.to_string() })))
}

pub fn require_field<T>(value: Option<T>, name: &str) -> Result<T, CovaultError> {
    value.ok_or_else(|| CovaultError::InvalidRequest(format!("{name} is required")))
}

/// Timestamps arrive from the interaction channel as either a number or a
/// decimal string.
pub fn parse_timestamp(value: &serde_json::Value) -> Result<u64, CovaultError> {
    match value {
        serde_json::Value::Number(n) => {
            n.as_u64().ok_or_else(|| CovaultError::InvalidRequest(format!("invalid discordTimestamp: {n}")))
        }
        serde_json::Value::String(s) => {
            s.trim().parse().map_err(|_| CovaultError::InvalidRequest(format!("invalid discordTimestamp: {s}")))
        }
        other => Err(CovaultError::InvalidRequest(format!("invalid discordTimestamp: {other}"))),
    }
}

pub fn parse_address(value: &str, name: &str) -> Result<alloy_primitives::Address, CovaultError> {
    value.trim().parse().map_err(|_| CovaultError::InvalidRequest(format!("{name} is not a valid address: {value}")))
}

/// Decimal ETH amount from a string or number body field.
pub fn amount_text(value: &serde_json::Value) -> Result<String, CovaultError> {
    match value {
        serde_json::Value::String(s) => Ok(s.clone()),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => Err(CovaultError::InvalidRequest(format!("invalid amountEth: {other}"))),
    }
}
