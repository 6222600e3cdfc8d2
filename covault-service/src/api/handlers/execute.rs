use super::types::{amount_text, error_response, parse_address, parse_timestamp, require_field, ChainQuery, ExecuteRequest, ExecuteResponse};
use crate::api::state::AppState;
use axum::extract::{Query, State};
use axum::response::{IntoResponse, Response};
use axum::Json;
use covault_core::application::TransferRequest;
use covault_core::domain::AuthorizationProof;
use covault_core::foundation::util::units::{format_ether, parse_ether};
use covault_core::foundation::{CovaultError, UserId};
use log::{info, warn};
use std::sync::Arc;

pub async fn handle_execute(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ChainQuery>,
    Json(body): Json<ExecuteRequest>,
) -> Response {
    let request = match build_transfer_request(query, body) {
        Ok(request) => request,
        Err(err) => return error_response(&err).into_response(),
    };
    let user_id = request.user_id.clone();

    match state.orchestrator.transfer(request).await {
        Ok(result) => {
            info!(
                "execute endpoint ok user_id={} sender={} receiver={} operation_hash={:#x}",
                user_id, result.sender, result.receiver, result.operation_hash
            );
            Json(ExecuteResponse {
                status: "submitted",
                sender_smart_account: result.sender,
                receiver: result.receiver,
                amount_eth: format_ether(result.amount_wei),
                user_op_hash: format!("{:#x}", result.operation_hash),
                transaction_hash: format!("{:#x}", result.settlement_hash),
            })
            .into_response()
        }
        Err(err) => {
            warn!("execute endpoint failed user_id={} error={}", user_id, err);
            error_response(&err).into_response()
        }
    }
}

fn build_transfer_request(query: ChainQuery, body: ExecuteRequest) -> Result<TransferRequest, CovaultError> {
    let user_id = require_field(body.user_id.filter(|v| !v.trim().is_empty()), "userId")?;
    let to = require_field(body.to, "to")?;
    let amount = require_field(body.amount_eth, "amountEth")?;
    let timestamp = require_field(body.discord_timestamp, "discordTimestamp")?;
    let signature = require_field(body.discord_signature, "discordSignature")?;
    let payload = require_field(body.discord_payload, "discordPayload")?;

    let to = parse_address(&to, "to")?;
    let amount_wei = parse_ether(&amount_text(&amount)?)?;
    let auth = AuthorizationProof::new(parse_timestamp(&timestamp)?, &signature, &payload)?;

    Ok(TransferRequest {
        user_id: UserId::new(user_id.trim()),
        to,
        amount_wei,
        chain: query.chain.or(body.chain),
        auth: Some(auth),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn full_body() -> ExecuteRequest {
        serde_json::from_value(json!({
            "userId": "alice",
            "to": "0x000000000000000000000000000000000000bEEF",
            "amountEth": "0.01",
            "discordTimestamp": 1_700_000_000u64,
            "discordSignature": "0xab12",
            "discordPayload": {"type": 2},
        }))
        .expect("body")
    }

    #[test]
    fn complete_body_builds_request() {
        let request = build_transfer_request(ChainQuery::default(), full_body()).expect("request");
        assert_eq!(request.user_id.as_str(), "alice");
        assert_eq!(request.amount_wei, parse_ether("0.01").expect("wei"));
        let auth = request.auth.expect("auth");
        assert_eq!(auth.signature, "ab12");
    }

    #[test]
    fn each_missing_field_is_named() {
        for (field, mutate) in [
            ("userId", Box::new(|b: &mut ExecuteRequest| b.user_id = None) as Box<dyn Fn(&mut ExecuteRequest)>),
            ("to", Box::new(|b| b.to = None)),
            ("amountEth", Box::new(|b| b.amount_eth = None)),
            ("discordTimestamp", Box::new(|b| b.discord_timestamp = None)),
            ("discordSignature", Box::new(|b| b.discord_signature = None)),
            ("discordPayload", Box::new(|b| b.discord_payload = None)),
        ] {
            let mut body = full_body();
            mutate(&mut body);
            let err = build_transfer_request(ChainQuery::default(), body).expect_err(field);
            assert!(err.to_string().contains(field), "error for {field} was {err}");
        }
    }

    #[test]
    fn query_chain_wins_over_body_chain() {
        let mut body = full_body();
        body.chain = Some("eth-sepolia".to_string());
        let request =
            build_transfer_request(ChainQuery { chain: Some("base-sepolia".to_string()) }, body).expect("request");
        assert_eq!(request.chain.as_deref(), Some("base-sepolia"));
    }

    #[test]
    fn bad_target_address_is_invalid_request() {
        let mut body = full_body();
        body.to = Some("not-an-address".to_string());
        let err = build_transfer_request(ChainQuery::default(), body).expect_err("bad to");
        assert!(matches!(err, CovaultError::InvalidRequest(_)));
    }
}
