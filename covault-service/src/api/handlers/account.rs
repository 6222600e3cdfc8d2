use super::types::{error_response, parse_address, require_field, AccountResponse, BalanceResponse, ChainQuery, CreateAccountRequest};
use crate::api::state::AppState;
use axum::extract::{Path, Query, State};
use axum::response::{IntoResponse, Response};
use axum::Json;
use covault_core::foundation::util::units::format_ether;
use covault_core::foundation::UserId;
use log::{info, warn};
use std::sync::Arc;

pub async fn handle_create_account(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ChainQuery>,
    Json(body): Json<CreateAccountRequest>,
) -> Response {
    let user_id = match require_field(body.user_id.filter(|v| !v.trim().is_empty()), "userId") {
        Ok(value) => UserId::new(value.trim()),
        Err(err) => return error_response(&err).into_response(),
    };
    let chain = query.chain.or(body.chain);

    match state.accounts.account_info(&user_id, chain.as_deref()).await {
        Ok(info) => {
            info!("account endpoint ok user_id={} address={}", user_id, info.address);
            Json(AccountResponse { address: info.address, threshold: info.threshold, deployed: info.deployed }).into_response()
        }
        Err(err) => {
            warn!("account endpoint failed user_id={} error={}", user_id, err);
            error_response(&err).into_response()
        }
    }
}

pub async fn handle_balance(
    State(state): State<Arc<AppState>>,
    Path(address): Path<String>,
    Query(query): Query<ChainQuery>,
) -> Response {
    let address = match parse_address(&address, "address") {
        Ok(value) => value,
        Err(err) => return error_response(&err).into_response(),
    };

    match state.accounts.balance(address, query.chain.as_deref()).await {
        Ok(balance) => {
            Json(BalanceResponse { address, balance: format_ether(balance), symbol: "ETH" }).into_response()
        }
        Err(err) => {
            warn!("balance endpoint failed address={} error={}", address, err);
            error_response(&err).into_response()
        }
    }
}
