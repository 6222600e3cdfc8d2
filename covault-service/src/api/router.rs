use super::handlers::account::{handle_balance, handle_create_account};
use super::handlers::execute::handle_execute;
use super::handlers::health::handle_health;
use super::middleware::auth::auth_middleware;
use super::middleware::correlation::correlation_middleware;
use super::middleware::logging::logging_middleware;
use super::middleware::rate_limit::rate_limit_middleware;
use super::state::AppState;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use covault_core::foundation::CovaultError;
use log::{error, info};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;

pub async fn run_http_server(addr: SocketAddr, state: Arc<AppState>) -> Result<(), CovaultError> {
    info!("binding http server addr={}", addr);
    let app = build_router(state);
    let listener = TcpListener::bind(addr).await?;
    info!("HTTP server ready and accepting connections addr={}", addr);
    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>()).await.map_err(|err| {
        error!("HTTP server terminated unexpectedly addr={} error={}", addr, err);
        CovaultError::Message(err.to_string())
    })
}

pub fn build_router(state: Arc<AppState>) -> Router {
    let protected = Router::new()
        .route("/v1/account", post(handle_create_account))
        .route("/v1/account/{address}/balance", get(handle_balance))
        .route("/v1/execute", post(handle_execute))
        .route_layer(axum::middleware::from_fn_with_state(state.clone(), auth_middleware))
        .route_layer(axum::middleware::from_fn_with_state(state.clone(), rate_limit_middleware));

    Router::new()
        .merge(protected)
        .route("/health", get(handle_health))
        .layer(DefaultBodyLimit::max(1024 * 1024))
        .layer(axum::middleware::from_fn(logging_middleware))
        .layer(axum::middleware::from_fn(correlation_middleware))
        .with_state(state)
}
