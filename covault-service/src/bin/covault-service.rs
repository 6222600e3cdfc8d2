#[path = "covault-service/cli.rs"]
mod cli;
#[path = "covault-service/setup.rs"]
mod setup;

use crate::cli::Cli;
use covault_core::application::{AccountService, TransferOrchestrator};
use covault_core::infrastructure::clients::ClientRegistry;
use covault_core::infrastructure::config::ChainRegistry;
use covault_service::api::{run_http_server, AppState, RateLimiter};
use log::info;
use std::net::SocketAddr;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Cli::parse_args();
    setup::init_logging(&args.log_level)?;
    args.apply_to_env();
    info!("covault-service starting log_level={}", args.log_level);

    let config = setup::load_app_config()?;
    info!(
        "config loaded chains={} default_chain={} api_addr={} auth_enabled={}",
        config.chains.len(),
        config.default_chain,
        config.api.addr,
        config.api.api_key.is_some()
    );

    let registry = Arc::new(ChainRegistry::from_config(&config)?);
    let clients = Arc::new(ClientRegistry::new(config.rpc.clone()));
    let accounts = Arc::new(AccountService::new(registry.clone(), clients.clone()));
    let orchestrator = Arc::new(TransferOrchestrator::new(registry.clone(), clients.clone()));

    let state = Arc::new(AppState {
        accounts,
        orchestrator,
        api_key: config.api.api_key.clone(),
        rate_limiter: Arc::new(RateLimiter::new()),
        rate_limit_rps: config.api.rate_limit_rps,
        rate_limit_burst: config.api.rate_limit_burst,
    });

    let addr: SocketAddr = config.api.addr.parse().map_err(|err| format!("invalid api.addr {}: {}", config.api.addr, err))?;
    let server_state = state.clone();
    let server = tokio::spawn(async move { run_http_server(addr, server_state).await });

    tokio::select! {
        result = server => {
            result??;
        }
        _ = tokio::signal::ctrl_c() => {
            info!("shutdown signal received");
        }
    }
    Ok(())
}
