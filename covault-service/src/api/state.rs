use crate::api::RateLimiter;
use covault_core::application::{AccountService, TransferOrchestrator};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub accounts: Arc<AccountService>,
    pub orchestrator: Arc<TransferOrchestrator>,
    /// Shared secret for `x-api-key`; `None` leaves all routes open (devnet).
    pub api_key: Option<String>,
    pub rate_limiter: Arc<RateLimiter>,
    pub rate_limit_rps: u32,
    pub rate_limit_burst: u32,
}
