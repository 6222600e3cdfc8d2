/// Floor imposed by the execution relay; operations priced below it are
/// silently dropped, so the fee policy enforces it locally.
pub const MIN_PRIORITY_FEE_WEI: u128 = 1_000_000;

/// Verification gas ceiling for cohort-controlled accounts. Threshold
/// signature verification is heavier than a single ECDSA check.
pub const VERIFICATION_GAS_LIMIT: u64 = 500_000;

/// Account-abstraction wire revision the signing network expects.
pub const AA_VERSION: &str = "mdt";

/// Fixed labels mixed into the deploy-salt preimage. Changing either label
/// silently re-homes every user onto new addresses.
pub const SALT_ORIGIN_LABEL: &str = "Discord";
pub const SALT_TENANT_LABEL: &str = "Collab.Land";

pub const DEFAULT_SETTLEMENT_WAIT_SECS: u64 = 120;
pub const DEFAULT_SETTLEMENT_POLL_SECS: u64 = 3;

pub const DEFAULT_RPC_TIMEOUT_SECS: u64 = 15;
pub const DEFAULT_RPC_RETRY_ATTEMPTS: usize = 3;
pub const DEFAULT_RPC_RETRY_BASE_DELAY_MS: u64 = 250;

pub const API_RATE_LIMIT_WINDOW_SECS: u64 = 1;
pub const API_RATE_LIMIT_CLEANUP_INTERVAL_SECS: u64 = 60;
pub const API_RATE_LIMIT_ENTRY_TTL_SECS: u64 = 300;
