use crate::domain::account::AccountFactory;
use crate::foundation::{
    DEFAULT_RPC_RETRY_ATTEMPTS, DEFAULT_RPC_RETRY_BASE_DELAY_MS, DEFAULT_RPC_TIMEOUT_SECS, DEFAULT_SETTLEMENT_POLL_SECS,
    DEFAULT_SETTLEMENT_WAIT_SECS,
};
use alloy_primitives::{Address, B256};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Which addressing scheme resolves the cohort's signer set for a chain.
///
/// `Child` chains host a child coordinator whose multisig publishes signers
/// and threshold on-chain; `Root` chains delegate the participant query to
/// the signing-coordinator network itself.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolverScheme {
    #[default]
    Child,
    Root,
}

impl std::fmt::Display for ResolverScheme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Child => write!(f, "child"),
            Self::Root => write!(f, "root"),
        }
    }
}

/// Static per-chain wiring. Immutable after load; the endpoint URLs are the
/// only fields expected to come from the environment.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChainConfig {
    /// Canonical chain key (`base-sepolia`). Filled from the map key at load.
    #[serde(default)]
    pub key: String,
    /// Human label accepted as an alias in requests (`Base Sepolia`).
    #[serde(default)]
    pub label: String,
    pub chain_id: u64,
    /// Signing-domain identifier the coordinator network scopes cohorts by.
    pub signing_domain: String,
    pub cohort_id: u32,
    /// Coordinator contract holding `cohortMultisigs(uint32)`.
    pub coordinator_address: Address,
    #[serde(default)]
    pub resolver: ResolverScheme,
    /// Account factory parameters; together they pin the CREATE2 scheme.
    pub factory_address: Address,
    pub proxy_init_code_hash: B256,
    /// Account-abstraction entry point the relay executes against.
    pub entry_point: Address,
    #[serde(default)]
    pub execution_rpc_url: String,
    #[serde(default)]
    pub coordinator_rpc_url: String,
    #[serde(default)]
    pub bundler_rpc_url: String,
}

impl ChainConfig {
    pub fn factory(&self) -> AccountFactory {
        AccountFactory { address: self.factory_address, proxy_init_code_hash: self.proxy_init_code_hash }
    }

    /// All required wiring present (three endpoints, factory parameters,
    /// entry point), or the reasons why not.
    pub fn wiring_problems(&self) -> Vec<String> {
        let mut problems = Vec::new();
        if self.execution_rpc_url.trim().is_empty() {
            problems.push(format!("chain {}: missing execution_rpc_url", self.key));
        }
        if self.coordinator_rpc_url.trim().is_empty() {
            problems.push(format!("chain {}: missing coordinator_rpc_url", self.key));
        }
        if self.bundler_rpc_url.trim().is_empty() {
            problems.push(format!("chain {}: missing bundler_rpc_url", self.key));
        }
        if self.coordinator_address == Address::ZERO {
            problems.push(format!("chain {}: missing coordinator_address", self.key));
        }
        if self.factory_address == Address::ZERO {
            problems.push(format!("chain {}: missing factory_address", self.key));
        }
        if self.proxy_init_code_hash == B256::ZERO {
            problems.push(format!("chain {}: missing proxy_init_code_hash", self.key));
        }
        if self.entry_point == Address::ZERO {
            problems.push(format!("chain {}: missing entry_point", self.key));
        }
        problems
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_api_addr")]
    pub addr: String,
    /// Shared secret expected in `x-api-key`. Empty/absent disables auth
    /// (devnet only; `validate` flags it).
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_rate_limit_rps")]
    pub rate_limit_rps: u32,
    #[serde(default = "default_rate_limit_burst")]
    pub rate_limit_burst: u32,
}

fn default_api_addr() -> String {
    "127.0.0.1:8080".to_string()
}

const fn default_rate_limit_rps() -> u32 {
    30
}

const fn default_rate_limit_burst() -> u32 {
    60
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            addr: default_api_addr(),
            api_key: None,
            rate_limit_rps: default_rate_limit_rps(),
            rate_limit_burst: default_rate_limit_burst(),
        }
    }
}

/// Upstream-call budgets: request timeout, bounded retry, and the settlement
/// wait window. Every external call the orchestrator makes is bounded by one
/// of these.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RpcSettings {
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_retry_attempts")]
    pub retry_attempts: usize,
    #[serde(default = "default_retry_base_delay_ms")]
    pub retry_base_delay_ms: u64,
    #[serde(default = "default_settlement_wait_secs")]
    pub settlement_wait_secs: u64,
    #[serde(default = "default_settlement_poll_secs")]
    pub settlement_poll_secs: u64,
}

const fn default_timeout_secs() -> u64 {
    DEFAULT_RPC_TIMEOUT_SECS
}

const fn default_retry_attempts() -> usize {
    DEFAULT_RPC_RETRY_ATTEMPTS
}

const fn default_retry_base_delay_ms() -> u64 {
    DEFAULT_RPC_RETRY_BASE_DELAY_MS
}

const fn default_settlement_wait_secs() -> u64 {
    DEFAULT_SETTLEMENT_WAIT_SECS
}

const fn default_settlement_poll_secs() -> u64 {
    DEFAULT_SETTLEMENT_POLL_SECS
}

impl Default for RpcSettings {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            retry_attempts: default_retry_attempts(),
            retry_base_delay_ms: default_retry_base_delay_ms(),
            settlement_wait_secs: default_settlement_wait_secs(),
            settlement_poll_secs: default_settlement_poll_secs(),
        }
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub rpc: RpcSettings,
    #[serde(default)]
    pub default_chain: String,
    #[serde(default)]
    pub chains: BTreeMap<String, ChainConfig>,
}

impl AppConfig {
    /// Collect every problem instead of failing on the first, so a broken
    /// deployment surfaces its whole shape in one startup log.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut problems = Vec::new();
        if self.chains.is_empty() {
            problems.push("no chains configured".to_string());
        }
        if !self.chains.contains_key(&self.default_chain) {
            problems.push(format!("default_chain {} is not a configured chain", self.default_chain));
        }
        for (key, chain) in &self.chains {
            if chain.key != *key {
                problems.push(format!("chain {}: key field {} does not match map key", key, chain.key));
            }
            if chain.label.trim().is_empty() {
                problems.push(format!("chain {}: missing label", key));
            }
            problems.extend(chain.wiring_problems());
        }
        if self.api.api_key.as_deref().map(|k| k.trim().is_empty()).unwrap_or(true) {
            problems.push("api.api_key is empty; all routes except /health will be open".to_string());
        }
        if self.rpc.settlement_poll_secs == 0 || self.rpc.settlement_wait_secs == 0 {
            problems.push("rpc settlement wait/poll must be non-zero".to_string());
        }
        if problems.is_empty() {
            Ok(())
        } else {
            Err(problems)
        }
    }
}
