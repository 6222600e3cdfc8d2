//! Configuration loader using Figment for layered config management.
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults (two devnet chains)
//! 2. TOML config file
//! 3. Environment variables (`COVAULT_*`, see `env.rs`)

use crate::foundation::CovaultError;
use crate::infrastructure::config::env::apply_env_overrides;
use crate::infrastructure::config::types::{AppConfig, ChainConfig, ResolverScheme};
use alloy_primitives::{Address, B256};
use figment::providers::{Format, Serialized, Toml};
use figment::Figment;
use log::{debug, info};
use std::path::Path;

pub const DEFAULT_CHAIN_KEY: &str = "base-sepolia";

const BASE_SEPOLIA_CHAIN_ID: u64 = 84_532;
const ETH_SEPOLIA_CHAIN_ID: u64 = 11_155_111;
const DEFAULT_SIGNING_DOMAIN: &str = "devnet";
const DEFAULT_COHORT_ID: u32 = 1;

// Child coordinator deployments for the devnet cohort.
const BASE_SEPOLIA_COORDINATOR: &str = "0xcc537b292d142dABe2424277596d8FFCC3e6A12D";
const ETH_SEPOLIA_COORDINATOR: &str = "0x4D9Dec33A74C366d0A2b4746c56D75A25f3627b2";

fn parse_const_address(value: &str) -> Address {
    value.parse().unwrap_or(Address::ZERO)
}

fn default_chain(key: &str, label: &str, chain_id: u64, coordinator: &str) -> ChainConfig {
    ChainConfig {
        key: key.to_string(),
        label: label.to_string(),
        chain_id,
        signing_domain: DEFAULT_SIGNING_DOMAIN.to_string(),
        cohort_id: DEFAULT_COHORT_ID,
        coordinator_address: parse_const_address(coordinator),
        resolver: ResolverScheme::Child,
        // Factory and entry-point wiring is deployment-specific and comes
        // from the TOML file or environment; zero values fail resolution.
        factory_address: Address::ZERO,
        proxy_init_code_hash: B256::ZERO,
        entry_point: Address::ZERO,
        execution_rpc_url: String::new(),
        coordinator_rpc_url: String::new(),
        bundler_rpc_url: String::new(),
    }
}

/// Compiled baseline: both devnet chains, no endpoints.
pub fn default_app_config() -> AppConfig {
    let mut config = AppConfig { default_chain: DEFAULT_CHAIN_KEY.to_string(), ..AppConfig::default() };
    config.chains.insert(
        "base-sepolia".to_string(),
        default_chain("base-sepolia", "Base Sepolia", BASE_SEPOLIA_CHAIN_ID, BASE_SEPOLIA_COORDINATOR),
    );
    config.chains.insert(
        "eth-sepolia".to_string(),
        default_chain("eth-sepolia", "Ethereum Sepolia", ETH_SEPOLIA_CHAIN_ID, ETH_SEPOLIA_COORDINATOR),
    );
    config
}

/// Load configuration from the resolved data dir / config path.
pub fn load_app_config() -> Result<AppConfig, CovaultError> {
    let data_dir = super::env::resolve_data_dir()?;
    let config_path = super::env::resolve_config_path(&data_dir)?;
    load_app_config_from_path(&config_path)
}

/// Load configuration from a specific TOML file path (the file may be
/// absent; defaults + env are enough for a devnet run).
pub fn load_app_config_from_path(path: &Path) -> Result<AppConfig, CovaultError> {
    info!("loading configuration path={}", path.display());
    let figment = Figment::from(Serialized::defaults(default_app_config())).merge(Toml::file(path));
    let mut config: AppConfig =
        figment.extract().map_err(|err| CovaultError::ConfigError(format!("config extraction failed: {err}")))?;

    // The map key is canonical; backfill per-chain key fields so TOML authors
    // don't have to repeat them.
    for (key, chain) in config.chains.iter_mut() {
        if chain.key.trim().is_empty() {
            chain.key = key.clone();
        }
    }

    apply_env_overrides(&mut config)?;
    debug!(
        "configuration loaded chains={} default_chain={} api_addr={}",
        config.chains.len(),
        config.default_chain,
        config.api.addr
    );
    Ok(config)
}
