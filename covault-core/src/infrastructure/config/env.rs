use crate::foundation::CovaultError;
use crate::infrastructure::config::types::AppConfig;
use std::path::{Path, PathBuf};

pub const CONFIG_PATH_ENV: &str = "COVAULT_CONFIG_PATH";
pub const DATA_DIR_ENV: &str = "COVAULT_DATA_DIR";
pub const API_KEY_ENV: &str = "COVAULT_API_KEY";
pub const API_ADDR_ENV: &str = "COVAULT_API_ADDR";
pub const DEFAULT_CHAIN_ENV: &str = "COVAULT_DEFAULT_CHAIN";

pub fn resolve_config_path(data_dir: &Path) -> Result<PathBuf, CovaultError> {
    if let Ok(value) = std::env::var(CONFIG_PATH_ENV) {
        let trimmed = value.trim();
        if !trimmed.is_empty() {
            return Ok(PathBuf::from(trimmed));
        }
    }
    Ok(data_dir.join("covault.toml"))
}

pub fn resolve_data_dir() -> Result<PathBuf, CovaultError> {
    if let Ok(data_dir) = std::env::var(DATA_DIR_ENV) {
        let trimmed = data_dir.trim();
        if !trimmed.is_empty() {
            return Ok(PathBuf::from(trimmed));
        }
    }
    let cwd = std::env::current_dir().map_err(|err| CovaultError::Message(err.to_string()))?;
    Ok(cwd.join(".covault"))
}

fn env_non_empty(name: &str) -> Option<String> {
    std::env::var(name).ok().map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

/// Per-chain env var name: `COVAULT_<FIELD>_<KEY>` with the chain key
/// uppercased and dashes replaced (`COVAULT_EXECUTION_RPC_URL_BASE_SEPOLIA`).
fn chain_env_name(field: &str, chain_key: &str) -> String {
    format!("COVAULT_{}_{}", field, chain_key.to_ascii_uppercase().replace('-', "_"))
}

/// Environment overrides on top of defaults + TOML.
///
/// Secrets (the API key) and per-deployment endpoint URLs are expected to
/// arrive this way rather than living in a checked-in file.
pub fn apply_env_overrides(config: &mut AppConfig) -> Result<(), CovaultError> {
    if let Some(key) = env_non_empty(API_KEY_ENV) {
        config.api.api_key = Some(key);
    }
    if let Some(addr) = env_non_empty(API_ADDR_ENV) {
        config.api.addr = addr;
    }
    if let Some(chain) = env_non_empty(DEFAULT_CHAIN_ENV) {
        config.default_chain = chain;
    }

    for (key, chain) in config.chains.iter_mut() {
        if let Some(url) = env_non_empty(&chain_env_name("EXECUTION_RPC_URL", key)) {
            chain.execution_rpc_url = url;
        }
        if let Some(url) = env_non_empty(&chain_env_name("COORDINATOR_RPC_URL", key)) {
            chain.coordinator_rpc_url = url;
        }
        if let Some(url) = env_non_empty(&chain_env_name("BUNDLER_RPC_URL", key)) {
            chain.bundler_rpc_url = url;
        }
        if let Some(value) = env_non_empty(&chain_env_name("COORDINATOR_ADDRESS", key)) {
            chain.coordinator_address =
                value.parse().map_err(|err| CovaultError::ConfigError(format!("chain {key}: bad coordinator address: {err}")))?;
        }
        if let Some(value) = env_non_empty(&chain_env_name("FACTORY_ADDRESS", key)) {
            chain.factory_address =
                value.parse().map_err(|err| CovaultError::ConfigError(format!("chain {key}: bad factory address: {err}")))?;
        }
        if let Some(value) = env_non_empty(&chain_env_name("PROXY_INIT_CODE_HASH", key)) {
            chain.proxy_init_code_hash =
                value.parse().map_err(|err| CovaultError::ConfigError(format!("chain {key}: bad init code hash: {err}")))?;
        }
        if let Some(value) = env_non_empty(&chain_env_name("ENTRY_POINT", key)) {
            chain.entry_point =
                value.parse().map_err(|err| CovaultError::ConfigError(format!("chain {key}: bad entry point: {err}")))?;
        }
    }
    Ok(())
}
