use crate::foundation::CovaultError;
use crate::infrastructure::config::types::{AppConfig, ChainConfig};
use log::debug;
use std::collections::BTreeMap;

/// Static mapping from chain identifier to its wiring. Pure lookup, no I/O;
/// built once at startup and shared by reference.
#[derive(Clone, Debug)]
pub struct ChainRegistry {
    chains: BTreeMap<String, ChainConfig>,
    default_chain: String,
}

impl ChainRegistry {
    pub fn from_config(config: &AppConfig) -> Result<Self, CovaultError> {
        if config.chains.is_empty() {
            return Err(CovaultError::ConfigError("no chains configured".to_string()));
        }
        if !config.chains.contains_key(&config.default_chain) {
            return Err(CovaultError::ConfigError(format!(
                "default_chain {} is not a configured chain",
                config.default_chain
            )));
        }
        Ok(Self { chains: config.chains.clone(), default_chain: config.default_chain.clone() })
    }

    pub fn default_chain_key(&self) -> &str {
        &self.default_chain
    }

    pub fn chain_keys(&self) -> impl Iterator<Item = &str> {
        self.chains.keys().map(String::as_str)
    }

    /// Resolve a canonical chain key, failing when the chain is unknown or
    /// its wiring is incomplete.
    pub fn resolve(&self, chain_key: &str) -> Result<&ChainConfig, CovaultError> {
        let chain = self
            .chains
            .get(chain_key)
            .ok_or_else(|| CovaultError::ConfigError(format!("unknown chain key: {chain_key}")))?;
        let problems = chain.wiring_problems();
        if !problems.is_empty() {
            return Err(CovaultError::ConfigError(problems.join("; ")));
        }
        Ok(chain)
    }

    /// Request-level chain selection: canonical key, case-insensitive human
    /// label, or the default chain when absent/unrecognized.
    pub fn select(&self, requested: Option<&str>) -> Result<&ChainConfig, CovaultError> {
        let requested = match requested.map(str::trim).filter(|s| !s.is_empty()) {
            Some(value) => value,
            None => return self.resolve(&self.default_chain),
        };

        let normalized = requested.to_ascii_lowercase();
        if self.chains.contains_key(&normalized) {
            return self.resolve(&normalized);
        }
        if let Some(key) = self
            .chains
            .iter()
            .find(|(_, chain)| chain.label.eq_ignore_ascii_case(requested))
            .map(|(key, _)| key.clone())
        {
            return self.resolve(&key);
        }

        debug!("unrecognized chain selector, using default requested={} default={}", requested, self.default_chain);
        self.resolve(&self.default_chain)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::config::loader::default_app_config;
    use alloy_primitives::{Address, B256};

    fn wired_config() -> AppConfig {
        let mut config = default_app_config();
        for chain in config.chains.values_mut() {
            chain.execution_rpc_url = "https://execution.example".to_string();
            chain.coordinator_rpc_url = "https://coordinator.example".to_string();
            chain.bundler_rpc_url = "https://bundler.example".to_string();
            chain.factory_address = Address::from([0xAA; 20]);
            chain.proxy_init_code_hash = B256::from([0x11; 32]);
            chain.entry_point = Address::from([0xBB; 20]);
        }
        config
    }

    #[test]
    fn resolve_fails_when_wiring_incomplete() {
        let registry = ChainRegistry::from_config(&default_app_config()).expect("registry");
        let err = registry.resolve("base-sepolia").expect_err("should fail");
        assert!(matches!(err, CovaultError::ConfigError(_)));
        assert!(err.to_string().contains("execution_rpc_url"));
    }

    #[test]
    fn select_accepts_key_label_and_falls_back() {
        let registry = ChainRegistry::from_config(&wired_config()).expect("registry");
        assert_eq!(registry.select(Some("eth-sepolia")).expect("select").key, "eth-sepolia");
        assert_eq!(registry.select(Some("Base Sepolia")).expect("select").key, "base-sepolia");
        assert_eq!(registry.select(Some("ETHEREUM SEPOLIA")).expect("select").key, "eth-sepolia");
        assert_eq!(registry.select(None).expect("select").key, "base-sepolia");
        assert_eq!(registry.select(Some("dogecoin")).expect("select").key, "base-sepolia");
        assert_eq!(registry.select(Some("  ")).expect("select").key, "base-sepolia");
    }

    #[test]
    fn unknown_default_is_a_config_error() {
        let mut config = wired_config();
        config.default_chain = "missing".to_string();
        assert!(matches!(ChainRegistry::from_config(&config), Err(CovaultError::ConfigError(_))));
    }
}
