use crate::foundation::CovaultError;
use crate::infrastructure::config::{ChainConfig, RpcSettings};
use crate::infrastructure::relay::{HttpRelayClient, RelayRpc};
use crate::infrastructure::rpc::{CoordinatorRpc, ExecutionRpc, HttpRpcClient};
use crate::infrastructure::signing::{HttpSigningNetwork, SigningNetwork};
use log::info;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

/// The per-chain client set: execution-chain reads, coordinator-chain reads,
/// the signing network, and the execution relay.
///
/// `execution_reader` is the contract-read view of the same endpoint as
/// `execution`: child coordinators are deployed on the execution chain,
/// while `coordinator` points at the (possibly different) chain hosting the
/// root signing coordinator.
#[derive(Clone)]
pub struct ClientBundle {
    pub execution: Arc<dyn ExecutionRpc>,
    pub execution_reader: Arc<dyn CoordinatorRpc>,
    pub coordinator: Arc<dyn CoordinatorRpc>,
    pub signing: Arc<dyn SigningNetwork>,
    pub relay: Arc<dyn RelayRpc>,
}

/// Explicit registry of per-chain client bundles, constructed once at
/// startup and passed by reference into the orchestrator.
///
/// Bundles are built lazily per chain key and reused for every subsequent
/// request on that chain. The async mutex serializes first-time construction
/// so two racing requests cannot build duplicate clients.
pub struct ClientRegistry {
    rpc_settings: RpcSettings,
    bundles: Mutex<HashMap<String, Arc<ClientBundle>>>,
}

impl ClientRegistry {
    pub fn new(rpc_settings: RpcSettings) -> Self {
        Self { rpc_settings, bundles: Mutex::new(HashMap::new()) }
    }

    /// Pre-seed a bundle (tests, or alternate client stacks).
    pub async fn insert(&self, chain_key: &str, bundle: ClientBundle) {
        self.bundles.lock().await.insert(chain_key.to_string(), Arc::new(bundle));
    }

    pub async fn bundle(&self, chain: &ChainConfig) -> Result<Arc<ClientBundle>, CovaultError> {
        let mut bundles = self.bundles.lock().await;
        if let Some(bundle) = bundles.get(&chain.key) {
            return Ok(bundle.clone());
        }

        let timeout = Duration::from_secs(self.rpc_settings.timeout_secs);
        info!(
            "constructing client bundle chain={} execution={} coordinator={} bundler={}",
            chain.key, chain.execution_rpc_url, chain.coordinator_rpc_url, chain.bundler_rpc_url
        );
        let execution = Arc::new(HttpRpcClient::new("execution-rpc", chain.execution_rpc_url.clone(), timeout)?);
        let coordinator = Arc::new(HttpRpcClient::new("coordinator-rpc", chain.coordinator_rpc_url.clone(), timeout)?);
        let signing = Arc::new(HttpSigningNetwork::new(chain.coordinator_rpc_url.clone(), timeout)?);
        let relay = Arc::new(HttpRelayClient::new(chain.bundler_rpc_url.clone(), timeout)?);

        let bundle = Arc::new(ClientBundle {
            execution: execution.clone(),
            execution_reader: execution,
            coordinator,
            signing,
            relay,
        });
        bundles.insert(chain.key.clone(), bundle.clone());
        Ok(bundle)
    }

    pub fn rpc_settings(&self) -> &RpcSettings {
        &self.rpc_settings
    }
}
