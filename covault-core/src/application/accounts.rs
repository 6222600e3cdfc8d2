use crate::application::resolver::resolver_for;
use crate::domain::account::{derive_account, AccountDescriptor};
use crate::foundation::{CovaultError, UserId};
use crate::infrastructure::clients::ClientRegistry;
use crate::infrastructure::config::ChainRegistry;
use alloy_primitives::U256;
use log::info;
use serde::Serialize;
use std::sync::Arc;

/// What the account endpoint reports: the counterfactual address and the
/// cohort threshold that controls it. Always counterfactual here.
#[derive(Clone, Debug, Serialize)]
pub struct AccountInfo {
    pub address: alloy_primitives::Address,
    pub threshold: u16,
    pub deployed: bool,
}

/// Account derivation entry point shared by the HTTP surface and the
/// orchestrator. Cohort state is re-resolved per call; the descriptor is
/// recomputed, never stored.
pub struct AccountService {
    registry: Arc<ChainRegistry>,
    clients: Arc<ClientRegistry>,
}

impl AccountService {
    pub fn new(registry: Arc<ChainRegistry>, clients: Arc<ClientRegistry>) -> Self {
        Self { registry, clients }
    }

    pub async fn derive(&self, user_id: &UserId, chain_selector: Option<&str>) -> Result<AccountDescriptor, CovaultError> {
        if user_id.is_empty() {
            return Err(CovaultError::InvalidRequest("userId is required".to_string()));
        }
        let chain = self.registry.select(chain_selector)?;
        let clients = self.clients.bundle(chain).await?;
        let cohort = resolver_for(chain.resolver).resolve(chain, &clients).await?;
        derive_account(&chain.factory(), &cohort, user_id)
    }

    pub async fn account_info(&self, user_id: &UserId, chain_selector: Option<&str>) -> Result<AccountInfo, CovaultError> {
        if user_id.is_empty() {
            return Err(CovaultError::InvalidRequest("userId is required".to_string()));
        }
        let chain = self.registry.select(chain_selector)?;
        let clients = self.clients.bundle(chain).await?;
        let cohort = resolver_for(chain.resolver).resolve(chain, &clients).await?;
        let account = derive_account(&chain.factory(), &cohort, user_id)?;
        info!("account derived chain={} user_id={} address={} threshold={}", chain.key, user_id, account.address, cohort.threshold);
        Ok(AccountInfo { address: account.address, threshold: cohort.threshold, deployed: account.deployed })
    }

    pub async fn balance(&self, address: alloy_primitives::Address, chain_selector: Option<&str>) -> Result<U256, CovaultError> {
        let chain = self.registry.select(chain_selector)?;
        let clients = self.clients.bundle(chain).await?;
        clients.execution.get_balance(address).await
    }
}
