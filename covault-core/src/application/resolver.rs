use crate::domain::cohort::CohortDescriptor;
use crate::foundation::CovaultError;
use crate::infrastructure::clients::ClientBundle;
use crate::infrastructure::config::{ChainConfig, ResolverScheme};
use async_trait::async_trait;
use log::{debug, info, warn};

/// Resolve the active signer set for a chain's cohort.
///
/// One implementation per addressing scheme, selected via chain
/// configuration. Resolution is read-only and must re-read the multisig
/// address every time: cohorts rotate, and a cached multisig silently points
/// new accounts at a retired signer set.
#[async_trait]
pub trait CohortResolver: Send + Sync {
    async fn resolve(&self, chain: &ChainConfig, clients: &ClientBundle) -> Result<CohortDescriptor, CovaultError>;
}

pub fn resolver_for(scheme: ResolverScheme) -> &'static dyn CohortResolver {
    match scheme {
        ResolverScheme::Child => &ChildCoordinatorResolver,
        ResolverScheme::Root => &RootCoordinatorResolver,
    }
}

/// Child-coordinator scheme: the coordinator and the cohort multisig are
/// deployed on the execution chain itself, and the multisig publishes its
/// signer set on-chain.
pub struct ChildCoordinatorResolver;

#[async_trait]
impl CohortResolver for ChildCoordinatorResolver {
    async fn resolve(&self, chain: &ChainConfig, clients: &ClientBundle) -> Result<CohortDescriptor, CovaultError> {
        let multisig = clients.execution_reader.cohort_multisig(chain.coordinator_address, chain.cohort_id).await?;
        debug!("cohort multisig resolved chain={} cohort_id={} multisig={}", chain.key, chain.cohort_id, multisig);

        let code = clients.execution.get_code(multisig).await?;
        if code.is_empty() {
            return Err(CovaultError::CohortUnavailable {
                details: format!("no code at multisig {multisig} on chain {}; is the cohort deployed?", chain.chain_id),
            });
        }

        let signers = clients.execution_reader.multisig_signers(multisig).await?;
        let threshold = clients.execution_reader.multisig_threshold(multisig).await?;
        if signers.is_empty() {
            return Err(CovaultError::CohortUnavailable {
                details: format!("multisig {multisig} reports an empty signer set"),
            });
        }

        info!(
            "cohort resolved chain={} scheme=child multisig={} signers={} threshold={}",
            chain.key,
            multisig,
            signers.len(),
            threshold
        );
        Ok(CohortDescriptor { multisig, signers, threshold })
    }
}

/// Root-coordinator scheme: the multisig address still comes from the
/// coordinator contract (on the coordinator chain), but the participant set
/// and threshold come from the signing-coordinator network.
pub struct RootCoordinatorResolver;

#[async_trait]
impl CohortResolver for RootCoordinatorResolver {
    async fn resolve(&self, chain: &ChainConfig, clients: &ClientBundle) -> Result<CohortDescriptor, CovaultError> {
        let multisig = clients.coordinator.cohort_multisig(chain.coordinator_address, chain.cohort_id).await?;
        debug!("cohort multisig resolved chain={} cohort_id={} multisig={}", chain.key, chain.cohort_id, multisig);

        let participants = clients.signing.participants(&chain.signing_domain, chain.cohort_id).await?;
        if participants.is_empty() {
            warn!("signing network returned no participants chain={} cohort_id={}", chain.key, chain.cohort_id);
            return Err(CovaultError::CohortUnavailable {
                details: format!("no participants for cohort {} in domain {}", chain.cohort_id, chain.signing_domain),
            });
        }
        let threshold = clients.signing.threshold(&chain.signing_domain, chain.cohort_id).await?;
        let signers = participants.into_iter().map(|p| p.signer_address).collect::<Vec<_>>();

        info!(
            "cohort resolved chain={} scheme=root multisig={} signers={} threshold={}",
            chain.key,
            multisig,
            signers.len(),
            threshold
        );
        Ok(CohortDescriptor { multisig, signers, threshold })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::cohort::CohortParticipant;
    use crate::infrastructure::rpc::StaticChainRpc;
    use crate::infrastructure::relay::ScriptedRelay;
    use crate::infrastructure::signing::ScriptedSigningNetwork;
    use alloy_primitives::Address;
    use std::sync::Arc;

    fn addr(byte: u8) -> Address {
        Address::from([byte; 20])
    }

    fn chain() -> ChainConfig {
        use alloy_primitives::B256;
        ChainConfig {
            key: "base-sepolia".to_string(),
            label: "Base Sepolia".to_string(),
            chain_id: 84_532,
            signing_domain: "devnet".to_string(),
            cohort_id: 1,
            coordinator_address: addr(0xC0),
            resolver: ResolverScheme::Child,
            factory_address: addr(0xFA),
            proxy_init_code_hash: B256::from([0x11; 32]),
            entry_point: addr(0xEF),
            execution_rpc_url: "https://execution.example".to_string(),
            coordinator_rpc_url: "https://coordinator.example".to_string(),
            bundler_rpc_url: "https://bundler.example".to_string(),
        }
    }

    fn bundle_with(rpc: Arc<StaticChainRpc>, signing: Arc<ScriptedSigningNetwork>) -> ClientBundle {
        ClientBundle {
            execution: rpc.clone(),
            execution_reader: rpc.clone(),
            coordinator: rpc,
            signing,
            relay: Arc::new(ScriptedRelay::new()),
        }
    }

    #[tokio::test]
    async fn child_scheme_reads_signers_from_chain() {
        let rpc = Arc::new(StaticChainRpc::new());
        rpc.set_cohort(addr(0xEE), vec![addr(1), addr(2), addr(3)], 2);
        let signing = Arc::new(ScriptedSigningNetwork::new(vec![], 0));
        let clients = bundle_with(rpc, signing.clone());

        let cohort = ChildCoordinatorResolver.resolve(&chain(), &clients).await.expect("resolve");
        assert_eq!(cohort.multisig, addr(0xEE));
        assert_eq!(cohort.signers, vec![addr(1), addr(2), addr(3)]);
        assert_eq!(cohort.threshold, 2);
        // The child scheme never consults the signing network for membership.
        assert_eq!(signing.total_calls(), 0);
    }

    #[tokio::test]
    async fn child_scheme_requires_deployed_multisig() {
        let rpc = Arc::new(StaticChainRpc::new());
        // set_cohort not called: multisig address resolves to zero, no code.
        let clients = bundle_with(rpc, Arc::new(ScriptedSigningNetwork::new(vec![], 0)));
        let err = ChildCoordinatorResolver.resolve(&chain(), &clients).await.expect_err("no code");
        assert!(matches!(err, CovaultError::CohortUnavailable { .. }));
    }

    #[tokio::test]
    async fn root_scheme_uses_signing_network_membership() {
        let rpc = Arc::new(StaticChainRpc::new());
        rpc.set_cohort(addr(0xEE), vec![], 0);
        let participants = vec![
            CohortParticipant { signer_address: addr(7), endpoint: None },
            CohortParticipant { signer_address: addr(8), endpoint: Some("https://node.example".to_string()) },
        ];
        let signing = Arc::new(ScriptedSigningNetwork::new(participants, 2));
        let clients = bundle_with(rpc, signing);

        let cohort = RootCoordinatorResolver.resolve(&chain(), &clients).await.expect("resolve");
        assert_eq!(cohort.signers, vec![addr(7), addr(8)]);
        assert_eq!(cohort.threshold, 2);
    }

    #[tokio::test]
    async fn root_scheme_fails_on_empty_participants() {
        let rpc = Arc::new(StaticChainRpc::new());
        rpc.set_cohort(addr(0xEE), vec![], 0);
        let clients = bundle_with(rpc, Arc::new(ScriptedSigningNetwork::new(vec![], 1)));
        let err = RootCoordinatorResolver.resolve(&chain(), &clients).await.expect_err("empty");
        assert!(matches!(err, CovaultError::CohortUnavailable { .. }));
    }
}
