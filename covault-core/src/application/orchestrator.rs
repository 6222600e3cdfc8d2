use crate::application::resolver::resolver_for;
use crate::application::signing_context::build_signing_context;
use crate::domain::account::derive_account;
use crate::domain::authorization::{parse_transfer_override, AuthorizationProof};
use crate::domain::cohort::CohortDescriptor;
use crate::domain::fee::compute_gas_fees;
use crate::domain::operation::{compute_operation_hash, TransferResult, UserOperation};
use crate::foundation::{CovaultError, UserId};
use crate::infrastructure::clients::ClientRegistry;
use crate::infrastructure::config::{ChainConfig, ChainRegistry};
use crate::infrastructure::relay::await_settlement;
use crate::infrastructure::rpc::retry_with_backoff;
use alloy_primitives::{Address, U256};
use log::{debug, info, warn};
use std::sync::Arc;
use std::time::Duration;

#[derive(Clone, Debug)]
pub struct TransferRequest {
    pub user_id: UserId,
    pub to: Address,
    pub amount_wei: U256,
    pub chain: Option<String>,
    pub auth: Option<AuthorizationProof>,
}

/// Top-level transfer sequencer.
///
/// Every step failing aborts the whole transfer; there is no partial-success
/// state. Upstream *reads* are retried with backoff, relay *submission* is
/// not: without a relay-side dedup key a blind resend could execute twice.
/// The content hash of the operation is logged as the idempotency handle for
/// out-of-band investigation.
pub struct TransferOrchestrator {
    registry: Arc<ChainRegistry>,
    clients: Arc<ClientRegistry>,
}

impl TransferOrchestrator {
    pub fn new(registry: Arc<ChainRegistry>, clients: Arc<ClientRegistry>) -> Self {
        Self { registry, clients }
    }

    pub async fn transfer(&self, request: TransferRequest) -> Result<TransferResult, CovaultError> {
        if request.user_id.is_empty() {
            return Err(CovaultError::InvalidRequest("userId is required".to_string()));
        }
        // Gate on the interaction proof before touching any upstream: the
        // cohort would refuse to sign without it, so nothing else is worth
        // doing first.
        let auth = request.auth.as_ref().ok_or(CovaultError::MissingAuthorization)?;

        let chain = self.registry.select(request.chain.as_deref())?;
        let clients = self.clients.bundle(chain).await?;
        let settings = self.clients.rpc_settings().clone();
        let attempts = settings.retry_attempts;
        let backoff = Duration::from_millis(settings.retry_base_delay_ms);

        // Sender is always derived, never taken from the caller: the caller's
        // idea of "their address" may predate a cohort rotation.
        let resolver = resolver_for(chain.resolver);
        let cohort =
            retry_with_backoff(attempts, backoff, "resolve_cohort", || resolver.resolve(chain, &clients)).await?;
        let sender = derive_account(&chain.factory(), &cohort, &request.user_id)?;

        let (receiver, amount_wei) = self.reinterpret_target(chain, &cohort, auth, request.to, request.amount_wei);

        let base_fee =
            retry_with_backoff(attempts, backoff, "base_fee_per_gas", || clients.execution.base_fee_per_gas()).await?;
        let fees = compute_gas_fees(base_fee);
        debug!(
            "fees computed chain={} base_fee={} max_fee={} max_priority_fee={}",
            chain.key, base_fee, fees.max_fee_per_gas, fees.max_priority_fee_per_gas
        );

        let operation = UserOperation::transfer(sender.address, receiver, amount_wei, fees)?;
        let content_hash = compute_operation_hash(&operation);
        info!(
            "operation built chain={} sender={} receiver={} amount_wei={} content_hash={:#x}",
            chain.key, sender.address, receiver, amount_wei, content_hash
        );

        let context = build_signing_context(chain, clients.signing.as_ref(), Some(auth)).await?;
        let signature = clients
            .signing
            .sign_operation(&chain.signing_domain, chain.cohort_id, chain.chain_id, &operation, &context)
            .await?;

        let operation_hash = clients.relay.submit_operation(chain.entry_point, &operation, &signature.signature).await?;
        info!("operation submitted chain={} operation_hash={:#x} content_hash={:#x}", chain.key, operation_hash, content_hash);

        let settlement_hash = await_settlement(
            clients.relay.as_ref(),
            operation_hash,
            Duration::from_secs(settings.settlement_wait_secs),
            Duration::from_secs(settings.settlement_poll_secs),
        )
        .await?;

        Ok(TransferResult { sender: sender.address, receiver, amount_wei, operation_hash, settlement_hash })
    }

    /// Best-effort reinterpretation of target/amount from the authorization
    /// payload. A structured sub-command wins over the caller-supplied
    /// values, and its receiver identifier goes through the same derivation
    /// as the sender, so both roles resolve identically. Anything malformed
    /// degrades to the caller's values.
    fn reinterpret_target(
        &self,
        chain: &ChainConfig,
        cohort: &CohortDescriptor,
        auth: &AuthorizationProof,
        fallback_to: Address,
        fallback_amount: U256,
    ) -> (Address, U256) {
        let Some(overrides) = parse_transfer_override(&auth.payload) else {
            return (fallback_to, fallback_amount);
        };

        let amount = overrides.amount_wei.unwrap_or(fallback_amount);
        let receiver = match overrides.receiver_id {
            Some(receiver_id) => match derive_account(&chain.factory(), cohort, &receiver_id) {
                Ok(account) => {
                    info!(
                        "payload names receiver chain={} receiver_id={} receiver_address={}",
                        chain.key, receiver_id, account.address
                    );
                    account.address
                }
                Err(err) => {
                    warn!("receiver derivation from payload failed, using caller target error={}", err);
                    fallback_to
                }
            },
            None => fallback_to,
        };
        (receiver, amount)
    }
}
