use crate::domain::operation::UserOperation;
use crate::foundation::{CovaultError, OperationHash, SettlementHash};
use alloy_primitives::{Address, Bytes};
use async_trait::async_trait;
use log::{debug, info};
use parking_lot::Mutex;
use std::time::Duration;

pub mod http;

pub use http::HttpRelayClient;

/// Execution relay (bundler) boundary: accepts cohort-signed operations,
/// wraps them for on-chain execution, and reports settlement.
#[async_trait]
pub trait RelayRpc: Send + Sync {
    /// Submit a signed operation; returns the relay's operation handle.
    async fn submit_operation(
        &self,
        entry_point: Address,
        operation: &UserOperation,
        signature: &Bytes,
    ) -> Result<OperationHash, CovaultError>;

    /// One settlement poll. `None` means not yet included.
    async fn settlement(&self, operation_hash: OperationHash) -> Result<Option<SettlementHash>, CovaultError>;
}

/// Poll the relay until settlement or the bounded wait elapses.
///
/// A hung relay must terminate in `SettlementTimeout` (a "pending/unknown"
/// terminal outcome for the caller to re-query) instead of blocking the
/// request task forever.
pub async fn await_settlement(
    relay: &dyn RelayRpc,
    operation_hash: OperationHash,
    wait: Duration,
    poll: Duration,
) -> Result<SettlementHash, CovaultError> {
    let deadline = tokio::time::Instant::now() + wait;
    loop {
        if let Some(settlement) = relay.settlement(operation_hash).await? {
            info!("operation settled operation_hash={:#x} settlement_hash={:#x}", operation_hash, settlement);
            return Ok(settlement);
        }
        if tokio::time::Instant::now() >= deadline {
            return Err(CovaultError::SettlementTimeout {
                operation_hash: format!("{:#x}", operation_hash),
                waited_secs: wait.as_secs(),
            });
        }
        debug!("operation pending operation_hash={:#x} poll_secs={}", operation_hash, poll.as_secs());
        tokio::time::sleep(poll).await;
    }
}

/// In-memory relay double: records submissions and settles each operation
/// after a configurable number of polls.
pub struct ScriptedRelay {
    state: Mutex<ScriptedRelayState>,
}

struct ScriptedRelayState {
    submissions: Vec<(Address, UserOperation, Bytes)>,
    reject: Option<String>,
    polls_until_settled: u32,
    polls_seen: u32,
    next_hash_byte: u8,
    last_hash: Option<OperationHash>,
}

impl ScriptedRelay {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(ScriptedRelayState {
                submissions: Vec::new(),
                reject: None,
                polls_until_settled: 0,
                polls_seen: 0,
                next_hash_byte: 1,
                last_hash: None,
            }),
        }
    }

    pub fn reject_with(&self, reason: &str) {
        self.state.lock().reject = Some(reason.to_string());
    }

    pub fn settle_after_polls(&self, polls: u32) {
        self.state.lock().polls_until_settled = polls;
    }

    pub fn submissions(&self) -> usize {
        self.state.lock().submissions.len()
    }

    pub fn last_submission(&self) -> Option<(Address, UserOperation, Bytes)> {
        self.state.lock().submissions.last().cloned()
    }
}

impl Default for ScriptedRelay {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RelayRpc for ScriptedRelay {
    async fn submit_operation(
        &self,
        entry_point: Address,
        operation: &UserOperation,
        signature: &Bytes,
    ) -> Result<OperationHash, CovaultError> {
        let mut state = self.state.lock();
        if let Some(reason) = &state.reject {
            return Err(CovaultError::RelaySubmission { details: reason.clone() });
        }
        state.submissions.push((entry_point, operation.clone(), signature.clone()));
        let hash = OperationHash::new([state.next_hash_byte; 32]);
        state.next_hash_byte = state.next_hash_byte.wrapping_add(1);
        state.polls_seen = 0;
        state.last_hash = Some(hash);
        Ok(hash)
    }

    async fn settlement(&self, operation_hash: OperationHash) -> Result<Option<SettlementHash>, CovaultError> {
        let mut state = self.state.lock();
        if state.last_hash != Some(operation_hash) {
            return Ok(None);
        }
        if state.polls_seen < state.polls_until_settled {
            state.polls_seen += 1;
            return Ok(None);
        }
        Ok(Some(SettlementHash::new(*operation_hash.as_hash())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn await_settlement_polls_until_included() {
        let relay = ScriptedRelay::new();
        relay.settle_after_polls(2);
        let hash = relay
            .submit_operation(Address::ZERO, &sample_operation(), &Bytes::from(vec![1u8]))
            .await
            .expect("submit");
        let settlement =
            await_settlement(&relay, hash, Duration::from_secs(5), Duration::from_millis(1)).await.expect("settled");
        assert_eq!(settlement.as_hash(), hash.as_hash());
    }

    #[tokio::test]
    async fn await_settlement_times_out() {
        let relay = ScriptedRelay::new();
        relay.settle_after_polls(u32::MAX);
        let hash = relay
            .submit_operation(Address::ZERO, &sample_operation(), &Bytes::from(vec![1u8]))
            .await
            .expect("submit");
        let err = await_settlement(&relay, hash, Duration::from_millis(5), Duration::from_millis(1))
            .await
            .expect_err("timeout");
        assert!(matches!(err, CovaultError::SettlementTimeout { .. }));
    }

    fn sample_operation() -> UserOperation {
        use crate::domain::fee::compute_gas_fees;
        use alloy_primitives::U256;
        UserOperation::transfer(
            Address::from([0xAA; 20]),
            Address::from([0xBB; 20]),
            U256::from(1u64),
            compute_gas_fees(U256::from(50_000_000u64)),
        )
        .expect("operation")
    }
}
