use crate::foundation::CovaultError;
use alloy_primitives::{Address, Bytes, U256};
use async_trait::async_trait;
use parking_lot::Mutex;

pub mod abi;
pub mod http;
pub mod retry;

pub use http::HttpRpcClient;
pub use retry::retry_with_backoff;

/// Read-only view of the execution chain holding the accounts.
#[async_trait]
pub trait ExecutionRpc: Send + Sync {
    async fn get_balance(&self, address: Address) -> Result<U256, CovaultError>;
    async fn base_fee_per_gas(&self) -> Result<U256, CovaultError>;
    async fn get_code(&self, address: Address) -> Result<Bytes, CovaultError>;
}

/// Contract reads against the chain hosting the cohort coordinator. May be a
/// different network than the execution chain.
#[async_trait]
pub trait CoordinatorRpc: Send + Sync {
    async fn cohort_multisig(&self, coordinator: Address, cohort_id: u32) -> Result<Address, CovaultError>;
    async fn multisig_signers(&self, multisig: Address) -> Result<Vec<Address>, CovaultError>;
    async fn multisig_threshold(&self, multisig: Address) -> Result<u16, CovaultError>;
}

/// In-memory chain double for tests: fixed balances, base fee, and cohort
/// wiring, with call counters so tests can assert what was (not) touched.
#[derive(Default)]
pub struct StaticChainRpc {
    state: Mutex<StaticChainState>,
}

#[derive(Default)]
struct StaticChainState {
    balances: std::collections::HashMap<Address, U256>,
    base_fee: U256,
    code: std::collections::HashMap<Address, Bytes>,
    multisig: Address,
    signers: Vec<Address>,
    threshold: u16,
    read_calls: u64,
}

impl StaticChainRpc {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_balance(&self, address: Address, balance: U256) {
        self.state.lock().balances.insert(address, balance);
    }

    pub fn set_base_fee(&self, base_fee: U256) {
        self.state.lock().base_fee = base_fee;
    }

    pub fn set_cohort(&self, multisig: Address, signers: Vec<Address>, threshold: u16) {
        let mut state = self.state.lock();
        state.multisig = multisig;
        state.code.insert(multisig, Bytes::from(vec![0x60, 0x80]));
        state.signers = signers;
        state.threshold = threshold;
    }

    pub fn read_calls(&self) -> u64 {
        self.state.lock().read_calls
    }
}

#[async_trait]
impl ExecutionRpc for StaticChainRpc {
    async fn get_balance(&self, address: Address) -> Result<U256, CovaultError> {
        let mut state = self.state.lock();
        state.read_calls += 1;
        Ok(state.balances.get(&address).copied().unwrap_or(U256::ZERO))
    }

    async fn base_fee_per_gas(&self) -> Result<U256, CovaultError> {
        let mut state = self.state.lock();
        state.read_calls += 1;
        Ok(state.base_fee)
    }

    async fn get_code(&self, address: Address) -> Result<Bytes, CovaultError> {
        let mut state = self.state.lock();
        state.read_calls += 1;
        Ok(state.code.get(&address).cloned().unwrap_or_default())
    }
}

#[async_trait]
impl CoordinatorRpc for StaticChainRpc {
    async fn cohort_multisig(&self, _coordinator: Address, _cohort_id: u32) -> Result<Address, CovaultError> {
        let mut state = self.state.lock();
        state.read_calls += 1;
        Ok(state.multisig)
    }

    async fn multisig_signers(&self, _multisig: Address) -> Result<Vec<Address>, CovaultError> {
        let mut state = self.state.lock();
        state.read_calls += 1;
        Ok(state.signers.clone())
    }

    async fn multisig_threshold(&self, _multisig: Address) -> Result<u16, CovaultError> {
        let mut state = self.state.lock();
        state.read_calls += 1;
        Ok(state.threshold)
    }
}
