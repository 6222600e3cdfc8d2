use crate::domain::cohort::CohortParticipant;
use crate::domain::operation::UserOperation;
use crate::foundation::CovaultError;
use alloy_primitives::Bytes;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::BTreeMap;

pub mod http;

pub use http::HttpSigningNetwork;

/// The condition context a cohort evaluates before co-signing.
///
/// `conditions` is the cohort's own policy document, fetched from the
/// coordinator network and treated as opaque; `parameters` are the named
/// values (`:timestamp`, `:signature`, `:discordPayload`) injected per
/// request for the policy to evaluate against.
#[derive(Clone, Debug, Default, serde::Serialize)]
pub struct SigningContext {
    pub conditions: serde_json::Value,
    pub parameters: BTreeMap<String, serde_json::Value>,
}

impl SigningContext {
    pub fn insert_parameter(&mut self, name: &str, value: serde_json::Value) {
        self.parameters.insert(name.to_string(), value);
    }
}

#[derive(Clone, Debug)]
pub struct AggregateSignature {
    pub signature: Bytes,
}

/// Client boundary to the threshold-signing coordinator network. The
/// cryptographic protocol lives entirely on the other side; this trait only
/// sequences requests and carries results.
#[async_trait]
pub trait SigningNetwork: Send + Sync {
    async fn participants(&self, domain: &str, cohort_id: u32) -> Result<Vec<CohortParticipant>, CovaultError>;

    async fn threshold(&self, domain: &str, cohort_id: u32) -> Result<u16, CovaultError>;

    /// Base condition context scoped to `(domain, cohort, execution chain)`.
    async fn cohort_conditions(&self, domain: &str, cohort_id: u32, chain_id: u64) -> Result<serde_json::Value, CovaultError>;

    /// Request the cohort's aggregate signature over the operation under the
    /// given context. A policy decline is `SigningFailed`; transport trouble
    /// is `UpstreamUnavailable`.
    async fn sign_operation(
        &self,
        domain: &str,
        cohort_id: u32,
        chain_id: u64,
        operation: &UserOperation,
        context: &SigningContext,
    ) -> Result<AggregateSignature, CovaultError>;
}

/// Scripted signing network for tests: fixed participants/threshold, a
/// canned signature, and per-method call counters so tests can assert the
/// cohort was never contacted on rejected requests.
pub struct ScriptedSigningNetwork {
    state: Mutex<ScriptedState>,
}

struct ScriptedState {
    participants: Vec<CohortParticipant>,
    threshold: u16,
    conditions: serde_json::Value,
    signature: Bytes,
    decline: Option<String>,
    conditions_error: bool,
    calls: u64,
    sign_calls: u64,
    last_context: Option<SigningContext>,
}

impl ScriptedSigningNetwork {
    pub fn new(participants: Vec<CohortParticipant>, threshold: u16) -> Self {
        Self {
            state: Mutex::new(ScriptedState {
                participants,
                threshold,
                conditions: serde_json::json!({"conditionType": "time", "method": "blocktime"}),
                signature: Bytes::from(vec![0x51; 65]),
                decline: None,
                conditions_error: false,
                calls: 0,
                sign_calls: 0,
                last_context: None,
            }),
        }
    }

    pub fn decline_with(&self, reason: &str) {
        self.state.lock().decline = Some(reason.to_string());
    }

    pub fn fail_conditions(&self) {
        self.state.lock().conditions_error = true;
    }

    pub fn total_calls(&self) -> u64 {
        self.state.lock().calls
    }

    pub fn sign_calls(&self) -> u64 {
        self.state.lock().sign_calls
    }

    pub fn last_context(&self) -> Option<SigningContext> {
        self.state.lock().last_context.clone()
    }
}

#[async_trait]
impl SigningNetwork for ScriptedSigningNetwork {
    async fn participants(&self, _domain: &str, _cohort_id: u32) -> Result<Vec<CohortParticipant>, CovaultError> {
        let mut state = self.state.lock();
        state.calls += 1;
        Ok(state.participants.clone())
    }

    async fn threshold(&self, _domain: &str, _cohort_id: u32) -> Result<u16, CovaultError> {
        let mut state = self.state.lock();
        state.calls += 1;
        Ok(state.threshold)
    }

    async fn cohort_conditions(&self, _domain: &str, _cohort_id: u32, _chain_id: u64) -> Result<serde_json::Value, CovaultError> {
        let mut state = self.state.lock();
        state.calls += 1;
        if state.conditions_error {
            return Err(CovaultError::upstream("signing-network", "conditions unavailable"));
        }
        Ok(state.conditions.clone())
    }

    async fn sign_operation(
        &self,
        _domain: &str,
        _cohort_id: u32,
        _chain_id: u64,
        _operation: &UserOperation,
        context: &SigningContext,
    ) -> Result<AggregateSignature, CovaultError> {
        let mut state = self.state.lock();
        state.calls += 1;
        state.sign_calls += 1;
        state.last_context = Some(context.clone());
        if let Some(reason) = &state.decline {
            return Err(CovaultError::SigningFailed(reason.clone()));
        }
        Ok(AggregateSignature { signature: state.signature.clone() })
    }
}
