use crate::domain::cohort::CohortParticipant;
use crate::domain::operation::UserOperation;
use crate::foundation::{CovaultError, AA_VERSION};
use crate::infrastructure::rpc::HttpRpcClient;
use crate::infrastructure::signing::{AggregateSignature, SigningContext, SigningNetwork};
use alloy_primitives::Bytes;
use async_trait::async_trait;
use log::{debug, info};
use serde::Deserialize;
use std::time::Duration;

/// JSON-RPC client for the signing-coordinator network.
pub struct HttpSigningNetwork {
    rpc: HttpRpcClient,
}

#[derive(Debug, Deserialize)]
struct ParticipantWire {
    #[serde(alias = "signerAddress")]
    signer_address: alloy_primitives::Address,
    #[serde(default, alias = "provider")]
    endpoint: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignReply {
    status: String,
    #[serde(default)]
    aggregated_signature: Option<String>,
    #[serde(default)]
    reason: Option<String>,
}

impl HttpSigningNetwork {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, CovaultError> {
        Ok(Self { rpc: HttpRpcClient::new("signing-network", url, timeout)? })
    }

    fn scope(domain: &str, cohort_id: u32) -> serde_json::Value {
        serde_json::json!({ "domain": domain, "cohortId": cohort_id })
    }
}

#[async_trait]
impl SigningNetwork for HttpSigningNetwork {
    async fn participants(&self, domain: &str, cohort_id: u32) -> Result<Vec<CohortParticipant>, CovaultError> {
        let result = self.rpc.request("cohort_getParticipants", Self::scope(domain, cohort_id)).await?;
        let wire: Vec<ParticipantWire> = serde_json::from_value(result)?;
        debug!("fetched cohort participants domain={} cohort_id={} count={}", domain, cohort_id, wire.len());
        Ok(wire
            .into_iter()
            .map(|p| CohortParticipant { signer_address: p.signer_address, endpoint: p.endpoint })
            .collect())
    }

    async fn threshold(&self, domain: &str, cohort_id: u32) -> Result<u16, CovaultError> {
        let result = self.rpc.request("cohort_getThreshold", Self::scope(domain, cohort_id)).await?;
        serde_json::from_value(result).map_err(|err| CovaultError::upstream("signing-network", format!("bad threshold: {err}")))
    }

    async fn cohort_conditions(&self, domain: &str, cohort_id: u32, chain_id: u64) -> Result<serde_json::Value, CovaultError> {
        self.rpc
            .request(
                "cohort_getSigningConditions",
                serde_json::json!({ "domain": domain, "cohortId": cohort_id, "chainId": chain_id }),
            )
            .await
    }

    async fn sign_operation(
        &self,
        domain: &str,
        cohort_id: u32,
        chain_id: u64,
        operation: &UserOperation,
        context: &SigningContext,
    ) -> Result<AggregateSignature, CovaultError> {
        let params = serde_json::json!({
            "domain": domain,
            "cohortId": cohort_id,
            "chainId": chain_id,
            "aaVersion": AA_VERSION,
            "userOperation": operation,
            "context": context,
        });
        let result = self.rpc.request("cohort_signUserOperation", params).await?;
        let reply: SignReply = serde_json::from_value(result)?;

        if reply.status != "signed" {
            let reason = reply.reason.unwrap_or_else(|| format!("cohort returned status {}", reply.status));
            return Err(CovaultError::SigningFailed(reason));
        }
        let signature_hex = reply
            .aggregated_signature
            .ok_or_else(|| CovaultError::SigningFailed("cohort reported signed but sent no signature".to_string()))?;
        let signature = crate::foundation::util::encoding::decode_hex(&signature_hex)?;
        info!("cohort signature collected domain={} cohort_id={} signature_bytes={}", domain, cohort_id, signature.len());
        Ok(AggregateSignature { signature: Bytes::from(signature) })
    }
}
