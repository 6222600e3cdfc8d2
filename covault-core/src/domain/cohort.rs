use crate::foundation::CovaultError;
use alloy_primitives::Address;
use serde::{Deserialize, Serialize};

/// One member of the signing cohort as reported by the coordinator network.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct CohortParticipant {
    pub signer_address: Address,
    /// Network endpoint of the participant node, when the coordinator
    /// publishes one. Informational; signing goes through the coordinator.
    #[serde(default)]
    pub endpoint: Option<String>,
}

/// The resolved signer set for one cohort at one instant.
///
/// Snapshot semantics: the multisig address rotates over time, so a
/// descriptor is only valid for the resolution that produced it and must
/// never be cached across requests.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct CohortDescriptor {
    pub multisig: Address,
    /// Signer addresses in coordinator order. Ordering is part of the
    /// account-derivation input; re-sorting here would silently move every
    /// derived account.
    pub signers: Vec<Address>,
    pub threshold: u16,
}

impl CohortDescriptor {
    pub fn validate(&self) -> Result<(), CovaultError> {
        if self.signers.is_empty() {
            return Err(CovaultError::CohortUnavailable { details: "participant set is empty".to_string() });
        }
        if self.threshold == 0 {
            return Err(CovaultError::DerivationError("cohort threshold is zero".to_string()));
        }
        if usize::from(self.threshold) > self.signers.len() {
            return Err(CovaultError::DerivationError(format!(
                "threshold {} exceeds signer count {}",
                self.threshold,
                self.signers.len()
            )));
        }
        Ok(())
    }
}
