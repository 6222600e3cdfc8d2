use crate::domain::fee::GasFees;
use crate::foundation::{CovaultError, OperationHash, SettlementHash, VERIFICATION_GAS_LIMIT};
use alloy_primitives::{keccak256, Address, Bytes, B256, U256};
use serde::Serialize;

const OPERATION_HASH_DOMAIN_V1: &[u8] = b"covault:userop:v1:";

/// One inner call carried by a user operation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Call {
    pub target: Address,
    pub value: U256,
    pub data: Bytes,
}

impl Call {
    pub fn transfer(target: Address, value: U256) -> Self {
        Self { target, value, data: Bytes::new() }
    }
}

/// An intended transfer, pre-signature. The relay completes gas estimation
/// and paymaster fields; the cohort signs over what is here.
#[derive(Clone, Debug, Serialize)]
pub struct UserOperation {
    pub sender: Address,
    pub calls: Vec<Call>,
    pub max_fee_per_gas: U256,
    pub max_priority_fee_per_gas: U256,
    pub verification_gas_limit: u64,
}

impl UserOperation {
    pub fn transfer(sender: Address, target: Address, value: U256, fees: GasFees) -> Result<Self, CovaultError> {
        Self::new(sender, vec![Call::transfer(target, value)], fees)
    }

    pub fn new(sender: Address, calls: Vec<Call>, fees: GasFees) -> Result<Self, CovaultError> {
        if calls.is_empty() {
            return Err(CovaultError::InvalidRequest("operation carries no calls".to_string()));
        }
        Ok(Self {
            sender,
            calls,
            max_fee_per_gas: fees.max_fee_per_gas,
            max_priority_fee_per_gas: fees.max_priority_fee_per_gas,
            verification_gas_limit: VERIFICATION_GAS_LIMIT,
        })
    }
}

/// Content hash of an operation, used as the idempotency handle when a
/// failed submission has to be investigated or retried out of band.
pub fn compute_operation_hash(op: &UserOperation) -> OperationHash {
    let mut buf = Vec::with_capacity(160);
    buf.extend_from_slice(OPERATION_HASH_DOMAIN_V1);
    buf.extend_from_slice(op.sender.as_slice());
    buf.extend_from_slice(&(op.calls.len() as u32).to_le_bytes());
    for call in &op.calls {
        buf.extend_from_slice(call.target.as_slice());
        buf.extend_from_slice(&B256::from(call.value).0);
        buf.extend_from_slice(&(call.data.len() as u32).to_le_bytes());
        buf.extend_from_slice(&call.data);
    }
    buf.extend_from_slice(&B256::from(op.max_fee_per_gas).0);
    buf.extend_from_slice(&B256::from(op.max_priority_fee_per_gas).0);
    buf.extend_from_slice(&op.verification_gas_limit.to_le_bytes());
    OperationHash::new(keccak256(&buf).0)
}

/// Outcome of a completed transfer. Both hashes are populated only after the
/// relay accepted the operation and reported settlement.
#[derive(Clone, Debug, Serialize)]
pub struct TransferResult {
    pub sender: Address,
    pub receiver: Address,
    pub amount_wei: U256,
    pub operation_hash: OperationHash,
    pub settlement_hash: SettlementHash,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::fee::compute_gas_fees;

    fn addr(byte: u8) -> Address {
        Address::from([byte; 20])
    }

    #[test]
    fn transfer_builds_single_call() {
        let fees = compute_gas_fees(U256::from(50_000_000u64));
        let op = UserOperation::transfer(addr(0xAA), addr(0xBE), U256::from(42u64), fees).expect("build");
        assert_eq!(op.calls.len(), 1);
        assert_eq!(op.calls[0].target, addr(0xBE));
        assert_eq!(op.calls[0].value, U256::from(42u64));
        assert!(op.calls[0].data.is_empty());
        assert_eq!(op.verification_gas_limit, VERIFICATION_GAS_LIMIT);
    }

    #[test]
    fn empty_calls_rejected() {
        let fees = compute_gas_fees(U256::from(1_000u64));
        assert!(matches!(UserOperation::new(addr(1), vec![], fees), Err(CovaultError::InvalidRequest(_))));
    }

    #[test]
    fn operation_hash_commits_to_content() {
        let fees = compute_gas_fees(U256::from(50_000_000u64));
        let op = UserOperation::transfer(addr(0xAA), addr(0xBE), U256::from(42u64), fees).expect("build");
        let same = UserOperation::transfer(addr(0xAA), addr(0xBE), U256::from(42u64), fees).expect("build");
        assert_eq!(compute_operation_hash(&op), compute_operation_hash(&same));

        let other_amount = UserOperation::transfer(addr(0xAA), addr(0xBE), U256::from(43u64), fees).expect("build");
        assert_ne!(compute_operation_hash(&op), compute_operation_hash(&other_amount));

        let other_target = UserOperation::transfer(addr(0xAA), addr(0xBF), U256::from(42u64), fees).expect("build");
        assert_ne!(compute_operation_hash(&op), compute_operation_hash(&other_target));
    }
}
