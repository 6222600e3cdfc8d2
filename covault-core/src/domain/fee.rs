use crate::foundation::MIN_PRIORITY_FEE_WEI;
use alloy_primitives::U256;
use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct GasFees {
    pub max_fee_per_gas: U256,
    pub max_priority_fee_per_gas: U256,
}

/// Price an operation off the current base fee.
///
/// `max_fee_per_gas` carries a 20% headroom over the observed base fee
/// (integer arithmetic, truncating). The priority fee is a tenth of the base
/// fee, floored at `MIN_PRIORITY_FEE_WEI`: the relay drops anything below
/// the floor without an error, so it has to be enforced here rather than
/// discovered as a silent stall.
pub fn compute_gas_fees(base_fee_per_gas: U256) -> GasFees {
    let max_fee_per_gas = base_fee_per_gas * U256::from(12u64) / U256::from(10u64);
    let floor = U256::from(MIN_PRIORITY_FEE_WEI);
    let tenth = base_fee_per_gas / U256::from(10u64);
    GasFees { max_fee_per_gas, max_priority_fee_per_gas: tenth.max(floor) }
}
