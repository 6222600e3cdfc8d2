pub mod account;
pub mod authorization;
pub mod cohort;
pub mod fee;
pub mod operation;

pub use account::{compute_deploy_salt, counterfactual_address, AccountDescriptor};
pub use authorization::{parse_transfer_override, AuthorizationProof, TransferOverride};
pub use cohort::{CohortDescriptor, CohortParticipant};
pub use fee::{compute_gas_fees, GasFees};
pub use operation::{compute_operation_hash, Call, TransferResult, UserOperation};
