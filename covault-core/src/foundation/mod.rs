pub mod constants;
pub mod error;
pub mod types;
pub mod util;

pub use constants::*;
pub use error::{CovaultError, ErrorCode, Result};
pub use types::{DeploySalt, Hash32, OperationHash, SettlementHash, UserId};
