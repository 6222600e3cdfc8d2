pub mod accounts;
pub mod orchestrator;
pub mod resolver;
pub mod signing_context;

pub use accounts::{AccountInfo, AccountService};
pub use orchestrator::{TransferOrchestrator, TransferRequest};
pub use resolver::{resolver_for, ChildCoordinatorResolver, CohortResolver, RootCoordinatorResolver};
pub use signing_context::build_signing_context;
