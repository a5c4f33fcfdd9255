mod coordinator;
mod errors;
mod outcomes;
mod reconciliation;

pub use coordinator::LendingCoordinator;
pub use errors::{LendingError, Result};
pub use outcomes::{CopyHoldings, LoanStarted, ReconciliationReport, RequestOutcome, ReturnOutcome};
