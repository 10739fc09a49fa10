//! Service layer: persistence, metrics, and the reconciliation job.

mod database;
pub mod metrics;
mod reconciliation;

pub use database::Database;
pub use metrics::{get_metrics, init_metrics};
pub use reconciliation::{ReconciliationSummary, reconcile_overdue, run_scheduler};
