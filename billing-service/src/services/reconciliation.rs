//! Batch penalty reconciliation.
//!
//! Recomputes the penalty of every unpaid bill from its original due date
//! and today's UTC date. The computation is a pure overwrite, so the pass
//! is idempotent and safe to repeat; `payment_status` is never touched
//! here.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use futures::future::join_all;
use serde::Serialize;
use service_core::error::AppError;
use tracing::{error, info, instrument};

use crate::billing::penalty::compute_penalty;
use crate::services::Database;
use crate::services::metrics::{record_penalty_update, record_reconciliation_run};

/// Outcome summary of one reconciliation pass.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct ReconciliationSummary {
    pub bills_processed: usize,
    pub bills_updated: usize,
    pub bills_failed: usize,
}

impl ReconciliationSummary {
    pub fn message(&self) -> String {
        if self.bills_processed == 0 {
            "no unpaid bills".to_string()
        } else {
            format!(
                "recomputed penalties for {} of {} unpaid bills",
                self.bills_updated, self.bills_processed
            )
        }
    }
}

/// Run one reconciliation pass over all unpaid bills.
///
/// Per-bill updates are independent and dispatched concurrently; a failed
/// row is logged and counted without aborting the rest of the pass.
#[instrument(skip(db))]
pub async fn reconcile_overdue(db: &Database) -> Result<ReconciliationSummary, AppError> {
    let bills = db.list_unpaid_bills().await?;
    if bills.is_empty() {
        info!("No unpaid bills to reconcile");
        return Ok(ReconciliationSummary::default());
    }

    let today = Utc::now().date_naive();
    let updates = bills.iter().map(|bill| {
        let penalty = compute_penalty(bill.amount, bill.original_due_date.date_naive(), today);
        let bill_id = bill.bill_id;
        async move { db.update_penalty(bill_id, penalty).await.map_err(|e| (bill_id, e)) }
    });

    let mut summary = ReconciliationSummary {
        bills_processed: bills.len(),
        ..Default::default()
    };
    for result in join_all(updates).await {
        match result {
            Ok(()) => {
                summary.bills_updated += 1;
                record_penalty_update("ok");
            }
            Err((bill_id, e)) => {
                error!(bill_id = %bill_id, error = %e, "Failed to update penalty");
                summary.bills_failed += 1;
                record_penalty_update("error");
            }
        }
    }

    info!(
        processed = summary.bills_processed,
        updated = summary.bills_updated,
        failed = summary.bills_failed,
        "Reconciliation pass complete"
    );

    Ok(summary)
}

/// Periodic reconciliation loop. Ticks immediately on startup, then every
/// `interval_secs` until the process shuts down.
pub async fn run_scheduler(db: Arc<Database>, interval_secs: u64) {
    let mut ticker = tokio::time::interval(Duration::from_secs(interval_secs));
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    info!(interval_secs = interval_secs, "Reconciliation scheduler started");

    loop {
        ticker.tick().await;
        match reconcile_overdue(&db).await {
            Ok(summary) => {
                record_reconciliation_run("scheduled", "completed");
                info!(
                    updated = summary.bills_updated,
                    failed = summary.bills_failed,
                    "Scheduled reconciliation finished"
                );
            }
            Err(e) => {
                record_reconciliation_run("scheduled", "failed");
                error!(error = %e, "Scheduled reconciliation failed");
            }
        }
    }
}
