//! Bill lifecycle handlers: generation, proof submission, approval, and
//! reconciliation.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use service_core::error::AppError;
use uuid::Uuid;

use crate::billing::cycle::{initial_schedule, rollover_on_approval};
use crate::models::{Bill, BillKind, CreateBill, ListBillsFilter, PaymentStatus};
use crate::services::metrics::{record_bill_operation, record_reconciliation_run};
use crate::services::{ReconciliationSummary, reconcile_overdue};
use crate::startup::AppState;

#[derive(Debug, Deserialize)]
pub struct ListBillsQuery {
    pub kind: Option<String>,
    pub status: Option<String>,
    pub tenant_id: Option<Uuid>,
}

/// List bills, optionally filtered by kind, status, or tenant.
pub async fn list_bills(
    State(state): State<AppState>,
    Query(query): Query<ListBillsQuery>,
) -> Result<Json<Vec<Bill>>, AppError> {
    let filter = ListBillsFilter {
        kind: query.kind.as_deref().map(BillKind::from_string),
        status: query.status.as_deref().map(PaymentStatus::from_string),
        tenant_id: query.tenant_id,
    };

    let bills = state.db.list_bills(&filter).await?;
    Ok(Json(bills))
}

/// Get a bill by id.
pub async fn get_bill(
    State(state): State<AppState>,
    Path(bill_id): Path<Uuid>,
) -> Result<Json<Bill>, AppError> {
    let bill = state
        .db
        .get_bill(bill_id)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Bill not found")))?;

    Ok(Json(bill))
}

#[derive(Debug, Deserialize)]
pub struct GenerateBillRequest {
    pub tenant_id: Option<Uuid>,
    pub kind: Option<String>,
    pub bill_date: Option<NaiveDate>,
    pub amount: Option<Decimal>,
    pub due_date: Option<DateTime<Utc>>,
    pub original_due_date: Option<DateTime<Utc>>,
}

/// Generate a bill for a tenant. The due date is computed from the
/// tenant's payment term unless one is supplied explicitly.
pub async fn generate_bill(
    State(state): State<AppState>,
    Json(payload): Json<GenerateBillRequest>,
) -> Result<(StatusCode, Json<Bill>), AppError> {
    let tenant_id = payload
        .tenant_id
        .ok_or_else(|| AppError::BadRequest(anyhow::anyhow!("tenant_id is required")))?;
    let bill_date = payload
        .bill_date
        .ok_or_else(|| AppError::BadRequest(anyhow::anyhow!("bill_date is required")))?;
    let amount = payload
        .amount
        .ok_or_else(|| AppError::BadRequest(anyhow::anyhow!("amount is required")))?;
    let kind = payload
        .kind
        .as_deref()
        .map(BillKind::from_string)
        .unwrap_or(BillKind::Rent);

    let tenant = state
        .db
        .get_tenant(tenant_id)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Tenant not found")))?;
    let payment_term = tenant.effective_payment_term();

    let (due_date, original_due_date) = match payload.due_date {
        Some(due) => (due, payload.original_due_date.unwrap_or(due)),
        None => {
            let schedule = initial_schedule(bill_date, payment_term);
            (schedule.due_date, schedule.due_date)
        }
    };

    tracing::info!(
        tenant_id = %tenant_id,
        kind = kind.as_str(),
        bill_date = %bill_date,
        due_date = %due_date,
        "Generating bill"
    );

    let bill = state
        .db
        .create_bill(&CreateBill {
            tenant_id,
            kind,
            bill_date,
            amount,
            due_date,
            original_due_date,
            payment_term,
        })
        .await?;

    record_bill_operation(kind.as_str(), "generate");
    Ok((StatusCode::CREATED, Json(bill)))
}

#[derive(Debug, Deserialize)]
pub struct SubmitProofRequest {
    pub proof_url: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SubmitProofResponse {
    pub bill_id: Uuid,
}

/// Attach a payment proof and mark the bill submitted. Re-submission
/// overwrites the previous proof.
pub async fn submit_proof(
    State(state): State<AppState>,
    Path(bill_id): Path<Uuid>,
    Json(payload): Json<SubmitProofRequest>,
) -> Result<Json<SubmitProofResponse>, AppError> {
    let proof_url = payload
        .proof_url
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::BadRequest(anyhow::anyhow!("proof_url is required")))?;

    let bill = state
        .db
        .submit_proof(bill_id, proof_url)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Bill not found")))?;

    record_bill_operation(&bill.kind, "submit_proof");
    Ok(Json(SubmitProofResponse {
        bill_id: bill.bill_id,
    }))
}

#[derive(Debug, Serialize)]
pub struct ApprovePaymentResponse {
    pub bill_id: Uuid,
    pub new_bill_date: NaiveDate,
    pub new_due_date: DateTime<Utc>,
}

/// Approve a submitted payment and roll the bill into its next cycle.
///
/// The rollover is a conditional write: it only applies while the bill is
/// still `submitted`, so a concurrent double-approval loses cleanly.
pub async fn approve_payment(
    State(state): State<AppState>,
    Path(bill_id): Path<Uuid>,
) -> Result<Json<ApprovePaymentResponse>, AppError> {
    let bill = state
        .db
        .get_bill(bill_id)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Bill not found")))?;

    let schedule = rollover_on_approval(Utc::now(), bill.due_date, bill.payment_term);

    let approved = state.db.approve_bill(bill_id, &schedule).await?;
    if !approved {
        return Err(AppError::Conflict(anyhow::anyhow!(
            "Bill not found or payment has not been submitted"
        )));
    }

    tracing::info!(
        bill_id = %bill_id,
        new_bill_date = %schedule.bill_date,
        new_due_date = %schedule.due_date,
        "Payment approved, bill rolled into next cycle"
    );
    record_bill_operation(&bill.kind, "approve");

    Ok(Json(ApprovePaymentResponse {
        bill_id,
        new_bill_date: schedule.bill_date,
        new_due_date: schedule.due_date,
    }))
}

#[derive(Debug, Serialize)]
pub struct ReconcileResponse {
    pub message: String,
    #[serde(flatten)]
    pub summary: ReconciliationSummary,
}

/// Recompute penalties for all unpaid bills on demand.
pub async fn reconcile(State(state): State<AppState>) -> Result<Json<ReconcileResponse>, AppError> {
    let summary = match reconcile_overdue(&state.db).await {
        Ok(summary) => {
            record_reconciliation_run("manual", "completed");
            summary
        }
        Err(e) => {
            record_reconciliation_run("manual", "failed");
            return Err(e);
        }
    };

    Ok(Json(ReconcileResponse {
        message: summary.message(),
        summary,
    }))
}
