//! Bill model.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Kind of bill. Rent and utility bills share one lifecycle and differ
/// only in what is being charged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BillKind {
    Rent,
    Utility,
}

impl BillKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BillKind::Rent => "rent",
            BillKind::Utility => "utility",
        }
    }

    pub fn from_string(s: &str) -> Self {
        match s {
            "utility" => BillKind::Utility,
            _ => BillKind::Rent,
        }
    }
}

/// Payment status of the current billing cycle.
///
/// Moves forward `pending -> submitted -> paid`; approval rolls the same
/// row into a new cycle rather than inserting a new one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Submitted,
    Paid,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Submitted => "submitted",
            PaymentStatus::Paid => "paid",
        }
    }

    pub fn from_string(s: &str) -> Self {
        match s {
            "submitted" => PaymentStatus::Submitted,
            "paid" => PaymentStatus::Paid,
            _ => PaymentStatus::Pending,
        }
    }
}

/// Bill row.
///
/// `due_date` and `original_due_date` are always 23:59:59 of a calendar
/// day and move together when a cycle rolls over; `original_due_date` is
/// the anchor penalty accrual counts from. `penalty` is recomputed from
/// scratch on every reconciliation pass, never accumulated.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Bill {
    pub bill_id: Uuid,
    pub tenant_id: Uuid,
    pub kind: String,
    pub bill_date: NaiveDate,
    pub due_date: DateTime<Utc>,
    pub original_due_date: DateTime<Utc>,
    pub amount: Decimal,
    pub penalty: Decimal,
    pub payment_term: i32,
    pub payment_status: String,
    pub payment_proof_url: Option<String>,
    pub created_utc: DateTime<Utc>,
    pub updated_utc: DateTime<Utc>,
}

/// Input for creating a bill.
#[derive(Debug, Clone)]
pub struct CreateBill {
    pub tenant_id: Uuid,
    pub kind: BillKind,
    pub bill_date: NaiveDate,
    pub amount: Decimal,
    pub due_date: DateTime<Utc>,
    pub original_due_date: DateTime<Utc>,
    pub payment_term: i32,
}

/// Filter parameters for listing bills.
#[derive(Debug, Clone, Default)]
pub struct ListBillsFilter {
    pub kind: Option<BillKind>,
    pub status: Option<PaymentStatus>,
    pub tenant_id: Option<Uuid>,
}
