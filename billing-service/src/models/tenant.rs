//! Tenant model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::billing::cycle::DEFAULT_PAYMENT_TERM;

/// Tenant row. The subject every bill belongs to.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Tenant {
    pub tenant_id: Uuid,
    pub full_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub unit_label: Option<String>,
    pub payment_term: Option<i32>,
    pub created_utc: DateTime<Utc>,
    pub updated_utc: DateTime<Utc>,
}

impl Tenant {
    /// Days granted per billing cycle, falling back to the default when
    /// unset or non-positive.
    pub fn effective_payment_term(&self) -> i32 {
        match self.payment_term {
            Some(term) if term > 0 => term,
            _ => DEFAULT_PAYMENT_TERM,
        }
    }
}

/// Input for creating a tenant.
#[derive(Debug, Clone)]
pub struct CreateTenant {
    pub full_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub unit_label: Option<String>,
    pub payment_term: Option<i32>,
}
