//! Domain models for billing-service.

mod bill;
mod tenant;

pub use bill::{Bill, BillKind, CreateBill, ListBillsFilter, PaymentStatus};
pub use tenant::{CreateTenant, Tenant};
