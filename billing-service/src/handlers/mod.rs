//! REST handlers for the billing service.

pub mod bills;
pub mod tenants;
