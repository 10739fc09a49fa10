//! Rent and utility billing service for property-management operations.
//!
//! The billing-cycle core lives in [`billing`]; [`handlers`] exposes it
//! over REST and [`services`] holds persistence, metrics, and the
//! scheduled reconciliation job.

pub mod billing;
pub mod config;
pub mod handlers;
pub mod models;
pub mod services;
pub mod startup;
