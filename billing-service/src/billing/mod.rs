//! Billing-cycle core: date arithmetic, penalty accrual, and cycle
//! schedule computation shared by rent and utility bills.

pub mod cycle;
pub mod dates;
pub mod penalty;
