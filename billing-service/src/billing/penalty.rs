//! Penalty accrual.
//!
//! A bill accrues a simple, non-compounding penalty of 1% of the
//! principal per day past the cycle's original due date. The result of
//! [`compute_penalty`] always replaces the stored value; nothing in the
//! service increments a penalty in place.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::billing::dates::days_between;

/// Fraction of the principal charged per overdue day.
pub const DAILY_PENALTY_RATE: Decimal = dec!(0.01);

/// Penalty owed on `amount` as of `as_of`, anchored at the cycle's
/// original due date. Zero on or before the due date (date-only
/// comparison).
pub fn compute_penalty(amount: Decimal, original_due: NaiveDate, as_of: NaiveDate) -> Decimal {
    let days_overdue = days_between(original_due, as_of);
    if days_overdue <= 0 {
        return Decimal::ZERO;
    }
    amount * DAILY_PENALTY_RATE * Decimal::from(days_overdue)
}
