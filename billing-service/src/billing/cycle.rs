//! Billing-cycle schedule computation.
//!
//! A cycle is described by its start date and its end-of-day due instant.
//! Approval rolls the same bill into a new cycle: paying early credits the
//! unused days to the next cycle, paying late shrinks it, floored at zero.

use chrono::{DateTime, NaiveDate, Utc};

use crate::billing::dates::{add_days, days_between, end_of_day};

/// Days granted per cycle when the tenant has no explicit term.
pub const DEFAULT_PAYMENT_TERM: i32 = 30;

/// Start and due dates of one billing cycle. At the start of a cycle the
/// original due date always equals the due date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleSchedule {
    pub bill_date: NaiveDate,
    pub due_date: DateTime<Utc>,
}

/// Schedule for a freshly generated bill: due `payment_term` days after
/// the bill date, at end of day.
pub fn initial_schedule(bill_date: NaiveDate, payment_term: i32) -> CycleSchedule {
    CycleSchedule {
        bill_date,
        due_date: end_of_day(add_days(bill_date, i64::from(payment_term))),
    }
}

/// Schedule for the cycle that starts when a payment is approved.
///
/// Strictly before the due instant is the early branch; exact equality
/// routes to the on-time/late branch. Day counting is date-only on both
/// branches, and the late branch never yields a negative cycle length.
pub fn rollover_on_approval(
    now: DateTime<Utc>,
    due_date: DateTime<Utc>,
    payment_term: i32,
) -> CycleSchedule {
    let today = now.date_naive();
    let cycle_days = if now < due_date {
        i64::from(payment_term) + days_between(today, due_date.date_naive())
    } else {
        (i64::from(payment_term) - days_between(due_date.date_naive(), today)).max(0)
    };

    CycleSchedule {
        bill_date: today,
        due_date: end_of_day(add_days(today, cycle_days)),
    }
}
