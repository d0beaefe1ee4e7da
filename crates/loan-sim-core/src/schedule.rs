//! Calendar plumbing for monthly repayment schedules.
//!
//! Schedules are driven by period index, not by date comparison:
//! period `k` of an instrument bound at `start` falls on
//! `start + k months`, and anniversary checks use `k % 12`. This keeps
//! end-of-month clamping (Jan 31 + 1 month = Feb 28) from ever
//! desynchronizing the anniversary test from the payment dates.

use chrono::{Datelike, Months, NaiveDate};

use crate::error::LoanSimError;
use crate::types::YearsMonths;
use crate::LoanSimResult;

/// Date `n` whole months after `date`, day-of-month clamped.
pub fn add_months(date: NaiveDate, n: u32) -> LoanSimResult<NaiveDate> {
    date.checked_add_months(Months::new(n))
        .ok_or_else(|| LoanSimError::DateError(format!("{date} + {n} months overflows")))
}

/// Elapsed span between two dates as whole years plus residual months:
/// the largest `m` such that `start + m months <= end`.
///
/// A final partial month does not count, but a month-end clamped end
/// date is a whole month: Jan 31 plus thirteen months lands on Feb 28,
/// so Jan 31 → Feb 28 of the next year is thirteen months, not twelve.
pub fn years_months_between(start: NaiveDate, end: NaiveDate) -> YearsMonths {
    let mut months =
        (end.year() - start.year()) * 12 + end.month() as i32 - start.month() as i32;
    if months > 0
        && start
            .checked_add_months(Months::new(months as u32))
            .is_some_and(|candidate| candidate > end)
    {
        months -= 1;
    }
    if months < 0 {
        months = 0;
    }
    YearsMonths {
        years: months / 12,
        months: (months % 12) as u32,
    }
}

/// Whether period `k` (1-based) of a `term_years` schedule falls on an
/// overpayment-eligible anniversary: the first anniversary through the
/// penultimate one. The final term anniversary is excluded.
pub fn is_overpay_anniversary(period: u32, term_years: u32) -> bool {
    period % 12 == 0 && period / 12 < term_years
}
