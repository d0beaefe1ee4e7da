//! Deterministic loan repayment simulation.
//!
//! A [`Loan`] holds a borrowed amount and an ordered list of
//! [`Mortgage`] instruments. [`Loan::payoff`] runs each instrument in
//! turn against the outstanding balance — monthly interest accrual,
//! capped repayment, anniversary overpayments, upfront downpayments —
//! until the balance reaches zero or the instruments run out. All
//! arithmetic is `rust_decimal::Decimal`; results are bit-for-bit
//! reproducible and carry full per-period audit records for external
//! rendering.

pub mod error;
pub mod loan;
pub mod mortgage;
pub mod schedule;
pub mod types;

pub use error::LoanSimError;
pub use loan::{Loan, PayoffOutput};
pub use mortgage::{Mortgage, MortgageOutcome, PeriodRecord};
pub use types::*;

/// Standard result type for all loan-sim operations
pub type LoanSimResult<T> = Result<T, LoanSimError>;
