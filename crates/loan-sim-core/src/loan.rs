//! Loan orchestrator: sequences instruments against the running
//! balance and decides when repayment stops.

use std::time::Instant;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::LoanSimError;
use crate::mortgage::{Mortgage, MortgageOutcome};
use crate::schedule::years_months_between;
use crate::types::{with_metadata, ComputationOutput, LoanStatus, Money, YearsMonths};
use crate::LoanSimResult;

/// Tolerance for reconciling the orchestrator's `repaid − interest`
/// netting against an instrument's internal balance. The two are
/// algebraically identical; they can differ by an ulp when long
/// compounding runs saturate Decimal's 96-bit mantissa.
const RECONCILE_EPSILON: Decimal = dec!(0.000001);

/// A borrowed amount and the ordered instruments that repay it.
///
/// The instrument list is immutable configuration; [`payoff`] walks it
/// with a cursor so the original definitions stay inspectable after
/// the run.
///
/// [`payoff`]: Loan::payoff
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Loan {
    pub principal: Money,
    /// First accrual date.
    pub start: NaiveDate,
    pub mortgages: Vec<Mortgage>,
}

/// Final state of a payoff run, plus the full per-instrument audit
/// trail for external reporting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayoffOutput {
    pub principal: Money,
    /// Balance when the run stopped. Zero or below means paid off;
    /// positive means the instruments were exhausted short.
    pub outstanding: Money,
    /// Cumulative interest paid across all processed instruments.
    pub cost: Money,
    pub start: NaiveDate,
    /// End date returned by the last processed instrument.
    pub end: NaiveDate,
    pub duration: YearsMonths,
    pub status: LoanStatus,
    pub instruments: Vec<MortgageOutcome>,
    /// Instruments never invoked because the balance reached zero.
    pub instruments_unused: u32,
}

impl Loan {
    pub fn new(
        principal: Money,
        start: NaiveDate,
        mortgages: Vec<Mortgage>,
    ) -> LoanSimResult<Self> {
        let loan = Loan {
            principal,
            start,
            mortgages,
        };
        loan.validate()?;
        Ok(loan)
    }

    pub fn validate(&self) -> LoanSimResult<()> {
        if self.principal <= Decimal::ZERO {
            return Err(LoanSimError::InvalidInput {
                field: "principal".into(),
                reason: "borrowed amount must be positive".into(),
            });
        }
        if self.mortgages.is_empty() {
            return Err(LoanSimError::InvalidInput {
                field: "mortgages".into(),
                reason: "at least one instrument is required".into(),
            });
        }
        for mortgage in &self.mortgages {
            mortgage.validate()?;
        }
        Ok(())
    }

    /// Look up an instrument by name (audit aid for single-instrument
    /// schedule runs).
    pub fn instrument(&self, name: &str) -> Option<&Mortgage> {
        self.mortgages.iter().find(|m| m.name == name)
    }

    /// Run every instrument in order against the outstanding balance
    /// until it reaches zero or the list is exhausted.
    ///
    /// After each instrument, the balance is netted by
    /// `repaid − interest` and reconciled against the instrument's own
    /// final balance, which is what gets carried forward.
    pub fn payoff(&self) -> LoanSimResult<ComputationOutput<PayoffOutput>> {
        let t0 = Instant::now();
        self.validate()?;

        let mut warnings: Vec<String> = Vec::new();
        let mut outstanding = self.principal;
        let mut cursor = self.start;
        let mut end = self.start;
        let mut cost = Decimal::ZERO;
        let mut outcomes: Vec<MortgageOutcome> = Vec::new();
        let mut status = LoanStatus::Exhausted;

        for mortgage in &self.mortgages {
            let opening = outstanding - mortgage.resolve_downpayment(outstanding);
            if mortgage.monthly_interest(opening) >= mortgage.monthly_repayment {
                warnings.push(format!(
                    "instrument '{}' repays {} per month but accrues {} interest at its opening balance; it cannot amortize",
                    mortgage.name,
                    mortgage.monthly_repayment,
                    mortgage.monthly_interest(opening).round_dp(2),
                ));
            }

            let outcome = mortgage.repay(outstanding, cursor)?;

            let netted = outstanding - (outcome.repaid - outcome.interest);
            debug_assert!(
                (netted - outcome.final_outstanding).abs() < RECONCILE_EPSILON,
                "balance netting diverged from instrument tracking: {netted} vs {}",
                outcome.final_outstanding,
            );
            outstanding = outcome.final_outstanding;
            cost += outcome.interest;
            end = outcome.end_date;
            outcomes.push(outcome);

            if outstanding <= Decimal::ZERO {
                status = LoanStatus::PaidOff;
                break;
            }
            cursor = end;
        }

        if status == LoanStatus::Exhausted {
            warnings.push(format!(
                "all instruments exhausted with {} still outstanding",
                outstanding.round_dp(2),
            ));
        }

        let instruments_unused = (self.mortgages.len() - outcomes.len()) as u32;
        let output = PayoffOutput {
            principal: self.principal,
            outstanding,
            cost,
            start: self.start,
            end,
            duration: years_months_between(self.start, end),
            status,
            instruments: outcomes,
            instruments_unused,
        };

        let elapsed = t0.elapsed().as_micros() as u64;
        Ok(with_metadata(
            "Sequential Amortization Simulation",
            self,
            warnings,
            elapsed,
            output,
        ))
    }
}
