//! Instrument simulator: one interest-bearing repayment schedule run
//! to completion against a given starting balance and date.

use std::time::Instant;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::LoanSimError;
use crate::schedule::{add_months, is_overpay_anniversary};
use crate::types::{with_metadata, ComputationOutput, CurrencyValue, Money, Rate};
use crate::LoanSimResult;

const MONTHS_PER_YEAR: Decimal = dec!(12);

/// Annual rates above 100% are treated as mis-entered percent strings.
const MAX_ANNUAL_RATE: Decimal = Decimal::ONE;

/// One debt instrument: immutable configuration only. Run-time state
/// (bound start date, balances, accrued totals) lives in the
/// [`MortgageOutcome`] returned by [`Mortgage::repay`], so the same
/// instrument definition can be simulated any number of times.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Mortgage {
    pub name: String,
    /// Nominal annual rate as a decimal fraction (0.06 = 6%).
    pub rate: Rate,
    pub term_years: u32,
    /// Fixed nominal repayment per month, capped by the outstanding
    /// balance near payoff.
    pub monthly_repayment: Money,
    /// Upfront balance adjustment before interest accrues. Negative
    /// means capital released back to the borrower.
    #[serde(default)]
    pub downpayment: CurrencyValue,
    /// Yearly anniversary lump sum: a fraction of outstanding or a
    /// flat amount. Zero disables overpayment.
    #[serde(default)]
    pub overpay: CurrencyValue,
}

/// Audit record for one processed schedule period.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeriodRecord {
    /// 1-based period index within the instrument's schedule.
    pub period: u32,
    pub date: NaiveDate,
    /// Interest accrued this period, before repayment.
    pub interest: Money,
    /// Total subtracted from the balance this period (nominal plus
    /// any anniversary overpayment).
    pub repayment: Money,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overpayment: Option<Money>,
    /// Balance after this period's repayment.
    pub outstanding: Money,
}

/// Result of simulating one instrument to completion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MortgageOutcome {
    pub name: String,
    /// Start date the instrument was bound to for this run.
    pub bound_start: NaiveDate,
    /// Balance snapshot at activation, before the downpayment.
    pub activation_balance: Money,
    /// Resolved signed downpayment (zero if none was configured).
    pub downpayment: Money,
    /// Total interest accrued over the instrument's involvement.
    pub interest: Money,
    /// Total repaid, downpayment included.
    pub repaid: Money,
    /// Date of the last period that processed a repayment; the bound
    /// start itself if the downpayment alone cleared the balance.
    pub end_date: NaiveDate,
    /// The instrument's own running balance when it finished.
    pub final_outstanding: Money,
    pub periods: Vec<PeriodRecord>,
}

impl Mortgage {
    pub fn new(
        name: impl Into<String>,
        rate: Rate,
        term_years: u32,
        monthly_repayment: Money,
        downpayment: CurrencyValue,
        overpay: CurrencyValue,
    ) -> LoanSimResult<Self> {
        let mortgage = Mortgage {
            name: name.into(),
            rate,
            term_years,
            monthly_repayment,
            downpayment,
            overpay,
        };
        mortgage.validate()?;
        Ok(mortgage)
    }

    /// Configuration sanity checks. Run at construction and again at
    /// the top of [`repay`] so deserialized configs get the same
    /// treatment as constructed ones.
    pub fn validate(&self) -> LoanSimResult<()> {
        if self.rate < Decimal::ZERO || self.rate > MAX_ANNUAL_RATE {
            return Err(LoanSimError::InvalidInput {
                field: format!("{}.rate", self.name),
                reason: "annual rate must be between 0 and 1 after normalization".into(),
            });
        }
        if self.term_years == 0 {
            return Err(LoanSimError::InvalidInput {
                field: format!("{}.years", self.name),
                reason: "term must be at least one year".into(),
            });
        }
        if self.monthly_repayment <= Decimal::ZERO {
            return Err(LoanSimError::InvalidInput {
                field: format!("{}.repayment", self.name),
                reason: "monthly repayment must be positive".into(),
            });
        }
        if self.overpay.is_negative() {
            return Err(LoanSimError::InvalidInput {
                field: format!("{}.overpay", self.name),
                reason: "overpayment cannot be negative".into(),
            });
        }
        if let CurrencyValue::Percent(fraction) = self.overpay {
            if fraction > Decimal::ONE {
                return Err(LoanSimError::InvalidInput {
                    field: format!("{}.overpay", self.name),
                    reason: "overpayment fraction cannot exceed 100%".into(),
                });
            }
        }
        if let CurrencyValue::Percent(fraction) = self.downpayment {
            if fraction.abs() > Decimal::ONE {
                return Err(LoanSimError::InvalidInput {
                    field: format!("{}.downpayment", self.name),
                    reason: "downpayment fraction cannot exceed 100%".into(),
                });
            }
        }
        Ok(())
    }

    /// One month's interest on the given balance: `balance × rate/12`.
    pub fn monthly_interest(&self, outstanding: Money) -> Money {
        outstanding * (self.rate / MONTHS_PER_YEAR)
    }

    /// Signed amount to subtract from the balance upfront. Percents
    /// resolve against the pre-downpayment outstanding; a negative
    /// result is a capital release that increases the balance.
    pub fn resolve_downpayment(&self, outstanding: Money) -> Money {
        self.downpayment.resolve(outstanding)
    }

    /// Simulate this instrument from `start` against `outstanding`.
    ///
    /// Each scheduled month, in order: stop if the balance is already
    /// cleared, accrue interest, repay (capped at the balance), apply
    /// any anniversary overpayment. The run ends at the earlier of
    /// balance exhaustion and term end.
    pub fn repay(&self, outstanding: Money, start: NaiveDate) -> LoanSimResult<MortgageOutcome> {
        self.validate()?;

        let activation_balance = outstanding;
        let downpayment = self.resolve_downpayment(outstanding);
        let mut balance = outstanding - downpayment;

        let total_periods = self.term_years * 12;
        let mut interest_total = Decimal::ZERO;
        let mut repaid_total = Decimal::ZERO;
        let mut end_date = start;
        let mut periods = Vec::with_capacity(total_periods as usize);

        for period in 1..=total_periods {
            // Previous period (or the downpayment itself) fully
            // cleared the balance; nothing left to accrue against.
            if balance <= Decimal::ZERO {
                break;
            }

            let date = add_months(start, period)?;

            let interest = self.monthly_interest(balance);
            interest_total += interest;
            balance += interest;

            let nominal = if balance > self.monthly_repayment {
                self.monthly_repayment
            } else {
                balance
            };
            let mut repayment = nominal;

            let mut overpayment = None;
            if !self.overpay.is_zero() && is_overpay_anniversary(period, self.term_years) {
                let after_nominal = balance - nominal;
                let mut lump = self.overpay.resolve(after_nominal);
                if lump > after_nominal {
                    lump = after_nominal;
                }
                if lump > Decimal::ZERO {
                    repayment += lump;
                    overpayment = Some(lump);
                }
            }

            balance -= repayment;
            repaid_total += repayment;
            end_date = date;

            periods.push(PeriodRecord {
                period,
                date,
                interest,
                repayment,
                overpayment,
                outstanding: balance,
            });
        }

        Ok(MortgageOutcome {
            name: self.name.clone(),
            bound_start: start,
            activation_balance,
            downpayment,
            interest: interest_total,
            repaid: repaid_total + downpayment,
            end_date,
            final_outstanding: balance,
            periods,
        })
    }

    /// Timed, enveloped single-instrument run, for callers that want
    /// the schedule of one instrument in isolation.
    pub fn simulate(
        &self,
        outstanding: Money,
        start: NaiveDate,
    ) -> LoanSimResult<ComputationOutput<MortgageOutcome>> {
        let t0 = Instant::now();
        let outcome = self.repay(outstanding, start)?;
        let elapsed = t0.elapsed().as_micros() as u64;
        Ok(with_metadata(
            "Single Instrument Amortization",
            self,
            Vec::new(),
            elapsed,
            outcome,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    fn start() -> NaiveDate {
        NaiveDate::from_ymd_opt(2020, 6, 1).unwrap()
    }

    fn flat(name: &str, rate: Decimal, years: u32, repayment: Decimal) -> Mortgage {
        Mortgage::new(
            name,
            rate,
            years,
            repayment,
            CurrencyValue::ZERO,
            CurrencyValue::ZERO,
        )
        .unwrap()
    }

    #[test]
    fn test_monthly_interest_is_rate_over_twelve() {
        let m = flat("fix", dec!(0.06), 25, dec!(700));
        assert_eq!(m.monthly_interest(dec!(100000)), dec!(500));
        assert_eq!(m.monthly_interest(dec!(0)), dec!(0));
    }

    #[test]
    fn test_monthly_interest_strictly_increasing_in_balance() {
        let m = flat("fix", dec!(0.10), 10, dec!(500));
        let mut last = dec!(-1);
        for balance in [dec!(0), dec!(1), dec!(99.99), dec!(5000), dec!(100000)] {
            let interest = m.monthly_interest(balance);
            assert!(interest > last);
            last = interest;
        }
    }

    #[test]
    fn test_downpayment_percent_resolves_against_base() {
        // Scenario B: 10% of 100000
        let m = Mortgage::new(
            "fix",
            dec!(0.06),
            25,
            dec!(700),
            CurrencyValue::Percent(dec!(0.10)),
            CurrencyValue::ZERO,
        )
        .unwrap();
        assert_eq!(m.resolve_downpayment(dec!(100000)), dec!(10000));

        let outcome = m.repay(dec!(100000), start()).unwrap();
        assert_eq!(outcome.downpayment, dec!(10000));
        // First period interest accrues on 90000
        assert_eq!(outcome.periods[0].interest, dec!(450));
    }

    #[test]
    fn test_negative_downpayment_is_capital_release() {
        // Scenario C: -5000 increases the balance before accrual
        let m = Mortgage::new(
            "remortgage",
            dec!(0),
            2,
            dec!(500),
            CurrencyValue::Amount(dec!(-5000)),
            CurrencyValue::ZERO,
        )
        .unwrap();
        let outcome = m.repay(dec!(10000), start()).unwrap();
        assert_eq!(outcome.downpayment, dec!(-5000));
        // 15000 at 500/month: first period ends at 14500
        assert_eq!(outcome.periods[0].outstanding, dec!(14500));
        // Release is netted out of the repaid total
        assert_eq!(outcome.repaid, outcome.periods.iter().map(|p| p.repayment).sum::<Decimal>() - dec!(5000));
    }

    #[test]
    fn test_repayment_capped_at_outstanding() {
        let m = flat("small", dec!(0), 1, dec!(300));
        let outcome = m.repay(dec!(1000), start()).unwrap();
        // 300, 300, 300, then only the remaining 100
        assert_eq!(outcome.periods.len(), 4);
        assert_eq!(outcome.periods[3].repayment, dec!(100));
        assert_eq!(outcome.final_outstanding, dec!(0));
        assert_eq!(outcome.repaid, dec!(1000));
        assert_eq!(outcome.end_date, add_months(start(), 4).unwrap());
    }

    #[test]
    fn test_loop_stops_without_repaying_a_cleared_balance() {
        let m = flat("small", dec!(0), 1, dec!(100));
        let outcome = m.repay(dec!(1000), start()).unwrap();
        // Ten payments of 100; period 11 finds the balance at zero
        assert_eq!(outcome.periods.len(), 10);
        assert_eq!(outcome.end_date, add_months(start(), 10).unwrap());
        assert_eq!(outcome.interest, dec!(0));
    }

    #[test]
    fn test_balance_monotonic_within_period() {
        let m = flat("fix", dec!(0.06), 5, dec!(700));
        let outcome = m.repay(dec!(30000), start()).unwrap();
        let mut prev = dec!(30000);
        for p in &outcome.periods {
            // Repayment never increases the balance past the
            // pre-accrual figure; interest never decreases it.
            assert!(p.outstanding <= prev);
            assert!(p.interest >= dec!(0));
            prev = p.outstanding;
        }
    }

    #[test]
    fn test_overpay_only_on_interior_anniversaries() {
        let m = Mortgage::new(
            "overpayer",
            dec!(0),
            3,
            dec!(100),
            CurrencyValue::ZERO,
            CurrencyValue::Percent(dec!(0.50)),
        )
        .unwrap();
        let outcome = m.repay(dec!(10000), start()).unwrap();

        let overpay_periods: Vec<u32> = outcome
            .periods
            .iter()
            .filter(|p| p.overpayment.is_some())
            .map(|p| p.period)
            .collect();
        assert_eq!(overpay_periods, vec![12, 24]);

        // Period 12: 8900 pre-repay, 8800 after nominal, half off
        assert_eq!(outcome.periods[11].overpayment, Some(dec!(4400)));
        assert_eq!(outcome.periods[11].outstanding, dec!(4400));
        // Period 24: 3300 pre-repay, 3200 after nominal, half off
        assert_eq!(outcome.periods[23].overpayment, Some(dec!(1600)));

        // Term ends with balance still positive
        assert_eq!(outcome.final_outstanding, dec!(400));
        assert_eq!(outcome.end_date, add_months(start(), 36).unwrap());
    }

    #[test]
    fn test_full_overpay_terminates_early() {
        // Scenario E: 100% overpay clears everything at the first
        // anniversary; the loop must stop there.
        let m = Mortgage::new(
            "aggressive",
            dec!(0),
            5,
            dec!(10),
            CurrencyValue::ZERO,
            CurrencyValue::Percent(dec!(1.00)),
        )
        .unwrap();
        let outcome = m.repay(dec!(1000), start()).unwrap();
        assert_eq!(outcome.periods.len(), 12);
        assert_eq!(outcome.periods[11].overpayment, Some(dec!(880)));
        assert_eq!(outcome.final_outstanding, dec!(0));
        assert_eq!(outcome.repaid, dec!(1000));
        assert_eq!(outcome.end_date, add_months(start(), 12).unwrap());
    }

    #[test]
    fn test_flat_overpay_applied_as_amount() {
        let m = Mortgage::new(
            "flat-lump",
            dec!(0),
            2,
            dec!(100),
            CurrencyValue::ZERO,
            CurrencyValue::Amount(dec!(1500)),
        )
        .unwrap();
        let outcome = m.repay(dec!(10000), start()).unwrap();
        assert_eq!(outcome.periods[11].overpayment, Some(dec!(1500)));
        // 10000 - 12*100 - 1500
        assert_eq!(outcome.periods[11].outstanding, dec!(7300));
    }

    #[test]
    fn test_overpay_never_exceeds_outstanding() {
        let m = Mortgage::new(
            "flat-lump",
            dec!(0),
            2,
            dec!(100),
            CurrencyValue::ZERO,
            CurrencyValue::Amount(dec!(1000000)),
        )
        .unwrap();
        let outcome = m.repay(dec!(5000), start()).unwrap();
        let anniversary = &outcome.periods[11];
        // 5000 - 12*100 = 3800 after the nominal repayment
        assert_eq!(anniversary.overpayment, Some(dec!(3800)));
        assert_eq!(anniversary.outstanding, dec!(0));
    }

    #[test]
    fn test_downpayment_alone_can_clear_the_balance() {
        let m = Mortgage::new(
            "payoff",
            dec!(0.05),
            10,
            dec!(100),
            CurrencyValue::Percent(dec!(1.00)),
            CurrencyValue::ZERO,
        )
        .unwrap();
        let outcome = m.repay(dec!(40000), start()).unwrap();
        assert_eq!(outcome.downpayment, dec!(40000));
        assert!(outcome.periods.is_empty());
        assert_eq!(outcome.end_date, start());
        assert_eq!(outcome.repaid, dec!(40000));
        assert_eq!(outcome.interest, dec!(0));
    }

    #[test]
    fn test_overshooting_downpayment_skips_the_schedule() {
        // A flat downpayment larger than the balance drives it
        // negative at activation. No period runs, so no interest
        // accrues (on a negative balance it would accrue negative)
        // and the end date is the bound start itself.
        let m = Mortgage::new(
            "overshoot",
            dec!(0.05),
            10,
            dec!(100),
            CurrencyValue::Amount(dec!(50000)),
            CurrencyValue::ZERO,
        )
        .unwrap();
        let outcome = m.repay(dec!(10000), start()).unwrap();
        assert_eq!(outcome.downpayment, dec!(50000));
        assert!(outcome.periods.is_empty());
        assert_eq!(outcome.end_date, start());
        assert_eq!(outcome.interest, dec!(0));
        assert_eq!(outcome.repaid, dec!(50000));
        assert_eq!(outcome.final_outstanding, dec!(-40000));
    }

    #[test]
    fn test_interest_accrues_monthly_at_six_percent() {
        // Scenario A shape: every period's interest is balance × 0.005
        let m = flat("fix", dec!(0.06), 25, dec!(700));
        let outcome = m.repay(dec!(100000), start()).unwrap();

        let mut balance = dec!(100000);
        for p in outcome.periods.iter().take(24) {
            assert_eq!(p.interest, balance * dec!(0.005));
            balance += p.interest;
            balance -= p.repayment;
            assert_eq!(p.outstanding, balance);
        }
    }

    #[test]
    fn test_rejects_zero_term() {
        let err = Mortgage::new(
            "bad",
            dec!(0.05),
            0,
            dec!(100),
            CurrencyValue::ZERO,
            CurrencyValue::ZERO,
        )
        .unwrap_err();
        assert!(matches!(err, LoanSimError::InvalidInput { .. }));
    }

    #[test]
    fn test_rejects_non_positive_repayment() {
        for bad in [dec!(0), dec!(-50)] {
            let err = Mortgage::new(
                "bad",
                dec!(0.05),
                10,
                bad,
                CurrencyValue::ZERO,
                CurrencyValue::ZERO,
            )
            .unwrap_err();
            assert!(matches!(err, LoanSimError::InvalidInput { .. }));
        }
    }

    #[test]
    fn test_rejects_out_of_range_rate() {
        for bad in [dec!(-0.01), dec!(1.5)] {
            let err = Mortgage::new(
                "bad",
                bad,
                10,
                dec!(100),
                CurrencyValue::ZERO,
                CurrencyValue::ZERO,
            )
            .unwrap_err();
            assert!(matches!(err, LoanSimError::InvalidInput { .. }));
        }
    }

    #[test]
    fn test_rejects_negative_overpay() {
        let err = Mortgage::new(
            "bad",
            dec!(0.05),
            10,
            dec!(100),
            CurrencyValue::ZERO,
            CurrencyValue::Percent(dec!(-0.10)),
        )
        .unwrap_err();
        assert!(matches!(err, LoanSimError::InvalidInput { .. }));
    }
}
