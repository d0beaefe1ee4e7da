use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};

use crate::error::LoanSimError;
use crate::LoanSimResult;

/// All monetary values. Wraps Decimal to prevent accidental f64 usage.
pub type Money = Decimal;

/// Rates expressed as decimal fractions (0.05 = 5%). Never as percentages.
pub type Rate = Decimal;

/// A currency-like value as it appears in instrument configuration:
/// either an absolute amount or a fraction of some context base.
///
/// Parsed from a bare number (`600`, `-5000`) or a string with an
/// optional sign and optional percent suffix (`"10%"`, `"-6%"`,
/// `"600.00"`). The sign lives in the Decimal itself; a `Percent`
/// holds the already-normalized fraction (`"10%"` → `0.10`).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CurrencyValue {
    Amount(Money),
    Percent(Rate),
}

impl CurrencyValue {
    pub const ZERO: CurrencyValue = CurrencyValue::Amount(Decimal::ZERO);

    /// Parse a raw string, naming the offending field on failure.
    pub fn parse(field: &str, raw: &str) -> LoanSimResult<Self> {
        Self::from_raw(raw).ok_or_else(|| LoanSimError::MalformedValue {
            field: field.to_string(),
            value: raw.to_string(),
        })
    }

    fn from_raw(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if let Some(body) = trimmed.strip_suffix('%') {
            let pct = Decimal::from_str(body.trim()).ok()?;
            Some(CurrencyValue::Percent(pct / Decimal::ONE_HUNDRED))
        } else {
            Decimal::from_str(trimmed).ok().map(CurrencyValue::Amount)
        }
    }

    /// Resolve against a context base: amounts pass through, percents
    /// scale the base. A percent is never meaningful in isolation.
    pub fn resolve(&self, base: Money) -> Money {
        match self {
            CurrencyValue::Amount(amount) => *amount,
            CurrencyValue::Percent(fraction) => fraction * base,
        }
    }

    /// Normalize a percent-or-decimal configuration value to a rate
    /// fraction: `"6%"` and `0.06` both mean six percent.
    pub fn as_fraction(&self) -> Rate {
        match self {
            CurrencyValue::Amount(amount) => *amount,
            CurrencyValue::Percent(fraction) => *fraction,
        }
    }

    pub fn is_zero(&self) -> bool {
        match self {
            CurrencyValue::Amount(amount) => amount.is_zero(),
            CurrencyValue::Percent(fraction) => fraction.is_zero(),
        }
    }

    pub fn is_negative(&self) -> bool {
        match self {
            CurrencyValue::Amount(amount) => amount.is_sign_negative() && !amount.is_zero(),
            CurrencyValue::Percent(fraction) => fraction.is_sign_negative() && !fraction.is_zero(),
        }
    }
}

impl Default for CurrencyValue {
    fn default() -> Self {
        CurrencyValue::ZERO
    }
}

impl From<Decimal> for CurrencyValue {
    fn from(amount: Decimal) -> Self {
        CurrencyValue::Amount(amount)
    }
}

impl<'de> Deserialize<'de> for CurrencyValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        // Numbers go through Decimal's own visitor so integer inputs
        // keep full precision instead of routing through f64. Decimal
        // also accepts plain numeric strings, which is equivalent to
        // the string arm for non-percent input; anything it rejects
        // ("10%", "-6%") falls through to `from_raw`.
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Num(Decimal),
            Str(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Num(n) => Ok(CurrencyValue::Amount(n)),
            Raw::Str(s) => CurrencyValue::from_raw(&s)
                .ok_or_else(|| de::Error::custom(format!("invalid currency value '{s}'"))),
        }
    }
}

impl fmt::Display for CurrencyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CurrencyValue::Amount(amount) => write!(f, "{amount:.2}"),
            CurrencyValue::Percent(fraction) => {
                write!(f, "{:.2}%", fraction * Decimal::ONE_HUNDRED)
            }
        }
    }
}

/// Whole years and residual months of an elapsed calendar span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearsMonths {
    pub years: i32,
    pub months: u32,
}

impl fmt::Display for YearsMonths {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} years {} months", self.years, self.months)
    }
}

/// Terminal state of a payoff run. `Exhausted` is a valid outcome
/// (every instrument processed, balance still positive), not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoanStatus {
    PaidOff,
    Exhausted,
}

/// Standard computation output envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationOutput<T: Serialize> {
    pub result: T,
    pub methodology: String,
    pub assumptions: serde_json::Value,
    pub warnings: Vec<String>,
    pub metadata: ComputationMetadata,
}

/// Metadata for every computation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationMetadata {
    pub version: String,
    pub computation_time_us: u64,
    pub precision: String,
}

/// Helper to wrap computation results with metadata
pub fn with_metadata<T: Serialize>(
    methodology: &str,
    assumptions: &impl Serialize,
    warnings: Vec<String>,
    elapsed_us: u64,
    result: T,
) -> ComputationOutput<T> {
    ComputationOutput {
        result,
        methodology: methodology.to_string(),
        assumptions: serde_json::to_value(assumptions).unwrap_or_default(),
        warnings,
        metadata: ComputationMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            computation_time_us: elapsed_us,
            precision: "rust_decimal_128bit".to_string(),
        },
    }
}
