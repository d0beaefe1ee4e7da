//! Instrument-definition files: an ordered YAML mapping of instrument
//! name → fields. File order is repayment order.
//!
//! ```yaml
//! fix-2y:
//!   rate: 3.15%          # percent string or decimal fraction
//!   years: 2
//!   repayment: 850
//!   downpayment: 5%      # optional; negative = capital release
//! variable:
//!   rate: 0.0459
//!   years: 23
//!   repayment: 980
//!   overpay: 10%         # optional yearly anniversary lump
//! ```

use std::fs;

use rust_decimal::Decimal;
use serde::Deserialize;
use serde_yaml::Mapping;

use loan_sim_core::{CurrencyValue, Mortgage};

#[derive(Debug, Deserialize)]
struct MortgageFields {
    rate: CurrencyValue,
    years: u32,
    repayment: Decimal,
    #[serde(default)]
    downpayment: CurrencyValue,
    #[serde(default)]
    overpay: CurrencyValue,
}

/// Read and parse an instrument-definition file.
pub fn read_mortgages(path: &str) -> Result<Vec<Mortgage>, Box<dyn std::error::Error>> {
    let contents =
        fs::read_to_string(path).map_err(|e| format!("Failed to read '{}': {}", path, e))?;
    parse_mortgages(&contents).map_err(|e| format!("In '{}': {}", path, e).into())
}

/// Parse instrument definitions from YAML text, preserving file order.
pub fn parse_mortgages(contents: &str) -> Result<Vec<Mortgage>, Box<dyn std::error::Error>> {
    let mapping: Mapping = serde_yaml::from_str(contents)?;

    let mut mortgages = Vec::with_capacity(mapping.len());
    for (key, value) in mapping {
        let name = key
            .as_str()
            .ok_or_else(|| format!("instrument names must be strings, got {:?}", key))?
            .to_string();
        let fields: MortgageFields = serde_yaml::from_value(value)
            .map_err(|e| format!("instrument '{}': {}", name, e))?;
        let mortgage = Mortgage::new(
            name,
            fields.rate.as_fraction(),
            fields.years,
            fields.repayment,
            fields.downpayment,
            fields.overpay,
        )?;
        mortgages.push(mortgage);
    }
    Ok(mortgages)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_parse_two_instruments_in_file_order() {
        let yaml = "
fix-2y:
  rate: 3.15%
  years: 2
  repayment: 850
  downpayment: 5%
variable:
  rate: 0.0459
  years: 23
  repayment: 980
  overpay: 10%
";
        let mortgages = parse_mortgages(yaml).unwrap();
        assert_eq!(mortgages.len(), 2);

        let fix = &mortgages[0];
        assert_eq!(fix.name, "fix-2y");
        assert_eq!(fix.rate, dec!(0.0315));
        assert_eq!(fix.term_years, 2);
        assert_eq!(fix.monthly_repayment, dec!(850));
        assert_eq!(fix.downpayment, CurrencyValue::Percent(dec!(0.05)));
        assert!(fix.overpay.is_zero());

        let var = &mortgages[1];
        assert_eq!(var.name, "variable");
        assert_eq!(var.rate, dec!(0.0459));
        assert_eq!(var.overpay, CurrencyValue::Percent(dec!(0.10)));
        assert!(var.downpayment.is_zero());
    }

    #[test]
    fn test_parse_negative_downpayment_and_flat_overpay() {
        let yaml = "
remortgage:
  rate: 4%
  years: 20
  repayment: 760
  downpayment: -6%
  overpay: 1500
";
        let mortgages = parse_mortgages(yaml).unwrap();
        let m = &mortgages[0];
        assert_eq!(m.downpayment, CurrencyValue::Percent(dec!(-0.06)));
        assert_eq!(m.overpay, CurrencyValue::Amount(dec!(1500)));
    }

    #[test]
    fn test_missing_required_field_names_the_instrument() {
        let yaml = "
broken:
  rate: 4%
  repayment: 760
";
        let err = parse_mortgages(yaml).unwrap_err().to_string();
        assert!(err.contains("broken"), "error was: {err}");
    }

    #[test]
    fn test_invalid_configuration_rejected_at_load() {
        let yaml = "
zero-term:
  rate: 4%
  years: 0
  repayment: 760
";
        assert!(parse_mortgages(yaml).is_err());
    }

    #[test]
    fn test_malformed_percent_string_rejected() {
        let yaml = "
bad-rate:
  rate: four percent
  years: 10
  repayment: 760
";
        let err = parse_mortgages(yaml).unwrap_err().to_string();
        assert!(err.contains("bad-rate"), "error was: {err}");
    }
}
