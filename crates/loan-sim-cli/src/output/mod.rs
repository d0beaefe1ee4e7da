pub mod csv_out;
pub mod json;
pub mod minimal;
pub mod table;

use crate::OutputFormat;
use rust_decimal::Decimal;
use serde_json::Value;
use std::str::FromStr;

/// Dispatch output to the appropriate formatter.
pub fn format_output(format: &OutputFormat, value: &Value) {
    match format {
        OutputFormat::Json => json::print_json(value),
        OutputFormat::Table => table::print_table(value),
        OutputFormat::Csv => csv_out::print_csv(value),
        OutputFormat::Minimal => minimal::print_minimal(value),
    }
}

/// Render a JSON leaf for human-facing output. Decimals arrive as
/// strings from the core; currency-like ones are rounded to two
/// decimal places here, at the presentation boundary.
pub fn format_value(value: &Value) -> String {
    match value {
        Value::String(s) => match Decimal::from_str(s) {
            Ok(d) => d.round_dp(2).to_string(),
            Err(_) => s.clone(),
        },
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        other => serde_json::to_string(other).unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_format_value_rounds_decimal_strings() {
        assert_eq!(format_value(&json!("12345.678901")), "12345.68");
        assert_eq!(format_value(&json!("500")), "500");
    }

    #[test]
    fn test_format_value_passes_non_numeric_strings() {
        assert_eq!(format_value(&json!("paid_off")), "paid_off");
        assert_eq!(format_value(&json!("2020-06-01")), "2020-06-01");
    }
}
