use serde_json::Value;
use tabled::{builder::Builder, Table};

use super::format_value;

/// Format a payoff or schedule envelope as tables: a summary of the
/// top-level result, then one schedule table per instrument.
pub fn print_table(value: &Value) {
    let Some(envelope) = value.as_object() else {
        println!("{}", value);
        return;
    };

    match envelope.get("result") {
        Some(Value::Object(result)) => {
            print_summary(result);

            // A payoff result carries instruments; a schedule result
            // is itself a single instrument outcome.
            if let Some(Value::Array(instruments)) = result.get("instruments") {
                for instrument in instruments {
                    print_instrument(instrument);
                }
            } else if result.contains_key("periods") {
                print_instrument(&Value::Object(result.clone()));
            }
        }
        _ => print_flat(value),
    }

    if let Some(Value::Array(warnings)) = envelope.get("warnings") {
        if !warnings.is_empty() {
            println!("\nWarnings:");
            for w in warnings {
                if let Value::String(s) = w {
                    println!("  - {}", s);
                }
            }
        }
    }

    if let Some(Value::String(methodology)) = envelope.get("methodology") {
        println!("\nMethodology: {}", methodology);
    }
}

fn print_summary(result: &serde_json::Map<String, Value>) {
    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    for (key, val) in result {
        // Nested audit detail gets its own tables below.
        if key == "instruments" || key == "periods" {
            continue;
        }
        if key == "duration" {
            builder.push_record(["duration", &format_duration(val)]);
            continue;
        }
        builder.push_record([key.as_str(), &format_value(val)]);
    }
    println!("{}", Table::from(builder));
}

fn print_instrument(instrument: &Value) {
    let Some(map) = instrument.as_object() else {
        return;
    };

    let name = map.get("name").and_then(Value::as_str).unwrap_or("instrument");
    println!("\nSchedule: {}", name);

    let mut builder = Builder::default();
    builder.push_record(["Period", "Date", "Interest", "Repayment", "Overpayment", "Outstanding"]);
    if let Some(Value::Array(periods)) = map.get("periods") {
        for period in periods {
            let Some(p) = period.as_object() else { continue };
            builder.push_record([
                p.get("period").map(format_value).unwrap_or_default(),
                p.get("date").map(format_value).unwrap_or_default(),
                p.get("interest").map(format_value).unwrap_or_default(),
                p.get("repayment").map(format_value).unwrap_or_default(),
                p.get("overpayment").map(format_value).unwrap_or_default(),
                p.get("outstanding").map(format_value).unwrap_or_default(),
            ]);
        }
    }
    println!("{}", Table::from(builder));
}

fn format_duration(value: &Value) -> String {
    let years = value.get("years").and_then(Value::as_i64).unwrap_or(0);
    let months = value.get("months").and_then(Value::as_i64).unwrap_or(0);
    format!("{} years {} months", years, months)
}

fn print_flat(value: &Value) {
    if let Value::Object(map) = value {
        let mut builder = Builder::default();
        builder.push_record(["Field", "Value"]);
        for (key, val) in map {
            builder.push_record([key.as_str(), &format_value(val)]);
        }
        println!("{}", Table::from(builder));
    } else {
        println!("{}", value);
    }
}
