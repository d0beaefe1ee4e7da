use serde_json::Value;

use super::format_value;

/// Print just the key answer figures from a payoff or schedule run.
pub fn print_minimal(value: &Value) {
    let result = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    // The figures an external caller most often wants
    let priority_keys = ["outstanding", "final_outstanding", "cost", "interest", "status"];

    if let Value::Object(map) = result {
        let mut printed = false;
        for key in &priority_keys {
            if let Some(val) = map.get(*key) {
                if !val.is_null() {
                    println!("{}: {}", key, format_value(val));
                    printed = true;
                }
            }
        }
        if printed {
            return;
        }

        // Fall back to the first field
        if let Some((key, val)) = map.iter().next() {
            println!("{}: {}", key, format_value(val));
            return;
        }
    }

    println!("{}", format_value(result));
}
