use serde_json::Value;

/// Pretty-print JSON to stdout. Full precision: JSON is the
/// machine-readable format, so no display rounding happens here.
pub fn print_json(value: &Value) {
    match serde_json::to_string_pretty(value) {
        Ok(s) => println!("{}", s),
        Err(e) => eprintln!("JSON serialization error: {}", e),
    }
}
