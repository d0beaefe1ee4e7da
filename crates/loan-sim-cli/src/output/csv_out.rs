use serde_json::Value;
use std::io;

use super::format_value;

/// Write output as CSV to stdout: one row per schedule period, with
/// the instrument name in the first column.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());

    let result = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    let Some(map) = result.as_object() else {
        let _ = wtr.write_record([format_value(result)]);
        let _ = wtr.flush();
        return;
    };

    if let Some(Value::Array(instruments)) = map.get("instruments") {
        write_schedules(&mut wtr, instruments);
    } else if map.contains_key("periods") {
        write_schedules(&mut wtr, std::slice::from_ref(result));
    } else {
        // No schedule detail: fall back to field,value rows
        let _ = wtr.write_record(["field", "value"]);
        for (key, val) in map {
            let _ = wtr.write_record([key.as_str(), &format_value(val)]);
        }
    }

    let _ = wtr.flush();
}

fn write_schedules(wtr: &mut csv::Writer<io::StdoutLock<'_>>, instruments: &[Value]) {
    let _ = wtr.write_record([
        "instrument",
        "period",
        "date",
        "interest",
        "repayment",
        "overpayment",
        "outstanding",
    ]);

    for instrument in instruments {
        let Some(map) = instrument.as_object() else {
            continue;
        };
        let name = map.get("name").and_then(Value::as_str).unwrap_or("");
        let Some(Value::Array(periods)) = map.get("periods") else {
            continue;
        };
        for period in periods {
            let Some(p) = period.as_object() else { continue };
            let _ = wtr.write_record([
                name.to_string(),
                p.get("period").map(format_value).unwrap_or_default(),
                p.get("date").map(format_value).unwrap_or_default(),
                p.get("interest").map(format_value).unwrap_or_default(),
                p.get("repayment").map(format_value).unwrap_or_default(),
                p.get("overpayment").map(format_value).unwrap_or_default(),
                p.get("outstanding").map(format_value).unwrap_or_default(),
            ]);
        }
    }
}
