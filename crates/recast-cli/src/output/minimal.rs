use serde_json::Value;

use super::format_scalar;

/// Headline figure for each command, in priority order.
const PRIORITY_KEYS: [&str; 4] = [
    "new_monthly_payment",
    "monthly_payment",
    "scheduled_payment",
    "interest_savings",
];

/// Print just the key answer value from the output.
pub fn print_minimal(value: &Value) {
    let result_obj = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);
    println!("{}", minimal_line(result_obj));
}

fn minimal_line(result: &Value) -> String {
    if let Value::Object(map) = result {
        for key in PRIORITY_KEYS {
            if let Some(val) = map.get(key) {
                if !val.is_null() {
                    return format_scalar(val);
                }
            }
        }
        if let Some((key, val)) = map.iter().next() {
            return format!("{}: {}", key, format_scalar(val));
        }
    }
    format_scalar(result)
}
