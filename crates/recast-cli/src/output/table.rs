use serde_json::{Map, Value};
use tabled::{builder::Builder, Table};

use super::{format_scalar, schedule_rows, SCHEDULE_COLUMNS};

/// Format output as tables using the tabled crate.
///
/// Scalar result fields go in a Field/Value table. Nested schedules are
/// printed after it: as a period table when rows are present, otherwise as
/// their own summary table.
pub fn print_table(value: &Value) {
    match value.get("result") {
        Some(Value::Object(result)) => {
            print_result(result);
            print_envelope_notes(value);
        }
        Some(other) => println!("{}", format_scalar(other)),
        None => println!("{}", format_scalar(value)),
    }
}

fn print_result(result: &Map<String, Value>) {
    if let Some(rows) = result.get("rows").and_then(Value::as_array) {
        println!("{}", field_table(result.iter().filter(|(k, _)| *k != "rows")));
        println!();
        println!("{}", rows_table(rows));
        return;
    }

    let (nested, scalars): (Vec<_>, Vec<_>) = result.iter().partition(|(_, v)| v.is_object());
    println!("{}", field_table(scalars.into_iter()));

    for (name, section) in nested {
        println!("\n{}:", title(name));
        match schedule_rows(section) {
            Some(rows) => println!("{}", rows_table(rows)),
            None => {
                if let Value::Object(map) = section {
                    println!("{}", field_table(map.iter()));
                }
            }
        }
    }
}

fn field_table<'a>(fields: impl Iterator<Item = (&'a String, &'a Value)>) -> Table {
    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    for (key, val) in fields {
        builder.push_record([key.as_str(), &format_scalar(val)]);
    }
    builder.build()
}

fn rows_table(rows: &[Value]) -> Table {
    let mut builder = Builder::default();
    builder.push_record(SCHEDULE_COLUMNS);
    for row in rows {
        let record: Vec<String> = SCHEDULE_COLUMNS
            .iter()
            .map(|col| row.get(*col).map(format_scalar).unwrap_or_default())
            .collect();
        builder.push_record(record);
    }
    builder.build()
}

fn print_envelope_notes(envelope: &Value) {
    if let Some(Value::Array(warnings)) = envelope.get("warnings") {
        if !warnings.is_empty() {
            println!("\nWarnings:");
            for w in warnings.iter().filter_map(Value::as_str) {
                println!("  - {}", w);
            }
        }
    }

    if let Some(Value::String(meth)) = envelope.get("methodology") {
        println!("\nMethodology: {}", meth);
    }
}

/// `post_recast_schedule` -> `Post recast schedule`
fn title(key: &str) -> String {
    let spaced = key.replace('_', " ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
