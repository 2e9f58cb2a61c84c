use duet_state::Collection;
use serde_json::Value;

use super::field::is_read_only;
use crate::db::Row;

/// The blank record a new entry starts from.
///
/// Copies the shape of `sample` when the collection has any rows, falling back
/// to the collection's important columns otherwise.
pub fn template(collection: Collection, sample: Option<&Row>) -> Row {
    match sample {
        Some(sample) => from_sample(collection, sample),
        None => from_columns(collection),
    }
}

/// Every writable key of `sample`, blanked: booleans become `false`, everything else `""`.
pub fn from_sample(collection: Collection, sample: &Row) -> Row {
    sample
        .iter()
        .filter(|(key, value)| !is_read_only(collection, key, value))
        .map(|(key, value)| (key.clone(), blank(value)))
        .collect()
}

/// The collection's important columns, blanked. `is_` flags start out `false`.
pub fn from_columns(collection: Collection) -> Row {
    collection
        .important_columns()
        .iter()
        .map(|&key| {
            let value = if key.starts_with("is_") {
                Value::Bool(false)
            } else {
                Value::String(String::new())
            };
            (key.to_string(), value)
        })
        .collect()
}

fn blank(value: &Value) -> Value {
    match value {
        Value::Bool(_) => Value::Bool(false),
        _ => Value::String(String::new()),
    }
}
