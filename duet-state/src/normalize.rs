use serde_json::Value;
use smol_str::SmolStr;

use crate::{Record, db::Row};

/// Turns raw backend rows into flat [`Record`]s.
///
/// The joined relation may arrive as an object, a one-or-more element array, a
/// bare string or not at all; it is reduced to a list of names here so nothing
/// downstream has to care which shape the backend picked. Nulls become empty
/// strings so text matching never has to special-case them.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Normalizer {
    relation: Option<SmolStr>,
}
impl Normalizer {
    /// The display name used when a record has no relation.
    pub const UNKNOWN: &str = "Unknown";

    /// A normalizer for rows joined to `relation` (for example `artist`).
    pub fn new(relation: Option<&str>) -> Self {
        Self {
            relation: relation.map(SmolStr::new),
        }
    }

    /// The relation field this normalizer reads.
    pub fn relation(&self) -> Option<&str> {
        self.relation.as_deref()
    }

    /// The name of the derived display field, e.g. `artistName` for `artist`.
    pub fn display_field(&self) -> Option<String> {
        self.relation
            .as_ref()
            .map(|relation| derived_display_field(relation))
    }

    /// Normalize a single row.
    pub fn normalize(&self, mut row: Row) -> Record {
        let relation_names = self
            .relation
            .as_ref()
            .and_then(|relation| row.shift_remove(relation.as_str()))
            .map(|value| relation_names(&value))
            .unwrap_or_default();

        for value in row.values_mut() {
            if value.is_null() {
                *value = Value::String(String::new());
            }
        }

        if let Some(display_field) = self.display_field() {
            let display_name = relation_names
                .first()
                .cloned()
                .or_else(|| {
                    // Already-flat records carry their display name forward.
                    row.get(&display_field)
                        .and_then(Value::as_str)
                        .filter(|name| !name.is_empty())
                        .map(str::to_string)
                })
                .unwrap_or_else(|| Self::UNKNOWN.to_string());
            row.insert(display_field, Value::String(display_name));
        }

        Record {
            fields: row,
            relation: self.relation.clone(),
            relation_names,
        }
    }

    /// Normalize every row, preserving order.
    pub fn normalize_all(&self, rows: impl IntoIterator<Item = Row>) -> Vec<Record> {
        rows.into_iter().map(|row| self.normalize(row)).collect()
    }
}

pub(crate) fn derived_display_field(relation: &str) -> String {
    format!("{relation}Name")
}

fn relation_names(value: &Value) -> Vec<String> {
    fn name_of(value: &Value) -> Option<String> {
        match value {
            Value::Object(object) => object
                .get("name")
                .and_then(Value::as_str)
                .filter(|name| !name.is_empty())
                .map(str::to_string),
            Value::String(name) if !name.is_empty() => Some(name.clone()),
            _ => None,
        }
    }

    match value {
        Value::Array(values) => values.iter().filter_map(name_of).collect(),
        other => name_of(other).into_iter().collect(),
    }
}
