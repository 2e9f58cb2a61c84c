use duet_state::{Collection, date};
use serde_json::Value;
use smol_str::SmolStr;

use super::EditorError;
use crate::db::Row;

/// Keys whose text is long-form.
const MULTILINE_KEYS: &[&str] = &["description", "detail", "content", "note"];
/// Existing text longer than this gets a multi-line editor.
const MULTILINE_LENGTH: usize = 80;

/// The kind of control a field is edited with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Boolean,
    Date,
    /// A foreign key; edited by picking one of `collection`'s records.
    Relation { collection: Collection },
    /// A link or image address, shown with a preview.
    Url,
    Text { multiline: bool },
}

/// One editable field of a record, inferred once when the editor opens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    pub key: SmolStr,
    pub label: String,
    pub kind: FieldKind,
}
impl FieldDescriptor {
    /// Infers the field kind from the key and its current value.
    pub fn infer(key: &str, value: &Value) -> Self {
        let lower = key.to_ascii_lowercase();
        let kind = if value.is_boolean() {
            FieldKind::Boolean
        } else if lower.contains("date") {
            FieldKind::Date
        } else if let Some(collection) = Collection::for_foreign_key(&lower) {
            FieldKind::Relation { collection }
        } else if lower.contains("url") || lower.contains("image") {
            FieldKind::Url
        } else {
            let long = value
                .as_str()
                .is_some_and(|s| s.chars().count() > MULTILINE_LENGTH);
            FieldKind::Text {
                multiline: long || MULTILINE_KEYS.iter().any(|k| lower.contains(k)),
            }
        };
        Self {
            key: key.into(),
            label: label_for(key),
            kind,
        }
    }

    /// Converts user input into the value stored for this field.
    pub fn parse(&self, input: &str) -> Result<Value, EditorError> {
        let trimmed = input.trim();
        match self.kind {
            FieldKind::Boolean => match trimmed.to_ascii_lowercase().as_str() {
                "true" | "yes" | "y" | "1" | "on" => Ok(Value::Bool(true)),
                "false" | "no" | "n" | "0" | "off" | "" => Ok(Value::Bool(false)),
                _ => Err(self.invalid(input, "true or false")),
            },
            FieldKind::Date if trimmed.is_empty() => Ok(Value::Null),
            FieldKind::Date => match date::parse_date(trimmed) {
                Some(_) => Ok(Value::String(trimmed.to_string())),
                None => Err(self.invalid(input, "a date such as 2024-06-15")),
            },
            FieldKind::Relation { .. } if trimmed.is_empty() => Ok(Value::Null),
            FieldKind::Relation { .. } => Ok(trimmed
                .parse::<i64>()
                .map(Value::from)
                .unwrap_or_else(|_| Value::String(trimmed.to_string()))),
            FieldKind::Url => Ok(Value::String(trimmed.to_string())),
            FieldKind::Text { .. } => Ok(Value::String(input.to_string())),
        }
    }

    /// The value as it would be typed back in.
    pub fn display(&self, value: Option<&Value>) -> String {
        match value {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
        }
    }

    fn invalid(&self, input: &str, expected: &'static str) -> EditorError {
        EditorError::InvalidValue {
            key: self.key.to_string(),
            input: input.to_string(),
            expected,
        }
    }
}

/// Whether `key` is shown by the editor but never written back: the ID, the
/// joined relation and its derived display name.
pub fn is_read_only(collection: Collection, key: &str, value: &Value) -> bool {
    key == "id"
        || value.is_object()
        || value.is_array()
        || collection.relation() == Some(key)
        || collection.normalizer().display_field().as_deref() == Some(key)
}

/// Describes every editable field of `row`, in row order.
pub fn describe(collection: Collection, row: &Row) -> Vec<FieldDescriptor> {
    row.iter()
        .filter(|(key, value)| !is_read_only(collection, key, value))
        .map(|(key, value)| FieldDescriptor::infer(key, value))
        .collect()
}

/// `artist_id` -> `Artist`, `birth_date` -> `Birth date`.
fn label_for(key: &str) -> String {
    let words = key.strip_suffix("_id").unwrap_or(key).replace('_', " ");
    let mut chars = words.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
