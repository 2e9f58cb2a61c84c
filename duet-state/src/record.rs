use std::borrow::Cow;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use smol_str::SmolStr;

use crate::db::Row;

/// A record ID. Backends hand out both numeric and UUID keys; both are kept as text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(pub String);
impl std::fmt::Display for RecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
impl RecordId {
    /// Reads the ID from a raw `id` value. Returns `None` for null, empty or structured values.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) if !s.is_empty() => Some(RecordId(s.clone())),
            Value::Number(n) => Some(RecordId(n.to_string())),
            _ => None,
        }
    }
}

/// A record, as the list pages care about it: flat fields plus the canonical
/// names of its joined relation.
///
/// Built by [`crate::Normalizer`].
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub(crate) fields: Row,
    pub(crate) relation: Option<SmolStr>,
    pub(crate) relation_names: Vec<String>,
}
impl Record {
    /// The record's ID, if it has one.
    pub fn id(&self) -> Option<RecordId> {
        self.fields.get("id").and_then(RecordId::from_value)
    }

    /// The raw value of `key`.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// The value of `key` rendered as text. Numbers and booleans are stringified;
    /// `None` for absent, null or structured values.
    pub fn text(&self, key: &str) -> Option<Cow<'_, str>> {
        match self.fields.get(key)? {
            Value::String(s) => Some(Cow::Borrowed(s)),
            Value::Number(n) => Some(Cow::Owned(n.to_string())),
            Value::Bool(b) => Some(Cow::Borrowed(if *b { "true" } else { "false" })),
            Value::Null | Value::Array(_) | Value::Object(_) => None,
        }
    }

    /// The first of `fields` that has non-empty text.
    pub fn first_text<'a>(
        &'a self,
        fields: impl IntoIterator<Item = &'a SmolStr>,
    ) -> Option<Cow<'a, str>> {
        fields
            .into_iter()
            .filter_map(|field| self.text(field))
            .find(|text| !text.is_empty())
    }

    /// The flat fields, in backend order. The relation object itself is not included;
    /// its derived display field is.
    pub fn fields(&self) -> &Row {
        &self.fields
    }

    /// The relation field this record was normalized against, if any.
    pub fn relation(&self) -> Option<&str> {
        self.relation.as_deref()
    }

    /// Every name carried by the joined relation, in backend order.
    pub fn relation_names(&self) -> &[String] {
        &self.relation_names
    }

    /// Converts back into a row with the relation in its canonical sequence shape.
    pub fn to_row(&self) -> Row {
        let mut row = self.fields.clone();
        if let Some(relation) = &self.relation
            && !self.relation_names.is_empty()
        {
            row.insert(
                relation.to_string(),
                Value::Array(
                    self.relation_names
                        .iter()
                        .map(|name| serde_json::json!({ "name": name }))
                        .collect(),
                ),
            );
        }
        row
    }
}
