use duet_state::{Collection, RecordId};
use serde_json::Value;

use super::{
    EditorError,
    field::{FieldDescriptor, FieldKind, describe},
    template::template,
};
use crate::db::Row;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorMode {
    Add,
    Edit { id: RecordId },
}

/// The values being edited and the fields that drive them.
#[derive(Debug, Clone, PartialEq)]
pub struct Form {
    values: Row,
    fields: Vec<FieldDescriptor>,
}
impl Form {
    fn new(collection: Collection, values: Row) -> Self {
        let fields = describe(collection, &values);
        Self { values, fields }
    }

    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    pub fn field(&self, key: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.key == key)
    }

    pub fn value(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Every value, read-only fields included.
    pub fn values(&self) -> &Row {
        &self.values
    }

    pub fn set(&mut self, key: &str, input: &str) -> Result<(), EditorError> {
        let field = self.field(key).ok_or_else(|| EditorError::UnknownField {
            key: key.to_string(),
        })?;
        let value = field.parse(input)?;
        self.values.insert(key.to_string(), value);
        Ok(())
    }

    /// What gets written: the editable fields only. Blank dates and relations
    /// are sent as null.
    pub fn payload(&self) -> Row {
        self.fields
            .iter()
            .filter_map(|field| {
                let value = self.values.get(field.key.as_str())?;
                let value = match (field.kind, value) {
                    (FieldKind::Date | FieldKind::Relation { .. }, Value::String(s))
                        if s.trim().is_empty() =>
                    {
                        Value::Null
                    }
                    _ => value.clone(),
                };
                Some((field.key.to_string(), value))
            })
            .collect()
    }
}

/// Where the editor is in its lifecycle.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum EditorState {
    #[default]
    Closed,
    Open {
        mode: EditorMode,
        form: Form,
        /// The last save error, kept until the next attempt.
        error: Option<String>,
    },
    Submitting {
        mode: EditorMode,
        form: Form,
    },
}

/// A save in flight.
#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
    pub mode: EditorMode,
    pub payload: Row,
}

/// Add/edit form state for one collection.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordEditor {
    collection: Collection,
    state: EditorState,
}
impl RecordEditor {
    pub fn new(collection: Collection) -> Self {
        Self {
            collection,
            state: EditorState::Closed,
        }
    }

    pub fn collection(&self) -> Collection {
        self.collection
    }

    pub fn state(&self) -> &EditorState {
        &self.state
    }

    pub fn is_open(&self) -> bool {
        !matches!(self.state, EditorState::Closed)
    }

    pub fn form(&self) -> Option<&Form> {
        match &self.state {
            EditorState::Closed => None,
            EditorState::Open { form, .. } | EditorState::Submitting { form, .. } => Some(form),
        }
    }

    pub fn mode(&self) -> Option<&EditorMode> {
        match &self.state {
            EditorState::Closed => None,
            EditorState::Open { mode, .. } | EditorState::Submitting { mode, .. } => Some(mode),
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.state {
            EditorState::Open { error, .. } => error.as_deref(),
            _ => None,
        }
    }

    /// Opens a blank form shaped like `sample`.
    pub fn open_add(&mut self, sample: Option<&Row>) {
        let form = Form::new(self.collection, template(self.collection, sample));
        tracing::debug!(collection = %self.collection, fields = form.fields.len(), "opened add form");
        self.state = EditorState::Open {
            mode: EditorMode::Add,
            form,
            error: None,
        };
    }

    /// Opens a form seeded with the whole of `row`.
    pub fn open_edit(&mut self, row: &Row) -> Result<(), EditorError> {
        let id = row
            .get("id")
            .and_then(RecordId::from_value)
            .ok_or(EditorError::MissingId)?;
        tracing::debug!(collection = %self.collection, %id, "opened edit form");
        self.state = EditorState::Open {
            mode: EditorMode::Edit { id },
            form: Form::new(self.collection, row.clone()),
            error: None,
        };
        Ok(())
    }

    pub fn set_field(&mut self, key: &str, input: &str) -> Result<(), EditorError> {
        match &mut self.state {
            EditorState::Open { form, .. } => form.set(key, input),
            EditorState::Submitting { .. } => Err(EditorError::Busy),
            EditorState::Closed => Err(EditorError::NotOpen),
        }
    }

    /// Discards the form. Has no effect while a save is in flight.
    pub fn cancel(&mut self) {
        if matches!(self.state, EditorState::Submitting { .. }) {
            tracing::debug!("ignoring cancel while submitting");
            return;
        }
        self.state = EditorState::Closed;
    }

    /// Moves to `Submitting` and returns what to write.
    pub fn begin_submit(&mut self) -> Result<Submission, EditorError> {
        match std::mem::take(&mut self.state) {
            EditorState::Open { mode, form, .. } => {
                let submission = Submission {
                    mode: mode.clone(),
                    payload: form.payload(),
                };
                self.state = EditorState::Submitting { mode, form };
                Ok(submission)
            }
            state @ EditorState::Submitting { .. } => {
                self.state = state;
                Err(EditorError::Busy)
            }
            EditorState::Closed => Err(EditorError::NotOpen),
        }
    }

    /// Closes the form on success; reopens it with `error` otherwise.
    pub fn finish_submit(&mut self, result: Result<(), String>) {
        match (std::mem::take(&mut self.state), result) {
            (EditorState::Submitting { .. }, Ok(())) => {}
            (EditorState::Submitting { mode, form }, Err(error)) => {
                self.state = EditorState::Open {
                    mode,
                    form,
                    error: Some(error),
                };
            }
            (state, _) => {
                tracing::warn!("finished a submit that was never started");
                self.state = state;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::json;

    fn row(value: Value) -> Row {
        value.as_object().unwrap().clone()
    }

    #[test]
    fn edit_payload_excludes_read_only_fields() {
        let mut editor = RecordEditor::new(Collection::Calendar);
        editor
            .open_edit(&row(json!({
                "id": 9,
                "date": "2024-06-20",
                "title": "Concert",
                "artist_id": 2,
                "artist": { "name": "Por" },
            })))
            .unwrap();
        editor.set_field("title", "Encore").unwrap();
        let submission = editor.begin_submit().unwrap();
        assert_eq!(
            submission.mode,
            EditorMode::Edit {
                id: RecordId("9".to_string())
            }
        );
        assert_eq!(
            Value::Object(submission.payload),
            json!({ "date": "2024-06-20", "title": "Encore", "artist_id": 2 })
        );
        // The seeded record is kept whole.
        assert_eq!(editor.form().unwrap().value("id"), Some(&json!(9)));
    }

    #[test]
    fn add_payload_nulls_blank_dates_and_relations() {
        let mut editor = RecordEditor::new(Collection::Magazines);
        editor.open_add(None);
        editor.set_field("title", "Vogue").unwrap();
        let submission = editor.begin_submit().unwrap();
        assert_eq!(submission.mode, EditorMode::Add);
        assert_eq!(submission.payload["date"], Value::Null);
        assert_eq!(submission.payload["artist_id"], Value::Null);
        assert_eq!(submission.payload["title"], json!("Vogue"));
        assert_eq!(submission.payload["issue"], json!(""));
    }

    #[test]
    fn transitions() {
        let mut editor = RecordEditor::new(Collection::Awards);
        assert_eq!(editor.begin_submit(), Err(EditorError::NotOpen));
        assert_eq!(editor.set_field("title", "x"), Err(EditorError::NotOpen));

        editor.open_add(None);
        editor.set_field("title", "Best Actor").unwrap();
        assert!(matches!(
            editor.set_field("nope", "x"),
            Err(EditorError::UnknownField { .. })
        ));

        editor.begin_submit().unwrap();
        assert!(matches!(editor.state(), EditorState::Submitting { .. }));
        assert_eq!(editor.begin_submit(), Err(EditorError::Busy));
        editor.cancel();
        assert!(matches!(editor.state(), EditorState::Submitting { .. }));

        editor.finish_submit(Err("permission denied".to_string()));
        assert_eq!(editor.error(), Some("permission denied"));
        assert_eq!(
            editor.form().unwrap().value("title"),
            Some(&json!("Best Actor"))
        );

        editor.begin_submit().unwrap();
        assert_eq!(editor.error(), None);
        editor.finish_submit(Ok(()));
        assert_eq!(editor.state(), &EditorState::Closed);
    }

    #[test]
    fn edit_requires_an_id() {
        let mut editor = RecordEditor::new(Collection::Awards);
        assert_eq!(
            editor.open_edit(&row(json!({ "title": "x" }))),
            Err(EditorError::MissingId)
        );
        assert!(!editor.is_open());
    }
}
