//! The admin surface: a form editor that works on any collection by inferring
//! its fields from the rows themselves.

use duet_state::{Collection, RecordId};

pub mod field;
pub use field::{FieldDescriptor, FieldKind};

pub mod template;

mod state;
pub use state::{EditorMode, EditorState, Form, RecordEditor, Submission};

mod admin;
pub use admin::{AdminTable, DeleteConfirmation, RelationOption};

/// An error raised by the record editor before anything reaches the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorError {
    /// No form is open.
    NotOpen,
    /// A save is already in flight.
    Busy,
    /// The row being edited has no usable `id`.
    MissingId,
    /// The form has no editable field with this key.
    UnknownField {
        /// The key that was set.
        key: String,
    },
    /// The input could not be parsed for the field's kind.
    InvalidValue {
        /// The field being set.
        key: String,
        /// The text that was rejected.
        input: String,
        /// What the field accepts, for the error message.
        expected: &'static str,
    },
}
impl std::fmt::Display for EditorError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EditorError::NotOpen => write!(f, "No record is being edited"),
            EditorError::Busy => write!(f, "A save is already in progress"),
            EditorError::MissingId => write!(f, "The record has no id"),
            EditorError::UnknownField { key } => write!(f, "`{key}` is not an editable field"),
            EditorError::InvalidValue {
                key,
                input,
                expected,
            } => write!(f, "`{input}` is not valid for `{key}`: expected {expected}"),
        }
    }
}
impl std::error::Error for EditorError {}

/// An error raised while managing the records of one collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdminError {
    /// The rows or an option list could not be fetched.
    FetchFailed {
        /// The collection being loaded.
        collection: Collection,
        /// The backend's error, as shown to the user.
        error: String,
    },
    /// The backend rejected an insert or update.
    SaveFailed {
        /// The collection being written.
        collection: Collection,
        /// The backend's error, as shown to the user.
        error: String,
    },
    /// The backend rejected a delete.
    DeleteFailed {
        /// The collection being written.
        collection: Collection,
        /// The record that was not deleted.
        id: RecordId,
        /// The backend's error, as shown to the user.
        error: String,
    },
    /// No loaded row has this id.
    UnknownRecord {
        /// The collection that was searched.
        collection: Collection,
        /// The id that was asked for.
        id: RecordId,
    },
    /// The editor refused the operation.
    Editor(EditorError),
}
impl AdminError {
    /// Should be paired with [`Self::display_message`]
    pub fn display_name(&self) -> &'static str {
        match self {
            AdminError::FetchFailed { .. } => "Failed to load records",
            AdminError::SaveFailed { .. } => "Failed to save record",
            AdminError::DeleteFailed { .. } => "Failed to delete record",
            AdminError::UnknownRecord { .. } => "No such record",
            AdminError::Editor(_) => "Invalid edit",
        }
    }

    /// Should be paired with [`Self::display_name`]
    pub fn display_message(&self) -> String {
        match self {
            AdminError::FetchFailed { collection, error } => format!("{collection}: {error}"),
            AdminError::SaveFailed { collection, error } => format!("{collection}: {error}"),
            AdminError::DeleteFailed {
                collection,
                id,
                error,
            } => format!("{collection} `{id}`: {error}"),
            AdminError::UnknownRecord { collection, id } => {
                format!("{collection} has no record `{id}`")
            }
            AdminError::Editor(error) => error.to_string(),
        }
    }
}
impl std::fmt::Display for AdminError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.display_name(), self.display_message())
    }
}
impl std::error::Error for AdminError {}
impl From<EditorError> for AdminError {
    fn from(error: EditorError) -> Self {
        AdminError::Editor(error)
    }
}
