use std::collections::BTreeMap;

use duet_state::{Collection, RecordId};

use super::{AdminError, EditorMode, RecordEditor};
use crate::{Backend, db::Row};

/// An entry in a relation picker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationOption {
    pub id: RecordId,
    pub label: String,
}
impl RelationOption {
    fn from_row(collection: Collection, row: &Row) -> Option<Self> {
        let id = row.get("id").and_then(RecordId::from_value)?;
        let label = row
            .get(collection.label_field())
            .and_then(|v| v.as_str())
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| id.to_string());
        Some(Self { id, label })
    }
}

/// Proof that the user confirmed deleting a record. Only
/// [`AdminTable::request_delete`] hands these out.
#[derive(Debug, PartialEq, Eq)]
pub struct DeleteConfirmation {
    id: RecordId,
}
impl DeleteConfirmation {
    pub fn id(&self) -> &RecordId {
        &self.id
    }
}

/// The admin view of one collection: its raw rows, the option lists for its
/// relation fields, and the add/edit form.
#[derive(Debug)]
pub struct AdminTable<B> {
    backend: B,
    collection: Collection,
    rows: Vec<Row>,
    options: BTreeMap<Collection, Vec<RelationOption>>,
    editor: RecordEditor,
    error: Option<AdminError>,
}
impl<B: Backend> AdminTable<B> {
    pub fn new(backend: B, collection: Collection) -> Self {
        Self {
            backend,
            collection,
            rows: vec![],
            options: BTreeMap::new(),
            editor: RecordEditor::new(collection),
            error: None,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn collection(&self) -> Collection {
        self.collection
    }

    /// The rows as the backend returned them, relation objects included.
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn row(&self, id: &RecordId) -> Option<&Row> {
        self.rows.iter().find(|row| row_id(row).as_ref() == Some(id))
    }

    /// The last load failure, if the list could not be fetched.
    pub fn error(&self) -> Option<&AdminError> {
        self.error.as_ref()
    }

    pub fn editor(&self) -> &RecordEditor {
        &self.editor
    }

    /// The picker entries for relation fields pointing at `collection`.
    pub fn options(&self, collection: Collection) -> &[RelationOption] {
        self.options
            .get(&collection)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// The collections this one's foreign keys point at.
    pub fn relation_targets(&self) -> Vec<Collection> {
        let sampled = self
            .rows
            .first()
            .into_iter()
            .flat_map(|row| row.keys().map(String::as_str));
        let mut targets: Vec<Collection> = self
            .collection
            .important_columns()
            .iter()
            .copied()
            .chain(sampled)
            .filter_map(Collection::for_foreign_key)
            .collect();
        targets.sort();
        targets.dedup();
        targets
    }

    /// Fetches the rows and every relation option list at once.
    pub async fn load(&mut self) -> Result<(), AdminError> {
        let targets = self.relation_targets();
        let backend = &self.backend;
        let (rows, options) = futures::join!(
            backend.fetch(self.collection),
            futures::future::join_all(targets.into_iter().map(|target| async move {
                (target, backend.fetch_options(target).await)
            })),
        );

        for (target, result) in options {
            match result {
                Ok(rows) => {
                    let options = rows
                        .iter()
                        .filter_map(|row| RelationOption::from_row(target, row))
                        .collect();
                    self.options.insert(target, options);
                }
                Err(e) => {
                    tracing::warn!(collection = %self.collection, %target, "failed to fetch options: {e}");
                    self.options.remove(&target);
                }
            }
        }

        match rows {
            Ok(rows) => {
                tracing::debug!(collection = %self.collection, count = rows.len(), "loaded admin rows");
                self.rows = rows;
                self.error = None;
                Ok(())
            }
            Err(e) => {
                let error = AdminError::FetchFailed {
                    collection: self.collection,
                    error: e.to_string(),
                };
                tracing::warn!("{error}");
                self.rows.clear();
                self.error = Some(error.clone());
                Err(error)
            }
        }
    }

    /// Opens a blank form shaped like the first row.
    pub fn open_add(&mut self) {
        self.editor.open_add(self.rows.first());
    }

    pub fn open_edit(&mut self, id: &RecordId) -> Result<(), AdminError> {
        let row = self
            .rows
            .iter()
            .find(|row| row_id(row).as_ref() == Some(id))
            .ok_or_else(|| AdminError::UnknownRecord {
                collection: self.collection,
                id: id.clone(),
            })?;
        self.editor.open_edit(row)?;
        Ok(())
    }

    pub fn set_field(&mut self, key: &str, input: &str) -> Result<(), AdminError> {
        Ok(self.editor.set_field(key, input)?)
    }

    pub fn cancel(&mut self) {
        self.editor.cancel();
    }

    /// Writes the open form. On success the form closes and the rows are
    /// re-fetched; on failure the form stays open with the error attached.
    pub async fn submit(&mut self) -> Result<(), AdminError> {
        let submission = self.editor.begin_submit()?;
        let result = match &submission.mode {
            EditorMode::Add => {
                self.backend
                    .insert(self.collection, &submission.payload)
                    .await
            }
            EditorMode::Edit { id } => {
                self.backend
                    .update(self.collection, id, &submission.payload)
                    .await
            }
        };

        if let Err(e) = result {
            let error = AdminError::SaveFailed {
                collection: self.collection,
                error: e.to_string(),
            };
            tracing::warn!("{error}");
            self.editor.finish_submit(Err(error.display_message()));
            return Err(error);
        }

        tracing::info!(collection = %self.collection, mode = ?submission.mode, "saved record");
        self.editor.finish_submit(Ok(()));
        // The write went through; a failed re-fetch is reported through `error()`.
        if let Err(e) = self.load().await {
            tracing::warn!("re-fetch after save failed: {e}");
        }
        Ok(())
    }

    /// Checks that `id` exists, returning the confirmation [`Self::delete`] needs.
    pub fn request_delete(&self, id: &RecordId) -> Result<DeleteConfirmation, AdminError> {
        match self.row(id) {
            Some(_) => Ok(DeleteConfirmation { id: id.clone() }),
            None => Err(AdminError::UnknownRecord {
                collection: self.collection,
                id: id.clone(),
            }),
        }
    }

    /// Deletes a confirmed record and drops it from the local rows. Nothing is
    /// re-fetched. On failure the rows are left as they were.
    pub async fn delete(&mut self, confirmation: DeleteConfirmation) -> Result<(), AdminError> {
        let id = confirmation.id;
        if let Err(e) = self.backend.delete(self.collection, &id).await {
            let error = AdminError::DeleteFailed {
                collection: self.collection,
                id,
                error: e.to_string(),
            };
            tracing::warn!("{error}");
            return Err(error);
        }
        tracing::info!(collection = %self.collection, %id, "deleted record");
        self.rows.retain(|row| row_id(row).as_ref() != Some(&id));
        Ok(())
    }
}

fn row_id(row: &Row) -> Option<RecordId> {
    row.get("id").and_then(RecordId::from_value)
}
