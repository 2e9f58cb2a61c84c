use std::{
    collections::BTreeMap,
    sync::{
        Mutex,
        atomic::{AtomicBool, AtomicU64, Ordering},
    },
};

use duet_state::{Collection, RecordId};
use serde_json::Value;

use crate::{
    Backend,
    db::{ClientError, ClientResult, Row},
};

pub fn rows(value: Value) -> Vec<Row> {
    match value {
        Value::Array(values) => values
            .into_iter()
            .map(|value| match value {
                Value::Object(row) => row,
                other => panic!("not an object: {other}"),
            })
            .collect(),
        other => panic!("not an array: {other}"),
    }
}

/// Tables held in memory, with a log of every call made against them.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    tables: Mutex<BTreeMap<Collection, Vec<Row>>>,
    calls: Mutex<Vec<String>>,
    next_id: AtomicU64,
    pub fail_writes: AtomicBool,
    pub fail_fetches: AtomicBool,
}
impl MemoryBackend {
    pub fn seed(&self, collection: Collection, rows: Vec<Row>) {
        self.tables.lock().unwrap().insert(collection, rows);
    }

    pub fn table(&self, collection: Collection) -> Vec<Row> {
        self.tables
            .lock()
            .unwrap()
            .get(&collection)
            .cloned()
            .unwrap_or_default()
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    fn failure(flag: &AtomicBool) -> ClientResult<()> {
        if flag.load(Ordering::SeqCst) {
            Err(ClientError::BackendError {
                status: 403,
                code: Some("42501".to_string()),
                message: Some("permission denied".to_string()),
            })
        } else {
            Ok(())
        }
    }
}

fn id_of(row: &Row) -> Option<RecordId> {
    row.get("id").and_then(RecordId::from_value)
}

impl Backend for MemoryBackend {
    async fn fetch(&self, collection: Collection) -> ClientResult<Vec<Row>> {
        self.record(format!("fetch {collection}"));
        Self::failure(&self.fail_fetches)?;
        Ok(self.table(collection))
    }

    async fn fetch_options(&self, collection: Collection) -> ClientResult<Vec<Row>> {
        self.record(format!("options {collection}"));
        Self::failure(&self.fail_fetches)?;
        let label = collection.label_field();
        Ok(self
            .table(collection)
            .into_iter()
            .map(|row| {
                let mut option = Row::new();
                for key in ["id", label] {
                    if let Some(value) = row.get(key) {
                        option.insert(key.to_string(), value.clone());
                    }
                }
                option
            })
            .collect())
    }

    async fn insert(&self, collection: Collection, payload: &Row) -> ClientResult<Vec<Row>> {
        self.record(format!("insert {collection}"));
        Self::failure(&self.fail_writes)?;
        let mut row = payload.clone();
        let id = 100 + self.next_id.fetch_add(1, Ordering::SeqCst);
        row.insert("id".to_string(), Value::from(id));
        self.tables
            .lock()
            .unwrap()
            .entry(collection)
            .or_default()
            .push(row.clone());
        Ok(vec![row])
    }

    async fn update(
        &self,
        collection: Collection,
        id: &RecordId,
        payload: &Row,
    ) -> ClientResult<Vec<Row>> {
        self.record(format!("update {collection} {id}"));
        Self::failure(&self.fail_writes)?;
        let mut tables = self.tables.lock().unwrap();
        let mut updated = vec![];
        for row in tables.entry(collection).or_default() {
            if id_of(row).as_ref() == Some(id) {
                row.extend(payload.clone());
                updated.push(row.clone());
            }
        }
        Ok(updated)
    }

    async fn delete(&self, collection: Collection, id: &RecordId) -> ClientResult<Vec<Row>> {
        self.record(format!("delete {collection} {id}"));
        Self::failure(&self.fail_writes)?;
        let mut tables = self.tables.lock().unwrap();
        let table = tables.entry(collection).or_default();
        let (deleted, kept): (Vec<Row>, Vec<Row>) = table
            .drain(..)
            .partition(|row| id_of(row).as_ref() == Some(id));
        *table = kept;
        Ok(deleted)
    }
}
