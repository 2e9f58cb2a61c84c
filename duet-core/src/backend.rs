use std::future::Future;

use duet_state::{Collection, RecordId};

use crate::db::{self, ClientResult, Row};

/// The operations duet needs from the managed backend.
///
/// Implemented by [`db::Client`]; pages and the admin table are generic over it so
/// they can be driven by an in-memory backend in tests.
pub trait Backend: Send + Sync {
    /// Every row of `collection`, relation joined, in the collection's default order.
    fn fetch(&self, collection: Collection) -> impl Future<Output = ClientResult<Vec<Row>>> + Send;

    /// `id` and label of every row of `collection`, for relation pickers.
    fn fetch_options(
        &self,
        collection: Collection,
    ) -> impl Future<Output = ClientResult<Vec<Row>>> + Send;

    /// Insert one row, returning the stored row(s).
    fn insert(
        &self,
        collection: Collection,
        payload: &Row,
    ) -> impl Future<Output = ClientResult<Vec<Row>>> + Send;

    /// Update the row keyed by `id`.
    fn update(
        &self,
        collection: Collection,
        id: &RecordId,
        payload: &Row,
    ) -> impl Future<Output = ClientResult<Vec<Row>>> + Send;

    /// Delete the row keyed by `id`.
    fn delete(
        &self,
        collection: Collection,
        id: &RecordId,
    ) -> impl Future<Output = ClientResult<Vec<Row>>> + Send;
}

impl Backend for db::Client {
    async fn fetch(&self, collection: Collection) -> ClientResult<Vec<Row>> {
        collection.query(self).fetch().await
    }

    async fn fetch_options(&self, collection: Collection) -> ClientResult<Vec<Row>> {
        let label = collection.label_field();
        self.from(collection.as_str())
            .select(format!("id, {label}"))
            .order(label, db::Direction::Ascending)
            .fetch()
            .await
    }

    async fn insert(&self, collection: Collection, payload: &Row) -> ClientResult<Vec<Row>> {
        db::Client::insert(self, collection.as_str(), payload).await
    }

    async fn update(
        &self,
        collection: Collection,
        id: &RecordId,
        payload: &Row,
    ) -> ClientResult<Vec<Row>> {
        db::Client::update(self, collection.as_str(), id, payload).await
    }

    async fn delete(&self, collection: Collection, id: &RecordId) -> ClientResult<Vec<Row>> {
        db::Client::delete(self, collection.as_str(), id).await
    }
}
