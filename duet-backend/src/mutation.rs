use crate::{Client, ClientResult, Row};

/// Write endpoints. Every mutation asks the backend to return the affected rows.
impl Client {
    /// Insert a single row into `collection`.
    pub async fn insert(&self, collection: &str, payload: &Row) -> ClientResult<Vec<Row>> {
        let request = self.write_request(self.client.post(self.rest_url(collection)), payload)?;
        let rows: Vec<Row> = self.send(request).await?;
        tracing::info!(collection, count = rows.len(), "inserted rows");
        Ok(rows)
    }

    /// Update the row of `collection` whose `id` equals `id`.
    pub async fn update(
        &self,
        collection: &str,
        id: impl std::fmt::Display,
        payload: &Row,
    ) -> ClientResult<Vec<Row>> {
        let request = self.write_request(
            self.client
                .patch(self.rest_url(collection))
                .query(&[("id", format!("eq.{id}"))]),
            payload,
        )?;
        let rows: Vec<Row> = self.send(request).await?;
        tracing::info!(collection, %id, count = rows.len(), "updated rows");
        Ok(rows)
    }

    /// Delete the row of `collection` whose `id` equals `id`.
    pub async fn delete(
        &self,
        collection: &str,
        id: impl std::fmt::Display,
    ) -> ClientResult<Vec<Row>> {
        let request = self.authorize(
            self.client
                .delete(self.rest_url(collection))
                .query(&[("id", format!("eq.{id}"))])
                .header("Prefer", "return=representation"),
        );
        let rows: Vec<Row> = self.send(request).await?;
        tracing::info!(collection, %id, count = rows.len(), "deleted rows");
        Ok(rows)
    }

    fn write_request(
        &self,
        request: reqwest::RequestBuilder,
        payload: &Row,
    ) -> ClientResult<reqwest::RequestBuilder> {
        Ok(self.authorize(
            request
                .header("Content-Type", "application/json")
                .header("Prefer", "return=representation")
                .body(serde_json::to_vec(payload)?),
        ))
    }
}
