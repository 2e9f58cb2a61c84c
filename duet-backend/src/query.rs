use crate::{Client, ClientResult, Row};

/// The direction of an ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Direction {
    /// Smallest first.
    #[default]
    Ascending,
    /// Largest first.
    Descending,
}
impl Direction {
    /// The wire representation of the direction.
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Ascending => "asc",
            Direction::Descending => "desc",
        }
    }

    /// Returns the opposite direction.
    pub fn reversed(self) -> Self {
        match self {
            Direction::Ascending => Direction::Descending,
            Direction::Descending => Direction::Ascending,
        }
    }
}
impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A read query against a single collection.
///
/// Built with [`Client::from`] and executed with [`Query::fetch`]:
///
/// ```no_run
/// # async fn run(client: &duet_backend::Client) -> duet_backend::ClientResult<()> {
/// let _rows = client
///     .from("calendar")
///     .select("*, artist(name)")
///     .order("date", duet_backend::Direction::Ascending)
///     .fetch()
///     .await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Query<'a> {
    client: &'a Client,
    collection: String,
    columns: String,
    order: Vec<(String, Direction)>,
    filters: Vec<(String, String)>,
}
impl<'a> Query<'a> {
    /// Set the columns to select, including embedded relations such as `artist(name)`.
    pub fn select(mut self, columns: impl Into<String>) -> Self {
        self.columns = columns.into();
        self
    }

    /// Order by `field`. Multiple calls add secondary orderings.
    pub fn order(mut self, field: impl Into<String>, direction: Direction) -> Self {
        self.order.push((field.into(), direction));
        self
    }

    /// Only return rows whose `field` equals `value`.
    pub fn eq(mut self, field: impl Into<String>, value: impl std::fmt::Display) -> Self {
        self.filters.push((field.into(), format!("eq.{value}")));
        self
    }

    /// The collection this query reads from.
    pub fn collection(&self) -> &str {
        &self.collection
    }

    pub(crate) fn parameters(&self) -> Vec<(String, String)> {
        let mut parameters = vec![("select".to_string(), self.columns.clone())];
        if !self.order.is_empty() {
            let order = self
                .order
                .iter()
                .map(|(field, direction)| format!("{field}.{direction}"))
                .collect::<Vec<_>>()
                .join(",");
            parameters.push(("order".to_string(), order));
        }
        parameters.extend(self.filters.iter().cloned());
        parameters
    }

    /// Execute the query, returning every matching row.
    pub async fn fetch(self) -> ClientResult<Vec<Row>> {
        let request = self.client.authorize(
            self.client
                .client
                .get(self.client.rest_url(&self.collection))
                .query(&self.parameters()),
        );
        let rows: Vec<Row> = self.client.send(request).await?;
        tracing::debug!(
            collection = %self.collection,
            count = rows.len(),
            "fetched rows"
        );
        Ok(rows)
    }
}

/// Query-related endpoints.
impl Client {
    /// Start a query against `collection`. Selects all columns until [`Query::select`] is called.
    pub fn from(&self, collection: impl Into<String>) -> Query<'_> {
        Query {
            client: self,
            collection: collection.into(),
            columns: "*".to_string(),
            order: vec![],
            filters: vec![],
        }
    }
}
