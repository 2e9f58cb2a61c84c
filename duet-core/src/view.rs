use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use duet_state::{
    ALL, Collection, DateWindow, Engine, FilterSpec, GroupSpec, Listing, Normalizer, Record,
    SortKey, SortSpec,
};

use crate::{
    Backend,
    db::{ClientResult, Direction, Row},
};

/// How a collection's public page presents its records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PagePreset {
    pub collection: Collection,
    /// The date-like field filtered on and sorted by. `None` for undated collections.
    pub date_field: Option<&'static str>,
    /// A time-of-day field that orders same-day records.
    pub time_field: Option<&'static str>,
    /// Searched in priority order.
    pub display_fields: &'static [&'static str],
    /// Fields offered as exact-match dropdowns.
    pub categorical_fields: &'static [&'static str],
    /// Whether the page starts out showing only records from today onwards.
    pub upcoming_by_default: bool,
    /// Whether the list is sectioned by month.
    pub group_by_month: bool,
    pub direction: Direction,
}
impl PagePreset {
    pub fn for_collection(collection: Collection) -> Self {
        let (_, direction) = collection.default_order();
        let base = PagePreset {
            collection,
            date_field: Some("date"),
            time_field: None,
            display_fields: &["title", "name"],
            categorical_fields: &["artist"],
            upcoming_by_default: false,
            group_by_month: false,
            direction,
        };
        match collection {
            Collection::Artist => PagePreset {
                date_field: None,
                display_fields: &["name", "full_name"],
                categorical_fields: &[],
                ..base
            },
            Collection::Calendar => PagePreset {
                time_field: Some("time"),
                categorical_fields: &["artist", "type"],
                upcoming_by_default: true,
                group_by_month: true,
                ..base
            },
            Collection::Performance => PagePreset {
                time_field: Some("time"),
                upcoming_by_default: true,
                ..base
            },
            Collection::Filmography
            | Collection::Discography
            | Collection::Endorsements
            | Collection::Contents => PagePreset {
                categorical_fields: &["artist", "type"],
                ..base
            },
            Collection::Awards => PagePreset {
                categorical_fields: &["artist", "result"],
                ..base
            },
            Collection::Magazines => base,
            Collection::FilmographyDetail => PagePreset {
                date_field: Some("air_date"),
                categorical_fields: &["filmography_id"],
                ..base
            },
        }
    }

    /// The window used while the user has not picked any bound.
    pub fn default_window(&self, today: NaiveDate) -> DateWindow {
        if self.upcoming_by_default {
            DateWindow::Upcoming { today }
        } else {
            DateWindow::All
        }
    }
}

/// User-controlled filter state of a list page.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FilterState {
    pub search: String,
    /// Selected value per categorical field. Missing or [`ALL`] means unfiltered.
    pub categories: BTreeMap<String, String>,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    /// Overrides the page's default direction.
    pub direction: Option<Direction>,
}
impl FilterState {
    pub fn select(&mut self, field: &str, value: impl Into<String>) {
        self.categories.insert(field.to_string(), value.into());
    }
}

/// Identifies one fetch. Only the latest ticket's response is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket(u64);

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FetchState {
    #[default]
    Idle,
    Loading,
    Loaded,
    Failed { error: String },
}

/// A public list page: the fetched records of one collection plus the filters
/// the user has applied to them.
#[derive(Debug)]
pub struct CollectionView {
    preset: PagePreset,
    normalizer: Normalizer,
    engine: Engine,
    records: Vec<Record>,
    pub filters: FilterState,
    fetch_state: FetchState,
    request_counter: u64,
}
impl CollectionView {
    pub fn new(preset: PagePreset) -> Self {
        Self {
            normalizer: preset.collection.normalizer(),
            preset,
            engine: Engine::new(),
            records: vec![],
            filters: FilterState::default(),
            fetch_state: FetchState::Idle,
            request_counter: 0,
        }
    }

    pub fn for_collection(collection: Collection) -> Self {
        Self::new(PagePreset::for_collection(collection))
    }

    pub fn preset(&self) -> &PagePreset {
        &self.preset
    }

    pub fn fetch_state(&self) -> &FetchState {
        &self.fetch_state
    }

    pub fn error(&self) -> Option<&str> {
        match &self.fetch_state {
            FetchState::Failed { error } => Some(error),
            _ => None,
        }
    }

    /// Every fetched record, normalized, in backend order.
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Starts a fetch. Any fetch still in flight becomes stale.
    pub fn begin_fetch(&mut self) -> FetchTicket {
        self.request_counter = self.request_counter.wrapping_add(1);
        self.fetch_state = FetchState::Loading;
        FetchTicket(self.request_counter)
    }

    /// Applies the response to `ticket`'s fetch. Returns `false` and leaves the
    /// view untouched if a newer fetch has started since.
    pub fn complete_fetch(&mut self, ticket: FetchTicket, result: ClientResult<Vec<Row>>) -> bool {
        if ticket.0 != self.request_counter {
            tracing::debug!(
                collection = %self.preset.collection,
                stale = ticket.0,
                current = self.request_counter,
                "discarding stale fetch response"
            );
            return false;
        }
        match result {
            Ok(rows) => {
                self.records = self.normalizer.normalize_all(rows);
                self.fetch_state = FetchState::Loaded;
                tracing::debug!(
                    collection = %self.preset.collection,
                    count = self.records.len(),
                    "fetched records"
                );
            }
            Err(e) => {
                tracing::warn!(collection = %self.preset.collection, "fetch failed: {e}");
                self.records.clear();
                self.fetch_state = FetchState::Failed {
                    error: e.to_string(),
                };
            }
        }
        true
    }

    /// Fetches and applies the collection's records.
    pub async fn refresh(&mut self, backend: &impl Backend) {
        let ticket = self.begin_fetch();
        let result = backend.fetch(self.preset.collection).await;
        self.complete_fetch(ticket, result);
    }

    /// Fetches again after a failure.
    pub async fn retry(&mut self, backend: &impl Backend) {
        tracing::info!(collection = %self.preset.collection, "retrying fetch");
        self.refresh(backend).await;
    }

    pub fn date_window(&self, today: NaiveDate) -> DateWindow {
        DateWindow::resolve(
            self.filters.start,
            self.filters.end,
            self.preset.default_window(today),
        )
    }

    pub fn filter_spec(&self, today: NaiveDate) -> FilterSpec {
        let mut spec = FilterSpec::new();
        if let Some(field) = self.preset.date_field {
            spec = spec.date_window(field, self.date_window(today));
        }
        for (field, value) in &self.filters.categories {
            spec = spec.categorical(field, value.as_str());
        }
        spec.text_search(
            self.preset.display_fields.iter().copied(),
            self.filters.search.trim(),
        )
    }

    pub fn sort_spec(&self) -> SortSpec {
        let direction = self.filters.direction.unwrap_or(self.preset.direction);
        let key = match self.preset.date_field {
            Some(field) => SortKey::Date(field.into()),
            None => {
                let field = self.preset.display_fields.first().copied().unwrap_or("name");
                SortKey::Text(field.into())
            }
        };
        let spec = SortSpec::by(key, direction);
        match self.preset.time_field {
            Some(field) => spec.then(SortKey::Time(field.into())),
            None => spec,
        }
    }

    pub fn group_spec(&self) -> Option<GroupSpec> {
        match (self.preset.group_by_month, self.preset.date_field) {
            (true, Some(field)) => Some(GroupSpec::by_month(field)),
            _ => None,
        }
    }

    /// What the page currently shows.
    pub fn visible(&self, today: NaiveDate) -> Listing {
        self.engine.apply(
            &self.records,
            &self.filter_spec(today),
            &self.sort_spec(),
            self.group_spec().as_ref(),
        )
    }

    /// The values offered for a categorical dropdown: [`ALL`] followed by every
    /// distinct value in the fetched records, in collation order.
    pub fn categorical_options(&self, field: &str) -> Vec<String> {
        let mut values = BTreeSet::new();
        for record in &self.records {
            if record.relation() == Some(field) {
                values.extend(record.relation_names().iter().cloned());
                if record.relation_names().is_empty()
                    && let Some(display_field) = self.normalizer.display_field()
                    && let Some(name) = record.text(&display_field)
                {
                    values.insert(name.into_owned());
                }
            } else if let Some(value) = record.text(field)
                && !value.is_empty()
            {
                values.insert(value.into_owned());
            }
        }
        let mut values: Vec<String> = values.into_iter().collect();
        let collation = self.engine.collation();
        values.sort_by(|a, b| collation.compare(a, b));
        std::iter::once(ALL.to_string()).chain(values).collect()
    }
}
