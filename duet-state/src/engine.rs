use crate::{Collation, FilterSpec, Group, GroupSpec, Record, SortSpec};

/// The visible part of a list, flat or in sections.
#[derive(Debug, Clone, PartialEq)]
pub enum Listing {
    /// Filtered and sorted records.
    Flat(Vec<Record>),
    /// Filtered and sorted records, bucketed by group key.
    Grouped(Vec<Group>),
}
impl Listing {
    /// The number of records shown.
    pub fn len(&self) -> usize {
        match self {
            Listing::Flat(records) => records.len(),
            Listing::Grouped(groups) => groups.iter().map(|g| g.records.len()).sum(),
        }
    }

    /// Whether nothing is shown.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every record shown, in display order.
    pub fn records(&self) -> Box<dyn Iterator<Item = &Record> + '_> {
        match self {
            Listing::Flat(records) => Box::new(records.iter()),
            Listing::Grouped(groups) => Box::new(groups.iter().flat_map(|g| g.records.iter())),
        }
    }

    /// Flattens into display order, discarding group headings.
    pub fn into_records(self) -> Vec<Record> {
        match self {
            Listing::Flat(records) => records,
            Listing::Grouped(groups) => groups.into_iter().flat_map(|g| g.records).collect(),
        }
    }
}

/// Produces what a list page shows from the records it has fetched.
#[derive(Debug, Default)]
pub struct Engine {
    collation: Collation,
}
impl Engine {
    /// Create an engine, loading collation data once.
    pub fn new() -> Self {
        Self::default()
    }

    /// The collation used for text ordering.
    pub fn collation(&self) -> &Collation {
        &self.collation
    }

    /// The records passing `filter`, in their original order.
    pub fn filter(&self, records: &[Record], filter: &FilterSpec) -> Vec<Record> {
        records
            .iter()
            .filter(|record| filter.matches(record))
            .cloned()
            .collect()
    }

    /// Filter, then stable-sort, then optionally group.
    pub fn apply(
        &self,
        records: &[Record],
        filter: &FilterSpec,
        sort: &SortSpec,
        group: Option<&GroupSpec>,
    ) -> Listing {
        let mut visible = self.filter(records, filter);
        sort.sort(&mut visible, &self.collation);
        tracing::trace!(
            total = records.len(),
            visible = visible.len(),
            grouped = group.is_some(),
            "applied list view"
        );
        match group {
            Some(group) => Listing::Grouped(group.group(visible)),
            None => Listing::Flat(visible),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::NaiveDate;
    use serde_json::{Value, json};

    use crate::{DateWindow, Normalizer, SortKey, db::Direction};

    fn records(values: Vec<Value>) -> Vec<Record> {
        let normalizer = Normalizer::new(Some("artist"));
        values
            .into_iter()
            .map(|value| match value {
                Value::Object(row) => normalizer.normalize(row),
                other => panic!("not an object: {other}"),
            })
            .collect()
    }

    fn calendar() -> Vec<Record> {
        records(vec![
            json!({"id": 1, "title": "Fan Meet", "date": "2024-06-20", "artist": {"name": "Por"}}),
            json!({"id": 2, "title": "Duang With You", "date": "2024-05-01", "artist": [{"name": "Teetee"}]}),
            json!({"id": 3, "title": "Concert", "date": "2024-07-04", "artist": [{"name": "Por"}, {"name": "Teetee"}]}),
            json!({"id": 4, "title": "Interview", "date": "2024-06-02", "artist": null}),
            json!({"id": 5, "title": "Premiere", "date": "2024-07-01", "artist": {"name": "Por"}}),
        ])
    }

    fn ids(records: impl IntoIterator<Item = Record>) -> Vec<String> {
        records.into_iter().map(|r| r.id().unwrap().0).collect()
    }

    #[test]
    fn descending_sort_yields_newest_month_first() {
        let listing = Engine::new().apply(
            &calendar(),
            &FilterSpec::new(),
            &SortSpec::by(SortKey::Date("date".into()), Direction::Descending),
            Some(&GroupSpec::by_month("date")),
        );

        let Listing::Grouped(groups) = &listing else {
            panic!("expected groups");
        };
        let keys: Vec<_> = groups.iter().map(|g| g.key.as_str()).collect();
        assert_eq!(keys, ["July 2024", "June 2024", "May 2024"]);
        assert_eq!(ids(listing.into_records()), ["3", "5", "1", "4", "2"]);
    }

    #[test]
    fn filters_then_sorts() {
        let filter = FilterSpec::new()
            .categorical("artist", "Por")
            .date_window(
                "date",
                DateWindow::Upcoming {
                    today: NaiveDate::from_ymd_opt(2024, 6, 15).unwrap(),
                },
            );
        let listing = Engine::new().apply(&calendar(), &filter, &SortSpec::default(), None);
        assert_eq!(ids(listing.into_records()), ["1", "5", "3"]);
    }

    #[test]
    fn grouped_count_matches_flat_count() {
        let engine = Engine::new();
        let filter = FilterSpec::new().text_search(["title", "name"], "e");
        let flat = engine.apply(&calendar(), &filter, &SortSpec::default(), None);
        let grouped = engine.apply(
            &calendar(),
            &filter,
            &SortSpec::default(),
            Some(&GroupSpec::by_month("date")),
        );
        assert_eq!(flat.len(), grouped.len());
        assert_eq!(
            flat.records().collect::<Vec<_>>(),
            grouped.records().collect::<Vec<_>>()
        );
    }

    #[test]
    fn unknown_artist_is_filterable() {
        let listing = Engine::new().apply(
            &calendar(),
            &FilterSpec::new().categorical("artist", Normalizer::UNKNOWN),
            &SortSpec::default(),
            None,
        );
        assert_eq!(ids(listing.into_records()), ["4"]);
    }
}
