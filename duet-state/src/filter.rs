use chrono::NaiveDate;
use smol_str::SmolStr;

use crate::{Record, date, normalize::derived_display_field};

/// The categorical value meaning "no filter".
pub const ALL: &str = "All";

/// Which dates a list shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DateWindow {
    /// Every record, dated or not.
    #[default]
    All,
    /// Records dated on or after `today`. Records without a usable date are hidden.
    Upcoming {
        /// The first day shown.
        today: NaiveDate,
    },
    /// Records dated within the inclusive bounds. A missing bound is open.
    Range {
        /// The first day shown.
        start: Option<NaiveDate>,
        /// The last day shown.
        end: Option<NaiveDate>,
    },
}
impl DateWindow {
    /// Picks the window for a page: explicit bounds win, otherwise the page's default
    /// applies. This is the single place deciding that a calendar-style page shows
    /// upcoming records until the user picks a start or end date.
    pub fn resolve(start: Option<NaiveDate>, end: Option<NaiveDate>, default: DateWindow) -> Self {
        if start.is_some() || end.is_some() {
            DateWindow::Range { start, end }
        } else {
            default
        }
    }

    /// Whether the window can exclude anything.
    pub fn is_active(&self) -> bool {
        match self {
            DateWindow::All => false,
            DateWindow::Upcoming { .. } => true,
            DateWindow::Range { start, end } => start.is_some() || end.is_some(),
        }
    }

    /// Whether a record dated `date` (`None` when missing or unparseable) is inside the window.
    ///
    /// Undated records are hidden from `Upcoming` only; once the user picks
    /// explicit bounds they show up again.
    pub fn contains(&self, date: Option<NaiveDate>) -> bool {
        match (self, date) {
            (DateWindow::All, _) => true,
            (DateWindow::Upcoming { .. }, None) => false,
            (DateWindow::Upcoming { today }, Some(date)) => date >= *today,
            (DateWindow::Range { .. }, None) => true,
            (DateWindow::Range { start, end }, Some(date)) => {
                start.is_none_or(|start| date >= start) && end.is_none_or(|end| date <= end)
            }
        }
    }
}

/// A single condition a record must meet to be shown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    /// The date in `field` lies within `window`.
    Date {
        /// The date-like field.
        field: SmolStr,
        /// The accepted dates.
        window: DateWindow,
    },
    /// The text of `field` equals `value` exactly. On the relation field, any
    /// of the joined names may match. [`ALL`] disables the predicate.
    Categorical {
        /// The field to compare.
        field: SmolStr,
        /// The selected value.
        value: String,
    },
    /// The first non-empty of `fields` contains `term`, ignoring case.
    /// An empty term disables the predicate.
    TextSearch {
        /// Display fields in priority order.
        fields: Vec<SmolStr>,
        /// The search term.
        term: String,
    },
}
impl Predicate {
    /// Evaluation rank; cheaper and more selective predicates run first.
    fn rank(&self) -> u8 {
        match self {
            Predicate::Date { .. } => 0,
            Predicate::Categorical { .. } => 1,
            Predicate::TextSearch { .. } => 2,
        }
    }

    /// Whether this predicate can exclude anything.
    pub fn is_active(&self) -> bool {
        match self {
            Predicate::Date { window, .. } => window.is_active(),
            Predicate::Categorical { value, .. } => !value.is_empty() && value != ALL,
            Predicate::TextSearch { term, .. } => !term.is_empty(),
        }
    }

    /// Whether `record` passes this predicate.
    pub fn matches(&self, record: &Record) -> bool {
        if !self.is_active() {
            return true;
        }
        match self {
            Predicate::Date { field, window } => {
                window.contains(record.text(field).and_then(|text| date::parse_date(&text)))
            }
            Predicate::Categorical { field, value } => {
                if record.relation() == Some(field.as_str()) && !record.relation_names().is_empty() {
                    record.relation_names().iter().any(|name| name == value)
                } else if record.relation() == Some(field.as_str()) {
                    record
                        .text(&derived_display_field(field))
                        .is_some_and(|text| text == *value)
                } else {
                    record.text(field).is_some_and(|text| text == *value)
                }
            }
            Predicate::TextSearch { fields, term } => {
                let term = term.to_lowercase();
                record
                    .first_text(fields)
                    .is_some_and(|text| text.to_lowercase().contains(&term))
            }
        }
    }
}

/// The set of predicates a list view applies. All must pass.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FilterSpec {
    predicates: Vec<Predicate>,
}
impl FilterSpec {
    /// A filter that passes everything.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a predicate. Predicates are kept in evaluation order:
    /// dates, then categories, then text search.
    pub fn with(mut self, predicate: Predicate) -> Self {
        let index = self
            .predicates
            .partition_point(|p| p.rank() <= predicate.rank());
        self.predicates.insert(index, predicate);
        self
    }

    /// Adds a date window on `field`.
    pub fn date_window(self, field: &str, window: DateWindow) -> Self {
        self.with(Predicate::Date {
            field: field.into(),
            window,
        })
    }

    /// Adds an exact-match filter on `field`.
    pub fn categorical(self, field: &str, value: impl Into<String>) -> Self {
        self.with(Predicate::Categorical {
            field: field.into(),
            value: value.into(),
        })
    }

    /// Adds a case-insensitive substring search over `fields`, in priority order.
    pub fn text_search<'a>(
        self,
        fields: impl IntoIterator<Item = &'a str>,
        term: impl Into<String>,
    ) -> Self {
        self.with(Predicate::TextSearch {
            fields: fields.into_iter().map(SmolStr::new).collect(),
            term: term.into(),
        })
    }

    /// The conjunction of both filters.
    pub fn and(self, other: FilterSpec) -> Self {
        other.predicates.into_iter().fold(self, Self::with)
    }

    /// The predicates, in evaluation order.
    pub fn predicates(&self) -> &[Predicate] {
        &self.predicates
    }

    /// Whether any predicate can exclude anything.
    pub fn is_active(&self) -> bool {
        self.predicates.iter().any(Predicate::is_active)
    }

    /// Whether `record` passes every predicate. Stops at the first failure.
    pub fn matches(&self, record: &Record) -> bool {
        self.predicates.iter().all(|p| p.matches(record))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::{Value, json};

    use crate::Normalizer;

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

    fn titles(records: &[Record], filter: &FilterSpec) -> Vec<String> {
        records
            .iter()
            .filter(|r| filter.matches(r))
            .map(|r| r.text("title").unwrap_or_default().into_owned())
            .collect()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn text_search_is_case_insensitive_substring() {
        let records = records(vec![
            json!({"title": "Duang With You", "date": "2024-05-01"}),
            json!({"title": "Other Show", "date": "2024-06-01"}),
        ]);
        let filter = FilterSpec::new().text_search(["title", "name"], "duang");
        assert_eq!(titles(&records, &filter), ["Duang With You"]);
    }

    #[test]
    fn text_search_falls_back_to_name() {
        let records = records(vec![
            json!({"name": "Por Suppakarn"}),
            json!({"title": "", "name": "Teetee"}),
        ]);
        let filter = FilterSpec::new().text_search(["title", "name"], "TEE");
        let matched: Vec<_> = records
            .iter()
            .filter(|r| filter.matches(r))
            .map(|r| r.text("name").unwrap().into_owned())
            .collect();
        assert_eq!(matched, ["Teetee"]);
    }

    #[test]
    fn upcoming_by_default_until_a_bound_is_set() {
        let today = date(2024, 6, 15);
        let records = records(vec![
            json!({"title": "Past", "date": "2024-06-10"}),
            json!({"title": "Future", "date": "2024-06-20"}),
            json!({"title": "Undated", "date": null}),
        ]);
        let default = DateWindow::Upcoming { today };

        let window = DateWindow::resolve(None, None, default);
        let filter = FilterSpec::new().date_window("date", window);
        assert_eq!(titles(&records, &filter), ["Future"]);

        let window = DateWindow::resolve(Some(date(2024, 6, 1)), None, default);
        let filter = FilterSpec::new().date_window("date", window);
        assert_eq!(titles(&records, &filter), ["Past", "Future", "Undated"]);
    }

    #[test]
    fn undated_records_are_hidden_only_from_upcoming() {
        let records = records(vec![
            json!({"title": "Undated", "date": "TBA"}),
            json!({"title": "Null", "date": null}),
        ]);
        for (window, expected) in [
            (DateWindow::All, 2),
            (DateWindow::Range { start: None, end: None }, 2),
            (DateWindow::Range { start: None, end: Some(date(2030, 1, 1)) }, 2),
            (DateWindow::Range { start: Some(date(2024, 6, 1)), end: None }, 2),
            (DateWindow::Upcoming { today: date(2024, 1, 1) }, 0),
        ] {
            let filter = FilterSpec::new().date_window("date", window);
            assert_eq!(titles(&records, &filter).len(), expected, "{window:?}");
        }
    }

    #[test]
    fn range_bounds_are_inclusive() {
        let records = records(vec![
            json!({"title": "Start", "date": "2024-06-01T10:00:00"}),
            json!({"title": "End", "date": "2024-06-30"}),
            json!({"title": "After", "date": "2024-07-01"}),
        ]);
        let filter = FilterSpec::new().date_window(
            "date",
            DateWindow::Range {
                start: Some(date(2024, 6, 1)),
                end: Some(date(2024, 6, 30)),
            },
        );
        assert_eq!(titles(&records, &filter), ["Start", "End"]);
    }

    #[test]
    fn relation_filter_tests_every_joined_name() {
        let records = records(vec![
            json!({"title": "Por only", "artist": [{"name": "Por"}]}),
            json!({"title": "Both", "artist": [{"name": "Teetee"}, {"name": "Por"}]}),
            json!({"title": "Nobody"}),
        ]);
        let por = FilterSpec::new().categorical("artist", "Por");
        assert_eq!(titles(&records, &por), ["Por only", "Both"]);

        let teetee = FilterSpec::new().categorical("artist", "Teetee");
        assert_eq!(titles(&records, &teetee), ["Both"]);

        let all = FilterSpec::new().categorical("artist", ALL);
        assert_eq!(titles(&records, &all).len(), 3);
    }

    #[test]
    fn categorical_filters_compare_exactly() {
        let records = records(vec![
            json!({"title": "Won", "result": "Winner"}),
            json!({"title": "Nominated", "result": "Nominee"}),
            json!({"title": "Year", "year": 2024}),
        ]);
        let filter = FilterSpec::new().categorical("result", "Winner");
        assert_eq!(titles(&records, &filter), ["Won"]);
        let filter = FilterSpec::new().categorical("result", "winner");
        assert!(titles(&records, &filter).is_empty());
        let filter = FilterSpec::new().categorical("year", "2024");
        assert_eq!(titles(&records, &filter), ["Year"]);
    }

    #[test]
    fn predicates_are_kept_in_evaluation_order() {
        let filter = FilterSpec::new()
            .text_search(["title"], "x")
            .categorical("type", "Concert")
            .date_window("date", DateWindow::All);
        let ranks: Vec<_> = filter.predicates().iter().map(Predicate::rank).collect();
        assert_eq!(ranks, [0, 1, 2]);
    }

    #[test]
    fn conjunction_equals_sequential_filtering() {
        let records = records(vec![
            json!({"title": "Duang Live", "date": "2024-06-20", "artist": {"name": "Por"}}),
            json!({"title": "Duang Talk", "date": "2024-05-20", "artist": {"name": "Por"}}),
            json!({"title": "Duang Fan Meet", "date": "2024-06-22", "artist": {"name": "Teetee"}}),
            json!({"title": "Other", "date": "2024-06-25", "artist": {"name": "Por"}}),
            json!({"title": "Untitled", "date": null}),
        ]);
        let specs = [
            FilterSpec::new().text_search(["title"], "duang"),
            FilterSpec::new().categorical("artist", "Por"),
            FilterSpec::new().date_window(
                "date",
                DateWindow::Upcoming {
                    today: date(2024, 6, 1),
                },
            ),
            FilterSpec::new(),
        ];

        for f1 in &specs {
            for f2 in &specs {
                let combined: Vec<_> = records
                    .iter()
                    .filter(|r| f1.clone().and(f2.clone()).matches(r))
                    .cloned()
                    .collect();
                let sequential: Vec<_> = records
                    .iter()
                    .filter(|r| f1.matches(r))
                    .filter(|r| f2.matches(r))
                    .cloned()
                    .collect();
                assert_eq!(combined, sequential);
            }
        }
    }
}
