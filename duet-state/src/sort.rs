use std::cmp::Ordering;

use smol_str::SmolStr;

use crate::{Record, date, db::Direction};

/// Locale-aware string ordering, ignoring case and treating digit runs as numbers.
pub struct Collation {
    collator: Option<icu_collator::CollatorBorrowed<'static>>,
}
impl std::fmt::Debug for Collation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Collation")
            .field("icu", &self.collator.is_some())
            .finish()
    }
}
impl Default for Collation {
    fn default() -> Self {
        Self::new()
    }
}
impl Collation {
    /// Build the collator. Falls back to lowercase code-point ordering if the
    /// collation data cannot be loaded.
    pub fn new() -> Self {
        let mut collator_preferences = icu_collator::CollatorPreferences::default();
        collator_preferences.numeric_ordering =
            Some(icu_collator::preferences::CollationNumericOrdering::True);

        let mut collator_options = icu_collator::options::CollatorOptions::default();
        collator_options.strength = Some(icu_collator::options::Strength::Primary);
        collator_options.case_level = Some(icu_collator::options::CaseLevel::Off);

        let collator = icu_collator::Collator::try_new(collator_preferences, collator_options)
            .map_err(|e| tracing::warn!("failed to load collation data, using plain ordering: {e}"))
            .ok();
        Self { collator }
    }

    /// Compare two strings.
    pub fn compare(&self, a: &str, b: &str) -> Ordering {
        match &self.collator {
            Some(collator) => collator.compare(a, b),
            None => a.to_lowercase().cmp(&b.to_lowercase()),
        }
    }
}

/// What a list is ordered by.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SortKey {
    /// A date-like field, compared as timestamps. Unparseable dates count as the epoch.
    Date(SmolStr),
    /// A time-of-day field (`HH.MM`). Unparseable times sort before every valid time.
    Time(SmolStr),
    /// A text field, compared with [`Collation`].
    Text(SmolStr),
    /// A numeric field. Values that are not numbers count as zero.
    Number(SmolStr),
}
impl SortKey {
    /// The field this key reads.
    pub fn field(&self) -> &str {
        match self {
            SortKey::Date(field)
            | SortKey::Time(field)
            | SortKey::Text(field)
            | SortKey::Number(field) => field,
        }
    }

    fn compare(&self, a: &Record, b: &Record, collation: &Collation) -> Ordering {
        let a = a.text(self.field()).unwrap_or_default();
        let b = b.text(self.field()).unwrap_or_default();
        match self {
            SortKey::Date(_) => date::sort_millis(&a).cmp(&date::sort_millis(&b)),
            SortKey::Time(_) => date::parse_time_of_day(&a).cmp(&date::parse_time_of_day(&b)),
            SortKey::Text(_) => collation.compare(&a, &b),
            SortKey::Number(_) => {
                let number = |text: &str| text.trim().parse::<f64>().unwrap_or(0.0);
                number(&a).total_cmp(&number(&b))
            }
        }
    }
}

/// How a list is ordered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSpec {
    /// The primary key.
    pub key: SortKey,
    /// Further keys consulted when the primary key ties, e.g. the time of a same-day event.
    pub then_by: Vec<SortKey>,
    /// Display fields compared with [`Collation`] when every key ties; the first
    /// non-empty field of each record is used.
    pub tie_break: Vec<SmolStr>,
    /// Applies to the whole comparison, tie-break included.
    pub direction: Direction,
}
impl Default for SortSpec {
    fn default() -> Self {
        Self {
            key: SortKey::Date("date".into()),
            then_by: vec![],
            tie_break: vec!["title".into(), "name".into()],
            direction: Direction::Ascending,
        }
    }
}
impl SortSpec {
    /// Order by `key`, tie-breaking on title then name.
    pub fn by(key: SortKey, direction: Direction) -> Self {
        Self {
            key,
            direction,
            ..Default::default()
        }
    }

    /// Adds a secondary key.
    pub fn then(mut self, key: SortKey) -> Self {
        self.then_by.push(key);
        self
    }

    /// Compare two records in ascending terms, then apply the direction.
    pub fn compare(&self, a: &Record, b: &Record, collation: &Collation) -> Ordering {
        let ascending = self
            .key
            .compare(a, b, collation)
            .then_with(|| {
                self.then_by
                    .iter()
                    .map(|key| key.compare(a, b, collation))
                    .find(|ordering| ordering.is_ne())
                    .unwrap_or(Ordering::Equal)
            })
            .then_with(|| {
                let a = a.first_text(&self.tie_break).unwrap_or_default();
                let b = b.first_text(&self.tie_break).unwrap_or_default();
                collation.compare(&a, &b)
            });
        match self.direction {
            Direction::Ascending => ascending,
            Direction::Descending => ascending.reverse(),
        }
    }

    /// Stable sort in place.
    pub fn sort(&self, records: &mut [Record], collation: &Collation) {
        records.sort_by(|a, b| self.compare(a, b, collation));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::{Value, json};

    use crate::Normalizer;

    fn records(values: Vec<Value>) -> Vec<Record> {
        values
            .into_iter()
            .map(|value| match value {
                Value::Object(row) => Normalizer::new(None).normalize(row),
                other => panic!("not an object: {other}"),
            })
            .collect()
    }

    fn titles(records: &[Record]) -> Vec<String> {
        records
            .iter()
            .map(|r| r.text("title").unwrap_or_default().into_owned())
            .collect()
    }

    #[test]
    fn sorts_by_parsed_date_with_unparseable_first() {
        let mut records = records(vec![
            json!({"title": "B", "date": "2024-06-10T09:00:00"}),
            json!({"title": "C", "date": "TBA"}),
            json!({"title": "A", "date": "2024-01-02"}),
        ]);
        SortSpec::default().sort(&mut records, &Collation::new());
        assert_eq!(titles(&records), ["C", "A", "B"]);
    }

    #[test]
    fn reversing_direction_reverses_output_without_ties() {
        let base = records(vec![
            json!({"title": "One", "date": "2024-03-01"}),
            json!({"title": "Two", "date": "2024-01-01"}),
            json!({"title": "Three", "date": "2024-02-01"}),
        ]);
        let collation = Collation::new();

        let mut ascending = base.clone();
        SortSpec::by(SortKey::Date("date".into()), Direction::Ascending)
            .sort(&mut ascending, &collation);
        let mut descending = base;
        SortSpec::by(SortKey::Date("date".into()), Direction::Descending)
            .sort(&mut descending, &collation);

        descending.reverse();
        assert_eq!(ascending, descending);
    }

    #[test]
    fn equal_dates_use_the_same_tie_break_in_both_directions() {
        let base = records(vec![
            json!({"title": "beta", "date": "2024-05-01"}),
            json!({"title": "Alpha", "date": "2024-05-01"}),
            json!({"name": "Gamma", "date": "2024-05-01"}),
            json!({"title": "Early", "date": "2024-04-01"}),
        ]);
        let collation = Collation::new();

        let mut ascending = base.clone();
        SortSpec::default().sort(&mut ascending, &collation);
        let names: Vec<_> = ascending
            .iter()
            .map(|r| r.first_text(&SortSpec::default().tie_break).unwrap().into_owned())
            .collect();
        assert_eq!(names, ["Early", "Alpha", "beta", "Gamma"]);

        let mut descending = base;
        SortSpec::by(SortKey::Date("date".into()), Direction::Descending)
            .sort(&mut descending, &collation);
        let names: Vec<_> = descending
            .iter()
            .map(|r| r.first_text(&SortSpec::default().tie_break).unwrap().into_owned())
            .collect();
        assert_eq!(names, ["Gamma", "beta", "Alpha", "Early"]);
    }

    #[test]
    fn same_day_events_order_by_time() {
        let mut records = records(vec![
            json!({"title": "Evening", "date": "2024-05-01", "time": "19.30"}),
            json!({"title": "Morning", "date": "2024-05-01", "time": "09.00"}),
            json!({"title": "Next day", "date": "2024-05-02", "time": "08.00"}),
        ]);
        SortSpec::default()
            .then(SortKey::Time("time".into()))
            .sort(&mut records, &Collation::new());
        assert_eq!(titles(&records), ["Morning", "Evening", "Next day"]);
    }

    #[test]
    fn collation_is_case_insensitive_and_numeric() {
        let collation = Collation::new();
        assert_eq!(collation.compare("Episode 2", "episode 10"), Ordering::Less);
        assert_eq!(collation.compare("por", "Por"), Ordering::Equal);
    }

    #[test]
    fn numbers_compare_numerically() {
        let mut records = records(vec![
            json!({"title": "Ten", "episode": 10}),
            json!({"title": "Two", "episode": "2"}),
            json!({"title": "None", "episode": ""}),
        ]);
        SortSpec::by(SortKey::Number("episode".into()), Direction::Ascending)
            .sort(&mut records, &Collation::new());
        assert_eq!(titles(&records), ["None", "Two", "Ten"]);
    }
}
