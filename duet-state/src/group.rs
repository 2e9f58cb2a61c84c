use std::collections::HashMap;

use smol_str::SmolStr;

use crate::{Record, date};

/// A section of a grouped list.
#[derive(Debug, Clone, PartialEq)]
pub struct Group {
    /// The heading of the group, e.g. `June 2024`.
    pub key: String,
    /// The records in the group, in list order.
    pub records: Vec<Record>,
}

/// Buckets a sorted list by the month of a date field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupSpec {
    /// The date-like field the month is taken from.
    pub field: SmolStr,
}
impl GroupSpec {
    /// Group by the month of `field`.
    pub fn by_month(field: &str) -> Self {
        Self {
            field: field.into(),
        }
    }

    /// The group key of `record`, or `None` if it has no usable date.
    pub fn key_for(&self, record: &Record) -> Option<String> {
        let text = record.text(&self.field)?;
        date::parse_date(&text).map(date::month_year)
    }

    /// Bucket `records`, which must already be sorted. Groups appear in the order
    /// their key is first encountered, so a descending sort yields newest-month-first
    /// groups without further ordering. Records without a usable date are dropped;
    /// callers are expected to filter them out beforehand.
    pub fn group(&self, records: Vec<Record>) -> Vec<Group> {
        let mut groups: Vec<Group> = vec![];
        let mut index_by_key: HashMap<String, usize> = HashMap::new();
        for record in records {
            let Some(key) = self.key_for(&record) else {
                tracing::debug!(
                    field = %self.field,
                    id = ?record.id(),
                    "dropping record without a usable date from grouped output"
                );
                continue;
            };
            match index_by_key.get(&key) {
                Some(&index) => groups[index].records.push(record),
                None => {
                    index_by_key.insert(key.clone(), groups.len());
                    groups.push(Group {
                        key,
                        records: vec![record],
                    });
                }
            }
        }
        groups
    }
}
