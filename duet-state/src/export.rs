//! CSV materialization of a record list.

use chrono::NaiveDate;

use crate::Record;

/// The download name for an export of `collection` made on `today`.
pub fn file_name(collection: &str, today: NaiveDate) -> String {
    format!("{collection}_export_{}.csv", today.format("%Y-%m-%d"))
}

/// Render `records` as CSV.
///
/// The header is the first record's field names; the joined relation object is
/// not a field (its display name is). Every value is quoted, with embedded quotes
/// doubled. Records lacking a header field get an empty cell. An empty list
/// renders as an empty string.
pub fn to_csv(records: &[Record]) -> String {
    let Some(first) = records.first() else {
        return String::new();
    };
    let header: Vec<&str> = first.fields().keys().map(String::as_str).collect();

    let mut out = String::new();
    push_line(&mut out, header.iter().copied());
    for record in records {
        let cells: Vec<String> = header
            .iter()
            .map(|key| {
                record
                    .text(key)
                    .map(|text| text.into_owned())
                    .unwrap_or_default()
            })
            .collect();
        push_line(&mut out, cells.iter().map(String::as_str));
    }
    out
}

/// Quote a single CSV cell.
pub fn escape(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

fn push_line<'a>(out: &mut String, cells: impl Iterator<Item = &'a str>) {
    let line = cells.map(escape).collect::<Vec<_>>().join(",");
    out.push_str(&line);
    out.push('\n');
}
