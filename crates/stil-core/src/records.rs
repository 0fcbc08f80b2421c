//! Exported table format for session records.
//!
//! The table is CSV with the header `First,Last,Time In,Time Out,Consumed`.
//! Every field is double-quoted with `"` escaped as `""`, and every line,
//! including the last, ends with `\n`.
//!
//! Decoding is tolerant: rows with fewer than five fields are reported as
//! [`RowOutcome::Skipped`] instead of failing the whole table. Splitting
//! honours quotes, so a name containing a comma survives a round trip.

use chrono::NaiveDate;

use crate::time::parse_duration_seconds;
use crate::types::SessionRecord;

/// Header line of an exported table.
pub const HEADER: &str = "First,Last,Time In,Time Out,Consumed";

/// Number of columns in an exported row.
pub const COLUMN_COUNT: usize = 5;

/// Encodes records as an exported table. An empty slice yields only the header.
pub fn encode(records: &[SessionRecord]) -> String {
    let mut csv = String::with_capacity(HEADER.len() + 1 + records.len() * 96);
    csv.push_str(HEADER);
    csv.push('\n');
    for record in records {
        let fields = [
            &record.first,
            &record.last,
            &record.time_in,
            &record.time_out,
            &record.consumed,
        ];
        let row: Vec<String> = fields.iter().map(|field| quote(field)).collect();
        csv.push_str(&row.join(","));
        csv.push('\n');
    }
    csv
}

fn quote(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}

/// File name for a table exported on `date`: `STILibrary MM-DD-YYYY.csv`.
pub fn export_filename(date: NaiveDate) -> String {
    format!("STILibrary {}.csv", date.format("%m-%d-%Y"))
}

/// The parts of an exported row needed for aggregation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartialRecord {
    pub first: String,
    pub last: String,
    pub consumed_seconds: u64,
}

/// Why a row was dropped during decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    TooFewFields { found: usize },
}

/// Result of decoding one non-blank data line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowOutcome {
    Parsed(PartialRecord),
    /// `line` is 1-based and counts the header.
    Skipped { line: usize, reason: SkipReason },
}

/// A decoded exported table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecodedTable {
    pub rows: Vec<RowOutcome>,
}

impl DecodedTable {
    /// Successfully parsed rows in file order.
    pub fn records(&self) -> impl Iterator<Item = &PartialRecord> {
        self.rows.iter().filter_map(|row| match row {
            RowOutcome::Parsed(record) => Some(record),
            RowOutcome::Skipped { .. } => None,
        })
    }

    /// Dropped rows as `(line, reason)` pairs.
    pub fn skipped(&self) -> impl Iterator<Item = (usize, SkipReason)> + '_ {
        self.rows.iter().filter_map(|row| match row {
            RowOutcome::Skipped { line, reason } => Some((*line, *reason)),
            RowOutcome::Parsed(_) => None,
        })
    }

    pub fn skipped_count(&self) -> usize {
        self.skipped().count()
    }
}

/// Decodes an exported table. The first line is always treated as the header.
pub fn decode(text: &str) -> DecodedTable {
    let mut rows = Vec::new();
    for (idx, line) in text.split('\n').enumerate().skip(1) {
        let line = line.strip_suffix('\r').unwrap_or(line);
        if line.trim().is_empty() {
            continue;
        }

        let fields = split_fields(line);
        if fields.len() < COLUMN_COUNT {
            tracing::warn!(line = idx + 1, found = fields.len(), "skipping malformed row");
            rows.push(RowOutcome::Skipped {
                line: idx + 1,
                reason: SkipReason::TooFewFields {
                    found: fields.len(),
                },
            });
            continue;
        }

        rows.push(RowOutcome::Parsed(PartialRecord {
            first: fields[0].trim().to_string(),
            last: fields[1].trim().to_string(),
            consumed_seconds: parse_duration_seconds(fields[4].trim()),
        }));
    }
    DecodedTable { rows }
}

/// Splits one line into unquoted fields.
///
/// A quote opens or closes a quoted run; inside a run, `""` is a literal quote
/// and commas do not separate fields. An unterminated run extends to the end
/// of the line.
fn split_fields(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                current.push('"');
                chars.next();
            }
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => fields.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    fields.push(current);
    fields
}

#[cfg(test)]
mod tests {
    use super::*;

    fn closed(first: &str, last: &str, consumed: &str) -> SessionRecord {
        SessionRecord {
            first: first.to_string(),
            last: last.to_string(),
            time_in: "01/01/2024 10:00:00".to_string(),
            time_out: "01/01/2024 11:00:00".to_string(),
            consumed: consumed.to_string(),
        }
    }

    #[test]
    fn encode_empty_yields_header_only() {
        assert_eq!(encode(&[]), "First,Last,Time In,Time Out,Consumed\n");
    }

    #[test]
    fn encode_quotes_every_field() {
        let mut open = closed("John", "Roe", "");
        open.time_out.clear();
        let csv = encode(&[closed("Jane", "Doe", "1 hrs 0 mins 0 secs"), open]);
        assert_eq!(
            csv,
            "First,Last,Time In,Time Out,Consumed\n\
             \"Jane\",\"Doe\",\"01/01/2024 10:00:00\",\"01/01/2024 11:00:00\",\"1 hrs 0 mins 0 secs\"\n\
             \"John\",\"Roe\",\"01/01/2024 10:00:00\",\"\",\"\"\n"
        );
    }

    #[test]
    fn encode_doubles_embedded_quotes() {
        let csv = encode(&[closed("Jo \"JJ\"", "Doe", "")]);
        assert!(csv.contains("\"Jo \"\"JJ\"\"\""));
    }

    #[test]
    fn decode_inverts_encode() {
        let records = vec![
            closed("Jane", "Doe", "1 hrs 30 mins 10 secs"),
            closed("Jo \"JJ\"", "Smith, Jr", "0 hrs 15 mins 0 secs"),
            closed("Open", "Session", ""),
        ];
        let table = decode(&encode(&records));

        let decoded: Vec<_> = table.records().cloned().collect();
        assert_eq!(decoded.len(), records.len());
        for (original, row) in records.iter().zip(&decoded) {
            assert_eq!(row.first, original.first);
            assert_eq!(row.last, original.last);
            assert_eq!(
                row.consumed_seconds,
                parse_duration_seconds(&original.consumed)
            );
        }
        assert_eq!(table.skipped_count(), 0);
    }

    #[test]
    fn decode_skips_short_rows_without_failing() {
        let text = "First,Last,Time In,Time Out,Consumed\n\
                    \"Jane\",\"Doe\",\"a\",\"b\"\n\
                    \"Jane\",\"Doe\",\"a\",\"b\",\"0 hrs 30 mins 0 secs\"\n";
        let table = decode(text);

        assert_eq!(table.records().count(), 1);
        assert_eq!(
            table.skipped().collect::<Vec<_>>(),
            vec![(2, SkipReason::TooFewFields { found: 4 })]
        );
    }

    #[test]
    fn decode_ignores_header_and_blank_lines() {
        let text = "\"Jane\",\"Doe\",\"a\",\"b\",\"9 hrs 0 mins 0 secs\"\r\n\r\n   \n\
                    \"Jane\",\"Doe\",\"a\",\"b\",\"0 hrs 1 mins 0 secs\"\r\n";
        let table = decode(text);

        let rows: Vec<_> = table.records().collect();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].consumed_seconds, 60);
        assert_eq!(table.skipped_count(), 0);
    }

    #[test]
    fn decode_accepts_unquoted_fields() {
        let text = "First,Last,Time In,Time Out,Consumed\n Jane , Doe ,x,y,1 hrs 0 mins 0 secs\n";
        let rows: Vec<_> = decode(text).records().cloned().collect();
        assert_eq!(
            rows,
            vec![PartialRecord {
                first: "Jane".to_string(),
                last: "Doe".to_string(),
                consumed_seconds: 3600,
            }]
        );
    }

    #[test]
    fn decode_of_empty_text_is_empty() {
        assert!(decode("").rows.is_empty());
        assert!(decode(HEADER).rows.is_empty());
    }

    #[test]
    fn export_filename_uses_month_day_year() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 7).unwrap();
        assert_eq!(export_filename(date), "STILibrary 03-07-2024.csv");
    }
}
