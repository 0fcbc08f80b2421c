//! Total time per person across exported tables.

use rayon::prelude::*;

use crate::records::{DecodedTable, decode};
use crate::time::format_seconds;
use crate::types::Identity;

/// Summed consumption for one identity.
///
/// `matched_rows == 0` means no records were found, which is distinct from
/// records that sum to zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Aggregate {
    pub total_seconds: u64,
    pub matched_rows: usize,
    /// Malformed rows dropped across all tables, matching or not.
    pub skipped_rows: usize,
}

impl Aggregate {
    pub const fn has_matches(&self) -> bool {
        self.matched_rows > 0
    }

    /// The total rendered as `"<h> hrs <m> mins <s> secs"`.
    pub fn duration_text(&self) -> String {
        seconds_to_duration_text(self.total_seconds)
    }
}

/// Decodes several exported tables in parallel, preserving input order.
pub fn decode_all<T>(texts: &[T]) -> Vec<DecodedTable>
where
    T: AsRef<str> + Sync,
{
    texts.par_iter().map(|text| decode(text.as_ref())).collect()
}

/// Sums consumed seconds of every row matching `identity`, ignoring case.
pub fn total_duration(tables: &[DecodedTable], identity: &Identity) -> Aggregate {
    let key = identity.key();
    let mut aggregate = Aggregate::default();
    for table in tables {
        aggregate.skipped_rows += table.skipped_count();
        for record in table.records() {
            if key.matches(&record.first, &record.last) {
                aggregate.total_seconds = aggregate
                    .total_seconds
                    .saturating_add(record.consumed_seconds);
                aggregate.matched_rows += 1;
            }
        }
    }
    tracing::debug!(
        %identity,
        tables = tables.len(),
        matched = aggregate.matched_rows,
        skipped = aggregate.skipped_rows,
        "aggregated consumed time"
    );
    aggregate
}

/// Renders a second count using the same decomposition as
/// [`crate::time::format_duration`].
pub fn seconds_to_duration_text(seconds: u64) -> String {
    format_seconds(seconds)
}
