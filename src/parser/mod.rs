pub mod bounds;
pub mod fallback;
pub mod heuristic;
pub mod labels;
pub mod lines;
pub mod record;
pub mod sections;

use tracing::{debug, error, info};

use crate::config::Settings;
use labels::LabelTable;
use lines::Lines;
use record::ListingRecord;

/// Window sizes used by the positional stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    pub boundary_window: usize,
    pub header_lookahead: usize,
    pub trend_lookahead: usize,
}

impl Default for ParseOptions {
    fn default() -> Self {
        ParseOptions::from(&Settings::default())
    }
}

impl From<&Settings> for ParseOptions {
    fn from(s: &Settings) -> Self {
        ParseOptions {
            boundary_window: s.boundary_window,
            header_lookahead: s.header_lookahead,
            trend_lookahead: s.trend_lookahead,
        }
    }
}

/// Listing paste parser. Holds only read-only configuration, so one instance
/// can be shared across threads.
#[derive(Debug, Clone)]
pub struct ListingParser {
    table: LabelTable,
    options: ParseOptions,
}

impl ListingParser {
    pub fn new(table: LabelTable, options: ParseOptions) -> Self {
        ListingParser { table, options }
    }

    pub fn table(&self) -> &LabelTable {
        &self.table
    }

    /// Pipeline: lines → bounds → heuristic → labels → sections → fallback.
    /// Never fails; an empty record means nothing was recognized.
    pub fn parse(&self, raw: &str) -> ListingRecord {
        let mut record = ListingRecord::new();
        let lines = Lines::from_raw(raw);
        if lines.is_empty() {
            error!("no content found after splitting lines");
            return record;
        }
        debug!(lines = lines.len(), "preprocessed paste");

        let bounds = bounds::detect(
            &lines,
            self.options.boundary_window,
            self.options.header_lookahead,
        );
        let consumed =
            heuristic::guess_title_and_shop(&lines, &bounds, &self.table, &mut record);

        let summary =
            labels::match_labels(&lines, bounds.start + consumed, &self.table, &mut record);
        debug!(?summary, "label matching done");

        sections::apply_all(&lines, self.options.trend_lookahead, &mut record);
        fallback::fill_shop_age(&lines, &mut record);

        if record.is_empty() {
            error!("no data fields extracted");
        } else {
            info!(
                fields = record.field_count(),
                tags = record.tags_list.len(),
                notes = record.notes.len(),
                "listing parsed"
            );
        }
        record
    }
}

// ── Tests ──
