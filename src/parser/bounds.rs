use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, warn};

use super::lines::Lines;

const TOOLBAR_MARKERS: &[&str] = &[
    "Customize button in Toolbar",
    "Filter button in Toolbar",
    "Export button in Toolbar",
];
const HEADER: &str = "Product";

static END_MARKERS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)^Showing: \d+ of \d+$",
        r"(?i)^Listing Details$",
        r"(?i)^Tags$",
        r"(?i)^Related Searches$",
        r"(?i)^Keyword Score$",
        r"(?i)^Trends$",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

/// How the table start was located.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartHint {
    Toolbar,
    Header,
    NotFound,
}

/// Approximate span of the main data table. Advisory only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableBounds {
    pub start: usize,
    pub end: usize,
    pub hint: StartHint,
}

impl TableBounds {
    pub fn contains(&self, idx: usize) -> bool {
        idx >= self.start && idx < self.end
    }
}

pub fn detect(lines: &Lines, window: usize, header_lookahead: usize) -> TableBounds {
    let n = lines.len();
    let window = window.min(n);

    let (start, hint) = if let Some(s) = header_after_toolbar(lines, window, header_lookahead) {
        (s, StartHint::Toolbar)
    } else if let Some(h) = lines
        .as_slice()
        .iter()
        .take(window)
        .position(|l| l == HEADER)
    {
        debug!(line = h, "found table header without toolbar marker");
        (h + 1, StartHint::Header)
    } else {
        warn!("table start not found, scanning labels from line 0");
        (0, StartHint::NotFound)
    };

    let end = lines
        .position_from(start, |l| END_MARKERS.iter().any(|re| re.is_match(l)))
        .unwrap_or(n);

    debug!(start, end, ?hint, "table bounds");
    TableBounds { start, end, hint }
}

/// Line after a "Product" header that closely follows a toolbar button marker.
fn header_after_toolbar(lines: &Lines, window: usize, lookahead: usize) -> Option<usize> {
    let all = lines.as_slice();
    for (i, line) in all.iter().enumerate().take(window) {
        if !TOOLBAR_MARKERS.iter().any(|m| line.contains(m)) {
            continue;
        }
        let stop = (i + lookahead).min(all.len());
        if let Some(j) = (i + 1..stop).find(|&j| all[j] == HEADER) {
            debug!(marker = i, header = j, "found table header after toolbar marker");
            return Some(j + 1);
        }
    }
    None
}
