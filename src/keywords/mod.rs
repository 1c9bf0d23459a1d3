pub mod scoring;

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use tracing::{debug, info};

use crate::parser::lines::Lines;
use crate::utils::has_letters;

const SEED_PREFIX: &str = "Keywords related to";
const COUNTRY_PREFIX: &str = "Search Trends (";
const DATA_MARKER: &str = "EXCLUDE KEYWORDS";
const END_MARKERS: &[&str] = &["Rows per page:", "Copyright ©"];
const CHUNK: usize = 9;

static PARENS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\((.*?)\)").unwrap());
static COUNTS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d+\s+\d+$").unwrap());
static GOOGLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^([\d,]+|N/A|Unknown)$").unwrap());

/// One keyword row, values kept as pasted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeywordEntry {
    pub keyword: String,
    pub avg_searches: String,
    pub avg_clicks: String,
    pub avg_ctr: String,
    pub etsy_competition: String,
    pub google_searches: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeywordReport {
    pub seed_keyword: Option<String>,
    pub country_code: String,
    pub keywords: Vec<KeywordEntry>,
}

/// Parse a keyword-tool paste. Missing markers give an empty row list, never an error.
pub fn parse(raw: &str) -> KeywordReport {
    let lines = Lines::from_raw(raw);
    let all = lines.as_slice();

    let seed = all
        .iter()
        .enumerate()
        .find_map(|(i, l)| seed_keyword(l).map(|kw| (i, kw)));
    match &seed {
        Some((i, kw)) => debug!(line = i, seed = %kw, "seed keyword"),
        None => debug!("seed keyword line not found"),
    }
    let seed_line = seed.as_ref().map(|(i, _)| *i);

    let country_code = country_code(all, seed_line).unwrap_or_else(|| "Unknown".to_string());

    let keywords = match data_start(all, seed_line) {
        Some(start) => {
            let end = lines
                .position_from(start, |l| END_MARKERS.iter().any(|m| l.contains(m)))
                .unwrap_or(all.len());
            debug!(start, end, "keyword rows span");
            read_chunks(&all[start..end])
        }
        None => {
            debug!(marker = DATA_MARKER, "data start marker not found");
            Vec::new()
        }
    };

    info!(
        keywords = keywords.len(),
        country = %country_code,
        "keyword paste parsed"
    );
    KeywordReport {
        seed_keyword: seed.map(|(_, kw)| kw),
        country_code,
        keywords,
    }
}

/// Text between the quotes in `Keywords related to "..."`.
fn seed_keyword(line: &str) -> Option<String> {
    let rest = line.strip_prefix(SEED_PREFIX)?;

    let (open_at, open) = ['"', '\'', '“']
        .iter()
        .filter_map(|&q| rest.find(q).map(|i| (i, q)))
        .min_by_key(|(i, _)| *i)?;
    // Allow a few spaces between the prefix and the quote.
    if open_at > 5 {
        return None;
    }
    let inner = &rest[open_at + open.len_utf8()..];

    let pair = match open {
        '“' => '”',
        q => q,
    };
    let close_at = inner.find(pair).or_else(|| {
        ['"', '\'', '”']
            .iter()
            .filter_map(|&q| inner.find(q))
            .min()
    })?;

    let kw = inner[..close_at].trim();
    (!kw.is_empty()).then(|| kw.to_string())
}

fn country_code(all: &[String], seed_line: Option<usize>) -> Option<String> {
    let limit = match seed_line {
        Some(i) => i + 30,
        None => 50,
    };
    all.iter()
        .take(limit + 1)
        .filter(|l| l.starts_with(COUNTRY_PREFIX))
        .find_map(|l| {
            PARENS_RE
                .captures(l)
                .map(|c| c[1].trim().to_string())
                .filter(|c| !c.is_empty())
        })
}

/// Rows begin two lines after the marker; the line right after it is a counter.
fn data_start(all: &[String], seed_line: Option<usize>) -> Option<usize> {
    let from = seed_line.map_or(0, |i| i + 1);
    let marker = all
        .iter()
        .enumerate()
        .take(all.len().saturating_sub(1))
        .skip(from)
        .find(|(_, l)| *l == DATA_MARKER)
        .map(|(i, _)| i)?;
    let start = marker + 2;
    (start < all.len()).then_some(start)
}

fn read_chunks(rows: &[String]) -> Vec<KeywordEntry> {
    let mut out = Vec::new();
    let mut i = 0;
    while i + CHUNK <= rows.len() {
        let c = &rows[i..i + CHUNK];
        let keyword = &c[0];
        let is_keyword = has_letters(keyword)
            && !keyword.replace(' ', "").chars().all(|ch| ch.is_ascii_digit());
        if is_keyword && COUNTS_RE.is_match(&c[3]) && GOOGLE_RE.is_match(&c[8]) {
            out.push(KeywordEntry {
                keyword: keyword.clone(),
                avg_searches: c[4].clone(),
                avg_clicks: c[5].clone(),
                avg_ctr: c[6].clone(),
                etsy_competition: c[7].clone(),
                google_searches: c[8].clone(),
            });
            i += CHUNK;
        } else {
            i += 1;
        }
    }
    out
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixture_report() {
        let text = std::fs::read_to_string("tests/fixtures/keyword_tool.txt").unwrap();
        let report = parse(&text);
        assert_eq!(report.seed_keyword.as_deref(), Some("ceramic mug"));
        assert_eq!(report.country_code, "UK");
        assert_eq!(report.keywords.len(), 3);
        assert_eq!(report.keywords[0].keyword, "ceramic mug");
        assert_eq!(report.keywords[0].avg_searches, "2,140");
        assert_eq!(report.keywords[1].google_searches, "N/A");
        assert_eq!(report.keywords[2].etsy_competition, "< 20");
    }

    #[test]
    fn seed_quote_styles() {
        assert_eq!(seed_keyword("Keywords related to \"mug\"").as_deref(), Some("mug"));
        assert_eq!(seed_keyword("Keywords related to 'mug cup'").as_deref(), Some("mug cup"));
        assert_eq!(seed_keyword("Keywords related to “gift mug”").as_deref(), Some("gift mug"));
        assert_eq!(seed_keyword("Keywords related to “odd\"").as_deref(), Some("odd"));
        assert_eq!(seed_keyword("Keywords related to         \"far\""), None);
        assert_eq!(seed_keyword("Keywords related to \"\""), None);
        assert_eq!(seed_keyword("Other \"mug\""), None);
    }

    #[test]
    fn country_defaults_to_unknown() {
        let report = parse("Keywords related to \"mug\"\nEXCLUDE KEYWORDS\n0/5");
        assert_eq!(report.country_code, "Unknown");
        assert!(report.keywords.is_empty());
    }

    #[test]
    fn missing_marker_gives_no_rows() {
        let report = parse("Keywords related to \"mug\"\nSearch Trends (US)\nmug\n2024\nup\n3 4\n10\n5\n50%\n100\n20");
        assert_eq!(report.seed_keyword.as_deref(), Some("mug"));
        assert_eq!(report.country_code, "US");
        assert!(report.keywords.is_empty());
    }

    #[test]
    fn misaligned_lines_skipped() {
        let text = "EXCLUDE KEYWORDS\n0/5\nstray\nmug\nMar 2024\nup\n3 4\n10\n5\n50%\n100\n20\nRows per page: 10\nignored";
        let report = parse(text);
        assert_eq!(report.seed_keyword, None);
        assert_eq!(report.keywords.len(), 1);
        assert_eq!(report.keywords[0].keyword, "mug");
    }

    #[test]
    fn trailing_partial_chunk_ignored() {
        let report = parse("EXCLUDE KEYWORDS\n0/5\nmug\nMar 2024\nup\n3 4\n10");
        assert!(report.keywords.is_empty());
    }
}
