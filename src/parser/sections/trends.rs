use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::error::SectionError;
use crate::parser::lines::Lines;
use crate::utils::safe_int;

const SECTION: &str = "trends";
const END_MARKERS: &[&str] = &["tags", "more details", "related searches", "listing details"];

static COUNT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[\d,]+$").unwrap());

/// Last-30-days sales: a "Sales" line, a number, then "Revenue", each within
/// `lookahead` lines of the previous part. `Ok(None)` if the header exists
/// but the sequence does not.
pub fn parse(lines: &Lines, lookahead: usize) -> Result<Option<i64>, SectionError> {
    let all = lines.as_slice();
    let header = lines
        .position_from(0, |l| l.eq_ignore_ascii_case("trends"))
        .ok_or(SectionError::HeaderNotFound { section: SECTION })?;
    let start = header + 1;
    let end = lines
        .position_from(start, |l| END_MARKERS.contains(&l.to_lowercase().as_str()))
        .unwrap_or(all.len());
    debug!(start, end, "trends span");

    for k in start..end {
        if !all[k].eq_ignore_ascii_case("sales") {
            continue;
        }

        let mut number = None;
        for (l, line) in all.iter().enumerate().take((k + 1 + lookahead).min(end)).skip(k + 1) {
            if COUNT_RE.is_match(line) {
                number = Some((l, line.as_str()));
                break;
            }
            if line.eq_ignore_ascii_case("revenue") {
                break;
            }
        }
        let Some((at, raw)) = number else {
            continue;
        };

        let stop = (at + 1 + lookahead).min(end);
        let confirmed = all[at + 1..stop]
            .iter()
            .any(|l| l.eq_ignore_ascii_case("revenue"));
        if !confirmed {
            continue;
        }
        match safe_int(raw) {
            Some(sales) => {
                debug!(line = at, value = raw, "confirmed last 30 days sales");
                return Ok(Some(sales));
            }
            None => debug!(line = at, value = raw, "sales count out of range, trying next"),
        }
    }

    debug!("no sales / number / revenue sequence in trends");
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(text: &str) -> Result<Option<i64>, SectionError> {
        parse(&Lines::from_raw(text), 3)
    }

    #[test]
    fn sales_number_revenue() {
        assert_eq!(run("Trends\nLast 30 days\nSales\n1,204\nRevenue\n$9,000"), Ok(Some(1204)));
    }

    #[test]
    fn tolerates_gap_lines() {
        assert_eq!(run("Trends\nSales\nchart\n88\nlegend\nRevenue"), Ok(Some(88)));
    }

    #[test]
    fn revenue_before_number_aborts_candidate() {
        assert_eq!(run("Trends\nSales\nRevenue\n55\nRevenue"), Ok(None));
    }

    #[test]
    fn oversized_count_tries_next_sequence() {
        assert_eq!(
            run("Trends\nSales\n99999999999999999999\nRevenue\nSales\n42\nRevenue"),
            Ok(Some(42))
        );
    }

    #[test]
    fn revenue_must_follow() {
        assert_eq!(run("Trends\nSales\n55\nViews\nx\ny\nz\nRevenue"), Ok(None));
    }

    #[test]
    fn span_stops_at_next_section() {
        assert_eq!(run("Trends\nSales\n55\nTags\nRevenue"), Ok(None));
    }

    #[test]
    fn later_candidate_can_confirm() {
        assert_eq!(run("Trends\nSales\nn/a\nSales\n12\nRevenue"), Ok(Some(12)));
    }

    #[test]
    fn missing_header() {
        assert_eq!(
            run("Sales\n55\nRevenue"),
            Err(SectionError::HeaderNotFound { section: "trends" })
        );
    }
}
