use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::error::SectionError;
use crate::parser::lines::Lines;
use crate::parser::record::TagEntry;
use crate::utils::{has_letters, safe_float, safe_int};

const SECTION: &str = "tags";

static KEYWORD_SCORE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^Keyword Score$").unwrap());
static TAGS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)^Tags$").unwrap());
static COLUMN_HEADER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(Volume|Competition|Keyword Score)\s*$").unwrap());
pub(crate) static MORE_DETAILS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\s*More Details\s*$").unwrap());
static NUMERIC_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[\d,\.\s%]+$").unwrap());
static LEVEL_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)^(High|Medium|Low)$").unwrap());
static COUNT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[\d,]+$").unwrap());
static SCORE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[\d,.]+$").unwrap());

/// Tag rows between the "Keyword Score" (or "Tags") header and "More Details".
pub fn parse(lines: &Lines) -> Result<Vec<TagEntry>, SectionError> {
    let all = lines.as_slice();
    let start = block_start(lines).ok_or(SectionError::HeaderNotFound { section: SECTION })?;
    let end = lines
        .position_from(start, |l| MORE_DETAILS_RE.is_match(l))
        .unwrap_or(all.len());
    if start >= end {
        return Err(SectionError::EmptyBlock { section: SECTION });
    }
    debug!(start, end, "tag block");

    let block = &all[start..end];
    let mut tags = Vec::new();
    let mut k = 0;
    while k < block.len() {
        match match_group(&block[k..]) {
            Some((tag, consumed)) => {
                debug!(line = start + k, name = %tag.name, "tag row");
                tags.push(tag);
                k += consumed;
            }
            None => k += 1,
        }
    }
    Ok(tags)
}

/// The "More Details" line closing the tag block, if the block has one.
pub fn details_marker(lines: &Lines) -> Option<usize> {
    let start = block_start(lines)?;
    lines.position_from(start, |l| MORE_DETAILS_RE.is_match(l))
}

/// First tag row, past the header and any column titles.
fn block_start(lines: &Lines) -> Option<usize> {
    let all = lines.as_slice();
    let header = lines
        .position_from(0, |l| KEYWORD_SCORE_RE.is_match(l))
        .or_else(|| lines.position_from(0, |l| TAGS_RE.is_match(l)))?;
    let mut start = header + 1;
    while start < all.len() && COLUMN_HEADER_RE.is_match(&all[start]) {
        start += 1;
    }
    Some(start)
}

/// One row: name, volume, competition, optional level, score.
fn match_group(rows: &[String]) -> Option<(TagEntry, usize)> {
    let name = rows.first()?;
    if !has_letters(name) || NUMERIC_RE.is_match(name) || LEVEL_RE.is_match(name) {
        return None;
    }
    let volume = rows.get(1).filter(|l| COUNT_RE.is_match(l)).and_then(|l| safe_int(l))?;
    let competition = rows.get(2).filter(|l| COUNT_RE.is_match(l)).and_then(|l| safe_int(l))?;

    let mut used = 3;
    let level = rows
        .get(used)
        .filter(|l| LEVEL_RE.is_match(l))
        .map(|l| l.to_string());
    if level.is_some() {
        used += 1;
    }

    let score = rows
        .get(used)
        .filter(|l| SCORE_RE.is_match(l))
        .and_then(|l| safe_float(l))?;
    used += 1;

    Some((
        TagEntry {
            name: name.clone(),
            volume,
            competition,
            level,
            score,
        },
        used,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(text: &str) -> Result<Vec<TagEntry>, SectionError> {
        parse(&Lines::from_raw(text))
    }

    #[test]
    fn single_tag_with_level() {
        let tags = run("Tags\nceramic mug\n1,200\n3,400\nHigh\n7.5\nMore Details").unwrap();
        assert_eq!(
            tags,
            vec![TagEntry {
                name: "ceramic mug".to_string(),
                volume: 1200,
                competition: 3400,
                level: Some("High".to_string()),
                score: 7.5,
            }]
        );
    }

    #[test]
    fn level_is_optional() {
        let tags = run("Keyword Score\nVolume\nCompetition\nmug gift\n90\n15\n42\ncoffee cup\n30\n8\nLow\n12").unwrap();
        assert_eq!(tags.len(), 2);
        assert_eq!(tags[0].name, "mug gift");
        assert_eq!(tags[0].level, None);
        assert_eq!(tags[0].score, 42.0);
        assert_eq!(tags[1].level.as_deref(), Some("Low"));
    }

    #[test]
    fn keyword_score_header_preferred() {
        // An earlier "Tags" line belongs to the table header, not the tag block.
        let tags = run("Tags\nnot a tag\nKeyword Score\nreal tag\n1\n2\n3").unwrap();
        assert_eq!(tags.len(), 1);
        assert_eq!(tags[0].name, "real tag");
    }

    #[test]
    fn malformed_group_skipped() {
        let tags = run("Tags\nbroken\n12\nnot a number\ngood tag\n5\n6\nMedium\n1.5\nMore Details").unwrap();
        assert_eq!(tags.len(), 1);
        assert_eq!(tags[0].name, "good tag");
    }

    #[test]
    fn missing_score_drops_group() {
        let tags = run("Tags\nlonely\n5\n6\nHigh\nMore Details\nWho Made").unwrap();
        assert!(tags.is_empty());
    }

    #[test]
    fn empty_block() {
        assert_eq!(
            run("Tags\nMore Details"),
            Err(SectionError::EmptyBlock { section: "tags" })
        );
    }

    #[test]
    fn details_marker_follows_tag_block() {
        let lines = Lines::from_raw("More Details\nTags\nmug\n1\n2\n3\nMore Details\nWho Made");
        assert_eq!(details_marker(&lines), Some(6));
        assert_eq!(details_marker(&Lines::from_raw("More Details\nWho Made")), None);
    }

    #[test]
    fn no_header() {
        assert_eq!(
            run("mug\n1\n2\n3"),
            Err(SectionError::HeaderNotFound { section: "tags" })
        );
    }
}
