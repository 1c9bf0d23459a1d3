use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use super::tags::MORE_DETAILS_RE;
use crate::error::SectionError;
use crate::parser::lines::Lines;

const SECTION: &str = "more details";

const KNOWN_KEYS: &[&str] = &[
    "When Made",
    "Listing Type",
    "Customizable",
    "Craft Supply",
    "Personalized",
    "Auto Renew",
    "Has variations",
    "Placements of Listing Shops",
    "Title character count",
    "# of tags",
    "Who Made",
];

static TRAILING_COUNT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+\d+$").unwrap());

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Detail {
    pub key: &'static str,
    pub value: String,
}

impl Detail {
    pub fn note(&self) -> String {
        format!("{}: {}", self.key, self.value)
    }
}

/// Known key/value pairs after the "More Details" header, in order.
///
/// `marker` is the header closing the tag block; without one the first
/// "More Details" line in the paste is used.
pub fn parse(lines: &Lines, marker: Option<usize>) -> Result<Vec<Detail>, SectionError> {
    let header = marker
        .filter(|&m| lines.get(m).is_some_and(|l| MORE_DETAILS_RE.is_match(l)))
        .or_else(|| lines.position_from(0, |l| MORE_DETAILS_RE.is_match(l)))
        .ok_or(SectionError::HeaderNotFound { section: SECTION })?;
    let body = &lines.as_slice()[header + 1..];
    if body.is_empty() {
        return Err(SectionError::EmptyBlock { section: SECTION });
    }

    let mut details = Vec::new();
    let mut current: Option<&'static str> = None;
    let mut value_lines: Vec<&str> = Vec::new();

    for line in body {
        if let Some(key) = known_key(line) {
            if let Some(prev) = current {
                push_detail(&mut details, prev, &value_lines);
            }
            current = Some(key);
            value_lines.clear();
        } else if current.is_some() {
            value_lines.push(line);
        }
    }
    if let Some(prev) = current {
        push_detail(&mut details, prev, &value_lines);
    }

    Ok(details)
}

fn known_key(line: &str) -> Option<&'static str> {
    let line = line.trim();
    KNOWN_KEYS
        .iter()
        .copied()
        .find(|k| k.eq_ignore_ascii_case(line))
}

fn push_detail(details: &mut Vec<Detail>, key: &'static str, value_lines: &[&str]) {
    if value_lines.is_empty() {
        debug!(key, "detail key without value, skipping");
        return;
    }
    let mut value = value_lines.join(" ").trim().to_string();
    if key == "Who Made" {
        value = TRAILING_COUNT_RE.replace(&value, "").trim().to_string();
    }
    if value.is_empty() {
        value = "Unknown".to_string();
    }
    details.push(Detail { key, value });
}
