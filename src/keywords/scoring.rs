use std::cmp::Ordering;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use super::KeywordEntry;
use crate::config::ScoreWeights;

const NEUTRAL: f64 = 0.5;

static BELOW_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"< ?(\d+(\.\d+)?)").unwrap());

/// Numeric form of a pasted metric. "Unknown" and "N/A" are missing; "< X"
/// sits just under X.
pub fn clean_value(raw: &str) -> Option<f64> {
    let v = raw.trim().to_lowercase().replace(',', "");
    if v.contains("unknown") || v.contains("n/a") {
        return None;
    }
    if v.contains('<') {
        let below = BELOW_RE
            .captures(&v)
            .and_then(|c| c[1].parse::<f64>().ok())
            .map_or(1.0, |x| x - 0.01);
        return Some(below);
    }
    v.replace('%', "").trim().parse::<f64>().ok()
}

pub fn score_searches(value: Option<f64>) -> f64 {
    match value {
        None => NEUTRAL,
        Some(v) if v < 50.0 => 0.1,
        Some(v) if v < 250.0 => 0.3,
        Some(v) if v < 1000.0 => 0.6,
        Some(v) if v < 5000.0 => 0.8,
        Some(_) => 1.0,
    }
}

/// `value` is a percentage, e.g. 88.9.
pub fn score_ctr(value: Option<f64>) -> f64 {
    match value {
        None => NEUTRAL,
        Some(v) if v < 50.0 => 0.1,
        Some(v) if v < 75.0 => 0.4,
        Some(v) if v < 95.0 => 0.7,
        Some(_) => 1.0,
    }
}

/// Lower competition scores higher.
pub fn score_competition(value: Option<f64>) -> f64 {
    match value {
        None => NEUTRAL,
        Some(v) if v < 1_000.0 => 1.0,
        Some(v) if v < 20_000.0 => 0.8,
        Some(v) if v < 100_000.0 => 0.5,
        Some(v) if v < 500_000.0 => 0.2,
        Some(_) => 0.0,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredKeyword {
    #[serde(flatten)]
    pub entry: KeywordEntry,
    pub searches: Option<f64>,
    pub ctr: Option<f64>,
    pub competition: Option<f64>,
    pub searches_score: f64,
    pub ctr_score: f64,
    pub competition_score: f64,
    pub opportunity: f64,
}

impl ScoredKeyword {
    pub fn new(entry: KeywordEntry, weights: &ScoreWeights) -> Self {
        let searches = clean_value(&entry.avg_searches);
        let ctr = clean_value(&entry.avg_ctr);
        let competition = clean_value(&entry.etsy_competition);
        let searches_score = score_searches(searches);
        let ctr_score = score_ctr(ctr);
        let competition_score = score_competition(competition);
        let opportunity = weights.searches * searches_score
            + weights.ctr * ctr_score
            + weights.competition * competition_score;
        ScoredKeyword {
            entry,
            searches,
            ctr,
            competition,
            searches_score,
            ctr_score,
            competition_score,
            opportunity,
        }
    }
}

/// Score every row and order by opportunity, best first. Ties keep paste order.
pub fn rank(entries: Vec<KeywordEntry>, weights: &ScoreWeights) -> Vec<ScoredKeyword> {
    let mut scored: Vec<ScoredKeyword> = entries
        .into_iter()
        .map(|e| ScoredKeyword::new(e, weights))
        .collect();
    scored.sort_by(|a, b| {
        b.opportunity
            .partial_cmp(&a.opportunity)
            .unwrap_or(Ordering::Equal)
    });
    scored
}
