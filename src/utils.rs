use std::sync::LazyLock;

use regex::Regex;

static CURRENCY_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[$£€,]").unwrap());
static AGE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(\d+\s+(?:Mo\.?|months?))$").unwrap());
static PRICE_OR_NUMBER_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[$£€\d]").unwrap());

/// Integer with thousands separators, e.g. "1,234".
pub fn safe_int(val: &str) -> Option<i64> {
    if val.is_empty() {
        return None;
    }
    val.replace(',', "").trim().parse::<i64>().ok()
}

/// Float with optional currency symbol and thousands separators, e.g. "$1,234.50".
pub fn safe_float(val: &str) -> Option<f64> {
    if val.is_empty() {
        return None;
    }
    CURRENCY_RE.replace_all(val, "").trim().parse::<f64>().ok()
}

pub fn has_letters(s: &str) -> bool {
    s.chars().any(|c| c.is_ascii_alphabetic())
}

pub fn starts_like_price_or_number(s: &str) -> bool {
    PRICE_OR_NUMBER_RE.is_match(s)
}

/// Whole-line age value such as "6 Mo." or "14 months".
pub fn match_age(s: &str) -> Option<&str> {
    AGE_RE.captures(s).and_then(|c| c.get(1)).map(|m| m.as_str())
}

/// Comparable form of an age value: "12 Months" and "12 Mo." both become "12 mo".
pub fn normalize_age(s: &str) -> String {
    s.to_lowercase().replace("months", "mo").replace('.', "")
}
