use std::collections::BTreeMap;
use std::fmt;

use serde::ser::{Serialize, SerializeMap, Serializer};

pub const PRODUCT_TITLE: &str = "product_title";
pub const SHOP_NAME: &str = "shop_name";
pub const LISTING_AGE: &str = "listing_age";
pub const SHOP_AGE_OVERALL: &str = "shop_age_overall";
pub const LISTING_TYPE: &str = "listing_type";
pub const LAST_30_DAYS_SALES: &str = "last_30_days_sales";

#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Int(i64),
    Float(f64),
    Text(String),
}

impl FieldValue {
    pub fn as_int(&self) -> Option<i64> {
        match self {
            FieldValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            FieldValue::Float(v) => Some(*v),
            FieldValue::Int(v) => Some(*v as f64),
            FieldValue::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Int(v) => write!(f, "{}", v),
            FieldValue::Float(v) => write!(f, "{}", v),
            FieldValue::Text(s) => f.write_str(s),
        }
    }
}

impl Serialize for FieldValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            FieldValue::Int(v) => serializer.serialize_i64(*v),
            FieldValue::Float(v) => serializer.serialize_f64(*v),
            FieldValue::Text(s) => serializer.serialize_str(s),
        }
    }
}

/// Which stage wrote a field. A field with no slot is unset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    Heuristic,
    Label,
    Section,
    Fallback,
}

impl Origin {
    /// Overwrite rules: an unset field takes anything, a heuristic guess
    /// yields to a label, and a label only yields to another label when the
    /// field is fed by several aliases.
    pub fn admits(existing: Option<Origin>, incoming: Origin, multi_alias: bool) -> bool {
        match (existing, incoming) {
            (None, _) => true,
            (Some(Origin::Heuristic), Origin::Label) => true,
            (Some(Origin::Label), Origin::Label) => multi_alias,
            _ => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Slot {
    pub value: FieldValue,
    pub origin: Origin,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct TagEntry {
    pub name: String,
    pub volume: i64,
    pub competition: i64,
    pub level: Option<String>,
    pub score: f64,
}

/// Outcome of offering a value to a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Assignment {
    Assigned,
    Overwrote(Origin),
    Kept(Origin),
}

/// Everything extracted from one paste.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListingRecord {
    fields: BTreeMap<String, Slot>,
    pub tags_list: Vec<TagEntry>,
    pub notes: Vec<String>,
}

impl ListingRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Write `value` into `field` if the overwrite rules allow it.
    pub fn offer(
        &mut self,
        field: &str,
        value: FieldValue,
        origin: Origin,
        multi_alias: bool,
    ) -> Assignment {
        let existing = self.origin(field);
        if !Origin::admits(existing, origin, multi_alias) {
            // admits() only refuses when a slot exists
            return Assignment::Kept(existing.unwrap_or(origin));
        }
        self.fields.insert(field.to_string(), Slot { value, origin });
        match existing {
            None => Assignment::Assigned,
            Some(prev) => Assignment::Overwrote(prev),
        }
    }

    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.fields.get(field).map(|s| &s.value)
    }

    pub fn origin(&self, field: &str) -> Option<Origin> {
        self.fields.get(field).map(|s| s.origin)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    pub fn int(&self, field: &str) -> Option<i64> {
        self.get(field).and_then(FieldValue::as_int)
    }

    pub fn float(&self, field: &str) -> Option<f64> {
        self.get(field).and_then(FieldValue::as_float)
    }

    pub fn text(&self, field: &str) -> Option<&str> {
        self.get(field).and_then(FieldValue::as_text)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(k, s)| (k.as_str(), &s.value))
    }

    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    /// True when nothing at all was extracted.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.tags_list.is_empty() && self.notes.is_empty()
    }
}

impl Serialize for ListingRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len() + 2))?;
        for (key, slot) in &self.fields {
            map.serialize_entry(key, &slot.value)?;
        }
        map.serialize_entry("tags_list", &self.tags_list)?;
        map.serialize_entry("notes", &self.notes)?;
        map.end()
    }
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> FieldValue {
        FieldValue::Text(s.to_string())
    }

    #[test]
    fn transitions() {
        assert!(Origin::admits(None, Origin::Heuristic, false));
        assert!(Origin::admits(None, Origin::Fallback, false));
        assert!(Origin::admits(Some(Origin::Heuristic), Origin::Label, false));
        assert!(!Origin::admits(Some(Origin::Label), Origin::Label, false));
        assert!(Origin::admits(Some(Origin::Label), Origin::Label, true));
        assert!(!Origin::admits(Some(Origin::Label), Origin::Section, false));
        assert!(!Origin::admits(Some(Origin::Heuristic), Origin::Section, false));
        assert!(!Origin::admits(Some(Origin::Section), Origin::Label, true));
    }

    #[test]
    fn label_overwrites_heuristic() {
        let mut r = ListingRecord::new();
        r.offer(PRODUCT_TITLE, text("Cute Mug"), Origin::Heuristic, false);
        let out = r.offer(PRODUCT_TITLE, text("Ceramic Mug"), Origin::Label, false);
        assert_eq!(out, Assignment::Overwrote(Origin::Heuristic));
        assert_eq!(r.text(PRODUCT_TITLE), Some("Ceramic Mug"));
        assert_eq!(r.origin(PRODUCT_TITLE), Some(Origin::Label));
    }

    #[test]
    fn first_label_wins_without_alias_flag() {
        let mut r = ListingRecord::new();
        r.offer("total_sales", FieldValue::Int(10), Origin::Label, false);
        let out = r.offer("total_sales", FieldValue::Int(20), Origin::Label, false);
        assert_eq!(out, Assignment::Kept(Origin::Label));
        assert_eq!(r.int("total_sales"), Some(10));
    }

    #[test]
    fn multi_alias_takes_latest() {
        let mut r = ListingRecord::new();
        r.offer("monthly_reviews", FieldValue::Int(3), Origin::Label, true);
        r.offer("monthly_reviews", FieldValue::Int(5), Origin::Label, true);
        assert_eq!(r.int("monthly_reviews"), Some(5));
    }

    #[test]
    fn serializes_flat() {
        let mut r = ListingRecord::new();
        r.offer("total_sales", FieldValue::Int(1234), Origin::Label, false);
        r.offer("revenue", FieldValue::Float(99.5), Origin::Label, false);
        r.notes.push("Who Made: I did".to_string());
        let json = serde_json::to_value(&r).unwrap();
        assert_eq!(json["total_sales"], 1234);
        assert_eq!(json["revenue"], 99.5);
        assert_eq!(json["tags_list"], serde_json::json!([]));
        assert_eq!(json["notes"][0], "Who Made: I did");
    }

    #[test]
    fn empty_record() {
        let mut r = ListingRecord::new();
        assert!(r.is_empty());
        r.notes.push("x: y".to_string());
        assert!(!r.is_empty());
    }
}
