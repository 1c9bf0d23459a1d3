use std::collections::{HashMap, HashSet};
use std::path::Path;

use regex::Regex;
use serde::Deserialize;
use tracing::{debug, info, warn};

use super::lines::Lines;
use super::record::{Assignment, FieldValue, ListingRecord, Origin};
use crate::error::ConfigError;
use crate::utils::{safe_float, safe_int};

pub const TABLE_VERSION: u32 = 1;

const BUILTIN_TABLE: &str = include_str!("../../config/labels.toml");

#[derive(Debug, Deserialize)]
struct TableFile {
    version: u32,
    #[serde(default)]
    noise: Vec<String>,
    #[serde(default)]
    labels: Vec<EntryFile>,
}

#[derive(Debug, Deserialize)]
struct EntryFile {
    label: String,
    field: String,
    convert: String,
    pattern: Option<String>,
    #[serde(default)]
    strip_percent: bool,
    #[serde(default)]
    multi_alias: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Converter {
    Int,
    Float,
    Text,
}

impl Converter {
    fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "int" => Some(Converter::Int),
            "float" => Some(Converter::Float),
            "text" | "str" | "string" => Some(Converter::Text),
            _ => None,
        }
    }

    pub fn convert(self, raw: &str) -> Option<FieldValue> {
        match self {
            Converter::Int => safe_int(raw).map(FieldValue::Int),
            Converter::Float => safe_float(raw).map(FieldValue::Float),
            Converter::Text => Some(FieldValue::Text(raw.to_string())),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Converter::Int => "int",
            Converter::Float => "float",
            Converter::Text => "text",
        }
    }
}

#[derive(Debug, Clone)]
pub struct LabelRule {
    pub label: String,
    pub field: String,
    pub converter: Converter,
    pub validator: Option<Regex>,
    pub strip_percent: bool,
    pub multi_alias: bool,
}

impl LabelRule {
    /// Validated, cleaned and converted value for a candidate line.
    fn accept(&self, raw: &str) -> Result<FieldValue, Rejection> {
        if let Some(re) = &self.validator {
            if !re.is_match(raw) {
                return Err(Rejection::Pattern);
            }
        }
        let cleaned = if self.strip_percent {
            raw.replace('%', "")
        } else {
            raw.to_string()
        };
        self.converter
            .convert(cleaned.trim())
            .ok_or(Rejection::Conversion)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Rejection {
    Pattern,
    Conversion,
}

/// Compiled label vocabulary: lowercase label → rule, plus noise lines.
#[derive(Debug, Clone)]
pub struct LabelTable {
    version: u32,
    rules: Vec<LabelRule>,
    index: HashMap<String, usize>,
    noise: HashSet<String>,
}

impl LabelTable {
    /// The table shipped in `config/labels.toml`.
    pub fn builtin() -> Result<Self, ConfigError> {
        Self::from_toml_str(BUILTIN_TABLE)
    }

    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let source = config::File::from_str(s, config::FileFormat::Toml);
        Self::load(source, "label table")
    }

    /// Format is picked from the file extension (toml, json, yaml, ...).
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::MissingFile(path.to_path_buf()));
        }
        Self::load(config::File::from(path), &path.display().to_string())
    }

    fn load<S>(source: S, what: &str) -> Result<Self, ConfigError>
    where
        S: config::Source + Send + Sync + 'static,
    {
        let load_err = |source| ConfigError::Load {
            what: what.to_string(),
            source,
        };
        let raw: TableFile = config::Config::builder()
            .add_source(source)
            .build()
            .map_err(load_err)?
            .try_deserialize()
            .map_err(load_err)?;
        let table = Self::compile(raw)?;
        info!(
            what,
            version = table.version,
            labels = table.rules.len(),
            "label table loaded"
        );
        Ok(table)
    }

    fn compile(raw: TableFile) -> Result<Self, ConfigError> {
        if raw.version != TABLE_VERSION {
            return Err(ConfigError::UnsupportedVersion {
                found: raw.version,
                expected: TABLE_VERSION,
            });
        }

        let mut rules = Vec::with_capacity(raw.labels.len());
        let mut index = HashMap::new();
        for (i, entry) in raw.labels.into_iter().enumerate() {
            let label = entry.label.trim().to_lowercase();
            if label.is_empty() {
                return Err(ConfigError::EmptyLabel { index: i });
            }
            if index.contains_key(&label) {
                return Err(ConfigError::DuplicateLabel(label));
            }
            let converter =
                Converter::parse(&entry.convert).ok_or_else(|| ConfigError::UnknownConverter {
                    label: label.clone(),
                    converter: entry.convert.clone(),
                })?;
            let validator = entry
                .pattern
                .as_deref()
                .map(|p| Regex::new(&format!("(?i){}", p)))
                .transpose()
                .map_err(|source| ConfigError::InvalidPattern {
                    label: label.clone(),
                    source,
                })?;

            index.insert(label.clone(), rules.len());
            rules.push(LabelRule {
                label,
                field: entry.field.trim().to_string(),
                converter,
                validator,
                strip_percent: entry.strip_percent,
                multi_alias: entry.multi_alias,
            });
        }

        let noise = raw.noise.into_iter().map(|n| n.trim().to_string()).collect();

        Ok(LabelTable {
            version: raw.version,
            rules,
            index,
            noise,
        })
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn rules(&self) -> &[LabelRule] {
        &self.rules
    }

    pub fn noise(&self) -> impl Iterator<Item = &str> {
        self.noise.iter().map(String::as_str)
    }

    /// Exact, case-insensitive lookup of a whole line.
    pub fn lookup(&self, line: &str) -> Option<&LabelRule> {
        self.index.get(&line.to_lowercase()).map(|&i| &self.rules[i])
    }

    pub fn is_noise(&self, line: &str) -> bool {
        self.noise.contains(line)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MatchSummary {
    pub labels_seen: usize,
    pub assigned: usize,
    pub rejected: usize,
}

/// Scan from `start` to the end, pairing each label line with the line after it.
///
/// A rejected value line is not consumed: the scan steps one line and may
/// read the same line again as a label.
pub fn match_labels(
    lines: &Lines,
    start: usize,
    table: &LabelTable,
    record: &mut ListingRecord,
) -> MatchSummary {
    let mut summary = MatchSummary::default();
    let n = lines.len();
    let mut i = start;

    while i < n {
        let line = &lines.as_slice()[i];

        if table.is_noise(line) {
            debug!(line = i, text = %line, "skipping noise line");
            i += 1;
            continue;
        }

        let Some(rule) = table.lookup(line) else {
            i += 1;
            continue;
        };
        summary.labels_seen += 1;

        let Some(raw) = lines.get(i + 1) else {
            warn!(line = i, label = %rule.label, "label has no value line");
            i += 1;
            continue;
        };

        match rule.accept(raw) {
            Ok(value) => {
                debug!(line = i, label = %rule.label, field = %rule.field, value = %value, "label matched");
                match record.offer(&rule.field, value, Origin::Label, rule.multi_alias) {
                    Assignment::Assigned => summary.assigned += 1,
                    Assignment::Overwrote(prev) => {
                        debug!(field = %rule.field, previous = ?prev, "overwrote earlier value");
                        summary.assigned += 1;
                    }
                    Assignment::Kept(prev) => {
                        debug!(field = %rule.field, existing = ?prev, "field already set, keeping it");
                    }
                }
                i += 2;
            }
            Err(Rejection::Pattern) => {
                warn!(
                    line = i,
                    label = %rule.label,
                    value = %raw,
                    "value failed validation, leaving field unset"
                );
                summary.rejected += 1;
                i += 1;
            }
            Err(Rejection::Conversion) => {
                warn!(
                    line = i,
                    label = %rule.label,
                    value = %raw,
                    converter = rule.converter.name(),
                    "value could not be converted"
                );
                summary.rejected += 1;
                i += 2;
            }
        }
    }

    summary
}

// ── Tests ──
