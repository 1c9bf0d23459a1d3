use std::path::PathBuf;

use thiserror::Error;

/// Problems loading settings or compiling the label table.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load {what}: {source}")]
    Load {
        what: String,
        #[source]
        source: config::ConfigError,
    },

    #[error("label table file not found: {0}")]
    MissingFile(PathBuf),

    #[error("unsupported label table version {found} (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },

    #[error("label entry #{index} has an empty label")]
    EmptyLabel { index: usize },

    #[error("label '{0}' is defined more than once")]
    DuplicateLabel(String),

    #[error("label '{label}': unknown converter '{converter}' (expected int, float or text)")]
    UnknownConverter { label: String, converter: String },

    #[error("label '{label}': invalid validation pattern: {source}")]
    InvalidPattern {
        label: String,
        #[source]
        source: regex::Error,
    },
}

/// Why a dedicated section contributed nothing to the record.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SectionError {
    #[error("{section}: header not found")]
    HeaderNotFound { section: &'static str },

    #[error("{section}: no lines between header and end marker")]
    EmptyBlock { section: &'static str },
}
