//! Extracts listing analytics (sales, revenue, ages, tags, trends) from text
//! pasted out of a marketplace analytics tool, and ranks keywords from the
//! companion keyword-research page.

pub mod config;
pub mod error;
pub mod keywords;
pub mod parser;
mod utils;

pub use config::{ScoreWeights, Settings};
pub use error::{ConfigError, SectionError};
pub use parser::labels::LabelTable;
pub use parser::record::{FieldValue, ListingRecord, Origin, TagEntry};
pub use parser::{ListingParser, ParseOptions};
