pub mod details;
pub mod tags;
pub mod trends;

use tracing::{debug, info, warn};

use super::lines::Lines;
use super::record::{FieldValue, ListingRecord, Origin, LAST_30_DAYS_SALES, LISTING_TYPE};
use crate::error::SectionError;

/// Run Trends, Tags and More Details independently and merge what each found.
/// A section that fails contributes nothing; the others still apply.
pub fn apply_all(lines: &Lines, trend_lookahead: usize, record: &mut ListingRecord) {
    match trends::parse(lines, trend_lookahead) {
        Ok(Some(sales)) => {
            record.offer(LAST_30_DAYS_SALES, FieldValue::Int(sales), Origin::Section, false);
        }
        Ok(None) => {}
        Err(e) => log_section_error(&e),
    }

    match tags::parse(lines) {
        Ok(tags) => {
            info!(count = tags.len(), "tags parsed");
            record.tags_list.extend(tags);
        }
        Err(e) => log_section_error(&e),
    }

    match details::parse(lines, tags::details_marker(lines)) {
        Ok(found) => {
            for detail in &found {
                if detail.key == "Listing Type" {
                    // The label matcher keeps priority over this section.
                    record.offer(
                        LISTING_TYPE,
                        FieldValue::Text(detail.value.clone()),
                        Origin::Section,
                        false,
                    );
                }
                record.notes.push(detail.note());
            }
            info!(count = found.len(), "more details parsed");
        }
        Err(e) => log_section_error(&e),
    }
}

fn log_section_error(e: &SectionError) {
    match e {
        SectionError::HeaderNotFound { .. } => debug!(error = %e, "section skipped"),
        SectionError::EmptyBlock { .. } => warn!(error = %e, "section skipped"),
    }
}
