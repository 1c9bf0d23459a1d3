use tracing::debug;

use super::lines::Lines;
use super::record::{FieldValue, ListingRecord, Origin, LISTING_AGE, SHOP_AGE_OVERALL};
use crate::utils::{match_age, normalize_age};

/// Fill shop_age_overall from the first bare age line that differs from
/// listing_age. Does nothing if the field is already set.
pub fn fill_shop_age(lines: &Lines, record: &mut ListingRecord) {
    if record.contains(SHOP_AGE_OVERALL) {
        debug!("shop age already set, skipping fallback");
        return;
    }
    let listing_age = record.get(LISTING_AGE).map(|v| normalize_age(&v.to_string()));

    let found = lines.as_slice().iter().enumerate().find_map(|(i, line)| {
        let age = match_age(line)?;
        let distinct = listing_age.as_deref() != Some(normalize_age(age).as_str());
        distinct.then_some((i, age.to_string()))
    });

    match found {
        Some((line, age)) => {
            debug!(line, age = %age, "shop age from fallback scan");
            record.offer(SHOP_AGE_OVERALL, FieldValue::Text(age), Origin::Fallback, false);
        }
        None => debug!("no shop age distinct from listing age"),
    }
}
