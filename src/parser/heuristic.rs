use tracing::debug;

use super::bounds::TableBounds;
use super::labels::LabelTable;
use super::lines::Lines;
use super::record::{FieldValue, ListingRecord, Origin, PRODUCT_TITLE, SHOP_NAME};
use crate::utils::{has_letters, match_age, starts_like_price_or_number};

const IMAGE_PLACEHOLDER: &str = "Product/Shop Image";

/// Provisional title and shop name from the first table lines.
/// Returns how many lines were consumed. Label and noise lines are never
/// taken, so the label matcher still sees them.
pub fn guess_title_and_shop(
    lines: &Lines,
    bounds: &TableBounds,
    table: &LabelTable,
    record: &mut ListingRecord,
) -> usize {
    let first = bounds.start;
    let Some(title) = lines.get(first).filter(|_| bounds.contains(first)) else {
        debug!("no lines available for title heuristic");
        return 0;
    };
    if is_reserved(table, title) || !looks_like_title(title) {
        debug!(line = first, text = %title, "first table line does not look like a title");
        return 0;
    }
    record.offer(
        PRODUCT_TITLE,
        FieldValue::Text(title.to_string()),
        Origin::Heuristic,
        false,
    );
    debug!(line = first, text = %title, "tentative product title");

    let next = first + 1;
    match lines.get(next).filter(|_| bounds.contains(next)) {
        Some(shop) if !is_reserved(table, shop) && looks_like_shop(shop) => {
            record.offer(
                SHOP_NAME,
                FieldValue::Text(shop.to_string()),
                Origin::Heuristic,
                false,
            );
            debug!(line = next, text = %shop, "tentative shop name");
            2
        }
        _ => 1,
    }
}

fn is_reserved(table: &LabelTable, line: &str) -> bool {
    table.lookup(line).is_some() || table.is_noise(line)
}

fn looks_like_title(line: &str) -> bool {
    has_letters(line) && !starts_like_price_or_number(line) && line != IMAGE_PLACEHOLDER
}

fn looks_like_shop(line: &str) -> bool {
    has_letters(line) && !starts_like_price_or_number(line) && match_age(line).is_none()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::bounds::StartHint;

    fn table() -> LabelTable {
        LabelTable::builtin().unwrap()
    }

    fn guess(text: &str) -> (ListingRecord, usize) {
        let lines = Lines::from_raw(text);
        let bounds = TableBounds {
            start: 0,
            end: lines.len(),
            hint: StartHint::NotFound,
        };
        let mut record = ListingRecord::new();
        let used = guess_title_and_shop(&lines, &bounds, &table(), &mut record);
        (record, used)
    }

    #[test]
    fn title_and_shop() {
        let (r, used) = guess("Cute Mug\nMugHouse\n$12.00");
        assert_eq!(used, 2);
        assert_eq!(r.text(PRODUCT_TITLE), Some("Cute Mug"));
        assert_eq!(r.text(SHOP_NAME), Some("MugHouse"));
        assert_eq!(r.origin(SHOP_NAME), Some(Origin::Heuristic));
    }

    #[test]
    fn price_is_not_a_title() {
        let (r, used) = guess("$12.00\nMugHouse");
        assert_eq!(used, 0);
        assert!(r.is_empty());
    }

    #[test]
    fn placeholder_is_not_a_title() {
        let (_, used) = guess("Product/Shop Image\nCute Mug");
        assert_eq!(used, 0);
    }

    #[test]
    fn age_is_not_a_shop() {
        let (r, used) = guess("Cute Mug\n6 Mo.");
        assert_eq!(used, 1);
        assert!(!r.contains(SHOP_NAME));
    }

    #[test]
    fn respects_table_end() {
        let lines = Lines::from_raw("Cute Mug\nMugHouse");
        let bounds = TableBounds {
            start: 0,
            end: 1,
            hint: StartHint::Header,
        };
        let mut r = ListingRecord::new();
        assert_eq!(guess_title_and_shop(&lines, &bounds, &table(), &mut r), 1);
        assert!(!r.contains(SHOP_NAME));
    }

    #[test]
    fn label_line_is_not_a_title() {
        let (r, used) = guess("Mo. Sales\n1,234");
        assert_eq!(used, 0);
        assert!(r.is_empty());
    }

    #[test]
    fn label_line_is_not_a_shop() {
        let (r, used) = guess("Cute Mug\nTotal Sales\n900");
        assert_eq!(used, 1);
        assert_eq!(r.text(PRODUCT_TITLE), Some("Cute Mug"));
        assert!(!r.contains(SHOP_NAME));
    }

    #[test]
    fn noise_line_is_not_a_title() {
        let (_, used) = guess("Dots Svg\nCute Mug");
        assert_eq!(used, 0);
    }
}
