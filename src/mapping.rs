//! Category-aware mapping of feed records onto the card shape.

use std::collections::HashMap;

use crate::models::source::non_blank;
use crate::models::{Category, ItemType, MappedCard, SourceRecord};

/// Map a feed record to a card without id or timestamps.
///
/// The display name means something different per item type: the idol for
/// cards, a "group - theme" label for wallpapers and the design name for
/// frames. Missing fields fall back to the code, then to a generic label;
/// records are never rejected.
pub fn map_record(record: &SourceRecord, item_type: ItemType, category: Category) -> MappedCard {
    let code = record.code();

    let (name, idol_name) = match item_type {
        ItemType::Frames => (
            record.name().or(code).unwrap_or("Frame").to_string(),
            None,
        ),
        ItemType::Wallpapers => {
            let label = [record.group.as_deref(), record.theme.as_deref()]
                .into_iter()
                .filter_map(non_blank)
                .collect::<Vec<_>>()
                .join(" - ");
            let name = if label.is_empty() {
                code.unwrap_or("Wallpaper").to_string()
            } else {
                label
            };
            (name, None)
        }
        ItemType::Cards => (
            record.name().or(code).unwrap_or("Card").to_string(),
            record.name().map(str::to_string),
        ),
    };

    MappedCard {
        name,
        image_url: record.image.clone().unwrap_or_default(),
        item_type,
        category,
        idol_name,
        group: record.group.clone(),
        theme: record.theme.clone(),
        subcat: record.subcat.clone(),
        code: record.code.clone(),
        print_number: record.print_number,
    }
}

/// Count how many times each code appears in one feed's batch.
///
/// Records without a code are not counted.
pub fn count_prints(records: &[SourceRecord]) -> HashMap<String, u32> {
    let mut counts = HashMap::new();
    for code in records.iter().filter_map(SourceRecord::code) {
        *counts.entry(code.to_string()).or_insert(0) += 1;
    }
    counts
}
