//! The five catalog feeds published by the bot host, and the trait used to
//! fetch them.

use std::fmt;

use serde_json::Value;

use crate::error::Result;
use crate::models::{Category, ItemType, SourceRecord};

// ---------------------------------------------------------------------------
// Feed
// ---------------------------------------------------------------------------

/// One named catalog feed. Each feed is bound to a fixed item type and
/// category, so the records it carries need not state their own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Feed {
    RegularCards,
    EventCards,
    LimitedCards,
    Frames,
    Wallpapers,
}

impl Feed {
    /// All feeds, in the order their cards appear in a merged listing.
    pub const ALL: [Feed; 5] = [
        Feed::RegularCards,
        Feed::EventCards,
        Feed::LimitedCards,
        Feed::Frames,
        Feed::Wallpapers,
    ];

    /// File name of the feed on the bot host.
    pub fn file_name(&self) -> &'static str {
        match self {
            Feed::RegularCards => "cards.json",
            Feed::EventCards => "eventcards.json",
            Feed::LimitedCards => "specials.json",
            Feed::Frames => "frames.json",
            Feed::Wallpapers => "wallpapers.json",
        }
    }

    pub fn item_type(&self) -> ItemType {
        match self {
            Feed::RegularCards | Feed::EventCards | Feed::LimitedCards => ItemType::Cards,
            Feed::Frames => ItemType::Frames,
            Feed::Wallpapers => ItemType::Wallpapers,
        }
    }

    pub fn category(&self) -> Category {
        match self {
            Feed::EventCards => Category::Event,
            Feed::LimitedCards => Category::Limited,
            Feed::RegularCards | Feed::Frames | Feed::Wallpapers => Category::Regular,
        }
    }
}

impl fmt::Display for Feed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.file_name())
    }
}

// ---------------------------------------------------------------------------
// FeedSource
// ---------------------------------------------------------------------------

/// Fetches the records of one catalog feed.
///
/// Feeds are fetched concurrently during a merge, hence the `Sync` bound. An
/// error only empties the failing feed; sibling feeds are unaffected.
pub trait FeedSource: Sync {
    fn fetch(&self, feed: Feed) -> Result<Vec<SourceRecord>>;
}

impl<T: FeedSource + ?Sized> FeedSource for &T {
    fn fetch(&self, feed: Feed) -> Result<Vec<SourceRecord>> {
        (**self).fetch(feed)
    }
}

/// Decode the records of a parsed feed file.
///
/// Accepts the bot's `{ "cards": [...] }` layout as well as a bare array.
/// Only entries that are not JSON objects are skipped, with a warning. Objects
/// with missing or oddly typed fields are kept and mapped with fallbacks.
pub fn parse_feed(feed: Feed, data: Value) -> Vec<SourceRecord> {
    let entries = match data {
        Value::Object(mut map) => match map.remove("cards") {
            Some(Value::Array(arr)) => arr,
            _ => Vec::new(),
        },
        Value::Array(arr) => arr,
        _ => Vec::new(),
    };

    let mut records = Vec::with_capacity(entries.len());
    for (i, entry) in entries.into_iter().enumerate() {
        if !entry.is_object() {
            log::warn!("Skipping non-object record #{} in {}", i, feed);
            continue;
        }
        match serde_json::from_value::<SourceRecord>(entry) {
            Ok(record) => records.push(record),
            Err(e) => log::warn!("Skipping undecodable record #{} in {}: {}", i, feed, e),
        }
    }
    records
}
