//! Reconciliation of catalog feeds and persisted customs into one card list.

use std::cell::Cell;
use std::collections::{HashMap, HashSet};
use std::thread;

use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::feeds::{Feed, FeedSource};
use crate::identity::derive_id;
use crate::mapping::{count_prints, map_record};
use crate::models::{Card, SourceRecord};
use crate::store::CustomStore;

// ---------------------------------------------------------------------------
// CardSyncService
// ---------------------------------------------------------------------------

/// Merges the five catalog feeds with the customs held in a store.
///
/// Both collaborators are injected, so tests can substitute in-memory fakes.
pub struct CardSyncService<F, S> {
    feeds: F,
    store: S,
    last_sync: Cell<Option<DateTime<Utc>>>,
}

impl<F: FeedSource, S: CustomStore> CardSyncService<F, S> {
    pub fn new(feeds: F, store: S) -> Self {
        Self {
            feeds,
            store,
            last_sync: Cell::new(None),
        }
    }

    pub fn feeds(&self) -> &F {
        &self.feeds
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// When the catalog feeds were last fetched and mapped.
    pub fn last_sync_time(&self) -> Option<DateTime<Utc>> {
        self.last_sync.get()
    }

    /// Fetch all feeds concurrently and map them into catalog cards.
    ///
    /// A feed whose fetch fails (or panics) contributes no cards; the others
    /// are unaffected. Cards appear in feed order, then record order. Records
    /// deriving an id already taken collapse into the earlier card.
    pub fn sync_from_feeds(&self) -> Vec<Card> {
        log::info!("Fetching catalog feeds...");
        let feeds = &self.feeds;

        let fetched: Vec<(Feed, Vec<SourceRecord>)> = thread::scope(|scope| {
            let handles: Vec<_> = Feed::ALL
                .iter()
                .map(|&feed| (feed, scope.spawn(move || feeds.fetch(feed))))
                .collect();

            handles
                .into_iter()
                .map(|(feed, handle)| {
                    let records = match handle.join() {
                        Ok(Ok(records)) => records,
                        Ok(Err(e)) => {
                            log::warn!("Feed {} unavailable: {}", feed, e);
                            Vec::new()
                        }
                        Err(_) => {
                            log::warn!("Feed {} fetch panicked", feed);
                            Vec::new()
                        }
                    };
                    (feed, records)
                })
                .collect()
        });

        let stamped_at = Utc::now();
        let mut seen: HashSet<String> = HashSet::new();
        let mut cards = Vec::new();
        let mut collapsed = 0usize;

        for (feed, records) in &fetched {
            cards.extend(catalog_cards(*feed, records, stamped_at, &mut seen, &mut collapsed));
        }

        if collapsed > 0 {
            log::debug!("Collapsed {} catalog records onto existing ids", collapsed);
        }
        log::info!("Processed {} cards from feeds", cards.len());
        self.last_sync.set(Some(stamped_at));
        cards
    }

    /// Every catalog card followed by every attributable custom.
    ///
    /// Returns an empty list when the store cannot be read; callers should
    /// treat that as "temporarily unavailable" and poll again.
    pub fn get_all_cards(&self) -> Vec<Card> {
        match self.merge() {
            Ok(cards) => cards,
            Err(e) => {
                log::error!("Failed to merge cards: {}", e);
                Vec::new()
            }
        }
    }

    /// Look up a card of the current merge by id.
    pub fn get_by_id(&self, id: &str) -> Option<Card> {
        self.get_all_cards().into_iter().find(|c| c.id == id)
    }

    /// Merge once and index the result for repeated lookups.
    pub fn snapshot(&self) -> CardSnapshot {
        CardSnapshot::new(self.get_all_cards())
    }

    fn merge(&self) -> Result<Vec<Card>> {
        let catalog = self.sync_from_feeds();

        let customs: Vec<Card> = self
            .store
            .list_all()?
            .into_iter()
            .filter(Card::has_submitter)
            .collect();

        log::info!(
            "Total cards: {} ({} from feeds, {} customs)",
            catalog.len() + customs.len(),
            catalog.len(),
            customs.len()
        );

        let mut cards = catalog;
        cards.extend(customs);
        Ok(cards)
    }
}

/// Map one feed's records to cards, skipping ids already in `seen`.
///
/// A surviving card whose code repeats in the feed carries the number of
/// prints of that code as its print number.
fn catalog_cards(
    feed: Feed,
    records: &[SourceRecord],
    stamped_at: DateTime<Utc>,
    seen: &mut HashSet<String>,
    collapsed: &mut usize,
) -> Vec<Card> {
    let prints = count_prints(records);
    let mut cards = Vec::with_capacity(records.len());

    for record in records {
        let mut mapped = map_record(record, feed.item_type(), feed.category());
        let id = derive_id(
            mapped.item_type,
            mapped.category,
            record.code(),
            &mapped.image_url,
            record.name(),
        );
        if !seen.insert(id.clone()) {
            *collapsed += 1;
            continue;
        }

        mapped.print_number = match record.code() {
            Some(code) => prints.get(code).copied(),
            None => mapped.print_number.or(Some(1)),
        };
        cards.push(mapped.into_card(id, stamped_at));
    }

    cards
}

// ---------------------------------------------------------------------------
// CardSnapshot
// ---------------------------------------------------------------------------

/// One merged listing plus an id index built once.
#[derive(Debug, Clone)]
pub struct CardSnapshot {
    cards: Vec<Card>,
    index: HashMap<String, usize>,
    taken_at: DateTime<Utc>,
}

impl CardSnapshot {
    pub fn new(cards: Vec<Card>) -> Self {
        let mut index = HashMap::with_capacity(cards.len());
        for (pos, card) in cards.iter().enumerate() {
            index.entry(card.id.clone()).or_insert(pos);
        }
        Self {
            cards,
            index,
            taken_at: Utc::now(),
        }
    }

    pub fn get(&self, id: &str) -> Option<&Card> {
        self.index.get(id).map(|&pos| &self.cards[pos])
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn taken_at(&self) -> DateTime<Utc> {
        self.taken_at
    }
}
