//! Card catalog reconciliation for the Kissune gallery.
//!
//! Merges the catalog feeds published by the Discord bot host (regular,
//! event and limited cards, frames, wallpapers) with the custom cards users
//! upload, into one list with stable, content-derived ids. Feed files are
//! downloaded and cached locally; customs live in a DuckDB database.
//!
//! # Quick start
//!
//! ```no_run
//! use kissune_cards::CardGallery;
//!
//! let gallery = CardGallery::builder()
//!     .feed_base_url("https://bot.example.com/jsons")
//!     .build()
//!     .unwrap();
//!
//! for card in gallery.cards() {
//!     println!("{} ({}/{})", card.name, card.item_type, card.category);
//! }
//! ```

#[cfg(feature = "async")]
pub mod async_client;
pub mod cache;
pub mod config;
pub mod error;
pub mod feeds;
pub mod identity;
pub mod mapping;
pub mod models;
pub mod store;
pub mod sync;

#[cfg(feature = "async")]
pub use async_client::AsyncCardGallery;
pub use cache::FeedCache;
pub use error::{GalleryError, Result};
pub use feeds::{Feed, FeedSource};
pub use identity::derive_id;
pub use mapping::map_record;
pub use models::{Card, Category, ImageRef, ItemType, SourceRecord};
pub use store::{CardStore, CustomStore};
pub use sync::{CardSnapshot, CardSyncService};

use std::env;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, Utc};

// ---------------------------------------------------------------------------
// CardGalleryBuilder
// ---------------------------------------------------------------------------

/// Builder for configuring and constructing a [`CardGallery`].
#[derive(Debug, Clone)]
pub struct CardGalleryBuilder {
    cache_dir: Option<PathBuf>,
    database: Option<PathBuf>,
    in_memory: bool,
    feed_base_url: Option<String>,
    offline: bool,
    timeout: Duration,
}

impl Default for CardGalleryBuilder {
    fn default() -> Self {
        Self {
            cache_dir: None,
            database: None,
            in_memory: false,
            feed_base_url: None,
            offline: false,
            timeout: Duration::from_secs(120),
        }
    }
}

impl CardGalleryBuilder {
    /// Start from the `KISSUNE_*` environment variables.
    ///
    /// Unset variables keep their defaults; an unparsable timeout is ignored.
    pub fn from_env() -> Self {
        let mut builder = Self::default();
        if let Ok(dir) = env::var(config::ENV_CACHE_DIR) {
            builder = builder.cache_dir(dir);
        }
        if let Ok(path) = env::var(config::ENV_DATABASE) {
            builder = builder.database(path);
        }
        if let Ok(url) = env::var(config::ENV_FEED_URL) {
            builder = builder.feed_base_url(url);
        }
        if let Ok(flag) = env::var(config::ENV_OFFLINE) {
            builder = builder.offline(config::parse_flag(&flag));
        }
        if let Some(secs) = env::var(config::ENV_TIMEOUT_SECS)
            .ok()
            .and_then(|v| v.trim().parse::<u64>().ok())
        {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        builder
    }

    /// Set a custom feed cache directory.
    ///
    /// If not set, the platform cache directory is used (e.g.
    /// `~/.cache/kissune-cards` on Linux).
    pub fn cache_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.cache_dir = Some(path.as_ref().to_path_buf());
        self
    }

    /// Set the customs database file.
    pub fn database<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.database = Some(path.as_ref().to_path_buf());
        self
    }

    /// Keep customs in an in-memory database. Overrides [`database`](Self::database).
    pub fn in_memory(mut self, in_memory: bool) -> Self {
        self.in_memory = in_memory;
        self
    }

    /// Base URL the feed files are downloaded from.
    pub fn feed_base_url(mut self, url: impl Into<String>) -> Self {
        self.feed_base_url = Some(url.into());
        self
    }

    /// Enable or disable offline mode.
    ///
    /// When offline, feed files are never downloaded and only files already in
    /// the cache directory are read. Defaults to `false`.
    pub fn offline(mut self, offline: bool) -> Self {
        self.offline = offline;
        self
    }

    /// Set the HTTP request timeout for feed downloads. Defaults to 120 seconds.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Build the gallery, opening the feed cache and the customs database.
    ///
    /// No feed is downloaded until cards are first requested.
    pub fn build(self) -> Result<CardGallery> {
        let feeds = FeedCache::new(self.cache_dir, self.feed_base_url, self.offline, self.timeout)?;
        let store = if self.in_memory {
            CardStore::open_in_memory()?
        } else {
            CardStore::open(self.database.unwrap_or_else(config::default_database_path))?
        };
        Ok(CardGallery {
            sync: CardSyncService::new(feeds, store),
        })
    }
}

// ---------------------------------------------------------------------------
// CardGallery
// ---------------------------------------------------------------------------

/// The main entry point: a [`CardSyncService`] over a [`FeedCache`] and a
/// [`CardStore`].
pub struct CardGallery {
    sync: CardSyncService<FeedCache, CardStore>,
}

impl CardGallery {
    /// Create a new builder for configuring the gallery.
    pub fn builder() -> CardGalleryBuilder {
        CardGalleryBuilder::default()
    }

    /// The merged listing: catalog cards first, then attributable customs.
    ///
    /// Empty when the customs store cannot be read.
    pub fn cards(&self) -> Vec<Card> {
        self.sync.get_all_cards()
    }

    /// Find a card of the merged listing by id.
    pub fn card(&self, id: &str) -> Option<Card> {
        self.sync.get_by_id(id)
    }

    /// Merge once and index the result for repeated lookups.
    pub fn snapshot(&self) -> CardSnapshot {
        self.sync.snapshot()
    }

    /// When the catalog feeds were last fetched.
    pub fn last_sync(&self) -> Option<DateTime<Utc>> {
        self.sync.last_sync_time()
    }

    /// Access the customs store for uploads, edits and deletions.
    pub fn customs(&self) -> &CardStore {
        self.sync.store()
    }

    /// Access the feed cache.
    pub fn feeds(&self) -> &FeedCache {
        self.sync.feeds()
    }

    /// Access the underlying reconciliation service.
    pub fn sync_service(&self) -> &CardSyncService<FeedCache, CardStore> {
        &self.sync
    }
}

impl fmt::Display for CardGallery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let feeds = self.feeds();
        write!(
            f,
            "CardGallery(cache_dir={}, feeds={}, offline={})",
            feeds.cache_dir.display(),
            feeds.base_url(),
            feeds.offline
        )
    }
}
