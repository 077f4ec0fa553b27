//! Async wrapper around [`CardGallery`] for use in async runtimes (Tokio, etc.).
//!
//! Runs all gallery operations on a blocking thread pool via
//! [`tokio::task::spawn_blocking`]. A merge blocks on feed downloads and
//! DuckDB reads, so this keeps the async event loop free.
//!
//! # Example
//!
//! ```no_run
//! use kissune_cards::AsyncCardGallery;
//!
//! #[tokio::main]
//! async fn main() {
//!     let gallery = AsyncCardGallery::builder().build().await.unwrap();
//!
//!     let cards = gallery.cards().await.unwrap();
//!     let first = gallery.card(&cards[0].id).await.unwrap();
//! }
//! ```

use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::error::{GalleryError, Result};
use crate::models::{Card, CustomCardUpdate, NewCustomCard};
use crate::{CardGallery, CardGalleryBuilder};

// ---------------------------------------------------------------------------
// AsyncCardGalleryBuilder
// ---------------------------------------------------------------------------

/// Builder for configuring and constructing an [`AsyncCardGallery`].
///
/// Accepts the same options as [`CardGalleryBuilder`].
#[derive(Debug, Clone, Default)]
pub struct AsyncCardGalleryBuilder {
    inner: CardGalleryBuilder,
}

impl AsyncCardGalleryBuilder {
    /// Start from the `KISSUNE_*` environment variables.
    pub fn from_env() -> Self {
        Self {
            inner: CardGalleryBuilder::from_env(),
        }
    }

    pub fn cache_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.inner = self.inner.cache_dir(path);
        self
    }

    pub fn database<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.inner = self.inner.database(path);
        self
    }

    pub fn in_memory(mut self, in_memory: bool) -> Self {
        self.inner = self.inner.in_memory(in_memory);
        self
    }

    pub fn feed_base_url(mut self, url: impl Into<String>) -> Self {
        self.inner = self.inner.feed_base_url(url);
        self
    }

    pub fn offline(mut self, offline: bool) -> Self {
        self.inner = self.inner.offline(offline);
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.inner = self.inner.timeout(timeout);
        self
    }

    /// Build the async gallery on the blocking thread pool.
    pub async fn build(self) -> Result<AsyncCardGallery> {
        let builder = self.inner;
        tokio::task::spawn_blocking(move || {
            let gallery = builder.build()?;
            Ok(AsyncCardGallery {
                inner: Arc::new(Mutex::new(gallery)),
            })
        })
        .await
        .map_err(|e| GalleryError::InvalidArgument(format!("Task join error: {e}")))?
    }
}

// ---------------------------------------------------------------------------
// AsyncCardGallery
// ---------------------------------------------------------------------------

/// Async wrapper around [`CardGallery`].
///
/// The gallery is protected by a [`Mutex`] since its sync service and DuckDB
/// connection are not `Sync`. Cloning is cheap and shares the same gallery.
#[derive(Clone)]
pub struct AsyncCardGallery {
    inner: Arc<Mutex<CardGallery>>,
}

impl AsyncCardGallery {
    /// Create a new builder for configuring the async gallery.
    pub fn builder() -> AsyncCardGalleryBuilder {
        AsyncCardGalleryBuilder::default()
    }

    /// Wrap an already built gallery.
    pub fn from_gallery(gallery: CardGallery) -> Self {
        Self {
            inner: Arc::new(Mutex::new(gallery)),
        }
    }

    /// Run a sync gallery operation on the blocking thread pool.
    pub async fn run<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&CardGallery) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let gallery = self.inner.clone();
        tokio::task::spawn_blocking(move || {
            let guard = gallery
                .lock()
                .map_err(|_| GalleryError::InvalidArgument("Gallery lock poisoned".into()))?;
            f(&guard)
        })
        .await
        .map_err(|e| GalleryError::InvalidArgument(format!("Task join error: {e}")))?
    }

    /// The merged listing. See [`CardGallery::cards`].
    pub async fn cards(&self) -> Result<Vec<Card>> {
        self.run(|g| Ok(g.cards())).await
    }

    /// Find a card of the merged listing by id.
    pub async fn card(&self, id: &str) -> Result<Option<Card>> {
        let id = id.to_string();
        self.run(move |g| Ok(g.card(&id))).await
    }

    /// When the catalog feeds were last fetched.
    pub async fn last_sync(&self) -> Result<Option<DateTime<Utc>>> {
        self.run(|g| Ok(g.last_sync())).await
    }

    /// Persist a new custom card.
    pub async fn create_custom(&self, data: NewCustomCard) -> Result<Card> {
        self.run(move |g| g.customs().create(data)).await
    }

    /// Update a stored custom card.
    pub async fn update_custom(&self, id: &str, data: CustomCardUpdate) -> Result<Option<Card>> {
        let id = id.to_string();
        self.run(move |g| g.customs().update(&id, data)).await
    }

    /// Delete a stored custom card.
    pub async fn delete_custom(&self, id: &str) -> Result<bool> {
        let id = id.to_string();
        self.run(move |g| g.customs().delete(&id)).await
    }

    /// Look up a stored custom card directly, bypassing the merge.
    pub async fn custom(&self, id: &str) -> Result<Option<Card>> {
        let id = id.to_string();
        self.run(move |g| g.customs().get(&id)).await
    }
}
