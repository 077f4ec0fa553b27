//! Download-and-cache manager for the bot's feed files.
//!
//! Each feed file is downloaded from a base URL into a local cache directory.
//! When a download fails the last cached copy is served instead. In offline
//! mode nothing is downloaded and the cache directory is read as-is, which is
//! how a directory mirrored from the bot host is consumed.

use crate::config;
use crate::error::{GalleryError, Result};
use crate::feeds::{self, Feed, FeedSource};
use crate::models::SourceRecord;
use reqwest::blocking::Client;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Downloads and caches the catalog feed files.
pub struct FeedCache {
    /// Directory where cached feed files are stored.
    pub cache_dir: PathBuf,
    /// If true, never download (use cached files only).
    pub offline: bool,
    base_url: String,
    client: Option<Client>,
}

impl FeedCache {
    /// Create a new feed cache.
    ///
    /// If `cache_dir` is `None`, uses the platform-appropriate default cache
    /// directory. Creates the cache directory if it does not exist. The HTTP
    /// client is only built when not offline.
    pub fn new(
        cache_dir: Option<PathBuf>,
        base_url: Option<String>,
        offline: bool,
        timeout: Duration,
    ) -> Result<Self> {
        let dir = cache_dir.unwrap_or_else(config::default_cache_dir);
        fs::create_dir_all(&dir)?;

        let client = if offline {
            None
        } else {
            Some(
                Client::builder()
                    .timeout(timeout)
                    .redirect(reqwest::redirect::Policy::limited(10))
                    .build()?,
            )
        };

        let base_url = base_url
            .unwrap_or_else(|| config::DEFAULT_FEED_BASE.to_string())
            .trim_end_matches('/')
            .to_string();

        Ok(Self {
            cache_dir: dir,
            offline,
            base_url,
            client,
        })
    }

    /// Base URL feed files are downloaded from.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Local path of a feed's cached file.
    pub fn path_for(&self, feed: Feed) -> PathBuf {
        self.cache_dir.join(feed.file_name())
    }

    /// Download a single feed file.
    ///
    /// Downloads to a temp file first and renames only once the body parses
    /// as JSON, so a partial or non-JSON response never replaces the cached
    /// copy.
    fn download_file(&self, client: &Client, feed: Feed, dest: &Path) -> Result<()> {
        let url = format!("{}/{}", self.base_url, feed.file_name());
        log::info!("Downloading {}", url);

        let tmp_dest = dest.with_extension("json.tmp");

        let result = (|| -> Result<()> {
            let resp = client.get(&url).send()?.error_for_status()?;
            let bytes = resp.bytes()?;
            serde_json::from_slice::<serde_json::Value>(&bytes)?;
            fs::write(&tmp_dest, &bytes)?;
            fs::rename(&tmp_dest, dest)?;
            Ok(())
        })();

        if result.is_err() {
            let _ = fs::remove_file(&tmp_dest);
        }

        result
    }

    /// Ensure a feed file is cached locally, downloading a fresh copy unless
    /// offline.
    ///
    /// A failed download falls back to the previously cached copy if there is
    /// one.
    pub fn ensure_feed(&self, feed: Feed) -> Result<PathBuf> {
        let local_path = self.path_for(feed);

        if let Some(client) = &self.client {
            if let Err(e) = self.download_file(client, feed, &local_path) {
                if local_path.exists() {
                    log::warn!("Failed to download {}: {} -- using cached copy", feed, e);
                    return Ok(local_path);
                }
                return Err(e);
            }
            return Ok(local_path);
        }

        if local_path.exists() {
            Ok(local_path)
        } else {
            Err(GalleryError::NotFound(format!(
                "Feed file {} not cached and offline mode is enabled",
                feed.file_name()
            )))
        }
    }

    /// Load and parse a feed file.
    ///
    /// If a downloaded file is corrupt it is deleted so the next fetch
    /// re-downloads a fresh copy. Offline caches are never deleted.
    pub fn load_feed(&self, feed: Feed) -> Result<Vec<SourceRecord>> {
        let path = self.ensure_feed(feed)?;
        let contents = fs::read_to_string(&path)?;

        match serde_json::from_str::<serde_json::Value>(&contents) {
            Ok(value) => {
                let records = feeds::parse_feed(feed, value);
                log::info!("Fetched {} items from {}", records.len(), feed);
                Ok(records)
            }
            Err(e) => {
                if self.offline {
                    return Err(GalleryError::Json(e));
                }
                log::warn!("Corrupt cache file {}: {} -- removing", path.display(), e);
                let _ = fs::remove_file(&path);
                Err(GalleryError::NotFound(format!(
                    "Feed file '{}' was corrupt and has been removed. \
                     Retry to re-download. Original error: {}",
                    feed.file_name(),
                    e
                )))
            }
        }
    }

    /// Remove all cached files and recreate the cache directory.
    pub fn clear(&self) -> Result<()> {
        if self.cache_dir.exists() {
            fs::remove_dir_all(&self.cache_dir)?;
            fs::create_dir_all(&self.cache_dir)?;
        }
        Ok(())
    }
}

impl FeedSource for FeedCache {
    fn fetch(&self, feed: Feed) -> Result<Vec<SourceRecord>> {
        self.load_feed(feed)
    }
}
