//! Shared test fixtures for the gallery integration tests.
//!
//! Provides in-memory feed and store fakes, offline and online `FeedCache`s
//! over a temporary directory, a one-shot local HTTP server, and a seeded
//! in-memory `CardStore`.

#![allow(dead_code)]

use chrono::{TimeZone, Utc};
use kissune_cards::models::NewCustomCard;
use kissune_cards::{
    Card, CardStore, Category, CustomStore, Feed, FeedCache, FeedSource, GalleryError, ImageRef,
    ItemType, SourceRecord,
};
use std::collections::{HashMap, HashSet};
use std::io::{Read, Write};
use std::net::TcpListener;
use std::path::Path;
use std::thread;
use std::time::Duration;

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// A feed record with the given code, name and single image.
pub fn record(code: Option<&str>, name: Option<&str>, image: &str) -> SourceRecord {
    SourceRecord {
        code: code.map(str::to_string),
        name: name.map(str::to_string),
        image: Some(ImageRef::from(image)),
        ..Default::default()
    }
}

/// A wallpaper record labelled by group and theme.
pub fn wallpaper(group: Option<&str>, theme: Option<&str>, code: Option<&str>) -> SourceRecord {
    SourceRecord {
        group: group.map(str::to_string),
        theme: theme.map(str::to_string),
        code: code.map(str::to_string),
        image: Some(ImageRef::from("https://x/wall.png")),
        ..Default::default()
    }
}

/// A persisted custom as the store would return it.
pub fn custom(id: &str, name: &str, submitter_id: Option<&str>) -> Card {
    let at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
    Card {
        id: id.to_string(),
        name: name.to_string(),
        image_url: ImageRef::from("https://s3/custom.png"),
        item_type: ItemType::Cards,
        category: Category::Regular,
        idol_name: None,
        group: None,
        theme: None,
        subcat: None,
        code: None,
        print_number: Some(1),
        canvas_width: None,
        canvas_height: None,
        description: None,
        submitter_id: submitter_id.map(str::to_string),
        submitter_name: submitter_id.map(|s| format!("user-{s}")),
        created_at: at,
        updated_at: at,
    }
}

// ---------------------------------------------------------------------------
// Feed fakes
// ---------------------------------------------------------------------------

/// Serves fixed records per feed. Feeds listed in `failing` return an error,
/// feeds in `panicking` panic. Feeds with no records return an empty list.
#[derive(Default)]
pub struct StaticFeeds {
    pub records: HashMap<Feed, Vec<SourceRecord>>,
    pub failing: HashSet<Feed>,
    pub panicking: HashSet<Feed>,
}

impl StaticFeeds {
    pub fn with(mut self, feed: Feed, records: Vec<SourceRecord>) -> Self {
        self.records.insert(feed, records);
        self
    }

    pub fn failing(mut self, feed: Feed) -> Self {
        self.failing.insert(feed);
        self
    }

    pub fn panicking(mut self, feed: Feed) -> Self {
        self.panicking.insert(feed);
        self
    }
}

impl FeedSource for StaticFeeds {
    fn fetch(&self, feed: Feed) -> kissune_cards::Result<Vec<SourceRecord>> {
        if self.panicking.contains(&feed) {
            panic!("feed {feed} exploded");
        }
        if self.failing.contains(&feed) {
            return Err(GalleryError::NotFound(format!("{feed} unreachable")));
        }
        Ok(self.records.get(&feed).cloned().unwrap_or_default())
    }
}

// ---------------------------------------------------------------------------
// Store fakes
// ---------------------------------------------------------------------------

/// Returns a fixed list of documents.
#[derive(Default)]
pub struct VecStore(pub Vec<Card>);

impl CustomStore for VecStore {
    fn list_all(&self) -> kissune_cards::Result<Vec<Card>> {
        Ok(self.0.clone())
    }
}

/// A store that can never be read.
pub struct BrokenStore;

impl CustomStore for BrokenStore {
    fn list_all(&self) -> kissune_cards::Result<Vec<Card>> {
        Err(GalleryError::NotFound("store offline".to_string()))
    }
}

// ---------------------------------------------------------------------------
// Real collaborators over temporary storage
// ---------------------------------------------------------------------------

/// Create an offline `FeedCache` whose directory holds the given raw feed
/// files.
///
/// Returns `(FeedCache, tempfile::TempDir)`. The caller must keep the
/// `TempDir` alive for the duration of the test.
pub fn offline_feeds(files: &[(Feed, &str)]) -> (FeedCache, tempfile::TempDir) {
    let tmp_dir = tempfile::tempdir().unwrap();
    seed(tmp_dir.path(), files);
    let cache = FeedCache::new(
        Some(tmp_dir.path().to_path_buf()),
        None,
        true,
        Duration::from_secs(30),
    )
    .unwrap();
    (cache, tmp_dir)
}

/// Create an online `FeedCache` downloading from `base_url`, with the given
/// raw feed files already cached.
pub fn online_feeds(base_url: &str, files: &[(Feed, &str)]) -> (FeedCache, tempfile::TempDir) {
    let tmp_dir = tempfile::tempdir().unwrap();
    seed(tmp_dir.path(), files);
    let cache = FeedCache::new(
        Some(tmp_dir.path().to_path_buf()),
        Some(base_url.to_string()),
        false,
        Duration::from_secs(5),
    )
    .unwrap();
    (cache, tmp_dir)
}

fn seed(dir: &Path, files: &[(Feed, &str)]) {
    for (feed, contents) in files {
        std::fs::write(dir.join(feed.file_name()), contents).unwrap();
    }
}

/// Serve a single HTTP response on a local port and return its base URL.
///
/// `status` is the status line suffix, e.g. `"200 OK"`.
pub fn serve_once(status: &'static str, body: &'static str) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    thread::spawn(move || {
        let Ok((mut stream, _)) = listener.accept() else {
            return;
        };
        let mut request = Vec::new();
        let mut buf = [0u8; 1024];
        while !request.windows(4).any(|w| w == b"\r\n\r\n") {
            match stream.read(&mut buf) {
                Ok(0) | Err(_) => break,
                Ok(n) => request.extend_from_slice(&buf[..n]),
            }
        }
        let response = format!(
            "HTTP/1.1 {status}\r\nContent-Type: application/json\r\n\
             Content-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        let _ = stream.write_all(response.as_bytes());
    });
    format!("http://{addr}")
}

/// An in-memory store seeded with one attributed and one unattributed custom.
pub fn seeded_store() -> CardStore {
    let store = CardStore::open_in_memory().unwrap();
    store
        .create(NewCustomCard::new("Fan Art", "https://s3/fan.png").submitted_by("u9", "Mina"))
        .unwrap();
    store
        .create(NewCustomCard::new("Demo Card", "https://s3/demo.png"))
        .unwrap();
    store
}
