//! Gallery facade tests: builder wiring over an offline cache and an
//! in-memory customs database.

use kissune_cards::models::NewCustomCard;
use kissune_cards::{CardGallery, Category, Feed, ItemType};

fn write_feed(dir: &std::path::Path, feed: Feed, contents: &str) {
    std::fs::write(dir.join(feed.file_name()), contents).unwrap();
}

fn offline_gallery(dir: &std::path::Path) -> CardGallery {
    CardGallery::builder()
        .cache_dir(dir)
        .offline(true)
        .in_memory(true)
        .build()
        .unwrap()
}

#[test]
fn merges_feed_files_and_uploads() {
    let tmp = tempfile::tempdir().unwrap();
    write_feed(
        tmp.path(),
        Feed::RegularCards,
        r#"{"cards":[{"code":"C1","name":"Karina","image":"https://x/1.png"}]}"#,
    );
    write_feed(
        tmp.path(),
        Feed::Wallpapers,
        r#"{"cards":[
            {"group":"LE SSERAFIM","theme":"Unforgiven","image":"https://x/w.png","gemPrice":40}
        ]}"#,
    );

    let gallery = offline_gallery(tmp.path());
    gallery
        .customs()
        .create(NewCustomCard::new("Fan Art", "https://s3/fan.png").submitted_by("u9", "Mina"))
        .unwrap();
    gallery
        .customs()
        .create(NewCustomCard::new("Seeded demo", "https://s3/demo.png"))
        .unwrap();

    assert!(gallery.last_sync().is_none());
    let cards = gallery.cards();
    assert!(gallery.last_sync().is_some());

    // Three missing feed files degrade to empty; the unattributed demo is filtered.
    assert_eq!(cards.len(), 3);
    assert_eq!(cards[0].idol_name.as_deref(), Some("Karina"));
    assert_eq!(cards[1].item_type, ItemType::Wallpapers);
    assert_eq!(cards[1].name, "LE SSERAFIM - Unforgiven");
    assert_eq!(cards[2].name, "Fan Art");
    assert_eq!(cards[2].category, Category::Regular);
}

#[test]
fn card_lookup_spans_both_sources() {
    let tmp = tempfile::tempdir().unwrap();
    write_feed(
        tmp.path(),
        Feed::Frames,
        r#"[{"code":"FR-01","image":"https://x/f.png"}]"#,
    );
    let gallery = offline_gallery(tmp.path());
    let upload = gallery
        .customs()
        .create(NewCustomCard::new("Mine", "https://s3/m.png").submitted_by("u1", "Yuna"))
        .unwrap();

    let snapshot = gallery.snapshot();
    assert_eq!(snapshot.len(), 2);
    let frame_id = snapshot.cards()[0].id.clone();

    assert_eq!(gallery.card(&frame_id).unwrap().name, "FR-01");
    assert_eq!(gallery.card(&upload.id).unwrap().name, "Mine");
    assert!(gallery.card("missing").is_none());
}

#[test]
fn deleted_upload_leaves_listing() {
    let tmp = tempfile::tempdir().unwrap();
    let gallery = offline_gallery(tmp.path());
    let upload = gallery
        .customs()
        .create(NewCustomCard::new("Temp", "https://s3/t.png").submitted_by("u1", "Yuna"))
        .unwrap();

    assert_eq!(gallery.cards().len(), 1);
    assert!(gallery.customs().delete(&upload.id).unwrap());
    assert!(gallery.cards().is_empty());
}

#[test]
fn display_mentions_cache_dir() {
    let tmp = tempfile::tempdir().unwrap();
    let gallery = offline_gallery(tmp.path());
    let shown = gallery.to_string();
    assert!(shown.starts_with("CardGallery("));
    assert!(shown.contains("offline=true"));
}
