//! Customs store tests against an in-memory DuckDB database.

mod common;

use kissune_cards::identity::is_catalog_id;
use kissune_cards::models::{CustomCardUpdate, NewCustomCard};
use kissune_cards::{CardStore, Category, GalleryError, ImageRef, ItemType};

// ---------------------------------------------------------------------------
// create / get
// ---------------------------------------------------------------------------

#[test]
fn create_assigns_uuid_and_timestamps() {
    let store = CardStore::open_in_memory().unwrap();
    let card = store
        .create(NewCustomCard::new("Fan Art", "https://s3/fan.png").submitted_by("u9", "Mina"))
        .unwrap();

    assert_eq!(card.id.len(), 36);
    assert!(!is_catalog_id(&card.id));
    assert_eq!(card.created_at, card.updated_at);
    assert_eq!(card.print_number, Some(1));
    assert_eq!(card.item_type, ItemType::Cards);
    assert_eq!(card.category, Category::Regular);
}

#[test]
fn get_round_trips_every_field() {
    let store = CardStore::open_in_memory().unwrap();
    let mut data = NewCustomCard::new(
        "Double",
        ImageRef::from_faces(vec!["https://s3/front.png".into(), "https://s3/back.png".into()]),
    )
    .submitted_by("u3", "Hana");
    data.item_type = ItemType::Frames;
    data.category = Category::Collabs;
    data.group = Some("TWICE".into());
    data.canvas_width = Some(600);
    data.canvas_height = Some(900);
    data.description = Some("Made for the collab event".into());

    let created = store.create(data).unwrap();
    let fetched = store.get(&created.id).unwrap().unwrap();

    assert_eq!(fetched.id, created.id);
    assert_eq!(fetched.name, "Double");
    assert!(fetched.image_url.is_double_sided());
    assert_eq!(fetched.item_type, ItemType::Frames);
    assert_eq!(fetched.category, Category::Collabs);
    assert_eq!(fetched.group.as_deref(), Some("TWICE"));
    assert_eq!(fetched.canvas_width, Some(600));
    assert_eq!(fetched.canvas_height, Some(900));
    assert_eq!(fetched.submitter_id.as_deref(), Some("u3"));
    assert_eq!(fetched.submitter_name.as_deref(), Some("Hana"));
    assert_eq!(fetched.created_at, created.created_at);
}

#[test]
fn get_returns_none_for_unknown() {
    let store = CardStore::open_in_memory().unwrap();
    assert!(store.get("no-such-id").unwrap().is_none());
}

#[test]
fn create_rejects_blank_name() {
    let store = CardStore::open_in_memory().unwrap();
    let err = store
        .create(NewCustomCard::new("   ", "https://s3/x.png"))
        .unwrap_err();
    assert!(matches!(err, GalleryError::InvalidArgument(_)));
    assert_eq!(store.count().unwrap(), 0);
}

#[test]
fn create_rejects_blank_image() {
    let store = CardStore::open_in_memory().unwrap();
    let err = store.create(NewCustomCard::new("Name", "")).unwrap_err();
    assert!(matches!(err, GalleryError::InvalidArgument(_)));
}

// ---------------------------------------------------------------------------
// list_all
// ---------------------------------------------------------------------------

#[test]
fn list_all_includes_unattributed_documents() {
    let store = common::seeded_store();
    let all = store.list_all().unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all.iter().filter(|c| c.has_submitter()).count(), 1);
}

#[test]
fn list_all_is_newest_first() {
    let store = CardStore::open_in_memory().unwrap();
    let older = store
        .create(NewCustomCard::new("Older", "https://s3/1.png").submitted_by("u1", "A"))
        .unwrap();
    std::thread::sleep(std::time::Duration::from_millis(5));
    let newer = store
        .create(NewCustomCard::new("Newer", "https://s3/2.png").submitted_by("u1", "A"))
        .unwrap();

    let ids: Vec<String> = store.list_all().unwrap().into_iter().map(|c| c.id).collect();
    assert_eq!(ids, vec![newer.id, older.id]);
}

// ---------------------------------------------------------------------------
// update
// ---------------------------------------------------------------------------

#[test]
fn update_changes_only_given_fields() {
    let store = CardStore::open_in_memory().unwrap();
    let mut data = NewCustomCard::new("Before", "https://s3/1.png").submitted_by("u1", "A");
    data.theme = Some("Summer".into());
    let card = store.create(data).unwrap();

    let updated = store
        .update(
            &card.id,
            CustomCardUpdate {
                name: Some("After".into()),
                description: Some("edited".into()),
                ..Default::default()
            },
        )
        .unwrap()
        .unwrap();

    assert_eq!(updated.name, "After");
    assert_eq!(updated.description.as_deref(), Some("edited"));
    assert_eq!(updated.theme.as_deref(), Some("Summer"));
    assert_eq!(updated.submitter_id.as_deref(), Some("u1"));
    assert!(updated.updated_at >= card.updated_at);

    let stored = store.get(&card.id).unwrap().unwrap();
    assert_eq!(stored, updated);
}

#[test]
fn update_unknown_returns_none() {
    let store = CardStore::open_in_memory().unwrap();
    let result = store
        .update("no-such-id", CustomCardUpdate::default())
        .unwrap();
    assert!(result.is_none());
}

#[test]
fn update_rejects_blank_name() {
    let store = common::seeded_store();
    let id = store.list_all().unwrap()[0].id.clone();
    let err = store
        .update(
            &id,
            CustomCardUpdate {
                name: Some(String::new()),
                ..Default::default()
            },
        )
        .unwrap_err();
    assert!(matches!(err, GalleryError::InvalidArgument(_)));
}

// ---------------------------------------------------------------------------
// delete
// ---------------------------------------------------------------------------

#[test]
fn delete_removes_once() {
    let store = common::seeded_store();
    let id = store.list_all().unwrap()[0].id.clone();

    assert!(store.delete(&id).unwrap());
    assert!(!store.delete(&id).unwrap());
    assert!(store.get(&id).unwrap().is_none());
    assert_eq!(store.count().unwrap(), 1);
}

// ---------------------------------------------------------------------------
// persistence
// ---------------------------------------------------------------------------

#[test]
fn file_store_survives_reopen() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("nested").join("customs.duckdb");

    let id = {
        let store = CardStore::open(&path).unwrap();
        store
            .create(NewCustomCard::new("Kept", "https://s3/k.png").submitted_by("u1", "A"))
            .unwrap()
            .id
    };

    let reopened = CardStore::open(&path).unwrap();
    assert_eq!(reopened.get(&id).unwrap().unwrap().name, "Kept");
}

#[test]
fn insert_keeps_foreign_ids() {
    let store = CardStore::open_in_memory().unwrap();
    let card = common::custom("custom-7", "Imported", Some("u9"));
    store.insert(&card).unwrap();
    assert_eq!(store.get("custom-7").unwrap().unwrap(), card);
}
