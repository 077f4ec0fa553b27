//! Deterministic identifiers for catalog cards.
//!
//! Catalog cards have no store of their own and are rebuilt on every read, so
//! their ids are derived from content: the same record always hashes to the
//! same id, across runs and restarts.

use sha2::{Digest, Sha256};

use crate::models::{Category, ImageRef, ItemType};

/// Length of a derived id, in hex characters (96 bits).
pub const ID_LENGTH: usize = 24;

const SEPARATOR: &[u8] = &[0x1f];

/// Derive the id of a catalog card.
///
/// With a non-blank `code` the id depends only on the feed identity
/// (`item_type`, `category`) and the code, so cosmetic edits to the record do
/// not move it. Without one it depends on the feed identity, the primary
/// image and the name.
///
/// Print numbers are deliberately not hashed: repeated prints of one code
/// share an id.
pub fn derive_id(
    item_type: ItemType,
    category: Category,
    code: Option<&str>,
    image: &ImageRef,
    name: Option<&str>,
) -> String {
    let mut hasher = Sha256::new();
    hasher.update(item_type.as_str().as_bytes());
    hasher.update(SEPARATOR);
    hasher.update(category.as_str().as_bytes());
    hasher.update(SEPARATOR);

    match code.filter(|c| !c.trim().is_empty()) {
        Some(code) => {
            hasher.update(b"code");
            hasher.update(SEPARATOR);
            hasher.update(code.as_bytes());
        }
        None => {
            hasher.update(b"image");
            hasher.update(SEPARATOR);
            hasher.update(image.primary().as_bytes());
            hasher.update(SEPARATOR);
            hasher.update(name.unwrap_or("").as_bytes());
        }
    }

    let digest = format!("{:x}", hasher.finalize());
    digest[..ID_LENGTH].to_string()
}

/// Whether `id` has the shape of a derived catalog id.
pub fn is_catalog_id(id: &str) -> bool {
    id.len() == ID_LENGTH && id.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
}
