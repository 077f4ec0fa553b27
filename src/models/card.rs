use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

// ---------------------------------------------------------------------------
// ItemType / Category
// ---------------------------------------------------------------------------

/// What kind of collectible an entry is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemType {
    Cards,
    Wallpapers,
    Frames,
}

impl ItemType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemType::Cards => "cards",
            ItemType::Wallpapers => "wallpapers",
            ItemType::Frames => "frames",
        }
    }
}

impl fmt::Display for ItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rarity bucket an entry belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Limited,
    Event,
    Regular,
    Collabs,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Limited => "limited",
            Category::Event => "event",
            Category::Regular => "regular",
            Category::Collabs => "collabs",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// ImageRef: one image, or both faces of a double-sided item
// ---------------------------------------------------------------------------

/// Image reference of a card.
///
/// Serializes as a bare string or as an array. A `DoubleSided` value always
/// holds at least two entries: deserializing a one-element array yields
/// `Single`, and an empty array degrades to an empty `Single`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ImageRef {
    Single(String),
    DoubleSided(Vec<String>),
}

impl ImageRef {
    /// Build an image reference from an ordered list of faces.
    pub fn from_faces(mut faces: Vec<String>) -> Self {
        match faces.len() {
            0 => ImageRef::Single(String::new()),
            1 => ImageRef::Single(faces.remove(0)),
            _ => ImageRef::DoubleSided(faces),
        }
    }

    /// The front face: the scalar itself, or the first element of a sequence.
    pub fn primary(&self) -> &str {
        match self {
            ImageRef::Single(url) => url,
            ImageRef::DoubleSided(faces) => faces.first().map(String::as_str).unwrap_or(""),
        }
    }

    pub fn is_double_sided(&self) -> bool {
        matches!(self, ImageRef::DoubleSided(_))
    }

    /// True when there is no usable image at all.
    pub fn is_blank(&self) -> bool {
        match self {
            ImageRef::Single(url) => url.trim().is_empty(),
            ImageRef::DoubleSided(faces) => faces.iter().all(|f| f.trim().is_empty()),
        }
    }
}

impl Default for ImageRef {
    fn default() -> Self {
        ImageRef::Single(String::new())
    }
}

impl From<&str> for ImageRef {
    fn from(url: &str) -> Self {
        ImageRef::Single(url.to_string())
    }
}

impl From<String> for ImageRef {
    fn from(url: String) -> Self {
        ImageRef::Single(url)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawImage {
    One(String),
    Many(Vec<String>),
}

impl<'de> Deserialize<'de> for ImageRef {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match RawImage::deserialize(deserializer)? {
            RawImage::One(url) => ImageRef::Single(url),
            RawImage::Many(faces) => ImageRef::from_faces(faces),
        })
    }
}

// ---------------------------------------------------------------------------
// Card: the unified gallery entry
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    pub id: String,
    pub name: String,
    pub image_url: ImageRef,
    pub item_type: ItemType,
    pub category: Category,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub idol_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subcat: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub print_number: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub canvas_width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub canvas_height: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submitter_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submitter_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Card {
    /// Whether this entry can be attributed to someone who uploaded it.
    pub fn has_submitter(&self) -> bool {
        self.submitter_id
            .as_deref()
            .is_some_and(|s| !s.trim().is_empty())
    }
}

// ---------------------------------------------------------------------------
// MappedCard: a catalog record in card shape, before identity is assigned
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappedCard {
    pub name: String,
    pub image_url: ImageRef,
    pub item_type: ItemType,
    pub category: Category,
    pub idol_name: Option<String>,
    pub group: Option<String>,
    pub theme: Option<String>,
    pub subcat: Option<String>,
    pub code: Option<String>,
    pub print_number: Option<u32>,
}

impl MappedCard {
    /// Finish the card with its identifier and merge-time timestamps.
    pub fn into_card(self, id: String, stamped_at: DateTime<Utc>) -> Card {
        Card {
            id,
            name: self.name,
            image_url: self.image_url,
            item_type: self.item_type,
            category: self.category,
            idol_name: self.idol_name,
            group: self.group,
            theme: self.theme,
            subcat: self.subcat,
            code: self.code,
            print_number: self.print_number,
            canvas_width: None,
            canvas_height: None,
            description: None,
            submitter_id: None,
            submitter_name: None,
            created_at: stamped_at,
            updated_at: stamped_at,
        }
    }
}
