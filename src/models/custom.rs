use serde::{Deserialize, Serialize};

use super::card::{Category, ImageRef, ItemType};
use crate::error::{GalleryError, Result};

/// Fields accepted when a custom card is uploaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCustomCard {
    pub name: String,
    pub image_url: ImageRef,
    #[serde(default = "default_item_type")]
    pub item_type: ItemType,
    #[serde(default = "default_category")]
    pub category: Category,
    #[serde(default)]
    pub idol_name: Option<String>,
    #[serde(default)]
    pub group: Option<String>,
    #[serde(default)]
    pub theme: Option<String>,
    #[serde(default)]
    pub subcat: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub print_number: Option<u32>,
    #[serde(default)]
    pub canvas_width: Option<u32>,
    #[serde(default)]
    pub canvas_height: Option<u32>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub submitter_id: Option<String>,
    #[serde(default)]
    pub submitter_name: Option<String>,
}

fn default_item_type() -> ItemType {
    ItemType::Cards
}

fn default_category() -> Category {
    Category::Regular
}

impl NewCustomCard {
    /// A minimal upload: a regular card with just a name and an image.
    pub fn new(name: impl Into<String>, image_url: impl Into<ImageRef>) -> Self {
        Self {
            name: name.into(),
            image_url: image_url.into(),
            item_type: default_item_type(),
            category: default_category(),
            idol_name: None,
            group: None,
            theme: None,
            subcat: None,
            code: None,
            print_number: None,
            canvas_width: None,
            canvas_height: None,
            description: None,
            submitter_id: None,
            submitter_name: None,
        }
    }

    /// Attribute the upload to a submitter.
    pub fn submitted_by(mut self, id: impl Into<String>, name: impl Into<String>) -> Self {
        self.submitter_id = Some(id.into());
        self.submitter_name = Some(name.into());
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(GalleryError::InvalidArgument(
                "Card name must not be empty".to_string(),
            ));
        }
        if self.image_url.is_blank() {
            return Err(GalleryError::InvalidArgument(
                "Card image must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Partial update of a custom card. `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomCardUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub image_url: Option<ImageRef>,
    #[serde(default)]
    pub item_type: Option<ItemType>,
    #[serde(default)]
    pub category: Option<Category>,
    #[serde(default)]
    pub idol_name: Option<String>,
    #[serde(default)]
    pub group: Option<String>,
    #[serde(default)]
    pub theme: Option<String>,
    #[serde(default)]
    pub subcat: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub canvas_width: Option<u32>,
    #[serde(default)]
    pub canvas_height: Option<u32>,
    #[serde(default)]
    pub description: Option<String>,
}

impl CustomCardUpdate {
    pub fn validate(&self) -> Result<()> {
        if self.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
            return Err(GalleryError::InvalidArgument(
                "Card name must not be empty".to_string(),
            ));
        }
        if self.image_url.as_ref().is_some_and(ImageRef::is_blank) {
            return Err(GalleryError::InvalidArgument(
                "Card image must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}
