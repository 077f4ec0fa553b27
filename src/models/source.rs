use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::card::ImageRef;

/// One entry of a bot feed file, before it is mapped to a [`Card`](super::Card).
///
/// Every field is optional and decoded leniently: the bot's JSON is loosely
/// typed, so a numeric `code` becomes its decimal string, a string
/// `printNumber` is parsed, and a value of the wrong shape reads as absent.
/// A record missing fields is still mapped, using fallbacks for the display
/// name. Feed-specific extras (frame price, wallpaper gem price, ...) are
/// ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceRecord {
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub subcat: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub group: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub theme: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub code: Option<String>,
    #[serde(default, deserialize_with = "lenient_image")]
    pub image: Option<ImageRef>,
    #[serde(default, deserialize_with = "lenient_count")]
    pub print_number: Option<u32>,
}

impl SourceRecord {
    /// The record's code, if it carries a non-blank one.
    pub fn code(&self) -> Option<&str> {
        non_blank(self.code.as_deref())
    }

    /// The record's name, if it carries a non-blank one.
    pub fn name(&self) -> Option<&str> {
        non_blank(self.name.as_deref())
    }
}

pub(crate) fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

fn scalar_text(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(scalar_text(Value::deserialize(deserializer)?))
}

fn lenient_count<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u32>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_u64().and_then(|v| u32::try_from(v).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    })
}

fn lenient_image<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<ImageRef>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::String(url) => Some(ImageRef::Single(url)),
        Value::Array(faces) => Some(ImageRef::from_faces(
            faces.into_iter().filter_map(scalar_text).collect(),
        )),
        _ => None,
    })
}
