//! Status records as returned by `GET /api/v1/accounts/:id/statuses`.
//!
//! Only the fields the widget displays are kept. Everything is lenient: a
//! missing, `null` or wrongly typed field degrades to "absent" instead of
//! failing the whole post.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Post {
    /// Server-rendered HTML. Trusted.
    #[serde(default, deserialize_with = "lenient")]
    pub content: String,
    #[serde(default, deserialize_with = "lenient")]
    pub created_at: String,
    #[serde(default, deserialize_with = "lenient")]
    pub url: String,
    #[serde(default, deserialize_with = "lenient")]
    pub emojis: Vec<Emoji>,
    #[serde(default, deserialize_with = "lenient")]
    pub poll: Option<Poll>,
    #[serde(default, deserialize_with = "lenient")]
    pub media_attachments: Vec<MediaAttachment>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Emoji {
    #[serde(default, deserialize_with = "lenient")]
    pub shortcode: String,
    #[serde(default, deserialize_with = "lenient")]
    pub url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Poll {
    #[serde(default, deserialize_with = "lenient")]
    pub expired: bool,
    /// Total votes. Need not equal the sum of the option counts.
    #[serde(default, deserialize_with = "lenient")]
    pub votes_count: u64,
    #[serde(default, deserialize_with = "lenient")]
    pub options: Vec<PollOption>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PollOption {
    #[serde(default, deserialize_with = "lenient")]
    pub title: String,
    /// `null` when the poll hides its results until it closes.
    #[serde(default, deserialize_with = "lenient")]
    pub votes_count: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct MediaAttachment {
    #[serde(rename = "type", default, deserialize_with = "lenient")]
    pub kind: MediaKind,
    #[serde(default, deserialize_with = "lenient")]
    pub url: String,
    #[serde(default, deserialize_with = "lenient")]
    pub preview_url: String,
    /// Alt text. Untrusted.
    #[serde(default, deserialize_with = "lenient")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub meta: Option<MediaMeta>,
}

impl MediaAttachment {
    /// Display size from `meta.small`, either side may be missing.
    pub fn small_size(&self) -> (Option<u32>, Option<u32>) {
        self.meta
            .as_ref()
            .and_then(|meta| meta.small.as_ref())
            .map(|small| (small.width, small.height))
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Gifv,
    Video,
    Audio,
    #[default]
    #[serde(other)]
    Unknown,
}

impl MediaKind {
    /// Kinds shown inline in a gallery rather than as a player or link.
    pub fn is_visual(self) -> bool {
        matches!(self, MediaKind::Image | MediaKind::Gifv | MediaKind::Video)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct MediaMeta {
    #[serde(default, deserialize_with = "lenient")]
    pub small: Option<MediaSize>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct MediaSize {
    #[serde(default, deserialize_with = "dimension")]
    pub width: Option<u32>,
    #[serde(default, deserialize_with = "dimension")]
    pub height: Option<u32>,
}

/// `T`, or its default when the value is `null` or has the wrong shape.
fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(T::deserialize(value).unwrap_or_default())
}

/// Pixel sizes arrive as integers from most servers and as floats from some.
fn dimension<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value
        .as_f64()
        .filter(|size| size.is_finite() && *size >= 0.0 && *size <= f64::from(u32::MAX))
        .map(|size| size.round() as u32))
}
