//! Data models for YouTube `playlistItems` responses
//!
//! Two layers live here:
//!
//! - the wire types ([`PlaylistPage`], [`RawItem`], [`VideoItem`]) which
//!   mirror the JSON returned by the YouTube Data API v3;
//! - the output type ([`Video`]) handed to the site build.
//!
//! See <https://developers.google.com/youtube/v3/docs/playlistItems>.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Base URL of the privacy-enhanced embed player
pub const EMBED_BASE_URL: &str = "https://www.youtube-nocookie.com/embed";

/// Base URL of the public watch page
pub const WATCH_BASE_URL: &str = "https://www.youtube.com/watch";

// ============================================================================
// Envelope
// ============================================================================

/// One page of a `playlistItems.list` response
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistPage {
    /// Continuation cursor, absent on the last page
    #[serde(default)]
    pub next_page_token: Option<String>,
    #[serde(default)]
    pub prev_page_token: Option<String>,
    pub items: Vec<RawItem>,
}

impl PlaylistPage {
    /// Whether another page follows this one
    pub fn has_next(&self) -> bool {
        self.next_page_token.is_some()
    }
}

/// A playlist entry as received, before classification
///
/// Only `snippet.resourceId.videoId` is checked when the envelope is parsed.
/// The remaining fields are kept as raw JSON and validated later, so that a
/// single malformed entry does not reject the whole page.
#[derive(Debug, Clone, PartialEq)]
pub struct RawItem {
    video_id: String,
    title: Option<String>,
    value: Value,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ItemHeader {
    snippet: HeaderSnippet,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct HeaderSnippet {
    resource_id: ResourceId,
    #[serde(default)]
    title: Option<Value>,
}

impl RawItem {
    /// Check the envelope-level shape of an item and wrap it
    pub fn from_value(value: Value) -> Result<Self, serde_json::Error> {
        let header = ItemHeader::deserialize(&value)?;
        let title = match header.snippet.title {
            Some(Value::String(title)) => Some(title),
            _ => None,
        };

        Ok(Self {
            video_id: header.snippet.resource_id.video_id,
            title,
            value,
        })
    }

    /// Video identifier from `snippet.resourceId.videoId`
    pub fn video_id(&self) -> &str {
        &self.video_id
    }

    /// Title if the snippet carries a string title
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// The raw JSON of the entry
    pub fn as_value(&self) -> &Value {
        &self.value
    }

    pub fn into_value(self) -> Value {
        self.value
    }
}

impl<'de> Deserialize<'de> for RawItem {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        RawItem::from_value(value).map_err(de::Error::custom)
    }
}

// ============================================================================
// Full video schema
// ============================================================================

/// A playlist entry that passed full validation
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoItem {
    pub snippet: VideoSnippet,
    pub content_details: ContentDetails,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoSnippet {
    pub title: String,
    pub description: String,
    pub thumbnails: Thumbnails,
    pub resource_id: ResourceId,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceId {
    pub video_id: String,
}

/// Thumbnail variants as sent by the API
///
/// `standard` and `maxres` may also be present; they are not part of the
/// output and are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct Thumbnails {
    pub default: ThumbnailSize,
    pub medium: Option<ThumbnailSize>,
    pub high: Option<ThumbnailSize>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ThumbnailSize {
    pub url: String,
    #[serde(deserialize_with = "deserialize_dimension")]
    pub width: u32,
    #[serde(deserialize_with = "deserialize_dimension")]
    pub height: u32,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawDimension {
    Integer(u64),
    Float(f64),
}

/// Pixel size given as any JSON number; fractional values are rounded
fn deserialize_dimension<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    match RawDimension::deserialize(deserializer)? {
        RawDimension::Integer(n) => u32::try_from(n)
            .map_err(|_| de::Error::custom(format!("dimension out of range: {n}"))),
        RawDimension::Float(f) if f.is_finite() && f >= 0.0 && f <= u32::MAX as f64 => {
            Ok(f.round() as u32)
        }
        RawDimension::Float(f) => Err(de::Error::custom(format!("invalid dimension: {f}"))),
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentDetails {
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub video_published_at: DateTime<Utc>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawTimestamp {
    Text(String),
    Millis(i64),
}

fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    match RawTimestamp::deserialize(deserializer)? {
        RawTimestamp::Text(text) => parse_timestamp(&text)
            .ok_or_else(|| de::Error::custom(format!("invalid timestamp: {text:?}"))),
        RawTimestamp::Millis(millis) => DateTime::from_timestamp_millis(millis)
            .ok_or_else(|| de::Error::custom(format!("timestamp out of range: {millis}"))),
    }
}

/// Coerce a textual date into a UTC timestamp
///
/// Accepts RFC 3339 (what the API sends), a date-time without offset (read
/// as UTC) and a bare `YYYY-MM-DD` date (midnight UTC).
pub fn parse_timestamp(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

// ============================================================================
// Output
// ============================================================================

/// Thumbnail quality label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThumbnailQuality {
    Default,
    Medium,
    High,
}

impl ThumbnailQuality {
    pub fn as_str(&self) -> &'static str {
        match self {
            ThumbnailQuality::Default => "default",
            ThumbnailQuality::Medium => "medium",
            ThumbnailQuality::High => "high",
        }
    }
}

impl std::fmt::Display for ThumbnailQuality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A thumbnail tagged with its quality
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thumbnail {
    pub quality: ThumbnailQuality,
    pub url: String,
    pub width: u32,
    pub height: u32,
}

impl Thumbnail {
    fn tagged(quality: ThumbnailQuality, size: ThumbnailSize) -> Self {
        Self {
            quality,
            url: size.url,
            width: size.width,
            height: size.height,
        }
    }
}

impl Thumbnails {
    /// Flatten the variants into a list, dropping the absent ones
    pub fn into_list(self) -> Vec<Thumbnail> {
        let mut list = vec![Thumbnail::tagged(ThumbnailQuality::Default, self.default)];
        if let Some(medium) = self.medium {
            list.push(Thumbnail::tagged(ThumbnailQuality::Medium, medium));
        }
        if let Some(high) = self.high {
            list.push(Thumbnail::tagged(ThumbnailQuality::High, high));
        }
        list
    }
}

/// A normalized playlist video, ready for the site build
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Video {
    /// YouTube video id
    pub id: String,
    pub title: String,
    pub description: String,
    /// Privacy-enhanced embed URL (autoplay)
    pub embed_url: String,
    /// Watch page URL, opened within the playlist
    pub external_url: String,
    pub published_at: DateTime<Utc>,
    pub thumbnails: Vec<Thumbnail>,
}

impl Video {
    /// Build the embed URL of a video
    pub fn embed_url_for(id: &str) -> String {
        format!("{}/{}?autoplay=1", EMBED_BASE_URL, id)
    }

    /// Build the watch URL of a video within a playlist
    pub fn external_url_for(id: &str, playlist_id: &str) -> String {
        format!("{}?v={}&list={}", WATCH_BASE_URL, id, playlist_id)
    }

    /// Get a thumbnail by quality
    pub fn thumbnail(&self, quality: ThumbnailQuality) -> Option<&Thumbnail> {
        self.thumbnails.iter().find(|t| t.quality == quality)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn test_raw_item_requires_video_id() {
        let ok = RawItem::from_value(json!({
            "snippet": { "title": "Hello", "resourceId": { "videoId": "abc" } }
        }))
        .unwrap();
        assert_eq!(ok.video_id(), "abc");
        assert_eq!(ok.title(), Some("Hello"));

        let missing = RawItem::from_value(json!({ "snippet": { "title": "Hello" } }));
        assert!(missing.is_err());
    }

    #[test]
    fn test_raw_item_ignores_non_string_title() {
        let item = RawItem::from_value(json!({
            "snippet": { "title": 42, "resourceId": { "videoId": "abc" } }
        }))
        .unwrap();
        assert_eq!(item.title(), None);
    }

    #[test]
    fn test_page_without_items_is_rejected() {
        let result = serde_json::from_value::<PlaylistPage>(json!({ "nextPageToken": "x" }));
        assert!(result.is_err());
    }

    #[test]
    fn test_page_cursor() {
        let page: PlaylistPage = serde_json::from_value(json!({
            "kind": "youtube#playlistItemListResponse",
            "nextPageToken": "CDIQAA",
            "pageInfo": { "totalResults": 60, "resultsPerPage": 50 },
            "items": []
        }))
        .unwrap();
        assert!(page.has_next());
        assert_eq!(page.next_page_token.as_deref(), Some("CDIQAA"));
        assert!(page.prev_page_token.is_none());
    }

    #[test]
    fn test_parse_timestamp() {
        let expected = Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap();
        assert_eq!(parse_timestamp("2024-03-01T12:30:00Z"), Some(expected));
        assert_eq!(parse_timestamp("2024-03-01T14:30:00+02:00"), Some(expected));
        assert_eq!(parse_timestamp("2024-03-01T12:30:00"), Some(expected));
        assert_eq!(
            parse_timestamp("2024-03-01"),
            Some(Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap())
        );
        assert_eq!(parse_timestamp("yesterday"), None);
    }

    #[test]
    fn test_content_details_accepts_epoch_millis() {
        let details: ContentDetails =
            serde_json::from_value(json!({ "videoPublishedAt": 1_700_000_000_000i64 })).unwrap();
        assert_eq!(details.video_published_at.timestamp(), 1_700_000_000);
    }

    #[test]
    fn test_thumbnails_into_list_drops_absent_variants() {
        let thumbnails: Thumbnails = serde_json::from_value(json!({
            "default": { "url": "d.jpg", "width": 120, "height": 90 },
            "high": { "url": "h.jpg", "width": 480, "height": 360 },
            "maxres": { "url": "m.jpg", "width": 1280, "height": 720 }
        }))
        .unwrap();

        let qualities: Vec<_> = thumbnails.into_list().iter().map(|t| t.quality).collect();
        assert_eq!(qualities, vec![ThumbnailQuality::Default, ThumbnailQuality::High]);
    }

    #[test]
    fn test_thumbnail_size_accepts_float_dimensions() {
        let size: ThumbnailSize =
            serde_json::from_value(json!({ "url": "d.jpg", "width": 120.0, "height": 89.6 }))
                .unwrap();
        assert_eq!((size.width, size.height), (120, 90));

        let negative =
            serde_json::from_value::<ThumbnailSize>(json!({ "url": "d.jpg", "width": -1, "height": 90 }));
        assert!(negative.is_err());
    }

    #[test]
    fn test_url_builders() {
        assert_eq!(
            Video::embed_url_for("dQw4w9WgXcQ"),
            "https://www.youtube-nocookie.com/embed/dQw4w9WgXcQ?autoplay=1"
        );
        assert_eq!(
            Video::external_url_for("dQw4w9WgXcQ", "PL123"),
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ&list=PL123"
        );
    }

    #[test]
    fn test_video_serializes_camel_case() {
        let video = Video {
            id: "abc".into(),
            title: "t".into(),
            description: "d".into(),
            embed_url: Video::embed_url_for("abc"),
            external_url: Video::external_url_for("abc", "PL"),
            published_at: Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap(),
            thumbnails: vec![Thumbnail {
                quality: ThumbnailQuality::Default,
                url: "d.jpg".into(),
                width: 120,
                height: 90,
            }],
        };

        let json = serde_json::to_value(&video).unwrap();
        assert_eq!(json["embedUrl"], "https://www.youtube-nocookie.com/embed/abc?autoplay=1");
        assert_eq!(json["externalUrl"], "https://www.youtube.com/watch?v=abc&list=PL");
        assert_eq!(json["publishedAt"], "2024-01-02T03:04:05Z");
        assert_eq!(json["thumbnails"][0]["quality"], "default");
    }
}
