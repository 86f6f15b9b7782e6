//! Classification of raw playlist entries
//!
//! YouTube keeps removed videos in a playlist as placeholders: their title is
//! replaced by a fixed string and most of the metadata is missing. The title
//! is therefore checked first, and only the remaining entries go through the
//! full video schema.

use crate::models::{RawItem, Video, VideoItem};
use serde::de::Error as _;

/// Title used by the API for deleted videos
pub const DELETED_VIDEO_TITLE: &str = "Deleted video";

/// Title used by the API for private videos
pub const PRIVATE_VIDEO_TITLE: &str = "Private video";

/// A classified playlist entry
#[derive(Debug, Clone)]
pub enum PlaylistEntry {
    /// Placeholder left by a deleted video
    Deleted { video_id: String },
    /// Placeholder left by a private video
    Private { video_id: String },
    /// A real, fully validated video
    Video(Box<VideoItem>),
}

/// An entry that matched none of the known shapes
#[derive(Debug, thiserror::Error)]
#[error("video {video_id} does not match the video schema: {source}")]
pub struct InvalidEntry {
    pub video_id: String,
    #[source]
    pub source: serde_json::Error,
}

impl PlaylistEntry {
    /// Classify a raw entry; first match wins
    pub fn classify(item: RawItem) -> Result<Self, InvalidEntry> {
        match item.title() {
            Some(DELETED_VIDEO_TITLE) => {
                return Ok(PlaylistEntry::Deleted {
                    video_id: item.video_id().to_string(),
                })
            }
            Some(PRIVATE_VIDEO_TITLE) => {
                return Ok(PlaylistEntry::Private {
                    video_id: item.video_id().to_string(),
                })
            }
            _ => {}
        }

        let video_id = item.video_id().to_string();
        if video_id.trim().is_empty() {
            return Err(InvalidEntry {
                video_id,
                source: serde_json::Error::custom("empty videoId"),
            });
        }

        serde_json::from_value::<VideoItem>(item.into_value())
            .map(|video| PlaylistEntry::Video(Box::new(video)))
            .map_err(|source| InvalidEntry { video_id, source })
    }

    pub fn video_id(&self) -> &str {
        match self {
            PlaylistEntry::Deleted { video_id } | PlaylistEntry::Private { video_id } => video_id,
            PlaylistEntry::Video(item) => &item.snippet.resource_id.video_id,
        }
    }

    /// Whether this entry stands for an unavailable video
    pub fn is_placeholder(&self) -> bool {
        !matches!(self, PlaylistEntry::Video(_))
    }
}

impl VideoItem {
    /// Normalize a validated entry into the output shape
    pub fn into_video(self, playlist_id: &str) -> Video {
        let snippet = self.snippet;
        let id = snippet.resource_id.video_id;

        Video {
            embed_url: Video::embed_url_for(&id),
            external_url: Video::external_url_for(&id, playlist_id),
            title: snippet.title,
            description: snippet.description,
            published_at: self.content_details.video_published_at,
            thumbnails: snippet.thumbnails.into_list(),
            id,
        }
    }
}
