//! YouTube playlist loader for PMOMusic
//!
//! This crate reads a YouTube playlist through the Data API v3 and turns it
//! into an ordered list of [`Video`] records that a static site build can
//! consume directly.
//!
//! # Features
//!
//! - **Pagination**: follows `nextPageToken` until the playlist is exhausted,
//!   one request at a time
//! - **Validation**: every entry is checked against the video schema; deleted
//!   and private placeholders are dropped, malformed entries skipped with a
//!   warning
//! - **Normalization**: embed/watch URLs, UTC publication date, flattened
//!   thumbnail list
//! - **Ordering**: most recent video first
//! - **Streaming**: [`PlaylistLoader::load_into`] registers videos in a
//!   [`VideoStore`] as pages arrive
//!
//! # Example
//!
//! ```no_run
//! use pmoyoutube::{PlaylistLoader, YouTubeConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Reads YOUTUBE_API_KEY and YOUTUBE_PLAYLIST_ID
//!     let config = YouTubeConfig::load(None)?;
//!     let loader = PlaylistLoader::new(config.client()?);
//!
//!     for video in loader.load().await? {
//!         println!("{} {} {}", video.published_at, video.id, video.title);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # API quota
//!
//! Each page costs one quota unit and holds at most 50 entries. Loading is
//! never retried; a failed request fails the whole load.

pub mod client;
pub mod config;
pub mod entry;
pub mod error;
pub mod loader;
pub mod models;
pub mod store;

// Re-exports
pub use client::{ClientBuilder, YouTubeClient};
pub use config::YouTubeConfig;
pub use entry::{PlaylistEntry, DELETED_VIDEO_TITLE, PRIVATE_VIDEO_TITLE};
pub use error::{Error, Result};
pub use loader::{LoadReport, PageSource, PlaylistLoader, SkippedItem, PAGE_WARNING_THRESHOLD};
pub use models::{PlaylistPage, RawItem, Thumbnail, ThumbnailQuality, Video};
pub use store::{MemoryStore, VideoStore};
