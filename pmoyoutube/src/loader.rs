//! Playlist loader
//!
//! Walks the playlist page by page, classifies every entry and turns the
//! valid ones into [`Video`] records.
//!
//! - Pages are fetched one after the other, never concurrently.
//! - A malformed page aborts the whole load; nothing partial is returned.
//! - Deleted and private placeholders are dropped silently.
//! - An entry that fails the video schema is skipped with a warning.
//! - Past [`PAGE_WARNING_THRESHOLD`] pages a warning is logged for every
//!   further page, but the cursor is still followed.

use crate::client::MAX_RESULTS;
use crate::entry::PlaylistEntry;
use crate::error::Result;
use crate::models::{PlaylistPage, RawItem, Video};
use crate::store::VideoStore;
use async_trait::async_trait;
use tracing::{debug, info, warn};

/// Number of pages after which a pagination loop is suspected
///
/// 100 pages of 50 entries is 5000 videos.
pub const PAGE_WARNING_THRESHOLD: usize = 100;

/// Source of playlist pages
///
/// Implemented by [`YouTubeClient`](crate::YouTubeClient) over HTTP.
#[async_trait]
pub trait PageSource: Send + Sync {
    /// Fetch one page; `page_token` is `None` for the first page
    async fn fetch_page(&self, page_token: Option<&str>) -> Result<PlaylistPage>;

    /// Playlist the pages belong to
    fn playlist_id(&self) -> &str;
}

/// An entry dropped because it matched none of the known shapes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedItem {
    pub video_id: String,
    pub reason: String,
}

/// Counters collected during one load
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    /// Pages fetched
    pub pages: usize,
    /// Raw entries received over all pages
    pub items: usize,
    /// Videos kept
    pub videos: usize,
    /// Deleted placeholders dropped
    pub deleted: usize,
    /// Private placeholders dropped
    pub private: usize,
    /// Entries skipped as invalid
    pub skipped: Vec<SkippedItem>,
    /// Pagination-loop warnings emitted
    pub loop_warnings: usize,
}

impl LoadReport {
    /// Whether the pagination-loop warning fired at least once
    pub fn loop_suspected(&self) -> bool {
        self.loop_warnings > 0
    }
}

/// Loads a whole playlist from a [`PageSource`]
pub struct PlaylistLoader<S> {
    source: S,
}

impl<S: PageSource> PlaylistLoader<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    /// Get the underlying page source
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Load the playlist, most recent video first
    pub async fn load(&self) -> Result<Vec<Video>> {
        let (videos, _) = self.load_with_report().await?;
        Ok(videos)
    }

    /// Load the playlist and return the load counters alongside the videos
    ///
    /// Videos are sorted by publication date, most recent first. The sort is
    /// stable: videos published at the same instant keep their playlist order.
    pub async fn load_with_report(&self) -> Result<(Vec<Video>, LoadReport)> {
        let mut videos = Vec::new();
        let report = self.walk(|video| videos.push(video)).await?;

        videos.sort_by(|a, b| b.published_at.cmp(&a.published_at));

        Ok((videos, report))
    }

    /// Load the playlist into a caller-provided store, keyed by video id
    ///
    /// Videos are registered as soon as their page has been parsed. If the
    /// load fails halfway, the store keeps what was registered before.
    pub async fn load_into<T: VideoStore>(&self, store: &mut T) -> Result<LoadReport> {
        self.walk(|video| store.set(video)).await
    }

    async fn walk<F>(&self, mut emit: F) -> Result<LoadReport>
    where
        F: FnMut(Video),
    {
        let playlist_id = self.source.playlist_id();
        let mut report = LoadReport::default();
        let mut page_token: Option<String> = None;

        loop {
            if report.pages >= PAGE_WARNING_THRESHOLD {
                let next_page = report.pages + 1;
                report.loop_warnings += 1;
                warn!(
                    playlist = %playlist_id,
                    page = next_page,
                    "Playlist contains over {} entries. Possible pagination loop detected.",
                    PAGE_WARNING_THRESHOLD * MAX_RESULTS as usize
                );
            }

            let page = self.source.fetch_page(page_token.as_deref()).await?;
            report.pages += 1;
            report.items += page.items.len();

            for item in page.items {
                if let Some(video) = Self::accept(item, playlist_id, &mut report) {
                    report.videos += 1;
                    emit(video);
                }
            }

            match page.next_page_token {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        info!(
            playlist = %playlist_id,
            pages = report.pages,
            videos = report.videos,
            deleted = report.deleted,
            private = report.private,
            skipped = report.skipped.len(),
            "Playlist loaded"
        );

        Ok(report)
    }

    fn accept(item: RawItem, playlist_id: &str, report: &mut LoadReport) -> Option<Video> {
        match PlaylistEntry::classify(item) {
            Ok(PlaylistEntry::Video(item)) => Some((*item).into_video(playlist_id)),
            Ok(PlaylistEntry::Deleted { video_id }) => {
                debug!(video_id = %video_id, "Dropping deleted video");
                report.deleted += 1;
                None
            }
            Ok(PlaylistEntry::Private { video_id }) => {
                debug!(video_id = %video_id, "Dropping private video");
                report.private += 1;
                None
            }
            Err(invalid) => {
                warn!("Skipped video {}. {}", invalid.video_id, invalid.source);
                report.skipped.push(SkippedItem {
                    video_id: invalid.video_id,
                    reason: invalid.source.to_string(),
                });
                None
            }
        }
    }
}
