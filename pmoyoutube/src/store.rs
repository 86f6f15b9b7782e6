//! Stores for the streaming variant of the loader
//!
//! [`PlaylistLoader::load_into`](crate::PlaylistLoader::load_into) hands every
//! video to a [`VideoStore`] as soon as its page is parsed, instead of
//! buffering and sorting the whole playlist.

use crate::models::Video;
use indexmap::IndexMap;

/// Destination of loaded videos, keyed by video id
pub trait VideoStore {
    /// Register a video; a previous record with the same id is replaced
    fn set(&mut self, video: Video);
}

/// In-memory store keeping first-insertion order
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    videos: IndexMap<String, Video>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &str) -> Option<&Video> {
        self.videos.get(id)
    }

    pub fn len(&self) -> usize {
        self.videos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.videos.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Video> {
        self.videos.values()
    }

    /// Consume the store, most recent video first
    pub fn into_sorted(self) -> Vec<Video> {
        let mut videos: Vec<Video> = self.videos.into_values().collect();
        videos.sort_by(|a, b| b.published_at.cmp(&a.published_at));
        videos
    }
}

impl VideoStore for MemoryStore {
    fn set(&mut self, video: Video) {
        self.videos.insert(video.id.clone(), video);
    }
}

impl VideoStore for Vec<Video> {
    fn set(&mut self, video: Video) {
        self.push(video);
    }
}
