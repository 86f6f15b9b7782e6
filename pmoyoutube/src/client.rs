//! HTTP client for the YouTube Data API `playlistItems` endpoint
//!
//! # Example
//!
//! ```no_run
//! use pmoyoutube::YouTubeClient;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = YouTubeClient::builder()
//!         .api_key("AIza...")
//!         .playlist_id("PLxxxxxxxx")
//!         .build()?;
//!
//!     let page = client.playlist_page(None).await?;
//!     println!("{} items, more: {}", page.items.len(), page.has_next());
//!     Ok(())
//! }
//! ```

use crate::error::{Error, Result};
use crate::loader::PageSource;
use crate::models::PlaylistPage;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

/// Default YouTube Data API base URL
pub const DEFAULT_API_BASE: &str = "https://www.googleapis.com/youtube/v3";

/// Page size requested from the API (maximum allowed)
pub const MAX_RESULTS: u32 = 50;

/// Default timeout for HTTP requests (30 seconds)
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Default User-Agent
pub const DEFAULT_USER_AGENT: &str = "pmoyoutube/0.1.0";

/// YouTube playlist HTTP client
///
/// Bound to a single playlist and API key. The client is stateless: the
/// continuation cursor is passed on every call and owned by the caller.
#[derive(Clone)]
pub struct YouTubeClient {
    client: Client,
    api_base: String,
    api_key: String,
    playlist_id: String,
    timeout: Duration,
}

impl std::fmt::Debug for YouTubeClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("YouTubeClient")
            .field("api_base", &self.api_base)
            .field("api_key", &"<redacted>")
            .field("playlist_id", &self.playlist_id)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl YouTubeClient {
    /// Create a builder for configuring the client
    pub fn builder() -> ClientBuilder {
        ClientBuilder::default()
    }

    /// Get the API base URL
    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    /// Get the playlist this client reads
    pub fn playlist_id(&self) -> &str {
        &self.playlist_id
    }

    /// Build the request URL for one page
    pub fn page_url(&self, page_token: Option<&str>) -> Result<Url> {
        let mut url = Url::parse(&format!(
            "{}/playlistItems",
            self.api_base.trim_end_matches('/')
        ))?;

        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("part", "snippet")
                .append_pair("part", "contentDetails")
                .append_pair("playlistId", &self.playlist_id)
                .append_pair("key", &self.api_key)
                .append_pair("maxResults", &MAX_RESULTS.to_string());
            if let Some(token) = page_token {
                query.append_pair("pageToken", token);
            }
        }

        Ok(url)
    }

    /// Fetch and parse one page of the playlist
    ///
    /// `page_token` is the `nextPageToken` of the previous page, `None` for
    /// the first one.
    pub async fn playlist_page(&self, page_token: Option<&str>) -> Result<PlaylistPage> {
        let url = self.page_url(page_token)?;

        debug!(
            playlist = %self.playlist_id,
            page_token = page_token.unwrap_or("<first>"),
            "Fetching playlist page"
        );

        let response = self.client.get(url).timeout(self.timeout).send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("YouTube API error ({}): {}", status.as_u16(), body.trim());
            return Err(Error::from_status(status.as_u16(), &body));
        }

        let text = response.text().await?;
        let page: PlaylistPage = serde_json::from_str(&text).map_err(|e| {
            warn!("Failed to parse playlist page: {}", e);
            Error::Schema(e)
        })?;

        debug!(
            items = page.items.len(),
            has_next = page.has_next(),
            "Received playlist page"
        );

        Ok(page)
    }
}

#[async_trait]
impl PageSource for YouTubeClient {
    async fn fetch_page(&self, page_token: Option<&str>) -> Result<PlaylistPage> {
        self.playlist_page(page_token).await
    }

    fn playlist_id(&self) -> &str {
        &self.playlist_id
    }
}

/// Builder for configuring a YouTubeClient
#[derive(Debug)]
pub struct ClientBuilder {
    client: Option<Client>,
    api_base: String,
    api_key: Option<String>,
    playlist_id: Option<String>,
    timeout: Duration,
    user_agent: String,
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self {
            client: None,
            api_base: DEFAULT_API_BASE.to_string(),
            api_key: None,
            playlist_id: None,
            timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl ClientBuilder {
    /// Create a new builder with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a custom HTTP client
    pub fn client(mut self, client: Client) -> Self {
        self.client = Some(client);
        self
    }

    /// Set the API base URL
    pub fn api_base(mut self, url: impl Into<String>) -> Self {
        self.api_base = url.into();
        self
    }

    /// Set the API key
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Set the playlist to read
    pub fn playlist_id(mut self, id: impl Into<String>) -> Self {
        self.playlist_id = Some(id.into());
        self
    }

    /// Set the request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set a custom User-Agent header
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Build the client
    ///
    /// Fails if the API key or the playlist id is missing or blank.
    pub fn build(self) -> Result<YouTubeClient> {
        let api_key = non_blank(self.api_key).ok_or(Error::MissingSetting("api_key"))?;
        let playlist_id =
            non_blank(self.playlist_id).ok_or(Error::MissingSetting("playlist_id"))?;

        // Fail early on an unusable base URL
        Url::parse(&self.api_base)?;

        let client = match self.client {
            Some(client) => client,
            None => Client::builder()
                .user_agent(&self.user_agent)
                .timeout(self.timeout)
                .build()?,
        };

        Ok(YouTubeClient {
            client,
            api_base: self.api_base,
            api_key,
            playlist_id,
            timeout: self.timeout,
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
