//! services/api/src/adapters/youtube.rs
//!
//! Adapter for the YouTube Data API (playlist items). Implements the
//! `YouTubeService` port from the `core` crate.
//!
//! Playlist-id extraction happens before any network call; upstream
//! failure yields an empty video list, which the connect flow treats as a
//! valid (zero-video) import.

use async_trait::async_trait;
use regex::Regex;
use serde::Deserialize;
use tracing::warn;

use skill_tracker_core::{
    domain::PlaylistVideo,
    ports::{PortResult, YouTubeService},
};

/// Pagination guard: 10 pages of 50 items bounds one import at 500 videos.
const MAX_PAGES: usize = 10;

/// Resolves the raw connect value to a playlist id. Accepts either a bare
/// id with the reserved `PL` prefix or any URL carrying a `list=` query
/// parameter; everything else is rejected before any network call.
pub fn extract_playlist_id(raw: &str) -> Option<String> {
    let re = Regex::new(r"[?&]list=([^&]+)").ok()?;
    if let Some(captures) = re.captures(raw) {
        return captures.get(1).map(|m| m.as_str().to_string());
    }
    if raw.starts_with("PL") {
        return Some(raw.to_string());
    }
    None
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlaylistItemsPage {
    #[serde(default)]
    items: Vec<PlaylistItem>,
    next_page_token: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlaylistItem {
    snippet: Snippet,
    content_details: ContentDetails,
}

#[derive(Deserialize)]
struct Snippet {
    title: String,
    thumbnails: Option<Thumbnails>,
}

#[derive(Deserialize)]
struct Thumbnails {
    medium: Option<Thumbnail>,
    default: Option<Thumbnail>,
}

#[derive(Deserialize)]
struct Thumbnail {
    url: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ContentDetails {
    video_id: String,
}

/// Prefers the medium-resolution thumbnail, falling back to default, then
/// to an empty string when the video has none at all.
fn pick_thumbnail(thumbnails: Option<Thumbnails>) -> String {
    thumbnails
        .and_then(|t| t.medium.or(t.default))
        .map(|t| t.url)
        .unwrap_or_default()
}

/// An adapter that implements `YouTubeService` over the Data API v3.
#[derive(Clone)]
pub struct YouTubeAdapter {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl YouTubeAdapter {
    pub fn new(client: reqwest::Client, base_url: String, api_key: Option<String>) -> Self {
        Self {
            client,
            base_url,
            api_key,
        }
    }

    async fn fetch_page(
        &self,
        playlist_id: &str,
        api_key: &str,
        page_token: Option<&str>,
    ) -> Result<PlaylistItemsPage, reqwest::Error> {
        let mut request = self
            .client
            .get(format!("{}/playlistItems", self.base_url))
            .query(&[
                ("part", "snippet,contentDetails"),
                ("playlistId", playlist_id),
                ("maxResults", "50"),
                ("key", api_key),
            ]);
        if let Some(token) = page_token {
            request = request.query(&[("pageToken", token)]);
        }
        request
            .send()
            .await
            .and_then(|r| r.error_for_status())?
            .json::<PlaylistItemsPage>()
            .await
    }
}

#[async_trait]
impl YouTubeService for YouTubeAdapter {
    async fn fetch_playlist_videos(&self, playlist_id: &str) -> PortResult<Vec<PlaylistVideo>> {
        let Some(api_key) = self.api_key.as_deref() else {
            warn!("no YouTube API key configured; returning empty playlist");
            return Ok(Vec::new());
        };

        let mut videos = Vec::new();
        let mut page_token: Option<String> = None;

        for _ in 0..MAX_PAGES {
            let page = match self
                .fetch_page(playlist_id, api_key, page_token.as_deref())
                .await
            {
                Ok(page) => page,
                Err(e) => {
                    // An import that fails mid-pagination keeps what it has;
                    // a retry fills in the rest.
                    warn!(playlist_id, error = %e, "YouTube playlist fetch failed");
                    break;
                }
            };

            videos.extend(page.items.into_iter().map(|item| PlaylistVideo {
                video_id: item.content_details.video_id,
                title: item.snippet.title,
                thumbnail: pick_thumbnail(item.snippet.thumbnails),
            }));

            page_token = page.next_page_token;
            if page_token.is_none() {
                break;
            }
        }

        Ok(videos)
    }
}
