//! services/api/src/web/videos.rs
//!
//! Playlist preview, idempotent bulk video import, per-user catalog
//! listing, and partial video-progress updates.

use axum::{
    extract::{Query, State},
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

use skill_tracker_core::domain::{PlaylistVideo, VideoProgressUpdate, VideoWithProgress};

use crate::error::{ApiError, ApiResult};
use crate::web::state::AppState;

//=========================================================================================
// Request/Response Types
//=========================================================================================

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistQuery {
    pub playlist_id: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistResponse {
    pub playlist_id: String,
    pub videos: Vec<PlaylistVideo>,
}

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VideoPayload {
    pub video_id: String,
    pub title: String,
    #[serde(default)]
    pub thumbnail: String,
}

impl From<VideoPayload> for PlaylistVideo {
    fn from(v: VideoPayload) -> Self {
        PlaylistVideo {
            video_id: v.video_id,
            title: v.title,
            thumbnail: v.thumbnail,
        }
    }
}

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SaveVideosRequest {
    pub playlist_id: String,
    pub videos: Vec<VideoPayload>,
}

#[derive(Serialize, ToSchema)]
pub struct SaveVideosResponse {
    pub message: String,
    pub inserted: u64,
}

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VideoProgressRequest {
    pub video_id: String,
    pub playlist_id: Option<String>,
    pub progress: Option<i32>,
    pub completed: Option<bool>,
    pub quiz_mark: Option<i32>,
}

//=========================================================================================
// Handlers
//=========================================================================================

/// GET /api/youtube/playlist?playlistId= - Preview a playlist
///
/// Fetches the playlist directly from the video host without touching the
/// store; the client calls save-videos separately to import it.
#[utoipa::path(
    get,
    path = "/api/youtube/playlist",
    params(("playlistId" = String, Query, description = "The playlist id")),
    responses(
        (status = 200, description = "Videos of the playlist"),
        (status = 400, description = "Playlist id missing")
    )
)]
pub async fn playlist_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PlaylistQuery>,
) -> ApiResult<Json<PlaylistResponse>> {
    let playlist_id = query
        .playlist_id
        .filter(|p| !p.is_empty())
        .ok_or_else(|| ApiError::MissingInput("playlistId is required".to_string()))?;

    let videos = state.youtube.fetch_playlist_videos(&playlist_id).await?;

    Ok(Json(PlaylistResponse {
        playlist_id,
        videos,
    }))
}

/// POST /api/youtube/save-videos - Import playlist videos
///
/// Idempotent: rows are keyed on (user, video) and only missing ones are
/// inserted, so a repeated import never duplicates.
#[utoipa::path(
    post,
    path = "/api/youtube/save-videos",
    request_body = SaveVideosRequest,
    responses(
        (status = 200, description = "Videos saved", body = SaveVideosResponse),
        (status = 400, description = "Missing playlist id or videos"),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_token" = []))
)]
pub async fn save_videos_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Json(req): Json<SaveVideosRequest>,
) -> ApiResult<Json<SaveVideosResponse>> {
    if req.playlist_id.is_empty() {
        return Err(ApiError::MissingInput("playlistId is required".to_string()));
    }

    let videos: Vec<PlaylistVideo> = req.videos.into_iter().map(Into::into).collect();
    let inserted = state
        .db
        .insert_videos_if_absent(user_id, &req.playlist_id, &videos)
        .await?;

    Ok(Json(SaveVideosResponse {
        message: "Playlist videos saved".to_string(),
        inserted,
    }))
}

/// GET /api/youtube/user-videos?playlistId= - Catalog joined with progress
#[utoipa::path(
    get,
    path = "/api/youtube/user-videos",
    params(("playlistId" = String, Query, description = "The playlist id")),
    responses(
        (status = 200, description = "Videos with per-user progress, in insertion order"),
        (status = 400, description = "Playlist id missing"),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_token" = []))
)]
pub async fn user_videos_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Query(query): Query<PlaylistQuery>,
) -> ApiResult<Json<Vec<VideoWithProgress>>> {
    let playlist_id = query
        .playlist_id
        .filter(|p| !p.is_empty())
        .ok_or_else(|| ApiError::MissingInput("playlistId is required".to_string()))?;

    let videos = state.db.list_user_videos(user_id, &playlist_id).await?;
    Ok(Json(videos))
}

/// POST /api/user/video-progress - Partial update of one progress row
///
/// Omitted fields leave the stored value untouched; the row is created
/// lazily on the first report.
#[utoipa::path(
    post,
    path = "/api/user/video-progress",
    request_body = VideoProgressRequest,
    responses(
        (status = 200, description = "Progress saved"),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_token" = []))
)]
pub async fn video_progress_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Json(req): Json<VideoProgressRequest>,
) -> ApiResult<Json<serde_json::Value>> {
    if req.video_id.is_empty() {
        return Err(ApiError::MissingInput("videoId is required".to_string()));
    }

    let update = VideoProgressUpdate {
        video_id: req.video_id,
        playlist_id: req.playlist_id,
        progress: req.progress,
        completed: req.completed,
        quiz_mark: req.quiz_mark,
    };
    state.db.save_video_progress(user_id, &update).await?;

    Ok(Json(serde_json::json!({ "message": "Saved" })))
}
