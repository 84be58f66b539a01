//! services/api/src/web/dashboard.rs
//!
//! The derived read models: the authenticated dashboard aggregation and
//! the token-keyed public share view. Both are pure reads assembled from
//! the per-platform rows plus the video/skill/certificate tables.

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

use skill_tracker_core::domain::{
    progress_percent, Certificate, PlatformConnection, PlatformKind, Skill,
};

use crate::error::{ApiError, ApiResult};
use crate::web::state::AppState;

//=========================================================================================
// Response Types
//=========================================================================================

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizStats {
    /// One quiz per catalog video.
    pub total: i64,
    pub completed: i64,
    /// Average of the non-null quiz marks, one decimal; 0 when no quiz has
    /// been taken.
    pub average_score: f64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct YoutubeSummary {
    pub connected: bool,
    pub progress: i32,
    pub completed: i64,
    pub total: i64,
    pub playlist_id: Option<String>,
    pub quiz_stats: QuizStats,
    pub certificate: Option<Certificate>,
}

impl YoutubeSummary {
    fn disconnected() -> Self {
        Self {
            connected: false,
            progress: 0,
            completed: 0,
            total: 0,
            playlist_id: None,
            quiz_stats: QuizStats {
                total: 0,
                completed: 0,
                average_score: 0.0,
            },
            certificate: None,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardResponse {
    pub platforms: Vec<PlatformConnection>,
    pub user_pic: Option<String>,
    pub youtube: YoutubeSummary,
    pub skills: Vec<Skill>,
}

/// The restricted projection exposed through a share token.
#[derive(Serialize)]
pub struct PublicProfileFields {
    pub full_name: Option<String>,
    pub job_title: Option<String>,
    pub bio: Option<String>,
    pub profile_pic: Option<String>,
}

#[derive(Serialize)]
pub struct PublicYoutubeSummary {
    pub connected: bool,
    pub total: i64,
    pub completed: i64,
    pub progress: i32,
}

#[derive(Serialize)]
pub struct PublicProfileResponse {
    pub profile: PublicProfileFields,
    pub platforms: Vec<PlatformConnection>,
    pub youtube: PublicYoutubeSummary,
    pub skills: Vec<Skill>,
}

//=========================================================================================
// Handlers
//=========================================================================================

/// GET /api/dashboard/stats - Consolidated dashboard read model
///
/// Tolerates a user with zero connections: every derived field defaults to
/// empty/zero/false.
#[utoipa::path(
    get,
    path = "/api/dashboard/stats",
    responses(
        (status = 200, description = "Aggregated dashboard stats"),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Store failure")
    ),
    security(("bearer_token" = []))
)]
pub async fn dashboard_stats_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
) -> ApiResult<Json<DashboardResponse>> {
    let platforms = state.db.list_platform_connections(user_id).await?;

    let youtube = match find_playlist(&platforms) {
        Some(playlist_id) => youtube_summary(&state, user_id, playlist_id).await?,
        None => YoutubeSummary::disconnected(),
    };

    let skills = state.db.list_skills(user_id).await?;
    let user_pic = state
        .db
        .get_profile(user_id)
        .await?
        .and_then(|p| p.profile_pic);

    Ok(Json(DashboardResponse {
        platforms,
        user_pic,
        youtube,
        skills,
    }))
}

/// GET /api/public/profile/{token} - Public share view
#[utoipa::path(
    get,
    path = "/api/public/profile/{token}",
    params(("token" = String, Path, description = "Opaque share token")),
    responses(
        (status = 200, description = "Public projection of the profile"),
        (status = 404, description = "Unknown or expired token"),
        (status = 500, description = "Store failure")
    )
)]
pub async fn public_profile_handler(
    State(state): State<Arc<AppState>>,
    Path(token): Path<String>,
) -> ApiResult<Json<PublicProfileResponse>> {
    let (user_id, profile) = state
        .db
        .resolve_share_token(&token)
        .await?
        .ok_or_else(|| ApiError::NotFound("Profile not found or link expired".to_string()))?;

    let platforms = state.db.list_platform_connections(user_id).await?;

    let youtube = match find_playlist(&platforms) {
        Some(playlist_id) => {
            let totals = state.db.video_totals(user_id, playlist_id).await?;
            PublicYoutubeSummary {
                connected: true,
                total: totals.total,
                completed: totals.completed,
                progress: progress_percent(totals.completed, totals.total),
            }
        }
        None => PublicYoutubeSummary {
            connected: false,
            total: 0,
            completed: 0,
            progress: 0,
        },
    };

    let skills = state.db.list_skills(user_id).await?;

    Ok(Json(PublicProfileResponse {
        profile: PublicProfileFields {
            full_name: profile.full_name,
            job_title: profile.job_title,
            bio: profile.bio,
            profile_pic: profile.profile_pic,
        },
        platforms,
        youtube,
        skills,
    }))
}

//=========================================================================================
// Aggregation Helpers
//=========================================================================================

/// The video-host connection stores the playlist id as its handle.
fn find_playlist(platforms: &[PlatformConnection]) -> Option<&str> {
    platforms
        .iter()
        .find(|p| p.platform == PlatformKind::Youtube)
        .map(|p| p.username.as_str())
}

async fn youtube_summary(
    state: &AppState,
    user_id: Uuid,
    playlist_id: &str,
) -> ApiResult<YoutubeSummary> {
    let totals = state.db.video_totals(user_id, playlist_id).await?;
    let quiz = state.db.quiz_aggregate(user_id, playlist_id).await?;
    let certificate = state.db.latest_certificate(user_id, playlist_id).await?;

    Ok(YoutubeSummary {
        connected: true,
        progress: progress_percent(totals.completed, totals.total),
        completed: totals.completed,
        total: totals.total,
        playlist_id: Some(playlist_id.to_string()),
        quiz_stats: QuizStats {
            total: totals.total,
            completed: quiz.completed,
            average_score: quiz.average.map(round1).unwrap_or(0.0),
        },
        certificate,
    })
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::test_state;
    use crate::web::platforms::{connect_platform_handler, ConnectRequest};
    use skill_tracker_core::domain::VideoProgressUpdate;

    async fn connect_youtube(state: &Arc<AppState>, user_id: Uuid) {
        connect_platform_handler(
            State(state.clone()),
            Extension(user_id),
            Json(ConnectRequest {
                platform: "youtube".to_string(),
                value: Some("PL123".to_string()),
                username: None,
            }),
        )
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn zero_connections_yield_the_default_read_model() {
        let state = test_state();
        let response = dashboard_stats_handler(State(state), Extension(Uuid::new_v4()))
            .await
            .unwrap();

        assert!(response.0.platforms.is_empty());
        assert!(response.0.skills.is_empty());
        assert!(!response.0.youtube.connected);
        assert_eq!(response.0.youtube.progress, 0);
        assert_eq!(response.0.youtube.total, 0);
        assert!(response.0.youtube.certificate.is_none());
    }

    #[tokio::test]
    async fn progress_is_rounded_and_quiz_marks_averaged() {
        let state = test_state();
        let user_id = Uuid::new_v4();
        connect_youtube(&state, user_id).await;

        // 1 of 3 videos completed, two quiz marks 80 and 85.
        state
            .db
            .save_video_progress(
                user_id,
                &VideoProgressUpdate {
                    video_id: "v1".to_string(),
                    playlist_id: Some("PL123".to_string()),
                    progress: Some(100),
                    completed: Some(true),
                    quiz_mark: Some(80),
                },
            )
            .await
            .unwrap();
        state
            .db
            .save_video_progress(
                user_id,
                &VideoProgressUpdate {
                    video_id: "v2".to_string(),
                    playlist_id: Some("PL123".to_string()),
                    progress: Some(40),
                    completed: None,
                    quiz_mark: Some(85),
                },
            )
            .await
            .unwrap();

        let response = dashboard_stats_handler(State(state), Extension(user_id))
            .await
            .unwrap();
        let yt = &response.0.youtube;

        assert!(yt.connected);
        assert_eq!(yt.total, 3);
        assert_eq!(yt.completed, 1);
        assert_eq!(yt.progress, 33);
        assert_eq!(yt.quiz_stats.completed, 2);
        assert_eq!(yt.quiz_stats.average_score, 82.5);
    }

    #[tokio::test]
    async fn unknown_share_token_is_not_found() {
        let state = test_state();
        let result =
            public_profile_handler(State(state), Path("deadbeef".to_string())).await;
        assert!(matches!(result, Err(ApiError::NotFound(_))));
    }

    #[tokio::test]
    async fn share_view_projects_only_public_fields() {
        let state = test_state();
        let user_id = Uuid::new_v4();
        connect_youtube(&state, user_id).await;

        state
            .db
            .upsert_profile(
                user_id,
                &skill_tracker_core::domain::Profile {
                    full_name: Some("Ada Lovelace".to_string()),
                    bio: Some("learning".to_string()),
                    job_title: None,
                    profile_pic: None,
                    share_token: None,
                },
            )
            .await
            .unwrap();
        state.db.set_share_token(user_id, "tok123").await.unwrap();

        let response = public_profile_handler(State(state), Path("tok123".to_string()))
            .await
            .unwrap();
        assert_eq!(response.0.profile.full_name.as_deref(), Some("Ada Lovelace"));
        assert!(response.0.youtube.connected);
        assert_eq!(response.0.youtube.total, 3);
    }
}
