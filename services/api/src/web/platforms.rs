//! services/api/src/web/platforms.rs
//!
//! The platform connection endpoint: resolves the submitted identifier,
//! dispatches to the matching platform adapter, and upserts the one
//! (user, platform) row with the normalized stats blob.

use axum::{extract::State, Extension, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;
use utoipa::ToSchema;
use uuid::Uuid;

use skill_tracker_core::domain::{PlatformKind, PlatformStats, YouTubeStats};
use skill_tracker_core::ports::PortError;

use crate::adapters::youtube::extract_playlist_id;
use crate::error::{ApiError, ApiResult};
use crate::web::state::AppState;

//=========================================================================================
// Request/Response Types
//=========================================================================================

#[derive(Deserialize, ToSchema)]
pub struct ConnectRequest {
    pub platform: String,
    /// The primary identifier field (username or playlist URL).
    pub value: Option<String>,
    /// Alternate identifier field some clients send instead of `value`.
    pub username: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct ConnectResponse {
    pub message: String,
    #[schema(value_type = Object)]
    pub stats: serde_json::Value,
}

#[derive(Deserialize, ToSchema)]
pub struct UpdateUdemyStatsRequest {
    #[schema(value_type = Object)]
    pub stats: serde_json::Value,
}

//=========================================================================================
// Handler
//=========================================================================================

/// POST /api/platform/connect - Connect a learning platform account
///
/// Fetches fresh stats from the platform and stores them. Reconnecting an
/// already-connected platform refreshes the stored stats in place.
#[utoipa::path(
    post,
    path = "/api/platform/connect",
    request_body = ConnectRequest,
    responses(
        (status = 200, description = "Platform connected", body = ConnectResponse),
        (status = 400, description = "Missing or invalid identifier"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Platform has no such user"),
        (status = 500, description = "Upstream or store failure")
    ),
    security(("bearer_token" = []))
)]
pub async fn connect_platform_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Json(req): Json<ConnectRequest>,
) -> ApiResult<Json<ConnectResponse>> {
    let platform: PlatformKind = req
        .platform
        .parse()
        .map_err(|e: String| ApiError::Port(PortError::InvalidInput(e)))?;

    let identifier = req
        .value
        .or(req.username)
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| ApiError::MissingInput("platform and value are required".to_string()))?;

    let (username, stats) = dispatch(&state, user_id, platform, &identifier).await?;

    let stats_value = stats
        .to_value()
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    // One atomic upsert; two concurrent connects for the same platform
    // converge on the last writer.
    state
        .db
        .upsert_platform_connection(user_id, platform, &username, &stats_value)
        .await?;

    info!(%user_id, %platform, "platform connected");

    Ok(Json(ConnectResponse {
        message: format!("{} connected", platform),
        stats: stats_value,
    }))
}

/// POST /api/udemy/update-stats - Hand-entered Udemy stats
///
/// When the profile scrape fails, the connect flow stores a manual-entry
/// sentinel; this endpoint lets the user replace it with their own numbers.
/// The submitted blob must parse as Udemy stats before it is stored.
#[utoipa::path(
    post,
    path = "/api/udemy/update-stats",
    request_body = UpdateUdemyStatsRequest,
    responses(
        (status = 200, description = "Stats updated"),
        (status = 400, description = "Blob does not match the Udemy stats shape"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Udemy is not connected"),
        (status = 500, description = "Store failure")
    ),
    security(("bearer_token" = []))
)]
pub async fn update_udemy_stats_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Json(req): Json<UpdateUdemyStatsRequest>,
) -> ApiResult<Json<serde_json::Value>> {
    let stats = PlatformStats::from_value(PlatformKind::Udemy, req.stats)
        .map_err(|e| ApiError::Port(PortError::InvalidInput(e.to_string())))?;
    let stats_value = stats
        .to_value()
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    // The stored username survives the update, so the row has to exist.
    let connection = state
        .db
        .list_platform_connections(user_id)
        .await?
        .into_iter()
        .find(|c| c.platform == PlatformKind::Udemy)
        .ok_or_else(|| ApiError::NotFound("udemy is not connected".to_string()))?;

    state
        .db
        .upsert_platform_connection(user_id, PlatformKind::Udemy, &connection.username, &stats_value)
        .await?;

    info!(%user_id, "udemy stats updated");

    Ok(Json(serde_json::json!({
        "message": "Udemy stats updated successfully"
    })))
}

/// Invokes the adapter for `platform` and returns the stored display
/// name/handle together with the normalized stats.
async fn dispatch(
    state: &AppState,
    user_id: Uuid,
    platform: PlatformKind,
    identifier: &str,
) -> ApiResult<(String, PlatformStats)> {
    match platform {
        PlatformKind::Leetcode => {
            let stats = state
                .leetcode
                .fetch_stats(identifier)
                .await?
                .ok_or_else(|| ApiError::NotFound("LeetCode user not found".to_string()))?;
            Ok((identifier.to_string(), PlatformStats::Leetcode(stats)))
        }
        PlatformKind::Hackerrank => {
            let stats = state.hackerrank.fetch_stats(identifier).await?;
            Ok((identifier.to_string(), PlatformStats::Hackerrank(stats)))
        }
        PlatformKind::Udemy => {
            let stats = state.udemy.fetch_profile(identifier).await?;
            Ok((identifier.to_string(), PlatformStats::Udemy(stats)))
        }
        PlatformKind::Coursera => {
            let stats = state.coursera.fetch_stats(identifier).await?;
            Ok((identifier.to_string(), PlatformStats::Coursera(stats)))
        }
        PlatformKind::Youtube => {
            let playlist_id = extract_playlist_id(identifier).ok_or_else(|| {
                ApiError::Port(PortError::InvalidInput(
                    "Invalid YouTube playlist URL".to_string(),
                ))
            })?;

            let videos = state.youtube.fetch_playlist_videos(&playlist_id).await?;

            // Catalog writes are not atomic with the connection upsert; a
            // retried connect fills in only the still-missing rows.
            state
                .db
                .insert_playlist_if_absent(
                    user_id,
                    &playlist_id,
                    &format!("Playlist {}", playlist_id),
                )
                .await?;
            state
                .db
                .insert_videos_if_absent(user_id, &playlist_id, &videos)
                .await?;

            let stats = YouTubeStats {
                video_count: videos.len(),
                playlist_id: playlist_id.clone(),
            };
            Ok((playlist_id, PlatformStats::Youtube(stats)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{test_state, test_state_with, FakeLeetCode, TestAdapters};
    use skill_tracker_core::domain::{LeetCodeStats, SubmitStats};

    fn connect_req(platform: &str, value: &str) -> ConnectRequest {
        ConnectRequest {
            platform: platform.to_string(),
            value: Some(value.to_string()),
            username: None,
        }
    }

    #[tokio::test]
    async fn connecting_twice_keeps_one_row_per_platform() {
        let state = test_state();
        let user_id = Uuid::new_v4();

        for _ in 0..2 {
            connect_platform_handler(
                State(state.clone()),
                Extension(user_id),
                Json(connect_req("hackerrank", "ada")),
            )
            .await
            .unwrap();
        }

        let connections = state.db.list_platform_connections(user_id).await.unwrap();
        assert_eq!(connections.len(), 1);
        assert_eq!(connections[0].platform, PlatformKind::Hackerrank);
    }

    #[tokio::test]
    async fn missing_identifier_is_rejected_before_any_fetch() {
        let state = test_state();
        let result = connect_platform_handler(
            State(state),
            Extension(Uuid::new_v4()),
            Json(ConnectRequest {
                platform: "hackerrank".to_string(),
                value: None,
                username: Some("   ".to_string()),
            }),
        )
        .await;
        assert!(matches!(result, Err(ApiError::MissingInput(_))));
    }

    #[tokio::test]
    async fn unknown_platform_name_is_invalid_input() {
        let state = test_state();
        let result = connect_platform_handler(
            State(state),
            Extension(Uuid::new_v4()),
            Json(connect_req("github", "ada")),
        )
        .await;
        assert!(matches!(
            result,
            Err(ApiError::Port(PortError::InvalidInput(_)))
        ));
    }

    #[tokio::test]
    async fn unknown_leetcode_user_is_404_and_leaves_prior_row_untouched() {
        let leetcode_stats = LeetCodeStats {
            username: "ada".to_string(),
            submit_stats: SubmitStats {
                ac_submission_num: vec![],
            },
        };
        let state = test_state_with(TestAdapters {
            leetcode: FakeLeetCode::known(leetcode_stats),
            ..TestAdapters::default()
        });
        let user_id = Uuid::new_v4();

        connect_platform_handler(
            State(state.clone()),
            Extension(user_id),
            Json(connect_req("leetcode", "ada")),
        )
        .await
        .unwrap();

        // Second connect against an adapter that no longer finds the user.
        let state2 = test_state_with(TestAdapters {
            leetcode: FakeLeetCode::unknown(),
            ..TestAdapters::default()
        });
        let state2 = Arc::new(AppState {
            db: state.db.clone(),
            ..(*state2).clone()
        });

        let result = connect_platform_handler(
            State(state2),
            Extension(user_id),
            Json(connect_req("leetcode", "ghost")),
        )
        .await;
        assert!(matches!(result, Err(ApiError::NotFound(_))));

        let connections = state.db.list_platform_connections(user_id).await.unwrap();
        assert_eq!(connections.len(), 1);
        assert_eq!(connections[0].username, "ada");
    }

    #[tokio::test]
    async fn youtube_connect_extracts_the_playlist_and_imports_the_catalog() {
        let state = test_state();
        let user_id = Uuid::new_v4();

        let response = connect_platform_handler(
            State(state.clone()),
            Extension(user_id),
            Json(connect_req("youtube", "https://x/playlist?list=PL123")),
        )
        .await
        .unwrap();

        assert_eq!(response.0.stats["playlistId"], "PL123");
        assert_eq!(response.0.stats["videoCount"], 3);

        let videos = state.db.list_user_videos(user_id, "PL123").await.unwrap();
        assert_eq!(videos.len(), 3);

        let connections = state.db.list_platform_connections(user_id).await.unwrap();
        assert_eq!(connections[0].username, "PL123");
    }

    #[tokio::test]
    async fn hand_entered_udemy_stats_replace_the_manual_sentinel() {
        let state = test_state();
        let user_id = Uuid::new_v4();

        connect_platform_handler(
            State(state.clone()),
            Extension(user_id),
            Json(connect_req("udemy", "ada")),
        )
        .await
        .unwrap();

        let connections = state.db.list_platform_connections(user_id).await.unwrap();
        assert_eq!(connections[0].stats["is_manual"], serde_json::json!(true));

        update_udemy_stats_handler(
            State(state.clone()),
            Extension(user_id),
            Json(UpdateUdemyStatsRequest {
                stats: serde_json::json!({
                    "courses_enrolled": 5,
                    "courses_completed": 2,
                    "recent_courses": [],
                    "is_manual": false
                }),
            }),
        )
        .await
        .unwrap();

        let connections = state.db.list_platform_connections(user_id).await.unwrap();
        assert_eq!(connections.len(), 1);
        assert_eq!(connections[0].username, "ada");
        assert_eq!(connections[0].stats["courses_enrolled"], serde_json::json!(5));
        assert_eq!(connections[0].stats["is_manual"], serde_json::json!(false));
    }

    #[tokio::test]
    async fn updating_udemy_stats_without_a_connection_is_404() {
        let state = test_state();
        let result = update_udemy_stats_handler(
            State(state),
            Extension(Uuid::new_v4()),
            Json(UpdateUdemyStatsRequest {
                stats: serde_json::json!({
                    "courses_enrolled": 1,
                    "courses_completed": 0,
                    "recent_courses": []
                }),
            }),
        )
        .await;
        assert!(matches!(result, Err(ApiError::NotFound(_))));
    }

    #[tokio::test]
    async fn malformed_udemy_stats_blob_is_rejected() {
        let state = test_state();
        let result = update_udemy_stats_handler(
            State(state),
            Extension(Uuid::new_v4()),
            Json(UpdateUdemyStatsRequest {
                stats: serde_json::json!({ "courses_enrolled": "lots" }),
            }),
        )
        .await;
        assert!(matches!(
            result,
            Err(ApiError::Port(PortError::InvalidInput(_)))
        ));
    }

    #[tokio::test]
    async fn youtube_connect_rejects_values_without_a_playlist_id() {
        let state = test_state();
        let result = connect_platform_handler(
            State(state),
            Extension(Uuid::new_v4()),
            Json(connect_req("youtube", "https://x/watch?v=abc")),
        )
        .await;
        assert!(matches!(
            result,
            Err(ApiError::Port(PortError::InvalidInput(_)))
        ));
    }
}
