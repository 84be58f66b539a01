//! services/api/src/web/coach.rs
//!
//! AI coaching endpoints: quiz generation for a video topic and a study
//! guide grounded in the user's stored platform stats. Both answer 503
//! when no LLM key is configured.

use axum::{extract::State, Extension, Json};
use serde::Deserialize;
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

use skill_tracker_core::domain::{PlatformKind, Quiz};
use skill_tracker_core::ports::{CoachService, PortError};

use crate::error::{ApiError, ApiResult};
use crate::web::state::AppState;

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GenerateQuizRequest {
    pub video_title: String,
}

#[derive(Deserialize, ToSchema)]
pub struct GuideRequest {
    pub platform: String,
    pub question: Option<String>,
}

fn coach(state: &AppState) -> ApiResult<&Arc<dyn CoachService>> {
    state
        .coach
        .as_ref()
        .ok_or_else(|| ApiError::Unavailable("AI coach is not configured".to_string()))
}

/// POST /api/ai/generate-quiz - Multiple-choice quiz for a video topic
#[utoipa::path(
    post,
    path = "/api/ai/generate-quiz",
    request_body = GenerateQuizRequest,
    responses(
        (status = 200, description = "Five multiple-choice questions"),
        (status = 400, description = "Video title missing"),
        (status = 401, description = "Unauthorized"),
        (status = 503, description = "AI coach not configured")
    ),
    security(("bearer_token" = []))
)]
pub async fn generate_quiz_handler(
    State(state): State<Arc<AppState>>,
    Extension(_user_id): Extension<Uuid>,
    Json(req): Json<GenerateQuizRequest>,
) -> ApiResult<Json<Quiz>> {
    if req.video_title.is_empty() {
        return Err(ApiError::MissingInput("videoTitle is required".to_string()));
    }

    let quiz = coach(&state)?.generate_quiz(&req.video_title).await?;
    Ok(Json(quiz))
}

/// POST /api/ai/guide - Study guide from stored platform stats
///
/// Reads the stored connection for the named platform; a platform the
/// user never connected yields 404.
#[utoipa::path(
    post,
    path = "/api/ai/guide",
    request_body = GuideRequest,
    responses(
        (status = 200, description = "Coaching text"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Platform not connected"),
        (status = 503, description = "AI coach not configured")
    ),
    security(("bearer_token" = []))
)]
pub async fn guide_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Json(req): Json<GuideRequest>,
) -> ApiResult<Json<serde_json::Value>> {
    let platform: PlatformKind = req
        .platform
        .parse()
        .map_err(|e: String| ApiError::Port(PortError::InvalidInput(e)))?;

    let connection = state
        .db
        .list_platform_connections(user_id)
        .await?
        .into_iter()
        .find(|c| c.platform == platform)
        .ok_or_else(|| ApiError::NotFound(format!("{} is not connected", platform)))?;

    let question = req
        .question
        .unwrap_or_else(|| "Give me a study plan.".to_string());

    let guide = coach(&state)?
        .study_guide(platform, &connection.username, &connection.stats, &question)
        .await?;

    Ok(Json(serde_json::json!({ "guide": guide })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::test_state;

    #[tokio::test]
    async fn unconfigured_coach_is_service_unavailable() {
        // The test state carries no coach.
        let state = test_state();
        let result = generate_quiz_handler(
            State(state),
            Extension(Uuid::new_v4()),
            Json(GenerateQuizRequest {
                video_title: "Ownership".to_string(),
            }),
        )
        .await;
        assert!(matches!(result, Err(ApiError::Unavailable(_))));
    }

    #[tokio::test]
    async fn guide_for_an_unconnected_platform_is_not_found_first() {
        // NotFound fires before the coach check so the client learns the
        // actionable problem even when the coach is configured.
        let state = test_state();
        let result = guide_handler(
            State(state),
            Extension(Uuid::new_v4()),
            Json(GuideRequest {
                platform: "leetcode".to_string(),
                question: None,
            }),
        )
        .await;
        assert!(matches!(result, Err(ApiError::NotFound(_))));
    }
}
