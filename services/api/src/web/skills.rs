//! services/api/src/web/skills.rs
//!
//! Skill-set reconciliation and assessment scores.

use axum::{extract::State, Extension, Json};
use serde::Deserialize;
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

use skill_tracker_core::domain::Skill;

use crate::error::{ApiError, ApiResult};
use crate::web::state::AppState;

#[derive(Deserialize, ToSchema)]
pub struct SaveSkillsRequest {
    pub skills: Vec<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct SkillScoreRequest {
    pub skills: Vec<String>,
    pub score: i32,
}

/// POST /api/user/skills - Reconcile the stored skill set
///
/// The stored rows end up exactly matching the submitted set: missing
/// skills are inserted at progress 0, deselected ones deleted, kept ones
/// untouched.
#[utoipa::path(
    post,
    path = "/api/user/skills",
    request_body = SaveSkillsRequest,
    responses(
        (status = 200, description = "Skills updated"),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_token" = []))
)]
pub async fn save_skills_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Json(req): Json<SaveSkillsRequest>,
) -> ApiResult<Json<serde_json::Value>> {
    state.db.reconcile_skills(user_id, &req.skills).await?;
    Ok(Json(
        serde_json::json!({ "message": "Skills updated successfully" }),
    ))
}

/// GET /api/user/skills - Read the skill set
#[utoipa::path(
    get,
    path = "/api/user/skills",
    responses(
        (status = 200, description = "The user's skills with progress scores"),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_token" = []))
)]
pub async fn list_skills_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
) -> ApiResult<Json<Vec<Skill>>> {
    let skills = state.db.list_skills(user_id).await?;
    Ok(Json(skills))
}

/// POST /api/user/skills/score - Record an assessment score
#[utoipa::path(
    post,
    path = "/api/user/skills/score",
    request_body = SkillScoreRequest,
    responses(
        (status = 200, description = "Score saved against the named skills"),
        (status = 400, description = "Missing skills"),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_token" = []))
)]
pub async fn skill_score_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Json(req): Json<SkillScoreRequest>,
) -> ApiResult<Json<serde_json::Value>> {
    if req.skills.is_empty() {
        return Err(ApiError::MissingInput("skills are required".to_string()));
    }

    state
        .db
        .set_skill_scores(user_id, &req.skills, req.score)
        .await?;
    Ok(Json(serde_json::json!({ "message": "Assessment score saved" })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::test_state;

    fn skills(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn reconciliation_converges_to_the_submitted_set() {
        let state = test_state();
        let user_id = Uuid::new_v4();

        save_skills_handler(
            State(state.clone()),
            Extension(user_id),
            Json(SaveSkillsRequest {
                skills: skills(&["A", "C"]),
            }),
        )
        .await
        .unwrap();

        // Give A a score so we can verify it survives the next reconcile.
        skill_score_handler(
            State(state.clone()),
            Extension(user_id),
            Json(SkillScoreRequest {
                skills: skills(&["A"]),
                score: 85,
            }),
        )
        .await
        .unwrap();

        save_skills_handler(
            State(state.clone()),
            Extension(user_id),
            Json(SaveSkillsRequest {
                skills: skills(&["A", "B"]),
            }),
        )
        .await
        .unwrap();

        let stored = list_skills_handler(State(state), Extension(user_id))
            .await
            .unwrap();
        let mut names: Vec<&str> = stored.0.iter().map(|s| s.skill.as_str()).collect();
        names.sort_unstable();
        assert_eq!(names, ["A", "B"]);

        let a = stored.0.iter().find(|s| s.skill == "A").unwrap();
        assert_eq!(a.progress, 85);
        let b = stored.0.iter().find(|s| s.skill == "B").unwrap();
        assert_eq!(b.progress, 0);
    }

    #[tokio::test]
    async fn scoring_without_skills_is_rejected() {
        let state = test_state();
        let result = skill_score_handler(
            State(state),
            Extension(Uuid::new_v4()),
            Json(SkillScoreRequest {
                skills: vec![],
                score: 50,
            }),
        )
        .await;
        assert!(matches!(result, Err(ApiError::MissingInput(_))));
    }
}
