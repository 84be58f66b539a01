//! services/api/src/web/profile.rs
//!
//! Profile read/write, share-link generation, and certificate issuance.

use axum::{extract::State, Extension, Json};
use rand::{distributions::Alphanumeric, Rng};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

use skill_tracker_core::domain::{Certificate, Profile};

use crate::error::{ApiError, ApiResult};
use crate::web::state::AppState;

//=========================================================================================
// Request/Response Types
//=========================================================================================

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct IssueCertificateRequest {
    pub playlist_id: String,
    pub course_name: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueCertificateResponse {
    pub message: String,
    pub certificate: Certificate,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ShareLinkResponse {
    pub share_token: String,
}

//=========================================================================================
// Token Minting
//=========================================================================================

/// A 32-hex-character opaque share token.
fn new_share_token() -> String {
    let mut bytes = [0u8; 16];
    rand::thread_rng().fill(&mut bytes[..]);
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

/// Certificate ids look like `CERT-X7K2P9QRM`.
fn new_certificate_id() -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(9)
        .map(char::from)
        .collect();
    format!("CERT-{}", suffix.to_uppercase())
}

//=========================================================================================
// Handlers
//=========================================================================================

/// GET /api/user/profile - Read the profile entity
#[utoipa::path(
    get,
    path = "/api/user/profile",
    responses(
        (status = 200, description = "The profile; empty fields when never saved"),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_token" = []))
)]
pub async fn get_profile_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
) -> ApiResult<Json<Profile>> {
    let profile = state.db.get_profile(user_id).await?.unwrap_or_default();
    Ok(Json(profile))
}

/// POST /api/user/profile - Create or update the profile
///
/// The share token cannot be set through this endpoint; only
/// generate-share-link writes it.
#[utoipa::path(
    post,
    path = "/api/user/profile",
    responses(
        (status = 200, description = "Profile updated"),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_token" = []))
)]
pub async fn update_profile_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Json(profile): Json<Profile>,
) -> ApiResult<Json<serde_json::Value>> {
    state.db.upsert_profile(user_id, &profile).await?;
    Ok(Json(serde_json::json!({ "message": "Profile updated" })))
}

/// POST /api/user/generate-share-link - Mint a public share token
///
/// Regenerating overwrites the previous token, invalidating any links
/// that carried it.
#[utoipa::path(
    post,
    path = "/api/user/generate-share-link",
    responses(
        (status = 200, description = "A fresh share token", body = ShareLinkResponse),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_token" = []))
)]
pub async fn generate_share_link_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
) -> ApiResult<Json<ShareLinkResponse>> {
    let share_token = new_share_token();
    state.db.set_share_token(user_id, &share_token).await?;
    Ok(Json(ShareLinkResponse { share_token }))
}

/// POST /api/user/issue-certificate - Mint a course certificate
///
/// Idempotent per (user, playlist): repeating the call returns the
/// certificate minted the first time.
#[utoipa::path(
    post,
    path = "/api/user/issue-certificate",
    request_body = IssueCertificateRequest,
    responses(
        (status = 200, description = "The certificate for this playlist"),
        (status = 400, description = "Missing playlist id or course name"),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_token" = []))
)]
pub async fn issue_certificate_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Json(req): Json<IssueCertificateRequest>,
) -> ApiResult<Json<IssueCertificateResponse>> {
    if req.playlist_id.is_empty() || req.course_name.is_empty() {
        return Err(ApiError::MissingInput(
            "playlistId and courseName are required".to_string(),
        ));
    }

    let certificate = state
        .db
        .issue_certificate(
            user_id,
            &req.playlist_id,
            &req.course_name,
            &new_certificate_id(),
        )
        .await?;

    Ok(Json(IssueCertificateResponse {
        message: "Certificate Issued".to_string(),
        certificate,
    }))
}
