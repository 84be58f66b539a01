//! services/api/src/web/mod.rs
//!
//! The HTTP layer: handlers, shared state, auth middleware, and the
//! master OpenAPI definition.

pub mod auth;
pub mod coach;
pub mod dashboard;
pub mod middleware;
pub mod platforms;
pub mod profile;
pub mod skills;
pub mod state;
pub mod videos;

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        auth::signup_handler,
        auth::login_handler,
        platforms::connect_platform_handler,
        platforms::update_udemy_stats_handler,
        dashboard::dashboard_stats_handler,
        dashboard::public_profile_handler,
        videos::playlist_handler,
        videos::save_videos_handler,
        videos::user_videos_handler,
        videos::video_progress_handler,
        skills::save_skills_handler,
        skills::list_skills_handler,
        skills::skill_score_handler,
        profile::get_profile_handler,
        profile::update_profile_handler,
        profile::generate_share_link_handler,
        profile::issue_certificate_handler,
        coach::generate_quiz_handler,
        coach::guide_handler,
    ),
    components(
        schemas(
            auth::SignupRequest,
            auth::LoginRequest,
            auth::PublicUser,
            auth::SignupResponse,
            auth::LoginResponse,
            platforms::ConnectRequest,
            platforms::ConnectResponse,
            platforms::UpdateUdemyStatsRequest,
            videos::VideoPayload,
            videos::SaveVideosRequest,
            videos::SaveVideosResponse,
            videos::VideoProgressRequest,
            skills::SaveSkillsRequest,
            skills::SkillScoreRequest,
            profile::IssueCertificateRequest,
            profile::ShareLinkResponse,
            coach::GenerateQuizRequest,
            coach::GuideRequest,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Skill Tracker API", description = "Learning-progress tracking backend.")
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_token",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}
