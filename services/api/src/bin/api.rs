//! services/api/src/bin/api.rs

use api_lib::{
    adapters::{
        DbAdapter, HackerRankAdapter, LeetCodeAdapter, OpenAiCoachAdapter, StaticCourseraAdapter,
        UdemyAdapter, YouTubeAdapter,
    },
    config::Config,
    error::ApiError,
    web::{
        auth::{login_handler, signup_handler},
        coach::{generate_quiz_handler, guide_handler},
        dashboard::{dashboard_stats_handler, public_profile_handler},
        middleware::require_auth,
        platforms::{connect_platform_handler, update_udemy_stats_handler},
        profile::{
            generate_share_link_handler, get_profile_handler, issue_certificate_handler,
            update_profile_handler,
        },
        skills::{list_skills_handler, save_skills_handler, skill_score_handler},
        state::AppState,
        videos::{
            playlist_handler, save_videos_handler, user_videos_handler, video_progress_handler,
        },
        ApiDoc,
    },
};
use async_openai::{config::OpenAIConfig, Client};
use axum::{
    http::{
        header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
        HeaderValue, Method,
    },
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use skill_tracker_core::ports::CoachService;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting server...");

    // --- 2. Connect to Database & Run Migrations ---
    info!("Connecting to database...");
    let db_pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await?;
    let db_adapter = Arc::new(DbAdapter::new(db_pool.clone()));
    info!("Running database migrations...");
    db_adapter
        .run_migrations()
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;
    info!("Database migrations complete.");

    // --- 3. Initialize Platform Adapters ---
    // One shared HTTP client; the timeout bounds every upstream call.
    let http_client = reqwest::Client::builder()
        .timeout(config.upstream_timeout)
        .build()
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    let leetcode = Arc::new(LeetCodeAdapter::new(
        http_client.clone(),
        config.leetcode_base_url.clone(),
    ));
    let hackerrank = Arc::new(HackerRankAdapter::new(
        http_client.clone(),
        config.hackerrank_base_url.clone(),
    ));
    let youtube = Arc::new(YouTubeAdapter::new(
        http_client.clone(),
        config.youtube_base_url.clone(),
        config.youtube_api_key.clone(),
    ));
    let udemy = Arc::new(UdemyAdapter::new(
        http_client.clone(),
        config.udemy_base_url.clone(),
    ));

    let coach = match config.openai_api_key.as_ref() {
        Some(key) => {
            let openai_client =
                Client::with_config(OpenAIConfig::new().with_api_key(key.clone()));
            Some(Arc::new(OpenAiCoachAdapter::new(
                openai_client,
                config.coach_model.clone(),
            )) as Arc<dyn CoachService>)
        }
        None => {
            info!("no OpenAI API key configured; AI coach endpoints disabled");
            None
        }
    };

    // --- 4. Build the Shared AppState ---
    let app_state = Arc::new(AppState {
        db: db_adapter,
        config: config.clone(),
        leetcode,
        hackerrank,
        youtube,
        udemy,
        coursera: Arc::new(StaticCourseraAdapter),
        coach,
    });

    let cors = CorsLayer::new()
        .allow_origin(
            config
                .cors_origin
                .parse::<HeaderValue>()
                .map_err(|e| ApiError::Internal(e.to_string()))?,
        )
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE, ACCEPT]);

    // --- 5. Create the Web Router ---
    // Public routes (no auth required)
    let public_routes = Router::new()
        .route("/api/signup", post(signup_handler))
        .route("/api/login", post(login_handler))
        .route("/api/public/profile/{token}", get(public_profile_handler))
        .route("/api/youtube/playlist", get(playlist_handler));

    // Protected routes (auth required)
    let protected_routes = Router::new()
        .route("/api/platform/connect", post(connect_platform_handler))
        .route("/api/udemy/update-stats", post(update_udemy_stats_handler))
        .route("/api/dashboard/stats", get(dashboard_stats_handler))
        .route("/api/youtube/save-videos", post(save_videos_handler))
        .route("/api/youtube/user-videos", get(user_videos_handler))
        .route("/api/user/video-progress", post(video_progress_handler))
        .route(
            "/api/user/skills",
            post(save_skills_handler).get(list_skills_handler),
        )
        .route("/api/user/skills/score", post(skill_score_handler))
        .route(
            "/api/user/profile",
            get(get_profile_handler).post(update_profile_handler),
        )
        .route(
            "/api/user/generate-share-link",
            post(generate_share_link_handler),
        )
        .route(
            "/api/user/issue-certificate",
            post(issue_certificate_handler),
        )
        .route("/api/ai/generate-quiz", post(generate_quiz_handler))
        .route("/api/ai/guide", post(guide_handler))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            require_auth,
        ));

    let api_router = Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(cors)
        .with_state(app_state);

    // Merge the API router with the Swagger UI router for a complete application.
    let app = Router::new()
        .merge(api_router)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    // --- 6. Start the Server ---
    info!("Starting server on {}", config.bind_address);
    info!(
        "Swagger UI available at http://{}/swagger-ui",
        config.bind_address
    );
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
