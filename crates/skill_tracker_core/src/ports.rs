//! crates/skill_tracker_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the
//! core to be independent of specific external implementations like the
//! database or the upstream learning platforms.

use async_trait::async_trait;
use serde_json::Value;
use uuid::Uuid;

use crate::domain::{
    Certificate, CourseraStats, HackerRankStats, LeetCodeStats, PlatformConnection, PlatformKind,
    PlaylistVideo, Profile, Quiz, Skill, UdemyStats, User, UserCredentials, VideoProgressUpdate,
    VideoTotals, VideoWithProgress, QuizAggregate,
};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services
/// (e.g., database, network).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Unauthorized")]
    Unauthorized,
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Store Port
//=========================================================================================

#[async_trait]
pub trait DatabaseService: Send + Sync {
    // --- Users ---
    async fn create_user(&self, name: &str, email: &str, password_hash: &str) -> PortResult<User>;

    async fn get_user_by_email(&self, email: &str) -> PortResult<Option<UserCredentials>>;

    // --- Platform connections ---

    /// Atomically inserts or refreshes the one (user, platform) row.
    async fn upsert_platform_connection(
        &self,
        user_id: Uuid,
        platform: PlatformKind,
        username: &str,
        stats: &Value,
    ) -> PortResult<()>;

    async fn list_platform_connections(&self, user_id: Uuid) -> PortResult<Vec<PlatformConnection>>;

    // --- Video catalog ---

    /// First writer wins for the playlist title; a re-import is a no-op.
    async fn insert_playlist_if_absent(
        &self,
        user_id: Uuid,
        playlist_id: &str,
        title: &str,
    ) -> PortResult<()>;

    /// Inserts only the rows that do not exist yet and reports how many
    /// were new, so a retried import converges without duplicates.
    async fn insert_videos_if_absent(
        &self,
        user_id: Uuid,
        playlist_id: &str,
        videos: &[PlaylistVideo],
    ) -> PortResult<u64>;

    async fn list_user_videos(
        &self,
        user_id: Uuid,
        playlist_id: &str,
    ) -> PortResult<Vec<VideoWithProgress>>;

    async fn save_video_progress(
        &self,
        user_id: Uuid,
        update: &VideoProgressUpdate,
    ) -> PortResult<()>;

    async fn video_totals(&self, user_id: Uuid, playlist_id: &str) -> PortResult<VideoTotals>;

    async fn quiz_aggregate(&self, user_id: Uuid, playlist_id: &str) -> PortResult<QuizAggregate>;

    // --- Skills ---
    async fn list_skills(&self, user_id: Uuid) -> PortResult<Vec<Skill>>;

    /// Reconciles the stored rows to exactly the submitted set.
    async fn reconcile_skills(&self, user_id: Uuid, skills: &[String]) -> PortResult<()>;

    async fn set_skill_scores(&self, user_id: Uuid, skills: &[String], score: i32)
        -> PortResult<()>;

    // --- Certificates ---

    /// Idempotent per (user, playlist): a repeat call returns the
    /// certificate minted by the first one.
    async fn issue_certificate(
        &self,
        user_id: Uuid,
        playlist_id: &str,
        course_name: &str,
        certificate_id: &str,
    ) -> PortResult<Certificate>;

    async fn latest_certificate(
        &self,
        user_id: Uuid,
        playlist_id: &str,
    ) -> PortResult<Option<Certificate>>;

    // --- Profiles and share tokens ---
    async fn get_profile(&self, user_id: Uuid) -> PortResult<Option<Profile>>;

    async fn upsert_profile(&self, user_id: Uuid, profile: &Profile) -> PortResult<()>;

    /// Overwrites any previous token, immediately invalidating it.
    async fn set_share_token(&self, user_id: Uuid, token: &str) -> PortResult<()>;

    async fn resolve_share_token(&self, token: &str) -> PortResult<Option<(Uuid, Profile)>>;
}

//=========================================================================================
// Platform Adapter Ports
//=========================================================================================

#[async_trait]
pub trait LeetCodeService: Send + Sync {
    /// `None` means the platform has no user with that name; the connect
    /// flow rejects the request instead of storing zero data.
    async fn fetch_stats(&self, username: &str) -> PortResult<Option<LeetCodeStats>>;
}

#[async_trait]
pub trait HackerRankService: Send + Sync {
    /// Profile and badges are independent upstream sub-resources; either
    /// may fail without failing the whole result.
    async fn fetch_stats(&self, username: &str) -> PortResult<HackerRankStats>;
}

#[async_trait]
pub trait YouTubeService: Send + Sync {
    /// Upstream failure yields an empty list, which the caller treats as a
    /// valid (if unhelpful) outcome.
    async fn fetch_playlist_videos(&self, playlist_id: &str) -> PortResult<Vec<PlaylistVideo>>;
}

#[async_trait]
pub trait UdemyService: Send + Sync {
    /// Scrape failure yields the manual-entry sentinel rather than an error.
    async fn fetch_profile(&self, username: &str) -> PortResult<UdemyStats>;
}

#[async_trait]
pub trait CourseraService: Send + Sync {
    async fn fetch_stats(&self, username: &str) -> PortResult<CourseraStats>;
}

//=========================================================================================
// AI Coach Port
//=========================================================================================

#[async_trait]
pub trait CoachService: Send + Sync {
    /// Generates a multiple-choice quiz for a video topic.
    async fn generate_quiz(&self, topic: &str) -> PortResult<Quiz>;

    /// Produces coaching text from a user's stored platform stats.
    async fn study_guide(
        &self,
        platform: PlatformKind,
        display_name: &str,
        stats: &Value,
        question: &str,
    ) -> PortResult<String>;
}
