//! services/api/src/adapters/db.rs
//!
//! This module contains the database adapter, which is the concrete
//! implementation of the `DatabaseService` port from the `core` crate. It
//! handles all interactions with the PostgreSQL database using `sqlx`.
//!
//! Every write that could race with a concurrent request is a single
//! conditional upsert (`INSERT .. ON CONFLICT`) guarded by a unique
//! constraint; there are no check-then-insert sequences.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::{FromRow, PgPool};
use tracing::warn;
use uuid::Uuid;

use skill_tracker_core::domain::{
    skill_set_diff, Certificate, PlatformConnection, PlatformKind, PlaylistVideo, Profile,
    QuizAggregate, Skill, User, UserCredentials, VideoProgressUpdate, VideoTotals,
    VideoWithProgress,
};
use skill_tracker_core::ports::{DatabaseService, PortError, PortResult};

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the `DatabaseService` port.
#[derive(Clone)]
pub struct DbAdapter {
    pool: PgPool,
}

impl DbAdapter {
    /// Creates a new `DbAdapter`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

fn unexpected(e: sqlx::Error) -> PortError {
    PortError::Unexpected(e.to_string())
}

fn is_unique_violation(e: &sqlx::Error) -> bool {
    matches!(
        e.as_database_error().map(|d| d.kind()),
        Some(sqlx::error::ErrorKind::UniqueViolation)
    )
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

#[derive(FromRow)]
struct UserRecord {
    id: Uuid,
    name: String,
    email: String,
    created_at: DateTime<Utc>,
}
impl UserRecord {
    fn to_domain(self) -> User {
        User {
            id: self.id,
            name: self.name,
            email: self.email,
            created_at: self.created_at,
        }
    }
}

#[derive(FromRow)]
struct CredentialsRecord {
    id: Uuid,
    name: String,
    email: String,
    password_hash: String,
}
impl CredentialsRecord {
    fn to_domain(self) -> UserCredentials {
        UserCredentials {
            user_id: self.id,
            name: self.name,
            email: self.email,
            password_hash: self.password_hash,
        }
    }
}

#[derive(FromRow)]
struct ConnectionRecord {
    platform: String,
    username: String,
    stats: Value,
    last_updated: DateTime<Utc>,
}
impl ConnectionRecord {
    fn to_domain(self) -> PortResult<PlatformConnection> {
        let platform = self
            .platform
            .parse::<PlatformKind>()
            .map_err(PortError::Unexpected)?;
        Ok(PlatformConnection {
            platform,
            username: self.username,
            stats: self.stats,
            last_updated: self.last_updated,
        })
    }
}

#[derive(FromRow)]
struct VideoRecord {
    video_id: String,
    title: String,
    thumbnail: String,
    progress: i32,
    completed: bool,
}
impl VideoRecord {
    fn to_domain(self) -> VideoWithProgress {
        VideoWithProgress {
            video_id: self.video_id,
            title: self.title,
            thumbnail: self.thumbnail,
            progress: self.progress,
            completed: self.completed,
        }
    }
}

#[derive(FromRow)]
struct SkillRecord {
    skill: String,
    progress: i32,
}
impl SkillRecord {
    fn to_domain(self) -> Skill {
        Skill {
            skill: self.skill,
            progress: self.progress,
        }
    }
}

#[derive(FromRow)]
struct CertificateRecord {
    certificate_id: String,
    playlist_id: String,
    course_name: String,
    issue_date: DateTime<Utc>,
}
impl CertificateRecord {
    fn to_domain(self) -> Certificate {
        Certificate {
            certificate_id: self.certificate_id,
            playlist_id: self.playlist_id,
            course_name: self.course_name,
            issue_date: self.issue_date,
        }
    }
}

#[derive(FromRow)]
struct ProfileRecord {
    full_name: Option<String>,
    bio: Option<String>,
    job_title: Option<String>,
    profile_pic: Option<String>,
    share_token: Option<String>,
}
impl ProfileRecord {
    fn to_domain(self) -> Profile {
        Profile {
            full_name: self.full_name,
            bio: self.bio,
            job_title: self.job_title,
            profile_pic: self.profile_pic,
            share_token: self.share_token,
        }
    }
}

//=========================================================================================
// `DatabaseService` Trait Implementation
//=========================================================================================

#[async_trait]
impl DatabaseService for DbAdapter {
    async fn create_user(&self, name: &str, email: &str, password_hash: &str) -> PortResult<User> {
        let record = sqlx::query_as::<_, UserRecord>(
            "INSERT INTO users (id, name, email, password_hash) VALUES ($1, $2, $3, $4) \
             RETURNING id, name, email, created_at",
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(email)
        .bind(password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                PortError::InvalidInput("Email already registered".to_string())
            } else {
                unexpected(e)
            }
        })?;
        Ok(record.to_domain())
    }

    async fn get_user_by_email(&self, email: &str) -> PortResult<Option<UserCredentials>> {
        let record = sqlx::query_as::<_, CredentialsRecord>(
            "SELECT id, name, email, password_hash FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(record.map(CredentialsRecord::to_domain))
    }

    async fn upsert_platform_connection(
        &self,
        user_id: Uuid,
        platform: PlatformKind,
        username: &str,
        stats: &Value,
    ) -> PortResult<()> {
        sqlx::query(
            "INSERT INTO user_platforms (user_id, platform, username, stats, last_updated) \
             VALUES ($1, $2, $3, $4, NOW()) \
             ON CONFLICT (user_id, platform) \
             DO UPDATE SET username = EXCLUDED.username, stats = EXCLUDED.stats, \
                           last_updated = NOW()",
        )
        .bind(user_id)
        .bind(platform.as_str())
        .bind(username)
        .bind(stats)
        .execute(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(())
    }

    async fn list_platform_connections(
        &self,
        user_id: Uuid,
    ) -> PortResult<Vec<PlatformConnection>> {
        let records = sqlx::query_as::<_, ConnectionRecord>(
            "SELECT platform, username, stats, last_updated FROM user_platforms \
             WHERE user_id = $1 ORDER BY platform",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;

        records.into_iter().map(ConnectionRecord::to_domain).collect()
    }

    async fn insert_playlist_if_absent(
        &self,
        user_id: Uuid,
        playlist_id: &str,
        title: &str,
    ) -> PortResult<()> {
        sqlx::query(
            "INSERT INTO youtube_playlists (user_id, playlist_id, title) VALUES ($1, $2, $3) \
             ON CONFLICT (user_id, playlist_id) DO NOTHING",
        )
        .bind(user_id)
        .bind(playlist_id)
        .bind(title)
        .execute(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(())
    }

    async fn insert_videos_if_absent(
        &self,
        user_id: Uuid,
        playlist_id: &str,
        videos: &[PlaylistVideo],
    ) -> PortResult<u64> {
        // Row failures are logged and skipped rather than rolling back the
        // import; a retry inserts only the still-missing rows.
        let mut inserted = 0;
        for video in videos {
            let result = sqlx::query(
                "INSERT INTO youtube_videos (user_id, playlist_id, video_id, title, thumbnail) \
                 VALUES ($1, $2, $3, $4, $5) \
                 ON CONFLICT (user_id, video_id) DO NOTHING",
            )
            .bind(user_id)
            .bind(playlist_id)
            .bind(&video.video_id)
            .bind(&video.title)
            .bind(&video.thumbnail)
            .execute(&self.pool)
            .await;

            match result {
                Ok(done) => inserted += done.rows_affected(),
                Err(e) => {
                    warn!(video_id = %video.video_id, error = %e, "video insert failed");
                }
            }
        }
        Ok(inserted)
    }

    async fn list_user_videos(
        &self,
        user_id: Uuid,
        playlist_id: &str,
    ) -> PortResult<Vec<VideoWithProgress>> {
        let records = sqlx::query_as::<_, VideoRecord>(
            "SELECT v.video_id, v.title, v.thumbnail, \
                    COALESCE(p.progress, 0) AS progress, \
                    COALESCE(p.completed, FALSE) AS completed \
             FROM youtube_videos v \
             LEFT JOIN user_video_progress p \
               ON v.video_id = p.video_id AND p.user_id = v.user_id \
             WHERE v.user_id = $1 AND v.playlist_id = $2 \
             ORDER BY v.id ASC",
        )
        .bind(user_id)
        .bind(playlist_id)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;

        Ok(records.into_iter().map(VideoRecord::to_domain).collect())
    }

    async fn save_video_progress(
        &self,
        user_id: Uuid,
        update: &VideoProgressUpdate,
    ) -> PortResult<()> {
        // One statement covers both the lazy first report and the partial
        // update: COALESCE keeps the stored value for omitted fields.
        sqlx::query(
            "INSERT INTO user_video_progress \
                 (user_id, video_id, playlist_id, progress, completed, quiz_mark, updated_at) \
             VALUES ($1, $2, $3, COALESCE($4, 0), COALESCE($5, FALSE), $6, NOW()) \
             ON CONFLICT (user_id, video_id) \
             DO UPDATE SET progress = COALESCE($4, user_video_progress.progress), \
                           completed = COALESCE($5, user_video_progress.completed), \
                           quiz_mark = COALESCE($6, user_video_progress.quiz_mark), \
                           updated_at = NOW()",
        )
        .bind(user_id)
        .bind(&update.video_id)
        .bind(&update.playlist_id)
        .bind(update.progress)
        .bind(update.completed)
        .bind(update.quiz_mark)
        .execute(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(())
    }

    async fn video_totals(&self, user_id: Uuid, playlist_id: &str) -> PortResult<VideoTotals> {
        let (total, completed) = sqlx::query_as::<_, (i64, i64)>(
            "SELECT \
               (SELECT COUNT(*) FROM youtube_videos \
                WHERE user_id = $1 AND playlist_id = $2), \
               (SELECT COUNT(*) FROM user_video_progress \
                WHERE user_id = $1 AND playlist_id = $2 AND completed = TRUE)",
        )
        .bind(user_id)
        .bind(playlist_id)
        .fetch_one(&self.pool)
        .await
        .map_err(unexpected)?;

        Ok(VideoTotals { total, completed })
    }

    async fn quiz_aggregate(&self, user_id: Uuid, playlist_id: &str) -> PortResult<QuizAggregate> {
        let (completed, average) = sqlx::query_as::<_, (i64, Option<f64>)>(
            "SELECT COUNT(quiz_mark), AVG(quiz_mark)::float8 \
             FROM user_video_progress \
             WHERE user_id = $1 AND playlist_id = $2 AND quiz_mark IS NOT NULL",
        )
        .bind(user_id)
        .bind(playlist_id)
        .fetch_one(&self.pool)
        .await
        .map_err(unexpected)?;

        Ok(QuizAggregate { completed, average })
    }

    async fn list_skills(&self, user_id: Uuid) -> PortResult<Vec<Skill>> {
        let records = sqlx::query_as::<_, SkillRecord>(
            "SELECT skill, progress FROM user_skills WHERE user_id = $1 ORDER BY id ASC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(records.into_iter().map(SkillRecord::to_domain).collect())
    }

    async fn reconcile_skills(&self, user_id: Uuid, skills: &[String]) -> PortResult<()> {
        let existing: Vec<String> =
            sqlx::query_scalar("SELECT skill FROM user_skills WHERE user_id = $1")
                .bind(user_id)
                .fetch_all(&self.pool)
                .await
                .map_err(unexpected)?;

        let (to_add, to_remove) = skill_set_diff(&existing, skills);

        if !to_remove.is_empty() {
            sqlx::query("DELETE FROM user_skills WHERE user_id = $1 AND skill = ANY($2)")
                .bind(user_id)
                .bind(&to_remove)
                .execute(&self.pool)
                .await
                .map_err(unexpected)?;
        }

        if !to_add.is_empty() {
            sqlx::query(
                "INSERT INTO user_skills (user_id, skill, progress) \
                 SELECT $1, s, 0 FROM UNNEST($2::text[]) AS s \
                 ON CONFLICT (user_id, skill) DO NOTHING",
            )
            .bind(user_id)
            .bind(&to_add)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        }

        Ok(())
    }

    async fn set_skill_scores(
        &self,
        user_id: Uuid,
        skills: &[String],
        score: i32,
    ) -> PortResult<()> {
        sqlx::query("UPDATE user_skills SET progress = $1 WHERE user_id = $2 AND skill = ANY($3)")
            .bind(score)
            .bind(user_id)
            .bind(skills)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(())
    }

    async fn issue_certificate(
        &self,
        user_id: Uuid,
        playlist_id: &str,
        course_name: &str,
        certificate_id: &str,
    ) -> PortResult<Certificate> {
        // Idempotent per (user, playlist): on conflict the freshly minted id
        // is discarded and the original row is returned.
        sqlx::query(
            "INSERT INTO user_certificates (user_id, playlist_id, course_name, certificate_id) \
             VALUES ($1, $2, $3, $4) \
             ON CONFLICT (user_id, playlist_id) DO NOTHING",
        )
        .bind(user_id)
        .bind(playlist_id)
        .bind(course_name)
        .bind(certificate_id)
        .execute(&self.pool)
        .await
        .map_err(unexpected)?;

        let record = sqlx::query_as::<_, CertificateRecord>(
            "SELECT certificate_id, playlist_id, course_name, issue_date \
             FROM user_certificates WHERE user_id = $1 AND playlist_id = $2",
        )
        .bind(user_id)
        .bind(playlist_id)
        .fetch_one(&self.pool)
        .await
        .map_err(unexpected)?;

        Ok(record.to_domain())
    }

    async fn latest_certificate(
        &self,
        user_id: Uuid,
        playlist_id: &str,
    ) -> PortResult<Option<Certificate>> {
        let record = sqlx::query_as::<_, CertificateRecord>(
            "SELECT certificate_id, playlist_id, course_name, issue_date \
             FROM user_certificates WHERE user_id = $1 AND playlist_id = $2 \
             ORDER BY issue_date DESC LIMIT 1",
        )
        .bind(user_id)
        .bind(playlist_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?;

        Ok(record.map(CertificateRecord::to_domain))
    }

    async fn get_profile(&self, user_id: Uuid) -> PortResult<Option<Profile>> {
        let record = sqlx::query_as::<_, ProfileRecord>(
            "SELECT full_name, bio, job_title, profile_pic, share_token \
             FROM user_profiles WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(record.map(ProfileRecord::to_domain))
    }

    async fn upsert_profile(&self, user_id: Uuid, profile: &Profile) -> PortResult<()> {
        sqlx::query(
            "INSERT INTO user_profiles (user_id, full_name, bio, job_title, profile_pic) \
             VALUES ($1, $2, $3, $4, $5) \
             ON CONFLICT (user_id) \
             DO UPDATE SET full_name = EXCLUDED.full_name, bio = EXCLUDED.bio, \
                           job_title = EXCLUDED.job_title, profile_pic = EXCLUDED.profile_pic",
        )
        .bind(user_id)
        .bind(&profile.full_name)
        .bind(&profile.bio)
        .bind(&profile.job_title)
        .bind(&profile.profile_pic)
        .execute(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(())
    }

    async fn set_share_token(&self, user_id: Uuid, token: &str) -> PortResult<()> {
        sqlx::query(
            "INSERT INTO user_profiles (user_id, share_token) VALUES ($1, $2) \
             ON CONFLICT (user_id) DO UPDATE SET share_token = $2",
        )
        .bind(user_id)
        .bind(token)
        .execute(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(())
    }

    async fn resolve_share_token(&self, token: &str) -> PortResult<Option<(Uuid, Profile)>> {
        #[derive(FromRow)]
        struct TokenRow {
            user_id: Uuid,
            full_name: Option<String>,
            bio: Option<String>,
            job_title: Option<String>,
            profile_pic: Option<String>,
            share_token: Option<String>,
        }

        let row = sqlx::query_as::<_, TokenRow>(
            "SELECT user_id, full_name, bio, job_title, profile_pic, share_token \
             FROM user_profiles WHERE share_token = $1",
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?;

        Ok(row.map(|r| {
            (
                r.user_id,
                Profile {
                    full_name: r.full_name,
                    bio: r.bio,
                    job_title: r.job_title,
                    profile_pic: r.profile_pic,
                    share_token: r.share_token,
                },
            )
        }))
    }
}
