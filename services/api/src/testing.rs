//! services/api/src/testing.rs
//!
//! In-memory implementations of the core ports, compiled for tests only.
//! The database fake mirrors the SQL adapter's conflict semantics
//! (insert-if-absent, COALESCE partial updates, idempotent certificates)
//! so handler tests exercise the same invariants.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use tracing::Level;
use uuid::Uuid;

use skill_tracker_core::domain::{
    skill_set_diff, Certificate, HackerRankStats, LeetCodeStats, PlatformConnection, PlatformKind,
    PlaylistVideo, Profile, QuizAggregate, Skill, UdemyStats, User, UserCredentials,
    VideoProgressUpdate, VideoTotals, VideoWithProgress,
};
use skill_tracker_core::ports::{
    DatabaseService, HackerRankService, LeetCodeService, PortError, PortResult, UdemyService,
    YouTubeService,
};

use crate::adapters::StaticCourseraAdapter;
use crate::config::Config;
use crate::web::state::AppState;

//=========================================================================================
// In-Memory Database
//=========================================================================================

struct CatalogRow {
    user_id: Uuid,
    playlist_id: String,
    video: PlaylistVideo,
}

#[derive(Default)]
struct ProgressRow {
    playlist_id: Option<String>,
    progress: i32,
    completed: bool,
    quiz_mark: Option<i32>,
}

struct SkillRow {
    user_id: Uuid,
    skill: String,
    progress: i32,
}

#[derive(Default)]
pub struct InMemoryDb {
    users: Mutex<Vec<UserCredentials>>,
    connections: Mutex<HashMap<(Uuid, PlatformKind), PlatformConnection>>,
    playlists: Mutex<HashMap<(Uuid, String), String>>,
    videos: Mutex<Vec<CatalogRow>>,
    progress: Mutex<HashMap<(Uuid, String), ProgressRow>>,
    skills: Mutex<Vec<SkillRow>>,
    certificates: Mutex<HashMap<(Uuid, String), Certificate>>,
    profiles: Mutex<HashMap<Uuid, Profile>>,
}

#[async_trait]
impl DatabaseService for InMemoryDb {
    async fn create_user(&self, name: &str, email: &str, password_hash: &str) -> PortResult<User> {
        let mut users = self.users.lock().unwrap();
        if users.iter().any(|u| u.email == email) {
            return Err(PortError::InvalidInput(
                "Email already registered".to_string(),
            ));
        }
        let user_id = Uuid::new_v4();
        users.push(UserCredentials {
            user_id,
            name: name.to_string(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
        });
        Ok(User {
            id: user_id,
            name: name.to_string(),
            email: email.to_string(),
            created_at: Utc::now(),
        })
    }

    async fn get_user_by_email(&self, email: &str) -> PortResult<Option<UserCredentials>> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn upsert_platform_connection(
        &self,
        user_id: Uuid,
        platform: PlatformKind,
        username: &str,
        stats: &Value,
    ) -> PortResult<()> {
        self.connections.lock().unwrap().insert(
            (user_id, platform),
            PlatformConnection {
                platform,
                username: username.to_string(),
                stats: stats.clone(),
                last_updated: Utc::now(),
            },
        );
        Ok(())
    }

    async fn list_platform_connections(
        &self,
        user_id: Uuid,
    ) -> PortResult<Vec<PlatformConnection>> {
        let mut connections: Vec<PlatformConnection> = self
            .connections
            .lock()
            .unwrap()
            .iter()
            .filter(|((uid, _), _)| *uid == user_id)
            .map(|(_, c)| c.clone())
            .collect();
        connections.sort_by_key(|c| c.platform.as_str());
        Ok(connections)
    }

    async fn insert_playlist_if_absent(
        &self,
        user_id: Uuid,
        playlist_id: &str,
        title: &str,
    ) -> PortResult<()> {
        self.playlists
            .lock()
            .unwrap()
            .entry((user_id, playlist_id.to_string()))
            .or_insert_with(|| title.to_string());
        Ok(())
    }

    async fn insert_videos_if_absent(
        &self,
        user_id: Uuid,
        playlist_id: &str,
        videos: &[PlaylistVideo],
    ) -> PortResult<u64> {
        let mut catalog = self.videos.lock().unwrap();
        let mut inserted = 0;
        for video in videos {
            let exists = catalog
                .iter()
                .any(|row| row.user_id == user_id && row.video.video_id == video.video_id);
            if !exists {
                catalog.push(CatalogRow {
                    user_id,
                    playlist_id: playlist_id.to_string(),
                    video: video.clone(),
                });
                inserted += 1;
            }
        }
        Ok(inserted)
    }

    async fn list_user_videos(
        &self,
        user_id: Uuid,
        playlist_id: &str,
    ) -> PortResult<Vec<VideoWithProgress>> {
        let progress = self.progress.lock().unwrap();
        Ok(self
            .videos
            .lock()
            .unwrap()
            .iter()
            .filter(|row| row.user_id == user_id && row.playlist_id == playlist_id)
            .map(|row| {
                let p = progress.get(&(user_id, row.video.video_id.clone()));
                VideoWithProgress {
                    video_id: row.video.video_id.clone(),
                    title: row.video.title.clone(),
                    thumbnail: row.video.thumbnail.clone(),
                    progress: p.map(|p| p.progress).unwrap_or(0),
                    completed: p.map(|p| p.completed).unwrap_or(false),
                }
            })
            .collect())
    }

    async fn save_video_progress(
        &self,
        user_id: Uuid,
        update: &VideoProgressUpdate,
    ) -> PortResult<()> {
        let mut progress = self.progress.lock().unwrap();
        let row = progress
            .entry((user_id, update.video_id.clone()))
            .or_insert_with(|| ProgressRow {
                playlist_id: update.playlist_id.clone(),
                ..ProgressRow::default()
            });
        if let Some(p) = update.progress {
            row.progress = p;
        }
        if let Some(c) = update.completed {
            row.completed = c;
        }
        if let Some(q) = update.quiz_mark {
            row.quiz_mark = Some(q);
        }
        Ok(())
    }

    async fn video_totals(&self, user_id: Uuid, playlist_id: &str) -> PortResult<VideoTotals> {
        let total = self
            .videos
            .lock()
            .unwrap()
            .iter()
            .filter(|row| row.user_id == user_id && row.playlist_id == playlist_id)
            .count() as i64;
        let completed = self
            .progress
            .lock()
            .unwrap()
            .iter()
            .filter(|((uid, _), row)| {
                *uid == user_id && row.playlist_id.as_deref() == Some(playlist_id) && row.completed
            })
            .count() as i64;
        Ok(VideoTotals { total, completed })
    }

    async fn quiz_aggregate(&self, user_id: Uuid, playlist_id: &str) -> PortResult<QuizAggregate> {
        let marks: Vec<i32> = self
            .progress
            .lock()
            .unwrap()
            .iter()
            .filter(|((uid, _), row)| {
                *uid == user_id && row.playlist_id.as_deref() == Some(playlist_id)
            })
            .filter_map(|(_, row)| row.quiz_mark)
            .collect();
        let completed = marks.len() as i64;
        let average = if marks.is_empty() {
            None
        } else {
            Some(marks.iter().sum::<i32>() as f64 / completed as f64)
        };
        Ok(QuizAggregate { completed, average })
    }

    async fn list_skills(&self, user_id: Uuid) -> PortResult<Vec<Skill>> {
        Ok(self
            .skills
            .lock()
            .unwrap()
            .iter()
            .filter(|row| row.user_id == user_id)
            .map(|row| Skill {
                skill: row.skill.clone(),
                progress: row.progress,
            })
            .collect())
    }

    async fn reconcile_skills(&self, user_id: Uuid, skills: &[String]) -> PortResult<()> {
        let mut rows = self.skills.lock().unwrap();
        let existing: Vec<String> = rows
            .iter()
            .filter(|row| row.user_id == user_id)
            .map(|row| row.skill.clone())
            .collect();
        let (to_add, to_remove) = skill_set_diff(&existing, skills);

        rows.retain(|row| row.user_id != user_id || !to_remove.contains(&row.skill));
        for skill in to_add {
            rows.push(SkillRow {
                user_id,
                skill,
                progress: 0,
            });
        }
        Ok(())
    }

    async fn set_skill_scores(
        &self,
        user_id: Uuid,
        skills: &[String],
        score: i32,
    ) -> PortResult<()> {
        for row in self.skills.lock().unwrap().iter_mut() {
            if row.user_id == user_id && skills.contains(&row.skill) {
                row.progress = score;
            }
        }
        Ok(())
    }

    async fn issue_certificate(
        &self,
        user_id: Uuid,
        playlist_id: &str,
        course_name: &str,
        certificate_id: &str,
    ) -> PortResult<Certificate> {
        let mut certificates = self.certificates.lock().unwrap();
        let cert = certificates
            .entry((user_id, playlist_id.to_string()))
            .or_insert_with(|| Certificate {
                certificate_id: certificate_id.to_string(),
                playlist_id: playlist_id.to_string(),
                course_name: course_name.to_string(),
                issue_date: Utc::now(),
            });
        Ok(cert.clone())
    }

    async fn latest_certificate(
        &self,
        user_id: Uuid,
        playlist_id: &str,
    ) -> PortResult<Option<Certificate>> {
        Ok(self
            .certificates
            .lock()
            .unwrap()
            .get(&(user_id, playlist_id.to_string()))
            .cloned())
    }

    async fn get_profile(&self, user_id: Uuid) -> PortResult<Option<Profile>> {
        Ok(self.profiles.lock().unwrap().get(&user_id).cloned())
    }

    async fn upsert_profile(&self, user_id: Uuid, profile: &Profile) -> PortResult<()> {
        let mut profiles = self.profiles.lock().unwrap();
        let row = profiles.entry(user_id).or_default();
        // The share token is owned by set_share_token and survives updates.
        row.full_name = profile.full_name.clone();
        row.bio = profile.bio.clone();
        row.job_title = profile.job_title.clone();
        row.profile_pic = profile.profile_pic.clone();
        Ok(())
    }

    async fn set_share_token(&self, user_id: Uuid, token: &str) -> PortResult<()> {
        let mut profiles = self.profiles.lock().unwrap();
        profiles.entry(user_id).or_default().share_token = Some(token.to_string());
        Ok(())
    }

    async fn resolve_share_token(&self, token: &str) -> PortResult<Option<(Uuid, Profile)>> {
        Ok(self
            .profiles
            .lock()
            .unwrap()
            .iter()
            .find(|(_, p)| p.share_token.as_deref() == Some(token))
            .map(|(uid, p)| (*uid, p.clone())))
    }
}

//=========================================================================================
// Fake Platform Adapters
//=========================================================================================

#[derive(Clone, Default)]
pub struct FakeLeetCode {
    result: Option<LeetCodeStats>,
}

impl FakeLeetCode {
    pub fn known(stats: LeetCodeStats) -> Self {
        Self {
            result: Some(stats),
        }
    }

    pub fn unknown() -> Self {
        Self { result: None }
    }
}

#[async_trait]
impl LeetCodeService for FakeLeetCode {
    async fn fetch_stats(&self, _username: &str) -> PortResult<Option<LeetCodeStats>> {
        Ok(self.result.clone())
    }
}

#[derive(Clone, Default)]
pub struct FakeHackerRank;

#[async_trait]
impl HackerRankService for FakeHackerRank {
    async fn fetch_stats(&self, username: &str) -> PortResult<HackerRankStats> {
        Ok(HackerRankStats {
            badges: Vec::new(),
            badge_count: 0,
            name: username.to_string(),
        })
    }
}

#[derive(Clone)]
pub struct FakeYouTube {
    pub videos: Vec<PlaylistVideo>,
}

impl Default for FakeYouTube {
    fn default() -> Self {
        Self {
            videos: (1..=3)
                .map(|i| PlaylistVideo {
                    video_id: format!("v{}", i),
                    title: format!("Video {}", i),
                    thumbnail: String::new(),
                })
                .collect(),
        }
    }
}

#[async_trait]
impl YouTubeService for FakeYouTube {
    async fn fetch_playlist_videos(&self, _playlist_id: &str) -> PortResult<Vec<PlaylistVideo>> {
        Ok(self.videos.clone())
    }
}

#[derive(Clone, Default)]
pub struct FakeUdemy;

#[async_trait]
impl UdemyService for FakeUdemy {
    async fn fetch_profile(&self, _username: &str) -> PortResult<UdemyStats> {
        Ok(UdemyStats::manual_entry())
    }
}

//=========================================================================================
// Test State Construction
//=========================================================================================

#[derive(Default)]
pub struct TestAdapters {
    pub leetcode: FakeLeetCode,
    pub hackerrank: FakeHackerRank,
    pub youtube: FakeYouTube,
    pub udemy: FakeUdemy,
}

pub fn test_config() -> Config {
    Config {
        bind_address: "127.0.0.1:0".parse::<SocketAddr>().unwrap(),
        database_url: "postgres://unused".to_string(),
        log_level: Level::INFO,
        cors_origin: "http://localhost:5173".to_string(),
        jwt_secret: "test-secret".to_string(),
        upstream_timeout: Duration::from_secs(1),
        youtube_api_key: None,
        openai_api_key: None,
        coach_model: "gpt-4o-mini".to_string(),
        leetcode_base_url: "http://unused".to_string(),
        hackerrank_base_url: "http://unused".to_string(),
        youtube_base_url: "http://unused".to_string(),
        udemy_base_url: "http://unused".to_string(),
    }
}

/// An `AppState` backed by the in-memory database and default fakes.
pub fn test_state() -> Arc<AppState> {
    test_state_with(TestAdapters::default())
}

pub fn test_state_with(adapters: TestAdapters) -> Arc<AppState> {
    Arc::new(AppState {
        db: Arc::new(InMemoryDb::default()),
        config: Arc::new(test_config()),
        leetcode: Arc::new(adapters.leetcode),
        hackerrank: Arc::new(adapters.hackerrank),
        youtube: Arc::new(adapters.youtube),
        udemy: Arc::new(adapters.udemy),
        coursera: Arc::new(StaticCourseraAdapter),
        coach: None,
    })
}
