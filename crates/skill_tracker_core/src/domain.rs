//! crates/skill_tracker_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any database or HTTP framework; the
//! per-platform stats shapes mirror the wire formats the adapters produce.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

//=========================================================================================
// Users
//=========================================================================================

/// Represents a registered user - used throughout the app.
#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

/// Only used internally for login - contains sensitive data.
#[derive(Debug, Clone)]
pub struct UserCredentials {
    pub user_id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: String,
}

//=========================================================================================
// Platforms
//=========================================================================================

/// The learning platforms a user can connect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlatformKind {
    Leetcode,
    Hackerrank,
    Youtube,
    Udemy,
    Coursera,
}

impl PlatformKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Leetcode => "leetcode",
            Self::Hackerrank => "hackerrank",
            Self::Youtube => "youtube",
            Self::Udemy => "udemy",
            Self::Coursera => "coursera",
        }
    }
}

impl std::str::FromStr for PlatformKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "leetcode" => Ok(Self::Leetcode),
            "hackerrank" => Ok(Self::Hackerrank),
            "youtube" => Ok(Self::Youtube),
            "udemy" => Ok(Self::Udemy),
            "coursera" => Ok(Self::Coursera),
            other => Err(format!("unknown platform '{}'", other)),
        }
    }
}

impl std::fmt::Display for PlatformKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One connected platform for a user. At most one row exists per
/// (user, platform); a refresh overwrites `stats` and `last_updated` in place.
#[derive(Debug, Clone, Serialize)]
pub struct PlatformConnection {
    pub platform: PlatformKind,
    pub username: String,
    pub stats: Value,
    pub last_updated: DateTime<Utc>,
}

//=========================================================================================
// Per-platform normalized stats
//=========================================================================================

/// Accepted-submission counts per difficulty bucket, as LeetCode reports them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AcSubmission {
    pub difficulty: String,
    pub count: i64,
    pub submissions: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitStats {
    pub ac_submission_num: Vec<AcSubmission>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeetCodeStats {
    pub username: String,
    pub submit_stats: SubmitStats,
}

/// One normalized HackerRank badge. Star rating and level default to 1 when
/// the upstream record omits them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Badge {
    pub name: String,
    pub stars: i32,
    pub level: i32,
    pub icon: String,
    pub badge_type: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HackerRankStats {
    pub badges: Vec<Badge>,
    #[serde(rename = "badgeCount")]
    pub badge_count: usize,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YouTubeStats {
    pub video_count: usize,
    pub playlist_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UdemyCourse {
    pub title: String,
    pub instructor: String,
    pub progress: i32,
    pub completed: bool,
}

/// Scraped Udemy profile stats. When the scrape fails entirely, `is_manual`
/// is set so the UI can offer hand-entered data instead.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UdemyStats {
    pub courses_enrolled: usize,
    pub courses_completed: usize,
    pub recent_courses: Vec<UdemyCourse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub is_manual: bool,
}

impl UdemyStats {
    /// The sentinel returned when the profile page cannot be fetched or
    /// parsed; the connect flow stores it as-is.
    pub fn manual_entry() -> Self {
        Self {
            courses_enrolled: 0,
            courses_completed: 0,
            recent_courses: Vec::new(),
            name: None,
            is_manual: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourseraCertificate {
    pub id: String,
    pub title: String,
    pub date: String,
    pub authority: String,
    pub instructor: String,
    pub skills: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourseraStats {
    pub courses_enrolled: usize,
    pub courses_completed: usize,
    pub certifications: usize,
    pub active_specialization: String,
    pub certificates: Vec<CourseraCertificate>,
}

/// The normalized stats payload for one platform. There is deliberately no
/// unified schema across platforms; the dashboard reads whichever fields
/// exist. The store persists the inner value as an opaque JSONB blob - the
/// row's `platform` column is the tag, so the blob itself stays untagged.
#[derive(Debug, Clone)]
pub enum PlatformStats {
    Leetcode(LeetCodeStats),
    Hackerrank(HackerRankStats),
    Youtube(YouTubeStats),
    Udemy(UdemyStats),
    Coursera(CourseraStats),
}

impl PlatformStats {
    pub fn kind(&self) -> PlatformKind {
        match self {
            Self::Leetcode(_) => PlatformKind::Leetcode,
            Self::Hackerrank(_) => PlatformKind::Hackerrank,
            Self::Youtube(_) => PlatformKind::Youtube,
            Self::Udemy(_) => PlatformKind::Udemy,
            Self::Coursera(_) => PlatformKind::Coursera,
        }
    }

    /// Serializes the inner payload to the JSON blob stored in the database.
    pub fn to_value(&self) -> Result<Value, serde_json::Error> {
        match self {
            Self::Leetcode(s) => serde_json::to_value(s),
            Self::Hackerrank(s) => serde_json::to_value(s),
            Self::Youtube(s) => serde_json::to_value(s),
            Self::Udemy(s) => serde_json::to_value(s),
            Self::Coursera(s) => serde_json::to_value(s),
        }
    }

    /// Validates a stored blob against the shape expected for `kind`.
    pub fn from_value(kind: PlatformKind, value: Value) -> Result<Self, serde_json::Error> {
        Ok(match kind {
            PlatformKind::Leetcode => Self::Leetcode(serde_json::from_value(value)?),
            PlatformKind::Hackerrank => Self::Hackerrank(serde_json::from_value(value)?),
            PlatformKind::Youtube => Self::Youtube(serde_json::from_value(value)?),
            PlatformKind::Udemy => Self::Udemy(serde_json::from_value(value)?),
            PlatformKind::Coursera => Self::Coursera(serde_json::from_value(value)?),
        })
    }
}

//=========================================================================================
// Video catalog and progress
//=========================================================================================

/// One video of an imported playlist, as returned by the video-host adapter.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistVideo {
    pub video_id: String,
    pub title: String,
    pub thumbnail: String,
}

/// A catalog row joined with the owning user's progress.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoWithProgress {
    pub video_id: String,
    pub title: String,
    pub thumbnail: String,
    pub progress: i32,
    pub completed: bool,
}

/// A partial update of one (user, video) progress row. `None` fields are
/// left untouched on an existing row.
#[derive(Debug, Clone)]
pub struct VideoProgressUpdate {
    pub video_id: String,
    pub playlist_id: Option<String>,
    pub progress: Option<i32>,
    pub completed: Option<bool>,
    pub quiz_mark: Option<i32>,
}

/// Total and completed video counts for one (user, playlist).
#[derive(Debug, Clone, Copy, Default)]
pub struct VideoTotals {
    pub total: i64,
    pub completed: i64,
}

/// Count and average of the non-null quiz marks across a playlist.
#[derive(Debug, Clone, Copy, Default)]
pub struct QuizAggregate {
    pub completed: i64,
    pub average: Option<f64>,
}

/// Completion percentage for the dashboard: `round(completed / total * 100)`,
/// and exactly 0 when the playlist is empty.
pub fn progress_percent(completed: i64, total: i64) -> i32 {
    if total > 0 {
        ((completed as f64 / total as f64) * 100.0).round() as i32
    } else {
        0
    }
}

//=========================================================================================
// Skills, certificates, profiles
//=========================================================================================

#[derive(Debug, Clone, Serialize)]
pub struct Skill {
    pub skill: String,
    pub progress: i32,
}

/// Computes the insert/delete sets that reconcile the stored skill set to
/// exactly the submitted one. Skills present in both are untouched.
pub fn skill_set_diff(existing: &[String], submitted: &[String]) -> (Vec<String>, Vec<String>) {
    let to_add = submitted
        .iter()
        .filter(|s| !existing.contains(s))
        .cloned()
        .collect();
    let to_remove = existing
        .iter()
        .filter(|s| !submitted.contains(s))
        .cloned()
        .collect();
    (to_add, to_remove)
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Certificate {
    pub certificate_id: String,
    pub playlist_id: String,
    pub course_name: String,
    pub issue_date: DateTime<Utc>,
}

/// The user-editable profile entity. Every field is optional; `share_token`
/// exposes the read-only public view when set.
#[derive(Debug, Clone, Default, Serialize, Deserialize, utoipa::ToSchema)]
pub struct Profile {
    pub full_name: Option<String>,
    pub bio: Option<String>,
    pub job_title: Option<String>,
    pub profile_pic: Option<String>,
    #[serde(skip_deserializing)]
    pub share_token: Option<String>,
}

//=========================================================================================
// AI coach
//=========================================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizQuestion {
    pub id: u32,
    pub question: String,
    pub options: Vec<String>,
    pub correct_answer: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quiz {
    pub questions: Vec<QuizQuestion>,
}
