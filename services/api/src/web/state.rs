//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use crate::config::Config;
use skill_tracker_core::ports::{
    CoachService, CourseraService, DatabaseService, HackerRankService, LeetCodeService,
    UdemyService, YouTubeService,
};
use std::sync::Arc;

//=========================================================================================
// AppState (Shared Across All Requests)
//=========================================================================================

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<dyn DatabaseService>,
    pub config: Arc<Config>,
    pub leetcode: Arc<dyn LeetCodeService>,
    pub hackerrank: Arc<dyn HackerRankService>,
    pub youtube: Arc<dyn YouTubeService>,
    pub udemy: Arc<dyn UdemyService>,
    pub coursera: Arc<dyn CourseraService>,
    /// `None` when no LLM API key is configured; the coach endpoints then
    /// answer 503 instead of failing at startup.
    pub coach: Option<Arc<dyn CoachService>>,
}
