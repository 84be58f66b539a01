//! services/api/src/adapters/coursera.rs
//!
//! Stub adapter for Coursera. Implements the `CourseraService` port from
//! the `core` crate.
//!
//! Coursera exposes neither a public stats API nor a scrapeable profile
//! page, so this adapter unconditionally returns a fixed illustrative
//! stats object. That is a deliberate "static sample data" policy, not a
//! live integration: connecting always succeeds and the dashboard renders
//! the sample. Replacing this file with a real client (or an explicit
//! manual-entry mode like the Udemy fallback) is the designated
//! integration point once a data source exists.

use async_trait::async_trait;

use skill_tracker_core::{
    domain::{CourseraCertificate, CourseraStats},
    ports::{CourseraService, PortResult},
};

/// The sample payload every connect call receives.
fn sample_stats() -> CourseraStats {
    CourseraStats {
        courses_enrolled: 4,
        courses_completed: 2,
        certifications: 1,
        active_specialization: "Data Science Specialization".to_string(),
        certificates: vec![CourseraCertificate {
            id: "CRT-1029384756".to_string(),
            title: "Google Data Analytics Professional Certificate".to_string(),
            date: "December 15, 2025".to_string(),
            authority: "Coursera".to_string(),
            instructor: "Google Career Certificates".to_string(),
            skills: vec![
                "Data Analysis".to_string(),
                "SQL".to_string(),
                "R Programming".to_string(),
                "Tableau".to_string(),
            ],
        }],
    }
}

/// An adapter that implements `CourseraService` with static sample data.
#[derive(Clone, Default)]
pub struct StaticCourseraAdapter;

#[async_trait]
impl CourseraService for StaticCourseraAdapter {
    async fn fetch_stats(&self, _username: &str) -> PortResult<CourseraStats> {
        Ok(sample_stats())
    }
}
