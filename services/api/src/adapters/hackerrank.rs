//! services/api/src/adapters/hackerrank.rs
//!
//! Adapter for the HackerRank REST API. Implements the `HackerRankService`
//! port from the `core` crate.
//!
//! The profile and badge listings are independent upstream sub-resources
//! and fail independently; each fetch carries its own fallback so one
//! failing never sinks the other. The overall call therefore always
//! produces a well-formed stats object.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::warn;

use skill_tracker_core::{
    domain::{Badge, HackerRankStats},
    ports::{HackerRankService, PortResult},
};

/// HackerRank rejects requests without a browser-looking user agent.
const USER_AGENT: &str = "Mozilla/5.0";

#[derive(Deserialize)]
struct ProfileEnvelope {
    model: Option<ProfileModel>,
}

#[derive(Deserialize)]
struct ProfileModel {
    name: Option<String>,
}

#[derive(Deserialize)]
struct BadgesEnvelope {
    models: Option<Vec<RawBadge>>,
}

#[derive(Deserialize)]
struct RawBadge {
    badge_name: Option<String>,
    badge_type: Option<String>,
    stars: Option<i32>,
    level: Option<i32>,
    icon: Option<String>,
}

/// Normalizes upstream badge records: the display name prefers
/// `badge_name` over `badge_type`, and star rating / level default to 1.
fn normalize_badges(models: Vec<RawBadge>) -> Vec<Badge> {
    models
        .into_iter()
        .map(|b| Badge {
            name: b
                .badge_name
                .or_else(|| b.badge_type.clone())
                .unwrap_or_default(),
            stars: b.stars.unwrap_or(1),
            level: b.level.unwrap_or(1),
            icon: b.icon.unwrap_or_default(),
            badge_type: b.badge_type,
        })
        .collect()
}

/// An adapter that implements `HackerRankService` over the REST endpoints.
#[derive(Clone)]
pub struct HackerRankAdapter {
    client: reqwest::Client,
    base_url: String,
}

impl HackerRankAdapter {
    pub fn new(client: reqwest::Client, base_url: String) -> Self {
        Self { client, base_url }
    }

    async fn fetch_display_name(&self, username: &str) -> Option<String> {
        let url = format!("{}/rest/hackers/{}", self.base_url, username);
        let envelope = self
            .client
            .get(&url)
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .send()
            .await
            .and_then(|r| r.error_for_status());

        let envelope = match envelope {
            Ok(r) => r.json::<ProfileEnvelope>().await,
            Err(e) => {
                warn!(username, error = %e, "HackerRank profile fetch failed");
                return None;
            }
        };

        match envelope {
            Ok(p) => p.model.and_then(|m| m.name),
            Err(e) => {
                warn!(username, error = %e, "HackerRank profile did not parse");
                None
            }
        }
    }

    async fn fetch_badges(&self, username: &str) -> Vec<Badge> {
        let url = format!("{}/rest/hackers/{}/badges", self.base_url, username);
        let envelope = self
            .client
            .get(&url)
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .send()
            .await
            .and_then(|r| r.error_for_status());

        let envelope = match envelope {
            Ok(r) => r.json::<BadgesEnvelope>().await,
            Err(e) => {
                warn!(username, error = %e, "HackerRank badge fetch failed");
                return Vec::new();
            }
        };

        match envelope {
            Ok(b) => normalize_badges(b.models.unwrap_or_default()),
            Err(e) => {
                warn!(username, error = %e, "HackerRank badges did not parse");
                Vec::new()
            }
        }
    }
}

#[async_trait]
impl HackerRankService for HackerRankAdapter {
    async fn fetch_stats(&self, username: &str) -> PortResult<HackerRankStats> {
        let (name, badges) = tokio::join!(
            self.fetch_display_name(username),
            self.fetch_badges(username)
        );

        Ok(HackerRankStats {
            badge_count: badges.len(),
            badges,
            name: name.unwrap_or_else(|| username.to_string()),
        })
    }
}
