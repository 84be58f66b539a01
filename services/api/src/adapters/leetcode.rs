//! services/api/src/adapters/leetcode.rs
//!
//! Adapter for the LeetCode GraphQL API. Implements the `LeetCodeService`
//! port from the `core` crate.
//!
//! LeetCode is the one platform where "no such user" is surfaced to the
//! caller instead of being silently accepted: the connect flow rejects the
//! request with 404 when `matchedUser` comes back null. A transport failure
//! is folded into the same `None`, with the underlying error logged so
//! operators can tell the cases apart.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::warn;

use skill_tracker_core::{
    domain::LeetCodeStats,
    ports::{LeetCodeService, PortResult},
};

/// The profile query the adapter sends, verbatim. `submitStats` aliases
/// `submitStatsGlobal` so the normalized blob keeps the short field name.
const USER_PROFILE_QUERY: &str = r#"
query getUserProfile($username: String!) {
  matchedUser(username: $username) {
    username
    submitStats: submitStatsGlobal {
      acSubmissionNum {
        difficulty
        count
        submissions
      }
    }
  }
}
"#;

#[derive(Deserialize)]
struct GraphQlEnvelope {
    data: Option<MatchedUserData>,
}

#[derive(Deserialize)]
struct MatchedUserData {
    #[serde(rename = "matchedUser")]
    matched_user: Option<LeetCodeStats>,
}

/// An adapter that implements `LeetCodeService` over the public GraphQL
/// endpoint.
#[derive(Clone)]
pub struct LeetCodeAdapter {
    client: reqwest::Client,
    base_url: String,
}

impl LeetCodeAdapter {
    /// Creates a new `LeetCodeAdapter`. The client is expected to carry the
    /// service-wide upstream timeout.
    pub fn new(client: reqwest::Client, base_url: String) -> Self {
        Self { client, base_url }
    }
}

#[async_trait]
impl LeetCodeService for LeetCodeAdapter {
    async fn fetch_stats(&self, username: &str) -> PortResult<Option<LeetCodeStats>> {
        let body = json!({
            "query": USER_PROFILE_QUERY,
            "variables": { "username": username },
        });

        let response = self
            .client
            .post(format!("{}/graphql", self.base_url))
            .header(reqwest::header::REFERER, self.base_url.as_str())
            .json(&body)
            .send()
            .await;

        let response = match response {
            Ok(r) => r,
            Err(e) => {
                warn!(username, error = %e, "LeetCode fetch failed");
                return Ok(None);
            }
        };

        if !response.status().is_success() {
            warn!(username, status = %response.status(), "LeetCode returned an error status");
            return Ok(None);
        }

        match response.json::<GraphQlEnvelope>().await {
            Ok(envelope) => Ok(envelope.data.and_then(|d| d.matched_user)),
            Err(e) => {
                warn!(username, error = %e, "LeetCode response did not parse");
                Ok(None)
            }
        }
    }
}
