//! services/api/src/adapters/udemy.rs
//!
//! Adapter for Udemy public profile pages. Implements the `UdemyService`
//! port from the `core` crate.
//!
//! Udemy has no public stats API, so this adapter scrapes a fixed set of
//! CSS-identified fragments from the profile page. A whole-fetch failure
//! (network or non-2xx) never surfaces as an error: the adapter returns
//! the manual-entry sentinel so the UI can let the user hand-enter data.
//! A page that yields no display name falls back to the raw identifier.
//! Scraped progress is always 0 - the page does not expose private
//! completion state.

use async_trait::async_trait;
use scraper::{Html, Selector};
use tracing::warn;

use skill_tracker_core::{
    domain::{UdemyCourse, UdemyStats},
    ports::{PortResult, UdemyService},
};

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                          (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

// Class names from the current profile-page layout; a layout change
// degrades to manual entry rather than breaking the connect flow.
const COURSE_CARD_SELECTOR: &str = ".course-card--container--3Y77k";
const COURSE_TITLE_SELECTOR: &str = ".course-card--course-title--2f69H";
const INSTRUCTOR_SELECTOR: &str = ".course-card--instructor-list--nH9pI";
const PROFILE_NAME_SELECTOR: &str = ".user-profile-header--user-name--3_m_X";

/// How many scraped courses are kept in the stats blob.
const RECENT_COURSE_LIMIT: usize = 5;

fn selected_text(fragment: scraper::ElementRef<'_>, selector: &Selector) -> String {
    fragment
        .select(selector)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string())
        .unwrap_or_default()
}

/// Parses a profile page into normalized stats. Pure so it can be tested
/// against HTML fixtures without a network.
fn parse_profile(html: &str, fallback_name: &str) -> UdemyStats {
    let (Ok(card_sel), Ok(title_sel), Ok(instructor_sel), Ok(name_sel)) = (
        Selector::parse(COURSE_CARD_SELECTOR),
        Selector::parse(COURSE_TITLE_SELECTOR),
        Selector::parse(INSTRUCTOR_SELECTOR),
        Selector::parse(PROFILE_NAME_SELECTOR),
    ) else {
        return UdemyStats::manual_entry();
    };

    let document = Html::parse_document(html);

    let mut courses = Vec::new();
    for card in document.select(&card_sel) {
        let title = selected_text(card, &title_sel);
        if title.is_empty() {
            continue;
        }
        courses.push(UdemyCourse {
            title,
            instructor: selected_text(card, &instructor_sel),
            progress: 0,
            completed: false,
        });
    }

    let name = document
        .select(&name_sel)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string())
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| fallback_name.to_string());

    UdemyStats {
        courses_enrolled: courses.len(),
        courses_completed: 0,
        recent_courses: courses.into_iter().take(RECENT_COURSE_LIMIT).collect(),
        name: Some(name),
        is_manual: false,
    }
}

/// An adapter that implements `UdemyService` by scraping the public
/// profile page.
#[derive(Clone)]
pub struct UdemyAdapter {
    client: reqwest::Client,
    base_url: String,
}

impl UdemyAdapter {
    pub fn new(client: reqwest::Client, base_url: String) -> Self {
        Self { client, base_url }
    }
}

#[async_trait]
impl UdemyService for UdemyAdapter {
    async fn fetch_profile(&self, username: &str) -> PortResult<UdemyStats> {
        let url = format!("{}/user/{}/", self.base_url, username);
        let html = self
            .client
            .get(&url)
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .send()
            .await
            .and_then(|r| r.error_for_status());

        let html = match html {
            Ok(response) => match response.text().await {
                Ok(body) => body,
                Err(e) => {
                    warn!(username, error = %e, "Udemy profile body unreadable");
                    return Ok(UdemyStats::manual_entry());
                }
            },
            Err(e) => {
                warn!(username, error = %e, "Udemy profile fetch failed");
                return Ok(UdemyStats::manual_entry());
            }
        };

        Ok(parse_profile(&html, username))
    }
}
