// src/scrape/sources/devpost.rs
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;

use crate::error::FetchError;
use crate::scrape::types::{EventRecord, EventSource, Platform};
use crate::scrape::{clean_text, FETCH_TIMEOUT};

const API_URL: &str = "https://devpost.com/api/hackathons?page=1&status[]=upcoming&status[]=open";

#[derive(Debug, Deserialize)]
struct Listing {
    #[serde(default)]
    hackathons: Vec<Hackathon>,
}

#[derive(Debug, Deserialize)]
struct Hackathon {
    title: Option<String>,
    url: Option<String>,
    submission_period_dates: Option<String>,
    #[serde(default)]
    themes: Vec<Theme>,
}

#[derive(Debug, Deserialize)]
struct Theme {
    name: Option<String>,
}

pub struct DevpostSource {
    mode: Mode,
}

enum Mode {
    Http { client: Client },
    Fixture(String),
}

impl DevpostSource {
    pub fn new(client: Client) -> Self {
        Self {
            mode: Mode::Http { client },
        }
    }

    /// Parse a captured API body instead of fetching; for tests.
    pub fn from_fixture_str(s: &str) -> Self {
        Self {
            mode: Mode::Fixture(s.to_string()),
        }
    }

    fn parse_listing(
        body: &str,
        discovered_at: DateTime<Utc>,
    ) -> Result<Vec<EventRecord>, FetchError> {
        let listing: Listing = serde_json::from_str(body)
            .map_err(|e| FetchError::Parse(format!("devpost listing json: {e}")))?;

        let mut out = Vec::with_capacity(listing.hackathons.len());
        for item in listing.hackathons {
            // Entries without a title cannot carry an identity; skip them
            // rather than fail the whole listing.
            let name = match item.title.as_deref().map(clean_text) {
                Some(n) if !n.is_empty() => n,
                _ => continue,
            };
            let tags = item
                .themes
                .into_iter()
                .filter_map(|t| t.name)
                .map(|n| clean_text(&n))
                .filter(|n| !n.is_empty())
                .collect();

            out.push(EventRecord {
                name,
                source: Platform::Devpost,
                link: item.url.unwrap_or_default(),
                start_window: item
                    .submission_period_dates
                    .as_deref()
                    .map(clean_text)
                    .unwrap_or_default(),
                tags,
                discovered_at,
            });
        }
        Ok(out)
    }
}

#[async_trait::async_trait]
impl EventSource for DevpostSource {
    async fn fetch(&self) -> Result<Vec<EventRecord>, FetchError> {
        match &self.mode {
            Mode::Http { client } => {
                let body = client
                    .get(API_URL)
                    .timeout(FETCH_TIMEOUT)
                    .send()
                    .await?
                    .error_for_status()?
                    .text()
                    .await?;
                Self::parse_listing(&body, Utc::now())
            }
            Mode::Fixture(s) => Self::parse_listing(s, Utc::now()),
        }
    }

    fn platform(&self) -> Platform {
        Platform::Devpost
    }
}
