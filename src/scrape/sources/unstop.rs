// src/scrape/sources/unstop.rs
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;

use crate::error::FetchError;
use crate::scrape::types::{EventRecord, EventSource, Platform};
use crate::scrape::{clean_text, FETCH_TIMEOUT};

const API_URL: &str =
    "https://unstop.com/api/public/opportunity/search-result?opportunity=hackathons&per_page=30&oppstatus=open";

#[derive(Debug, Deserialize)]
struct SearchResult {
    data: Option<Page>,
}

#[derive(Debug, Deserialize)]
struct Page {
    #[serde(default)]
    data: Vec<Opportunity>,
}

#[derive(Debug, Deserialize)]
struct Opportunity {
    title: Option<String>,
    public_url: Option<String>,
    seo_url: Option<String>,
    start_date: Option<String>,
    end_date: Option<String>,
    #[serde(default)]
    filters: Vec<Filter>,
}

#[derive(Debug, Deserialize)]
struct Filter {
    name: Option<String>,
}

pub struct UnstopSource {
    mode: Mode,
}

enum Mode {
    Http { client: Client },
    Fixture(String),
}

impl UnstopSource {
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
        let result: SearchResult = serde_json::from_str(body)
            .map_err(|e| FetchError::Parse(format!("unstop search json: {e}")))?;

        let opportunities = result.data.map(|p| p.data).unwrap_or_default();
        let mut out = Vec::with_capacity(opportunities.len());
        for opp in opportunities {
            let name = match opp.title.as_deref().map(clean_text) {
                Some(n) if !n.is_empty() => n,
                _ => continue,
            };

            let link = opp
                .public_url
                .filter(|u| !u.is_empty())
                .or_else(|| {
                    opp.seo_url
                        .filter(|u| !u.is_empty())
                        .map(|seo| format!("https://unstop.com/{}", seo.trim_start_matches('/')))
                })
                .unwrap_or_default();

            let start_window = match (opp.start_date.as_deref(), opp.end_date.as_deref()) {
                (Some(start), Some(end)) => format!("{start} to {end}"),
                (Some(start), None) => start.to_string(),
                (None, Some(end)) => format!("until {end}"),
                (None, None) => String::new(),
            };

            let tags = opp
                .filters
                .into_iter()
                .filter_map(|f| f.name)
                .map(|n| clean_text(&n))
                .filter(|n| !n.is_empty())
                .collect();

            out.push(EventRecord {
                name,
                source: Platform::Unstop,
                link,
                start_window,
                tags,
                discovered_at,
            });
        }
        Ok(out)
    }
}

#[async_trait::async_trait]
impl EventSource for UnstopSource {
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
        Platform::Unstop
    }
}
