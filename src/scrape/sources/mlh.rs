// src/scrape/sources/mlh.rs
use chrono::{DateTime, Utc};
use once_cell::sync::OnceCell;
use reqwest::Client;
use scraper::{Html, Selector};

use crate::error::FetchError;
use crate::scrape::types::{EventRecord, EventSource, Platform};
use crate::scrape::{clean_text, FETCH_TIMEOUT};

const EVENTS_URL: &str = "https://mlh.io/seasons/2026/events";
const BASE_URL: &str = "https://mlh.io";

fn sel(cell: &'static OnceCell<Selector>, css: &'static str) -> &'static Selector {
    cell.get_or_init(|| Selector::parse(css).unwrap())
}

static SEL_EVENT: OnceCell<Selector> = OnceCell::new();
static SEL_NAME: OnceCell<Selector> = OnceCell::new();
static SEL_DATE: OnceCell<Selector> = OnceCell::new();
static SEL_LINK: OnceCell<Selector> = OnceCell::new();
static SEL_NOTES: OnceCell<Selector> = OnceCell::new();

pub struct MlhSource {
    mode: Mode,
}

enum Mode {
    Http { client: Client },
    Fixture(String),
}

impl MlhSource {
    pub fn new(client: Client) -> Self {
        Self {
            mode: Mode::Http { client },
        }
    }

    /// Parse a captured events page instead of fetching; for tests.
    pub fn from_fixture_str(s: &str) -> Self {
        Self {
            mode: Mode::Fixture(s.to_string()),
        }
    }

    /// Extract event cards from the seasons page. HTML that does not match
    /// the expected structure yields fewer (or zero) records, never an error.
    fn parse_listing(html: &str, discovered_at: DateTime<Utc>) -> Vec<EventRecord> {
        let document = Html::parse_document(html);

        let mut out = Vec::new();
        for card in document.select(sel(&SEL_EVENT, "div.event")) {
            let name = card
                .select(sel(&SEL_NAME, "h3.event-name"))
                .next()
                .map(|e| clean_text(&e.text().collect::<String>()))
                .unwrap_or_default();
            if name.is_empty() {
                continue;
            }

            let link = card
                .select(sel(&SEL_LINK, "a.event-link"))
                .next()
                .and_then(|e| e.value().attr("href"))
                .map(|href| {
                    if href.starts_with("http") {
                        href.to_string()
                    } else {
                        format!("{BASE_URL}{href}")
                    }
                })
                .unwrap_or_default();

            let start_window = card
                .select(sel(&SEL_DATE, "p.event-date"))
                .next()
                .map(|e| clean_text(&e.text().collect::<String>()))
                .unwrap_or_default();

            // In-person / digital ribbon doubles as the only tag MLH exposes.
            let tags = card
                .select(sel(&SEL_NOTES, "div.event-hybrid-notes"))
                .next()
                .map(|e| clean_text(&e.text().collect::<String>()))
                .filter(|t| !t.is_empty())
                .map(|t| vec![t])
                .unwrap_or_default();

            out.push(EventRecord {
                name,
                source: Platform::Mlh,
                link,
                start_window,
                tags,
                discovered_at,
            });
        }
        out
    }
}

#[async_trait::async_trait]
impl EventSource for MlhSource {
    async fn fetch(&self) -> Result<Vec<EventRecord>, FetchError> {
        match &self.mode {
            Mode::Http { client } => {
                let body = client
                    .get(EVENTS_URL)
                    .timeout(FETCH_TIMEOUT)
                    .send()
                    .await?
                    .error_for_status()?
                    .text()
                    .await?;
                Ok(Self::parse_listing(&body, Utc::now()))
            }
            Mode::Fixture(s) => Ok(Self::parse_listing(s, Utc::now())),
        }
    }

    fn platform(&self) -> Platform {
        Platform::Mlh
    }
}
