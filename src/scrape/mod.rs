// src/scrape/mod.rs
//! Fetch orchestration: fan out to the enabled source adapters, isolate
//! per-adapter failures, and aggregate candidates deterministically.

pub mod registry;
pub mod sources;
pub mod types;

use std::time::Duration;

use once_cell::sync::OnceCell;
use reqwest::Client;

use crate::error::FetchError;
use crate::scrape::types::{EventRecord, EventSource, Platform};

/// Per-adapter retrieval bound.
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Listing pages answer a browser UA; the reqwest default gets bot-walled.
const USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

pub fn default_client() -> Result<Client, reqwest::Error> {
    Client::builder().user_agent(USER_AGENT).build()
}

/// Collapse whitespace, decode HTML entities, trim.
pub(crate) fn clean_text(s: &str) -> String {
    let decoded = html_escape::decode_html_entities(s).to_string();

    static RE_WS: OnceCell<regex::Regex> = OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| regex::Regex::new(r"\s+").unwrap());
    re_ws.replace_all(&decoded, " ").trim().to_string()
}

/// What one adapter produced this cycle: a count, or an error kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceOutcome {
    pub count: usize,
    pub error: Option<String>,
}

/// All candidates from one fan-out plus the per-source outcomes, in
/// source-enable order.
#[derive(Debug, Default)]
pub struct FetchBatch {
    pub candidates: Vec<EventRecord>,
    pub outcomes: Vec<(Platform, SourceOutcome)>,
}

/// Invoke every adapter's `fetch()` concurrently and collect the results.
///
/// One adapter failing must not abort the others; its outcome records the
/// error kind and contributes zero candidates. The combined candidate list is
/// ordered by source-enable order, then by each adapter's own return order.
pub async fn fetch_all(sources: &[Box<dyn EventSource>]) -> FetchBatch {
    // join_all keeps result order aligned with input order, and the fan-out
    // is bounded by the number of enabled sources.
    let results: Vec<Result<Vec<EventRecord>, FetchError>> =
        futures::future::join_all(sources.iter().map(|s| s.fetch())).await;

    let mut batch = FetchBatch::default();
    for (source, result) in sources.iter().zip(results) {
        let platform = source.platform();
        match result {
            Ok(records) => {
                tracing::info!(source = %platform, count = records.len(), "source fetched");
                batch
                    .outcomes
                    .push((platform, SourceOutcome { count: records.len(), error: None }));
                batch.candidates.extend(records);
            }
            Err(e) => {
                tracing::warn!(source = %platform, error = %e, "source failed");
                batch.outcomes.push((
                    platform,
                    SourceOutcome { count: 0, error: Some(e.kind().to_string()) },
                ));
            }
        }
    }
    batch
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    struct StaticSource {
        platform: Platform,
        names: Vec<&'static str>,
    }

    #[async_trait::async_trait]
    impl EventSource for StaticSource {
        async fn fetch(&self) -> Result<Vec<EventRecord>, FetchError> {
            Ok(self
                .names
                .iter()
                .map(|n| EventRecord {
                    name: n.to_string(),
                    source: self.platform,
                    link: String::new(),
                    start_window: String::new(),
                    tags: vec![],
                    discovered_at: Utc::now(),
                })
                .collect())
        }

        fn platform(&self) -> Platform {
            self.platform
        }
    }

    struct FailingSource;

    #[async_trait::async_trait]
    impl EventSource for FailingSource {
        async fn fetch(&self) -> Result<Vec<EventRecord>, FetchError> {
            Err(FetchError::Parse("boom".into()))
        }

        fn platform(&self) -> Platform {
            Platform::Mlh
        }
    }

    #[tokio::test]
    async fn aggregation_order_is_enable_order_then_return_order() {
        let sources: Vec<Box<dyn EventSource>> = vec![
            Box::new(StaticSource { platform: Platform::Devpost, names: vec!["A1", "A2"] }),
            Box::new(StaticSource { platform: Platform::Unstop, names: vec!["B1"] }),
        ];
        let batch = fetch_all(&sources).await;
        let names: Vec<_> = batch.candidates.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["A1", "A2", "B1"]);
    }

    #[tokio::test]
    async fn one_failure_does_not_abort_the_others() {
        let sources: Vec<Box<dyn EventSource>> = vec![
            Box::new(StaticSource { platform: Platform::Devpost, names: vec!["A1"] }),
            Box::new(FailingSource),
            Box::new(StaticSource { platform: Platform::Unstop, names: vec!["C1"] }),
        ];
        let batch = fetch_all(&sources).await;

        assert_eq!(batch.candidates.len(), 2);
        assert_eq!(batch.outcomes.len(), 3);
        assert_eq!(
            batch.outcomes[1],
            (
                Platform::Mlh,
                SourceOutcome { count: 0, error: Some("parse".into()) }
            )
        );
        assert_eq!(batch.outcomes[0].1.error, None);
        assert_eq!(batch.outcomes[2].1.count, 1);
    }

    #[test]
    fn clean_text_decodes_and_collapses() {
        assert_eq!(clean_text("  Hack&nbsp;the\n Planet "), "Hack the Planet");
    }
}
