// src/notify/mod.rs
//! Cycle summary notifications. Sinks are best-effort by contract: a failed
//! send is logged and swallowed, never surfaced to the cycle controller.

pub mod webhook;

use chrono::{DateTime, Utc};

use crate::error::NotificationError;
use crate::scrape::types::{EventRecord, Platform};

/// One cycle summary, handed to the sink at most once per cycle.
#[derive(Debug, Clone)]
pub struct SummaryPayload {
    pub new_count: usize,
    /// Total rows known after the append; `None` when the re-read failed.
    pub total_count: Option<usize>,
    pub records: Vec<EventRecord>,
    pub ts: DateTime<Utc>,
}

impl SummaryPayload {
    /// Synthetic payload for the `test-notify` command, bypassing the pipeline.
    pub fn synthetic() -> Self {
        let ts = Utc::now();
        Self {
            new_count: 1,
            total_count: Some(42),
            records: vec![EventRecord {
                name: "Test Hackathon".into(),
                source: Platform::Devpost,
                link: "https://example.devpost.com/".into(),
                start_window: "whenever you run test-notify".into(),
                tags: vec!["test".into()],
                discovered_at: ts,
            }],
            ts,
        }
    }

    /// Short human-readable rendering shared by the sinks.
    pub fn headline(&self) -> String {
        match self.total_count {
            Some(total) => format!(
                "{} new hackathon(s) found ({} known in total)",
                self.new_count, total
            ),
            None => format!("{} new hackathon(s) found", self.new_count),
        }
    }
}

#[async_trait::async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, payload: &SummaryPayload) -> Result<(), NotificationError>;

    fn name(&self) -> &'static str;
}

/// Push `payload` through every sink, swallowing failures.
pub async fn dispatch(sinks: &[Box<dyn Notifier>], payload: &SummaryPayload) {
    for sink in sinks {
        if let Err(e) = sink.send(payload).await {
            tracing::warn!(sink = sink.name(), error = %e, "notification failed");
        }
    }
}

/// Renders the summary into the log stream. Always available, so a machine
/// without any external notification backend still surfaces new events.
pub struct LogNotifier;

#[async_trait::async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, payload: &SummaryPayload) -> Result<(), NotificationError> {
        tracing::info!(
            new = payload.new_count,
            total = payload.total_count,
            "{}",
            payload.headline()
        );
        for rec in &payload.records {
            tracing::info!(source = %rec.source, link = %rec.link, "  {}", rec.name);
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "log"
    }
}
