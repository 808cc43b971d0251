// src/cycle.rs
//! One full scraping cycle: load known identities, fan out to the sources,
//! de-duplicate, append, notify.

use chrono::Utc;

use crate::dedup::{self, IdentitySet};
use crate::error::PersistenceError;
use crate::notify::{self, Notifier, SummaryPayload};
use crate::scrape::types::{EventRecord, EventSource, Platform};
use crate::scrape::{self, SourceOutcome};
use crate::store::EventStore;

/// Ephemeral result of one cycle; discarded after notification dispatch.
#[derive(Debug)]
pub struct CycleReport {
    pub new_records: Vec<EventRecord>,
    pub outcomes: Vec<(Platform, SourceOutcome)>,
    pub total_known_after: Option<usize>,
}

pub struct CycleRunner {
    store: EventStore,
    sources: Vec<Box<dyn EventSource>>,
    sinks: Vec<Box<dyn Notifier>>,
    notifications_enabled: bool,
}

impl CycleRunner {
    pub fn new(
        store: EventStore,
        sources: Vec<Box<dyn EventSource>>,
        sinks: Vec<Box<dyn Notifier>>,
        notifications_enabled: bool,
    ) -> Self {
        Self {
            store,
            sources,
            sinks,
            notifications_enabled,
        }
    }

    /// Execute one cycle. Store failures abort the cycle and surface here;
    /// adapter failures are already isolated inside the orchestrator and
    /// notification failures inside the sinks.
    pub async fn run_cycle(&self) -> Result<CycleReport, PersistenceError> {
        tracing::info!("starting scraping cycle");

        // Snapshot the known identities once; this cycle's own appends must
        // not be visible to its own dedup step.
        let existing = self.store.list_existing()?;
        let known = IdentitySet::from_records(&existing);

        let batch = scrape::fetch_all(&self.sources).await;
        let new_records = dedup::filter_new(batch.candidates, &known);

        self.store.append(&new_records)?;

        let total_known_after = match self.store.list_existing() {
            Ok(records) => Some(records.len()),
            Err(e) => {
                tracing::warn!(error = %e, "could not re-read store for total count");
                None
            }
        };

        if new_records.is_empty() {
            tracing::info!("no new hackathons found");
        } else {
            tracing::info!(count = new_records.len(), "found and saved new hackathons");
            if self.notifications_enabled {
                let payload = SummaryPayload {
                    new_count: new_records.len(),
                    total_count: total_known_after,
                    records: new_records.clone(),
                    ts: Utc::now(),
                };
                notify::dispatch(&self.sinks, &payload).await;
            }
        }

        Ok(CycleReport {
            new_records,
            outcomes: batch.outcomes,
            total_known_after,
        })
    }
}
