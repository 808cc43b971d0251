//! Hackathon Monitor — Binary Entrypoint
//!
//! Scrapes hackathon platforms on a schedule, appends new events to a tabular
//! file, and raises a single summary notification per cycle.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use hackathon_monitor::config::{MonitorConfig, DEFAULT_CONFIG_PATH};
use hackathon_monitor::cycle::CycleRunner;
use hackathon_monitor::notify::{self, webhook::WebhookNotifier, LogNotifier, Notifier, SummaryPayload};
use hackathon_monitor::scheduler::{Mode, Scheduler};
use hackathon_monitor::scrape::{self, registry};
use hackathon_monitor::store::EventStore;

#[derive(Parser)]
#[command(name = "hackathon-monitor", about = "Monitors hackathon platforms and records new events", version)]
struct Cli {
    /// Path to the TOML configuration; created with defaults when missing.
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Execute exactly one scraping cycle and exit.
    RunOnce,
    /// Enter the recurring scheduler loop until interrupted.
    RunForever,
    /// Send a synthetic summary through the notification sinks.
    TestNotify,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn build_sinks() -> Vec<Box<dyn Notifier>> {
    let mut sinks: Vec<Box<dyn Notifier>> = vec![Box::new(LogNotifier)];
    let webhook = WebhookNotifier::from_env();
    if webhook.is_configured() {
        sinks.push(Box::new(webhook));
    }
    sinks
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env in local/dev; no-op when absent.
    let _ = dotenvy::dotenv();
    init_tracing();

    let cli = Cli::parse();

    let config = MonitorConfig::load_or_init(&cli.config)
        .with_context(|| format!("loading configuration from {}", cli.config.display()))?;
    tracing::info!(path = %cli.config.display(), "configuration loaded");

    let sinks = build_sinks();

    match cli.command {
        Command::TestNotify => {
            notify::dispatch(&sinks, &SummaryPayload::synthetic()).await;
            return Ok(());
        }
        Command::RunOnce | Command::RunForever => {}
    }

    let client = scrape::default_client().context("building http client")?;
    let sources = registry::build_sources(&config.platforms, &client);
    if sources.is_empty() {
        tracing::warn!("no platforms enabled; cycles will find nothing");
    }

    let store = EventStore::new(config.settings.excel_file.clone());
    let runner = CycleRunner::new(
        store,
        sources,
        sinks,
        config.settings.notifications_enabled,
    );

    let mode = match cli.command {
        Command::RunOnce => Mode::RunOnce,
        Command::RunForever => Mode::RunForever,
        Command::TestNotify => unreachable!("handled above"),
    };

    let (stop_tx, stop_rx) = tokio::sync::watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("interrupt received, stopping after the current state");
            let _ = stop_tx.send(true);
        }
    });

    let scheduler = Scheduler::new(runner, config.settings.scraping_interval, mode);
    scheduler.run(stop_rx).await.context("scraping cycle failed")?;

    Ok(())
}
