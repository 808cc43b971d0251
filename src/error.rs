// src/error.rs
use std::path::PathBuf;

use thiserror::Error;

/// Adapter-level failure. Isolated per source at the orchestrator boundary;
/// never propagates past it.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected payload: {0}")]
    Parse(String),
}

impl FetchError {
    /// Short kind tag recorded in per-source outcomes.
    pub fn kind(&self) -> &'static str {
        match self {
            FetchError::Http(_) => "http",
            FetchError::Parse(_) => "parse",
        }
    }
}

/// Record Store read/write failure. Aborts the current cycle only.
#[derive(Error, Debug)]
pub enum PersistenceError {
    #[error("store i/o: {0}")]
    Io(#[from] std::io::Error),

    #[error("store encoding: {0}")]
    Csv(#[from] csv::Error),

    #[error("bad stored row: {0}")]
    Corrupt(String),
}

/// Malformed or missing required configuration. Fatal at startup only.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("reading config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parsing config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Sink-level notification failure. Logged and swallowed at the dispatch
/// boundary, never surfaced to the controller.
#[derive(Error, Debug)]
pub enum NotificationError {
    #[error("webhook post failed: {0}")]
    Webhook(String),

    #[error("no notification backend available")]
    Unavailable,
}
