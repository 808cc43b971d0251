// src/scrape/types.rs
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};

use crate::error::FetchError;

/// One of the monitored hackathon platforms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Devpost,
    Mlh,
    Unstop,
}

impl Platform {
    /// All known platforms, in the fixed enable order used by the registry.
    pub const ALL: [Platform; 3] = [Platform::Devpost, Platform::Mlh, Platform::Unstop];

    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Devpost => "devpost",
            Platform::Mlh => "mlh",
            Platform::Unstop => "unstop",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "devpost" => Ok(Platform::Devpost),
            "mlh" => Ok(Platform::Mlh),
            "unstop" => Ok(Platform::Unstop),
            other => Err(format!("unknown platform: {other}")),
        }
    }
}

/// A discovered event, as extracted by one source adapter.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct EventRecord {
    pub name: String,
    pub source: Platform,
    /// Best-effort URL to the event page.
    pub link: String,
    /// Free-text date/availability hint; sources do not guarantee structured dates.
    pub start_window: String,
    pub tags: Vec<String>,
    /// Stamped by the adapter at fetch completion, not taken from the source.
    pub discovered_at: DateTime<Utc>,
}

impl EventRecord {
    /// De-duplication key: `(case-folded + trimmed name, source)`.
    /// Two records sharing this key are the same event regardless of any
    /// other field differences.
    pub fn identity_key(&self) -> IdentityKey {
        (normalize_name(&self.name), self.source)
    }
}

pub type IdentityKey = (String, Platform);

/// Case-fold + trim. The whole identity contract lives here.
pub fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Capability set of a source adapter: fetch, and nothing else.
/// Adapters are stateless across invocations.
#[async_trait::async_trait]
pub trait EventSource: Send + Sync {
    /// Best-effort retrieval with a bounded timeout. Transport failures and
    /// unparseable payloads are `FetchError`; zero extracted records is not.
    async fn fetch(&self) -> Result<Vec<EventRecord>, FetchError>;

    fn platform(&self) -> Platform;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_key_case_folds_and_trims() {
        let rec = EventRecord {
            name: "  Global AI Hack  ".into(),
            source: Platform::Devpost,
            link: String::new(),
            start_window: String::new(),
            tags: vec![],
            discovered_at: Utc::now(),
        };
        assert_eq!(
            rec.identity_key(),
            ("global ai hack".to_string(), Platform::Devpost)
        );
    }

    #[test]
    fn same_name_different_source_is_a_different_identity() {
        assert_ne!(
            (normalize_name("Alpha"), Platform::Devpost),
            (normalize_name("Alpha"), Platform::Mlh)
        );
    }

    #[test]
    fn platform_roundtrips_through_str() {
        for p in Platform::ALL {
            assert_eq!(p.as_str().parse::<Platform>().unwrap(), p);
        }
        assert!("itch".parse::<Platform>().is_err());
    }
}
