// src/config.rs
//! Startup configuration, mirroring the sections of the original
//! `config.ini` control surface: `[settings]`, `[platforms]`, `[filters]`.
//!
//! A missing file is repaired by writing a commented default config next to
//! where it was expected; a malformed file is fatal.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::ConfigError;
use crate::scrape::types::Platform;

pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

const DEFAULT_CONFIG: &str = r#"[settings]
# How often to scrape, in hours. Fractional values below 1.0 switch the
# scheduler to a minute-grained test cadence.
scraping_interval = 6.0

# Where discovered events are appended.
excel_file = "hackathons_data.csv"

# Raise a summary notification when a cycle finds new events.
notifications_enabled = true

[platforms]
devpost = true
mlh = true
unstop = true

[filters]
# Hints for the control surface; not enforced by the pipeline.
min_days_notice = 1
max_days_advance = 90
keywords = ["AI", "ML", "blockchain", "web", "mobile", "hackathon"]
"#;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    pub settings: Settings,
    pub platforms: PlatformsConfig,
    pub filters: Filters,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            settings: Settings::default(),
            platforms: PlatformsConfig::default(),
            filters: Filters::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Hours between cycles; may be fractional for the test cadence.
    pub scraping_interval: f64,
    /// Path of the tabular event store.
    pub excel_file: PathBuf,
    pub notifications_enabled: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            scraping_interval: 6.0,
            excel_file: PathBuf::from("hackathons_data.csv"),
            notifications_enabled: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PlatformsConfig {
    pub devpost: bool,
    pub mlh: bool,
    pub unstop: bool,
}

impl Default for PlatformsConfig {
    fn default() -> Self {
        Self {
            devpost: true,
            mlh: true,
            unstop: true,
        }
    }
}

impl PlatformsConfig {
    pub fn is_enabled(&self, platform: Platform) -> bool {
        match platform {
            Platform::Devpost => self.devpost,
            Platform::Mlh => self.mlh,
            Platform::Unstop => self.unstop,
        }
    }

    pub fn enabled(&self) -> Vec<Platform> {
        Platform::ALL
            .into_iter()
            .filter(|p| self.is_enabled(*p))
            .collect()
    }
}

/// Notification filter hints. Parsed for the external control surface; the
/// core pipeline does not enforce them.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Filters {
    pub min_days_notice: u32,
    pub max_days_advance: u32,
    pub keywords: Vec<String>,
}

impl Default for Filters {
    fn default() -> Self {
        Self {
            min_days_notice: 1,
            max_days_advance: 90,
            keywords: vec![
                "AI".into(),
                "ML".into(),
                "blockchain".into(),
                "web".into(),
                "mobile".into(),
                "hackathon".into(),
            ],
        }
    }
}

impl MonitorConfig {
    /// Load from `path`, creating a commented default file first when none
    /// exists yet.
    pub fn load_or_init(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!(path = %path.display(), "config not found, writing defaults");
            std::fs::write(path, DEFAULT_CONFIG).map_err(|source| ConfigError::Io {
                path: path.to_path_buf(),
                source,
            })?;
        }
        Self::load(path)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: MonitorConfig =
            toml::from_str(&content).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !self.settings.scraping_interval.is_finite() || self.settings.scraping_interval <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "scraping_interval must be a positive number of hours, got {}",
                self.settings.scraping_interval
            )));
        }
        if self.settings.excel_file.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("excel_file must not be empty".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_text_parses_to_defaults() {
        let config: MonitorConfig = toml::from_str(DEFAULT_CONFIG).unwrap();
        assert_eq!(config.settings.scraping_interval, 6.0);
        assert_eq!(
            config.settings.excel_file,
            PathBuf::from("hackathons_data.csv")
        );
        assert!(config.settings.notifications_enabled);
        assert_eq!(config.platforms.enabled(), Platform::ALL.to_vec());
        assert_eq!(config.filters.max_days_advance, 90);
    }

    #[test]
    fn partial_config_falls_back_to_defaults() {
        let config: MonitorConfig = toml::from_str(
            r#"
            [settings]
            scraping_interval = 0.1

            [platforms]
            mlh = false
            "#,
        )
        .unwrap();
        assert_eq!(config.settings.scraping_interval, 0.1);
        assert!(config.settings.notifications_enabled);
        assert_eq!(
            config.platforms.enabled(),
            vec![Platform::Devpost, Platform::Unstop]
        );
    }

    #[test]
    fn missing_file_is_created_then_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let config = MonitorConfig::load_or_init(&path).unwrap();
        assert!(path.exists());
        assert_eq!(config.settings.scraping_interval, 6.0);
    }

    #[test]
    fn non_positive_interval_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[settings]\nscraping_interval = 0.0\n").unwrap();

        let err = MonitorConfig::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[settings\nscraping_interval = 6").unwrap();

        let err = MonitorConfig::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }
}
