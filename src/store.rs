// src/store.rs
//! Append-only tabular store for discovered events.
//!
//! One CSV file with a fixed six-column header. Rows are appended, never
//! rewritten in place, never reordered, never deleted. The file is assumed to
//! have a single writer (the running cycle); no cross-process locking is
//! attempted.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::PersistenceError;
use crate::scrape::types::{EventRecord, Platform};

pub const HEADER: [&str; 6] = [
    "name",
    "source",
    "link",
    "start_window",
    "tags",
    "discovered_at",
];

const TAG_SEPARATOR: &str = "; ";

/// Flat on-disk row. Tags are joined into one cell, timestamps are RFC 3339.
#[derive(Debug, Serialize, Deserialize)]
struct Row {
    name: String,
    source: String,
    link: String,
    start_window: String,
    tags: String,
    discovered_at: String,
}

impl Row {
    fn from_record(rec: &EventRecord) -> Self {
        Self {
            name: rec.name.clone(),
            source: rec.source.to_string(),
            link: rec.link.clone(),
            start_window: rec.start_window.clone(),
            tags: rec.tags.join(TAG_SEPARATOR),
            discovered_at: rec.discovered_at.to_rfc3339(),
        }
    }

    fn into_record(self) -> Result<EventRecord, PersistenceError> {
        let source = Platform::from_str(&self.source).map_err(PersistenceError::Corrupt)?;
        let discovered_at = DateTime::parse_from_rfc3339(&self.discovered_at)
            .map_err(|e| {
                PersistenceError::Corrupt(format!("timestamp {:?}: {e}", self.discovered_at))
            })?
            .with_timezone(&Utc);
        let tags = self
            .tags
            .split(';')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect();

        Ok(EventRecord {
            name: self.name,
            source,
            link: self.link,
            start_window: self.start_window,
            tags,
            discovered_at,
        })
    }
}

/// Durable collection of event records backed by one CSV file.
#[derive(Debug, Clone)]
pub struct EventStore {
    path: PathBuf,
}

impl EventStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All previously persisted records, in file order. A missing backing file
    /// is a valid initial state and yields an empty list, not an error.
    pub fn list_existing(&self) -> Result<Vec<EventRecord>, PersistenceError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let mut reader = csv::Reader::from_path(&self.path)?;
        let mut records = Vec::new();
        for row in reader.deserialize::<Row>() {
            records.push(row?.into_record()?);
        }
        Ok(records)
    }

    /// Durably append `records`, creating the file (with its header) when it
    /// does not exist yet.
    ///
    /// The rows are written to a temporary file alongside the target and
    /// renamed over it, so a failed call leaves the existing data untouched:
    /// either all of `records` are visible afterward or none are.
    pub fn append(&self, records: &[EventRecord]) -> Result<(), PersistenceError> {
        if records.is_empty() {
            return Ok(());
        }

        let existing = match std::fs::read(&self.path) {
            Ok(bytes) => Some(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => return Err(e.into()),
        };

        let dir = self.path.parent().filter(|p| !p.as_os_str().is_empty());
        let mut tmp = match dir {
            Some(dir) => tempfile::NamedTempFile::new_in(dir)?,
            None => tempfile::NamedTempFile::new_in(".")?,
        };

        match &existing {
            Some(bytes) => tmp.write_all(bytes)?,
            None => {
                let mut header = HEADER.join(",");
                header.push('\n');
                tmp.write_all(header.as_bytes())?;
            }
        }

        {
            let mut writer = csv::WriterBuilder::new()
                .has_headers(false)
                .from_writer(&mut tmp);
            for rec in records {
                writer.serialize(Row::from_record(rec))?;
            }
            writer.flush()?;
        }
        tmp.as_file().sync_all()?;

        tmp.persist(&self.path).map_err(|e| e.error)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn rec(name: &str, source: Platform) -> EventRecord {
        EventRecord {
            name: name.to_string(),
            source,
            link: format!("https://example.test/{name}"),
            start_window: "Jun 01 - Jun 03".into(),
            tags: vec!["ai".into(), "web".into()],
            discovered_at: Utc.with_ymd_and_hms(2025, 6, 1, 8, 30, 0).unwrap(),
        }
    }

    #[test]
    fn missing_file_lists_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = EventStore::new(dir.path().join("events.csv"));
        assert!(store.list_existing().unwrap().is_empty());
    }

    #[test]
    fn append_creates_file_with_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events.csv");
        let store = EventStore::new(&path);

        store.append(&[rec("Alpha", Platform::Devpost)]).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let first_line = contents.lines().next().unwrap();
        assert_eq!(first_line, HEADER.join(","));
    }

    #[test]
    fn append_empty_is_a_noop() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events.csv");
        let store = EventStore::new(&path);

        store.append(&[]).unwrap();
        assert!(!path.exists());

        store.append(&[rec("Alpha", Platform::Devpost)]).unwrap();
        let before = store.list_existing().unwrap();
        store.append(&[]).unwrap();
        let after = store.list_existing().unwrap();
        assert_eq!(before, after);
    }

    #[test]
    fn roundtrips_fields_and_preserves_order() {
        let dir = tempfile::tempdir().unwrap();
        let store = EventStore::new(dir.path().join("events.csv"));

        store
            .append(&[rec("Alpha", Platform::Devpost), rec("Beta", Platform::Mlh)])
            .unwrap();
        store.append(&[rec("Gamma", Platform::Unstop)]).unwrap();

        let listed = store.list_existing().unwrap();
        let names: Vec<_> = listed.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Alpha", "Beta", "Gamma"]);
        assert_eq!(listed[0], rec("Alpha", Platform::Devpost));
        assert_eq!(listed[0].tags, vec!["ai".to_string(), "web".to_string()]);
    }

    #[test]
    fn append_into_missing_directory_fails_cleanly() {
        let dir = tempfile::tempdir().unwrap();
        let store = EventStore::new(dir.path().join("no_such_subdir").join("events.csv"));

        let err = store.append(&[rec("Alpha", Platform::Devpost)]).unwrap_err();
        assert!(matches!(err, PersistenceError::Io(_)));
    }

    #[test]
    fn unknown_source_in_a_row_is_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events.csv");
        let mut contents = HEADER.join(",");
        contents.push_str("\nAlpha,itch,,,,2025-06-01T08:30:00+00:00\n");
        std::fs::write(&path, contents).unwrap();

        let err = EventStore::new(&path).list_existing().unwrap_err();
        assert!(matches!(err, PersistenceError::Corrupt(_)));
    }

    #[test]
    fn commas_and_quotes_in_fields_survive() {
        let dir = tempfile::tempdir().unwrap();
        let store = EventStore::new(dir.path().join("events.csv"));

        let mut tricky = rec("Hack, the \"Planet\"", Platform::Devpost);
        tricky.start_window = "Jun 01, 2025 - Jun 03, 2025".into();
        store.append(std::slice::from_ref(&tricky)).unwrap();

        let listed = store.list_existing().unwrap();
        assert_eq!(listed, vec![tricky]);
    }
}
