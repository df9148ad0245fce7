use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::Config;

/// File name of the persisted list, inside the platform data directory.
pub const RECENT_PLACES_FILE: &str = "recent_places.json";

pub const MAX_RECENT_PLACES: usize = 5;

/// Most-recent-first list of searched place names.
///
/// Serialized as a plain JSON array of strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecentPlaces(Vec<String>);

impl RecentPlaces {
    pub fn entries(&self) -> &[String] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Record a search. Names already in the list are left where they are.
    /// Returns whether the list changed.
    pub fn record(&mut self, name: &str) -> bool {
        let name = name.trim();
        if name.is_empty() || self.0.iter().any(|n| n == name) {
            return false;
        }

        self.0.insert(0, name.to_string());
        self.0.truncate(MAX_RECENT_PLACES);
        true
    }
}

/// JSON file holding [`RecentPlaces`].
#[derive(Debug, Clone)]
pub struct RecentPlacesStore {
    path: PathBuf,
}

impl RecentPlacesStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at the platform data directory.
    pub fn open_default() -> Result<Self> {
        Ok(Self::new(Config::recent_places_path()?))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the list. A missing file is an empty list; an unreadable one is
    /// logged and treated as empty.
    pub fn load(&self) -> Result<RecentPlaces> {
        if !self.path.exists() {
            return Ok(RecentPlaces::default());
        }

        let contents = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read recent places: {}", self.path.display()))?;

        match serde_json::from_str::<RecentPlaces>(&contents) {
            Ok(mut places) => {
                places.0.truncate(MAX_RECENT_PLACES);
                Ok(places)
            }
            Err(e) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "Ignoring corrupt recent places file"
                );
                Ok(RecentPlaces::default())
            }
        }
    }

    pub fn save(&self, places: &RecentPlaces) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create data directory: {}", parent.display())
            })?;
        }

        let json = serde_json::to_string(places).context("Failed to serialize recent places")?;

        fs::write(&self.path, json)
            .with_context(|| format!("Failed to write recent places: {}", self.path.display()))
    }

    /// Load, record `name`, and persist if the list changed.
    pub fn record(&self, name: &str) -> Result<RecentPlaces> {
        let mut places = self.load()?;
        if places.record(name) {
            self.save(&places)?;
        }
        Ok(places)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(places: &RecentPlaces) -> Vec<&str> {
        places.entries().iter().map(String::as_str).collect()
    }

    #[test]
    fn keeps_five_most_recent_first() {
        let mut places = RecentPlaces::default();
        for n in ["Paris", "Tokyo", "Lima", "Oslo", "Doha", "Rome"] {
            assert!(places.record(n));
        }

        assert_eq!(names(&places), ["Rome", "Doha", "Oslo", "Lima", "Tokyo"]);
    }

    #[test]
    fn existing_entry_is_not_promoted() {
        let mut places = RecentPlaces::default();
        for n in ["Paris", "Tokyo", "Lima", "Oslo", "Doha", "Rome"] {
            places.record(n);
        }
        let before = places.clone();

        assert!(!places.record("Lima"));
        assert_eq!(places, before);
    }

    #[test]
    fn trims_and_ignores_blank_names() {
        let mut places = RecentPlaces::default();
        assert!(places.record("  Paris "));
        assert!(!places.record("Paris"));
        assert!(!places.record("   "));

        assert_eq!(names(&places), ["Paris"]);
    }

    #[test]
    fn dedup_is_exact_match() {
        let mut places = RecentPlaces::default();
        places.record("paris");
        places.record("Paris");

        assert_eq!(names(&places), ["Paris", "paris"]);
    }

    #[test]
    fn store_persists_json_array() {
        let dir = tempfile::tempdir().unwrap();
        let store = RecentPlacesStore::new(dir.path().join("data").join(RECENT_PLACES_FILE));

        store.record("Paris").unwrap();
        store.record("Tokyo").unwrap();

        let raw = fs::read_to_string(store.path()).unwrap();
        assert_eq!(raw, r#"["Tokyo","Paris"]"#);
        assert_eq!(names(&store.load().unwrap()), ["Tokyo", "Paris"]);
    }

    #[test]
    fn missing_or_corrupt_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = RecentPlacesStore::new(dir.path().join(RECENT_PLACES_FILE));
        assert!(store.load().unwrap().is_empty());

        fs::write(store.path(), "{not json").unwrap();
        assert!(store.load().unwrap().is_empty());
    }
}
