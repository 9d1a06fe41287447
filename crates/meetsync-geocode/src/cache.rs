//! Persistent geocode cache.
//!
//! Survives across runs under `DATA_DIR` so repeat syncs do not re-query
//! Nominatim for addresses that have not changed. Loading tolerates a
//! missing or corrupt file (the cache just starts empty); saving goes
//! through a `.tmp` sibling and an atomic rename.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::GeocodeError;

const CACHE_FILE: &str = "geocode_cache.json";

/// Address query → `(lat, lon)` map, persisted as JSON.
#[derive(Debug, Default)]
pub struct GeocodeCache {
    path: PathBuf,
    entries: BTreeMap<String, (f64, f64)>,
}

impl GeocodeCache {
    /// The cache file location inside a data directory.
    #[must_use]
    pub fn path_in(data_dir: &Path) -> PathBuf {
        data_dir.join(CACHE_FILE)
    }

    /// Loads the cache from `path`. A missing or unreadable file yields an
    /// empty cache rather than an error; stale cache data is never worth
    /// failing a sync run over.
    #[must_use]
    pub fn load(path: PathBuf) -> Self {
        let entries = fs::read_to_string(&path)
            .ok()
            .and_then(|raw| serde_json::from_str::<BTreeMap<String, (f64, f64)>>(&raw).ok())
            .unwrap_or_default();
        if !entries.is_empty() {
            tracing::debug!(count = entries.len(), path = %path.display(), "loaded geocode cache");
        }
        Self { path, entries }
    }

    #[must_use]
    pub fn get(&self, query: &str) -> Option<(f64, f64)> {
        self.entries.get(query).copied()
    }

    pub fn insert(&mut self, query: String, coords: (f64, f64)) {
        self.entries.insert(query, coords);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Writes the cache back to disk atomically.
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError::CacheIo`] if the parent directory cannot be
    /// created or the file cannot be written or renamed into place.
    pub fn save(&self) -> Result<(), GeocodeError> {
        let io_err = |source: std::io::Error| GeocodeError::CacheIo {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(io_err)?;
        }

        let body = serde_json::to_vec_pretty(&self.entries).map_err(|e| GeocodeError::CacheIo {
            path: self.path.clone(),
            source: std::io::Error::other(e),
        })?;

        let mut tmp = self.path.as_os_str().to_owned();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        fs::write(&tmp, body).map_err(io_err)?;
        fs::rename(&tmp, &self.path).map_err(io_err)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_loads_empty() {
        let dir = tempfile::tempdir().expect("tempdir");
        let cache = GeocodeCache::load(GeocodeCache::path_in(dir.path()));
        assert!(cache.is_empty());
    }

    #[test]
    fn corrupt_file_loads_empty() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = GeocodeCache::path_in(dir.path());
        fs::write(&path, "{not json").expect("write");
        let cache = GeocodeCache::load(path);
        assert!(cache.is_empty());
    }

    #[test]
    fn round_trips_through_disk() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = GeocodeCache::path_in(dir.path());

        let mut cache = GeocodeCache::load(path.clone());
        cache.insert("Esimerkkikatu 1, Helsinki".to_owned(), (60.17, 24.94));
        cache.save().expect("save");

        let reloaded = GeocodeCache::load(path);
        assert_eq!(reloaded.len(), 1);
        assert_eq!(
            reloaded.get("Esimerkkikatu 1, Helsinki"),
            Some((60.17, 24.94))
        );
    }

    #[test]
    fn save_leaves_no_tmp_file_behind() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = GeocodeCache::path_in(dir.path());

        let mut cache = GeocodeCache::load(path.clone());
        cache.insert("q".to_owned(), (1.0, 2.0));
        cache.save().expect("save");

        let leftovers: Vec<_> = fs::read_dir(dir.path())
            .expect("read_dir")
            .filter_map(Result::ok)
            .filter(|e| e.path().extension().is_some_and(|ext| ext == "tmp"))
            .collect();
        assert!(leftovers.is_empty(), "tmp file left behind: {leftovers:?}");
    }

    #[test]
    fn coordinates_persist_as_json_pairs() {
        // Wire format compatibility: entries are `query: [lat, lon]`.
        let dir = tempfile::tempdir().expect("tempdir");
        let path = GeocodeCache::path_in(dir.path());

        let mut cache = GeocodeCache::load(path.clone());
        cache.insert("q".to_owned(), (60.5, 24.5));
        cache.save().expect("save");

        let raw = fs::read_to_string(&path).expect("read");
        let value: serde_json::Value = serde_json::from_str(&raw).expect("parse");
        assert_eq!(value["q"], serde_json::json!([60.5, 24.5]));
    }
}
