pub mod file;
pub mod memory;
pub mod traits;

use crate::{
    config::StoreConfig,
    error::{ArtGenError, Result},
    models::GalleryRecord,
};

pub use file::FileStore;
pub use memory::MemoryStore;
pub use traits::{KeyValueStore, StorageStats};

/// The local gallery: newest-first records mirrored to one key of a
/// [`KeyValueStore`]. Every mutation is written through before it returns;
/// if the write fails the in-memory list is rolled back, so memory and
/// storage never disagree.
pub struct GalleryStore {
    backend: Box<dyn KeyValueStore>,
    key: String,
    records: Vec<GalleryRecord>,
}

impl GalleryStore {
    /// Opens the gallery and loads whatever was saved under `key`.
    pub fn open(backend: Box<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        let mut store = Self {
            backend,
            key: key.into(),
            records: Vec::new(),
        };
        store.load();
        store
    }

    pub fn from_config(config: &StoreConfig) -> Result<Self> {
        let dir = config.resolve_data_dir().ok_or_else(|| {
            ArtGenError::ConfigError("No data directory available for the gallery".into())
        })?;
        log::debug!("Gallery directory: {}", dir.display());
        Ok(Self::open(
            Box::new(FileStore::new(dir)),
            config.gallery_key.clone(),
        ))
    }

    /// Reloads from storage. Missing or unreadable data is an empty gallery.
    pub fn load(&mut self) -> &[GalleryRecord] {
        self.records = match self.backend.get(&self.key) {
            Ok(Some(raw)) => match serde_json::from_str::<Vec<GalleryRecord>>(&raw) {
                Ok(records) => records,
                Err(e) => {
                    log::warn!("⚠️  Ignoring malformed gallery data: {}", e);
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(e) => {
                log::warn!("⚠️  Could not read gallery, starting empty: {}", e);
                Vec::new()
            }
        };
        log::debug!("Loaded {} gallery records", self.records.len());
        &self.records
    }

    pub fn records(&self) -> &[GalleryRecord] {
        &self.records
    }

    pub fn get(&self, id: &str) -> Option<&GalleryRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// A record id that sorts after everything already stored, based on
    /// the current time in milliseconds.
    pub fn next_id(&self, candidate: &GalleryRecord) -> String {
        let wanted: i64 = candidate.id.parse().unwrap_or(0);
        let newest = self
            .records
            .iter()
            .filter_map(|r| r.id.parse::<i64>().ok())
            .max();
        match newest {
            Some(newest) if wanted <= newest => (newest + 1).to_string(),
            _ => candidate.id.clone(),
        }
    }

    /// Prepends `record` and persists.
    pub fn add(&mut self, record: GalleryRecord) -> Result<()> {
        let previous = self.records.clone();
        self.records.insert(0, record);
        self.commit(previous)
    }

    /// Removes the record with `id`; unknown ids leave everything untouched.
    pub fn remove(&mut self, id: &str) -> Result<()> {
        let previous = self.records.clone();
        self.records.retain(|r| r.id != id);
        self.commit(previous)
    }

    pub fn clear(&mut self) -> Result<()> {
        let previous = std::mem::take(&mut self.records);
        self.commit(previous)
    }

    pub fn stats(&self) -> StorageStats {
        StorageStats {
            total_records: self.records.len(),
            newest_id: self.records.first().map(|r| r.id.clone()),
            oldest_id: self.records.last().map(|r| r.id.clone()),
        }
    }

    fn commit(&mut self, previous: Vec<GalleryRecord>) -> Result<()> {
        let written = serde_json::to_string(&self.records)
            .map_err(ArtGenError::from)
            .and_then(|raw| self.backend.set(&self.key, &raw));

        if let Err(e) = written {
            log::error!("❌ Failed to persist gallery: {}", e);
            self.records = previous;
            return Err(e);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, SubsecRound, Utc};

    const KEY: &str = "generatedImages";

    fn record(id: &str, prompt: &str, seconds_ago: i64) -> GalleryRecord {
        GalleryRecord {
            id: id.to_string(),
            url: format!("https://img.example/{}.png", id),
            prompt: prompt.to_string(),
            timestamp: (Utc::now() - Duration::seconds(seconds_ago)).trunc_subsecs(3),
        }
    }

    fn reopen(backend: &MemoryStore) -> GalleryStore {
        GalleryStore::open(Box::new(backend.clone()), KEY)
    }

    struct BrokenStore;

    impl KeyValueStore for BrokenStore {
        fn get(&self, _key: &str) -> Result<Option<String>> {
            Err(ArtGenError::StorageError("disk on fire".into()))
        }
        fn set(&mut self, _key: &str, _value: &str) -> Result<()> {
            Err(ArtGenError::StorageError("disk on fire".into()))
        }
    }

    #[test]
    fn empty_storage_loads_empty() {
        assert!(reopen(&MemoryStore::new()).is_empty());
    }

    #[test]
    fn add_prepends_and_survives_reload() {
        let backend = MemoryStore::new();
        let mut gallery = reopen(&backend);
        gallery.add(record("1", "first", 20)).unwrap();
        gallery.add(record("2", "second", 10)).unwrap();

        let reloaded = reopen(&backend);
        assert_eq!(reloaded.records()[0].id, "2");
        assert_eq!(reloaded.records(), gallery.records());
    }

    #[test]
    fn round_trip_preserves_order_and_timestamps() {
        let backend = MemoryStore::new();
        let mut gallery = reopen(&backend);
        let records = vec![
            record("3", "a lighthouse", 5),
            record("2", "a dragon", 60),
            record("1", "a cat", 3600),
        ];
        for r in records.iter().rev() {
            gallery.add(r.clone()).unwrap();
        }

        let reloaded = reopen(&backend);
        assert_eq!(reloaded.records(), records.as_slice());
        assert_eq!(reloaded.records()[2].timestamp, records[2].timestamp);
    }

    #[test]
    fn remove_unknown_id_changes_nothing() {
        let backend = MemoryStore::new();
        let mut gallery = reopen(&backend);
        gallery.add(record("1", "a cat", 10)).unwrap();
        gallery.add(record("2", "a dog", 5)).unwrap();
        let before = gallery.records().to_vec();

        gallery.remove("404").unwrap();
        assert_eq!(gallery.records(), before.as_slice());
        assert_eq!(reopen(&backend).records(), before.as_slice());
    }

    #[test]
    fn remove_drops_matching_record() {
        let backend = MemoryStore::new();
        let mut gallery = reopen(&backend);
        gallery.add(record("1", "a cat", 10)).unwrap();
        gallery.add(record("2", "a dog", 5)).unwrap();

        gallery.remove("1").unwrap();
        let reloaded = reopen(&backend);
        assert_eq!(reloaded.len(), 1);
        assert_eq!(reloaded.records()[0].id, "2");
        assert!(reloaded.get("1").is_none());
    }

    #[test]
    fn clear_then_load_is_empty() {
        let backend = MemoryStore::new();
        let mut gallery = reopen(&backend);
        gallery.add(record("1", "a cat", 10)).unwrap();
        gallery.clear().unwrap();

        assert!(gallery.is_empty());
        assert!(reopen(&backend).is_empty());
        assert_eq!(backend.get(KEY).unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn malformed_data_loads_as_empty() {
        let mut backend = MemoryStore::new();
        backend.set(KEY, "{not json").unwrap();
        assert!(reopen(&backend).is_empty());

        backend
            .set(KEY, r#"[{"id":"1","url":"u","prompt":"p","timestamp":"yesterday"}]"#)
            .unwrap();
        assert!(reopen(&backend).is_empty());
    }

    #[test]
    fn persisted_timestamps_are_rfc3339_text() {
        let mut backend = MemoryStore::new();
        backend
            .set(
                KEY,
                r#"[{"id":"1700000000000","url":"u","prompt":"p","timestamp":"2023-11-14T22:13:20.000Z"}]"#,
            )
            .unwrap();
        let gallery = reopen(&backend);
        assert_eq!(gallery.records()[0].timestamp.timestamp(), 1_700_000_000);
    }

    #[test]
    fn failed_write_rolls_back() {
        let mut gallery = GalleryStore::open(Box::new(BrokenStore), KEY);
        assert!(gallery.is_empty());
        assert!(gallery.add(record("1", "a cat", 0)).is_err());
        assert!(gallery.is_empty());
    }

    #[test]
    fn next_id_never_collides() {
        let backend = MemoryStore::new();
        let mut gallery = reopen(&backend);
        gallery.add(record("5000", "a cat", 0)).unwrap();

        assert_eq!(gallery.next_id(&record("4999", "x", 0)), "5001");
        assert_eq!(gallery.next_id(&record("5000", "x", 0)), "5001");
        assert_eq!(gallery.next_id(&record("6000", "x", 0)), "6000");
    }

    #[test]
    fn file_backed_gallery_round_trips() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let config = StoreConfig::new().with_data_dir(temp.path());
        let mut gallery = GalleryStore::from_config(&config)?;
        gallery.add(record("1", "a cat", 0))?;

        let reloaded = GalleryStore::from_config(&config)?;
        assert_eq!(reloaded.records(), gallery.records());
        assert_eq!(reloaded.stats().newest_id.as_deref(), Some("1"));
        Ok(())
    }
}
