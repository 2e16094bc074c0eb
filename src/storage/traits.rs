use crate::error::Result;

/// Durable, synchronous string key-value storage. A write that returns
/// `Ok` must be visible to every later `get`, including from a new process.
pub trait KeyValueStore: Send {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct StorageStats {
    pub total_records: usize,
    pub newest_id: Option<String>,
    pub oldest_id: Option<String>,
}
