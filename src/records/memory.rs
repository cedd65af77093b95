use super::store::RecordStore;
use crate::{Error, Result, mapping::TargetRecord};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::debug;

#[derive(Debug, Clone, Default)]
pub struct MemoryRecordStore {
    records: Arc<Mutex<HashMap<String, TargetRecord>>>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: impl IntoIterator<Item = TargetRecord>) -> Self {
        let map = records
            .into_iter()
            .map(|record| (record.id.clone(), record))
            .collect();
        Self {
            records: Arc::new(Mutex::new(map)),
        }
    }

    /// Seeds or replaces a record.
    pub fn insert(&self, record: TargetRecord) -> Result<()> {
        self.lock()?.insert(record.id.clone(), record);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.lock().map(|records| records.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<String, TargetRecord>>> {
        self.records
            .lock()
            .map_err(|e| Error::internal(format!("Mutex lock failed: {e}")))
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn get(&self, id: &str) -> Result<TargetRecord> {
        self.lock()?
            .get(id)
            .cloned()
            .ok_or_else(|| Error::RecordNotFound { id: id.to_string() })
    }

    async fn update(&self, record: &TargetRecord) -> Result<()> {
        let mut records = self.lock()?;
        let stored = records.get_mut(&record.id).ok_or_else(|| Error::RecordNotFound {
            id: record.id.clone(),
        })?;
        *stored = record.clone();
        debug!("Record updated in memory: {}", record.id);
        Ok(())
    }
}
