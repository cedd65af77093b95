use crate::{Result, mapping::TargetRecord};
use async_trait::async_trait;

/// Read/write access to the system of record.
///
/// The client only reads and updates existing records; it never creates or
/// deletes them.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn get(&self, id: &str) -> Result<TargetRecord>;

    /// Persists `record`. Fails with `RecordNotFound` if the id is unknown.
    async fn update(&self, record: &TargetRecord) -> Result<()>;
}
