use super::store::RecordStore;
use crate::{Error, Result, mapping::TargetRecord};
use async_trait::async_trait;
use chrono::Utc;
use libsql::{Builder, Connection, Database};
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Records persisted in a libSQL table, with fields stored as a JSON object.
///
/// All invocations share the one connection opened in [`SqlRecordStore::new`],
/// so a `":memory:"` database stays visible to every caller. libSQL serializes
/// statements on that connection.
pub struct SqlRecordStore {
    _db: Database,
    conn: Connection,
}

impl SqlRecordStore {
    pub async fn new(db_path: &str) -> Result<Self> {
        let db = Builder::new_local(db_path).build().await?;
        // ":memory:" databases are private to the connection that opened them
        let conn = db.connect()?;

        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS records (
                id TEXT PRIMARY KEY,
                fields TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            "#,
            (),
        )
        .await?;

        info!("Record store initialized: {}", db_path);
        Ok(Self { _db: db, conn })
    }

    /// Seeds or replaces a record.
    pub async fn insert(&self, record: &TargetRecord) -> Result<()> {
        let fields = serde_json::to_string(&record.fields)?;
        self.conn
            .execute(
                "INSERT OR REPLACE INTO records (id, fields, updated_at) VALUES (?, ?, ?)",
                (record.id.as_str(), fields, Utc::now().to_rfc3339()),
            )
            .await?;
        debug!("Record inserted: {}", record.id);
        Ok(())
    }
}

#[async_trait]
impl RecordStore for SqlRecordStore {
    async fn get(&self, id: &str) -> Result<TargetRecord> {
        let mut rows = self
            .conn
            .query("SELECT fields FROM records WHERE id = ?", [id])
            .await?;

        let row = rows
            .next()
            .await?
            .ok_or_else(|| Error::RecordNotFound { id: id.to_string() })?;

        let fields_json: String = row.get(0)?;
        let fields: BTreeMap<String, serde_json::Value> = serde_json::from_str(&fields_json)?;

        Ok(TargetRecord {
            id: id.to_string(),
            fields,
        })
    }

    async fn update(&self, record: &TargetRecord) -> Result<()> {
        let fields = serde_json::to_string(&record.fields)?;
        let changed = self
            .conn
            .execute(
                "UPDATE records SET fields = ?, updated_at = ? WHERE id = ?",
                (fields, Utc::now().to_rfc3339(), record.id.as_str()),
            )
            .await?;

        if changed == 0 {
            return Err(Error::RecordNotFound {
                id: record.id.clone(),
            });
        }

        debug!("Record updated in database: {}", record.id);
        Ok(())
    }
}
