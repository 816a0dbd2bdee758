use async_trait::async_trait;
use crewdesk_sync::application::ports::remote_store::{RemoteError, RemoteStore};
use crewdesk_sync::domain::value_objects::{EntityId, RemotePayload};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

/// In-memory remote store with scriptable failures. Rows are keyed by table
/// and record id; `upsert` overwrites on id collision, matching the
/// merge-duplicates behavior of the real backend.
pub struct MockRemoteStore {
    rows: RwLock<HashMap<String, HashMap<String, RemotePayload>>>,
    missing_columns: RwLock<HashMap<String, HashSet<String>>>,
    available: AtomicBool,
    fail_next_writes: AtomicU32,
    upsert_calls: AtomicU32,
}

impl MockRemoteStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            rows: RwLock::new(HashMap::new()),
            missing_columns: RwLock::new(HashMap::new()),
            available: AtomicBool::new(true),
            fail_next_writes: AtomicU32::new(0),
            upsert_calls: AtomicU32::new(0),
        })
    }

    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// The next `count` upserts fail as `Unavailable`, then service resumes.
    pub fn fail_next_writes(&self, count: u32) {
        self.fail_next_writes.store(count, Ordering::SeqCst);
    }

    /// Declares a column the remote schema does not have. Upserts whose
    /// payload still carries it are rejected the way the real backend
    /// rejects an unknown column.
    pub async fn drop_column(&self, table: &str, column: &str) {
        self.missing_columns
            .write()
            .await
            .entry(table.to_string())
            .or_default()
            .insert(column.to_string());
    }

    pub fn upsert_calls(&self) -> u32 {
        self.upsert_calls.load(Ordering::SeqCst)
    }

    pub async fn row(&self, table: &str, id: &str) -> Option<RemotePayload> {
        self.rows
            .read()
            .await
            .get(table)
            .and_then(|t| t.get(id))
            .cloned()
    }

    pub async fn row_count(&self, table: &str) -> usize {
        self.rows.read().await.get(table).map_or(0, HashMap::len)
    }

    /// Seeds a row directly, bypassing failure scripting. Stands in for a
    /// write made by another device.
    pub async fn seed_row(&self, table: &str, payload: RemotePayload) {
        let id = payload.entity_id().expect("seed row needs an id").to_string();
        self.rows
            .write()
            .await
            .entry(table.to_string())
            .or_default()
            .insert(id, payload);
    }

    /// Removes a row directly, as if another device hard-deleted it.
    pub async fn remove_row(&self, table: &str, id: &str) {
        if let Some(t) = self.rows.write().await.get_mut(table) {
            t.remove(id);
        }
    }

    fn check_available(&self) -> Result<(), RemoteError> {
        if !self.available.load(Ordering::SeqCst) {
            return Err(RemoteError::Unavailable("remote is down".to_string()));
        }
        Ok(())
    }

    fn consume_scripted_failure(&self) -> Result<(), RemoteError> {
        let remaining = self
            .fail_next_writes
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if remaining {
            return Err(RemoteError::Unavailable(
                "remote is down (scripted)".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl RemoteStore for MockRemoteStore {
    async fn upsert(&self, table: &str, row: &RemotePayload) -> Result<(), RemoteError> {
        self.upsert_calls.fetch_add(1, Ordering::SeqCst);
        self.check_available()?;
        self.consume_scripted_failure()?;

        if let Some(missing) = self.missing_columns.read().await.get(table) {
            for column in missing {
                if row.has_field(column) {
                    return Err(RemoteError::UnknownColumn(column.clone()));
                }
            }
        }

        let id = row
            .entity_id()
            .ok_or_else(|| RemoteError::Rejected("row has no id".to_string()))?
            .to_string();
        self.rows
            .write()
            .await
            .entry(table.to_string())
            .or_default()
            .insert(id, row.clone());
        Ok(())
    }

    async fn delete(&self, table: &str, id: &EntityId) -> Result<(), RemoteError> {
        self.check_available()?;
        self.consume_scripted_failure()?;
        if let Some(t) = self.rows.write().await.get_mut(table) {
            t.remove(id.as_str());
        }
        Ok(())
    }

    async fn select_all(&self, table: &str) -> Result<Vec<RemotePayload>, RemoteError> {
        self.check_available()?;
        Ok(self
            .rows
            .read()
            .await
            .get(table)
            .map(|t| t.values().cloned().collect())
            .unwrap_or_default())
    }

    async fn select_by_id(
        &self,
        table: &str,
        id: &EntityId,
    ) -> Result<Option<RemotePayload>, RemoteError> {
        self.check_available()?;
        Ok(self.row(table, id.as_str()).await)
    }
}
