use crate::application::ports::remote_store::{RemoteError, RemoteStore};
use crate::domain::value_objects::{EntityId, RemotePayload};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use tracing::{debug, warn};

/// Makes remote writes resilient to a remote schema that lags the client's
/// field set. Columns the remote has rejected are remembered for the lifetime
/// of the process and stripped from every later write of the same table; a
/// restart re-learns drift, which tolerates the schema catching up.
pub struct SchemaDriftAdapter {
    remote: Arc<dyn RemoteStore>,
    known_missing: Mutex<HashMap<String, HashSet<String>>>,
}

impl SchemaDriftAdapter {
    pub fn new(remote: Arc<dyn RemoteStore>) -> Self {
        Self {
            remote,
            known_missing: Mutex::new(HashMap::new()),
        }
    }

    /// Upserts a row, stripping unknown columns as the remote reports them.
    /// Attempts are bounded by the payload's field count plus a small
    /// constant, so pathological error patterns still terminate. Errors other
    /// than `UnknownColumn` are returned unmodified.
    pub async fn upsert(&self, table: &str, payload: RemotePayload) -> Result<(), RemoteError> {
        let mut payload = payload;
        let already_known = self.strip_known(table, &mut payload);
        if !already_known.is_empty() {
            debug!(
                table,
                columns = ?already_known,
                "Stripped columns previously rejected by the remote schema"
            );
        }

        let mut dropped: Vec<String> = Vec::new();
        let max_attempts = payload.field_count() + 2;

        for _ in 0..max_attempts {
            match self.remote.upsert(table, &payload).await {
                Ok(()) => {
                    if !dropped.is_empty() {
                        warn!(
                            table,
                            columns = ?dropped,
                            "Remote write succeeded only after dropping columns; \
                             the remote schema is behind the client"
                        );
                    }
                    return Ok(());
                }
                Err(RemoteError::UnknownColumn(column)) => {
                    if !payload.remove_field(&column) {
                        // The remote keeps rejecting a column we no longer
                        // send; stripping cannot make progress.
                        return Err(RemoteError::UnknownColumn(column));
                    }
                    self.remember_missing(table, &column);
                    dropped.push(column);
                }
                Err(other) => return Err(other),
            }
        }

        Err(RemoteError::Rejected(format!(
            "Schema drift retry budget exhausted for table {table}"
        )))
    }

    /// Deletes carry no columns; drift handling does not apply.
    pub async fn delete(&self, table: &str, id: &EntityId) -> Result<(), RemoteError> {
        self.remote.delete(table, id).await
    }

    /// Columns currently known missing for a table. Mostly for diagnostics.
    pub fn missing_columns(&self, table: &str) -> HashSet<String> {
        self.known_missing
            .lock()
            .map(|map| map.get(table).cloned().unwrap_or_default())
            .unwrap_or_default()
    }

    fn strip_known(&self, table: &str, payload: &mut RemotePayload) -> Vec<String> {
        match self.known_missing.lock() {
            Ok(map) => match map.get(table) {
                Some(columns) => payload.strip_fields(columns),
                None => Vec::new(),
            },
            Err(_) => Vec::new(),
        }
    }

    fn remember_missing(&self, table: &str, column: &str) {
        if let Ok(mut map) = self.known_missing.lock() {
            map.entry(table.to_string())
                .or_default()
                .insert(column.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex as StdMutex;

    /// Remote that rejects a fixed set of columns, mimicking a schema that
    /// has not caught up with the client.
    struct ColumnRejectingRemote {
        missing: Vec<&'static str>,
        writes: StdMutex<Vec<RemotePayload>>,
    }

    impl ColumnRejectingRemote {
        fn new(missing: Vec<&'static str>) -> Self {
            Self {
                missing,
                writes: StdMutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl RemoteStore for ColumnRejectingRemote {
        async fn upsert(&self, _table: &str, row: &RemotePayload) -> Result<(), RemoteError> {
            for column in &self.missing {
                if row.has_field(column) {
                    return Err(RemoteError::UnknownColumn(column.to_string()));
                }
            }
            self.writes.lock().unwrap().push(row.clone());
            Ok(())
        }

        async fn delete(&self, _table: &str, _id: &EntityId) -> Result<(), RemoteError> {
            Ok(())
        }

        async fn select_all(&self, _table: &str) -> Result<Vec<RemotePayload>, RemoteError> {
            Ok(Vec::new())
        }

        async fn select_by_id(
            &self,
            _table: &str,
            _id: &EntityId,
        ) -> Result<Option<RemotePayload>, RemoteError> {
            Ok(None)
        }
    }

    fn payload(json: &str) -> RemotePayload {
        RemotePayload::from_json_str(json).unwrap()
    }

    #[tokio::test]
    async fn strips_unknown_columns_until_the_write_lands() {
        let remote = Arc::new(ColumnRejectingRemote::new(vec!["badge", "shoeSize"]));
        let adapter = SchemaDriftAdapter::new(remote.clone());

        adapter
            .upsert("users", payload(r#"{"id":"u1","name":"Ada","badge":"b","shoeSize":42}"#))
            .await
            .unwrap();

        let writes = remote.writes.lock().unwrap();
        assert_eq!(writes.len(), 1);
        assert!(!writes[0].has_field("badge"));
        assert!(!writes[0].has_field("shoeSize"));
        assert!(writes[0].has_field("name"));
    }

    #[tokio::test]
    async fn remembers_missing_columns_across_writes() {
        let remote = Arc::new(ColumnRejectingRemote::new(vec!["badge"]));
        let adapter = SchemaDriftAdapter::new(remote.clone());

        adapter
            .upsert("users", payload(r#"{"id":"u1","badge":"b"}"#))
            .await
            .unwrap();
        adapter
            .upsert("users", payload(r#"{"id":"u2","badge":"c"}"#))
            .await
            .unwrap();

        // The second write never offered the rejected column.
        let writes = remote.writes.lock().unwrap();
        assert_eq!(writes.len(), 2);
        assert!(adapter.missing_columns("users").contains("badge"));
        assert!(adapter.missing_columns("bookings").is_empty());
    }

    #[tokio::test]
    async fn other_errors_pass_through_unmodified() {
        struct DownRemote;

        #[async_trait]
        impl RemoteStore for DownRemote {
            async fn upsert(&self, _t: &str, _r: &RemotePayload) -> Result<(), RemoteError> {
                Err(RemoteError::Unavailable("connection refused".into()))
            }
            async fn delete(&self, _t: &str, _id: &EntityId) -> Result<(), RemoteError> {
                Err(RemoteError::Unavailable("connection refused".into()))
            }
            async fn select_all(&self, _t: &str) -> Result<Vec<RemotePayload>, RemoteError> {
                Err(RemoteError::Unavailable("connection refused".into()))
            }
            async fn select_by_id(
                &self,
                _t: &str,
                _id: &EntityId,
            ) -> Result<Option<RemotePayload>, RemoteError> {
                Err(RemoteError::Unavailable("connection refused".into()))
            }
        }

        let adapter = SchemaDriftAdapter::new(Arc::new(DownRemote));
        let err = adapter
            .upsert("users", payload(r#"{"id":"u1"}"#))
            .await
            .unwrap_err();
        assert!(matches!(err, RemoteError::Unavailable(_)));
    }
}
