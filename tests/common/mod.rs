#![allow(dead_code)]

pub mod mocks;

use crewdesk_sync::infrastructure::database::ConnectionPool;
use crewdesk_sync::{AppConfig, SyncEngine};
use mocks::MockRemoteStore;
use std::sync::Arc;
use tempfile::TempDir;

/// Engine wired against a file-backed SQLite database and a scriptable
/// in-memory remote. The database file survives `reopen`, which stands in
/// for an app restart.
pub struct TestContext {
    pub engine: SyncEngine,
    pub remote: Arc<MockRemoteStore>,
    pub pool: ConnectionPool,
    pub config: AppConfig,
    database_url: String,
    _dir: TempDir,
}

impl TestContext {
    /// Everything starts offline; tests flip connectivity explicitly.
    pub async fn new() -> Self {
        Self::with_config(test_config()).await
    }

    pub async fn with_config(config: AppConfig) -> Self {
        let dir = TempDir::new().expect("temp dir");
        let database_url = format!(
            "sqlite://{}?mode=rwc",
            dir.path().join("crewdesk.db").display()
        );

        let pool = ConnectionPool::new(&database_url, config.database.max_connections)
            .await
            .expect("sqlite pool");
        pool.migrate().await.expect("migrations");

        let remote = MockRemoteStore::new();
        let engine = SyncEngine::assemble(pool.clone(), remote.clone(), &config);

        Self {
            engine,
            remote,
            pool,
            config,
            database_url,
            _dir: dir,
        }
    }

    pub fn set_online(&self, online: bool) {
        self.engine.connectivity.set_online(online);
    }

    /// Rebuilds the engine over the same database file with a fresh remote,
    /// as after a process restart.
    pub async fn reopen(self) -> Self {
        self.engine.close().await;

        let pool = ConnectionPool::new(&self.database_url, self.config.database.max_connections)
            .await
            .expect("sqlite pool");
        let remote = MockRemoteStore::new();
        let engine = SyncEngine::assemble(pool.clone(), remote.clone(), &self.config);

        Self {
            engine,
            remote,
            pool,
            config: self.config,
            database_url: self.database_url,
            _dir: self._dir,
        }
    }
}

/// Defaults tuned for tests: no background loop, immediate retries.
pub fn test_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.sync.auto_sync = false;
    config.sync.sync_interval = 3600;
    config.sync.backoff_base_secs = 0;
    config
}

/// Waits out the drain worker's retry jitter (under 250ms) plus the
/// one-second granularity of the queue's timestamps.
pub async fn wait_for_backoff() {
    tokio::time::sleep(std::time::Duration::from_millis(400)).await;
}
