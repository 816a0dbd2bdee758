use crate::application::ports::connectivity::ConnectivityMonitor;
use crate::application::ports::remote_store::RemoteStore;
use crate::application::ports::sync_queue::SyncQueue;
use crate::application::services::{
    ActivityLogService, AttendanceService, BookingService, DrainConfig, EntitySyncService,
    LeaveService, QueueDrainWorker, SchemaDriftAdapter, UserService,
};
use crate::domain::entities::SyncRecord;
use crate::infrastructure::database::{ConnectionPool, SqliteEntityStore, SqliteSyncQueue};
use crate::infrastructure::remote::{ConnectionWatcher, RestRemoteStore};
use crate::shared::config::AppConfig;
use crate::shared::error::AppError;
use std::sync::Arc;

/// Fully wired sync engine: one entity service per kind sharing a single
/// queue, drift adapter and connectivity signal, plus the drain worker.
pub struct SyncEngine {
    pub bookings: BookingService,
    pub users: UserService,
    pub leave: LeaveService,
    pub attendance: AttendanceService,
    pub activity: ActivityLogService,
    pub drain_worker: Arc<QueueDrainWorker>,
    pub connectivity: Arc<ConnectionWatcher>,
    queue: Arc<dyn SyncQueue>,
    pool: ConnectionPool,
}

impl SyncEngine {
    pub async fn new(config: &AppConfig) -> Result<Self, AppError> {
        let pool =
            ConnectionPool::new(&config.database.url, config.database.max_connections).await?;
        pool.migrate().await?;
        let remote: Arc<dyn RemoteStore> = Arc::new(RestRemoteStore::new(&config.remote)?);
        Ok(Self::assemble(pool, remote, config))
    }

    /// Wiring entry point for callers that bring their own remote store,
    /// such as tests. The pool must already be migrated.
    pub fn assemble(pool: ConnectionPool, remote: Arc<dyn RemoteStore>, config: &AppConfig) -> Self {
        let connectivity = Arc::new(ConnectionWatcher::new(false));
        let queue: Arc<dyn SyncQueue> =
            Arc::new(SqliteSyncQueue::new(pool.get_pool().clone()));
        let drift = Arc::new(SchemaDriftAdapter::new(remote.clone()));

        let bookings = BookingService::new(
            Self::service(&pool, &remote, &drift, &queue, &connectivity),
            Self::service(&pool, &remote, &drift, &queue, &connectivity),
            Self::service(&pool, &remote, &drift, &queue, &connectivity),
        );
        let users = UserService::new(Self::service(&pool, &remote, &drift, &queue, &connectivity));
        let leave = LeaveService::new(Self::service(&pool, &remote, &drift, &queue, &connectivity));
        let attendance =
            AttendanceService::new(Self::service(&pool, &remote, &drift, &queue, &connectivity));
        let activity =
            ActivityLogService::new(Self::service(&pool, &remote, &drift, &queue, &connectivity));

        let drain_worker = Arc::new(QueueDrainWorker::new(
            queue.clone(),
            remote,
            drift,
            connectivity.clone(),
            DrainConfig::from_sync_config(&config.sync, config.remote.request_timeout),
        ));

        Self {
            bookings,
            users,
            leave,
            attendance,
            activity,
            drain_worker,
            connectivity,
            queue,
            pool,
        }
    }

    fn service<R: SyncRecord>(
        pool: &ConnectionPool,
        remote: &Arc<dyn RemoteStore>,
        drift: &Arc<SchemaDriftAdapter>,
        queue: &Arc<dyn SyncQueue>,
        connectivity: &Arc<ConnectionWatcher>,
    ) -> EntitySyncService<R> {
        EntitySyncService::new(
            Arc::new(SqliteEntityStore::<R>::new(pool.get_pool().clone())),
            remote.clone(),
            drift.clone(),
            queue.clone(),
            connectivity.clone() as Arc<dyn ConnectivityMonitor>,
        )
    }

    /// Starts the background drain loop when auto-sync is enabled.
    pub fn start(&self, config: &AppConfig) -> Option<tokio::task::JoinHandle<()>> {
        if config.sync.auto_sync {
            Some(self.drain_worker.clone().spawn())
        } else {
            None
        }
    }

    pub fn queue(&self) -> Arc<dyn SyncQueue> {
        self.queue.clone()
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}
