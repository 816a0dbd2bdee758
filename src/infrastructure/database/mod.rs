pub mod connection_pool;
pub mod entity_store;
pub mod rows;
pub mod sqlite_queue;

pub use connection_pool::ConnectionPool;
pub use entity_store::SqliteEntityStore;
pub use sqlite_queue::SqliteSyncQueue;
