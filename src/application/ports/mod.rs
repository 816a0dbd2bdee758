pub mod connectivity;
pub mod local_store;
pub mod remote_store;
pub mod sync_queue;

pub use connectivity::ConnectivityMonitor;
pub use local_store::LocalRepository;
pub use remote_store::{RemoteError, RemoteStore};
pub use sync_queue::SyncQueue;
