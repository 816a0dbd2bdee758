pub mod connectivity;
pub mod rest_store;

pub use connectivity::ConnectionWatcher;
pub use rest_store::RestRemoteStore;
