use tokio::sync::watch;

/// Online/offline signal. The interactive path consults it before attempting
/// a remote write; the drain worker subscribes to be woken on the
/// offline-to-online transition.
pub trait ConnectivityMonitor: Send + Sync {
    fn is_online(&self) -> bool;

    fn subscribe(&self) -> watch::Receiver<bool>;
}
