use crate::application::ports::connectivity::ConnectivityMonitor;
use tokio::sync::watch;
use tracing::info;

/// Connectivity signal fed by the embedding application (platform network
/// callbacks, a reachability probe, or tests). Subscribers observe the
/// offline-to-online transition through the watch channel.
pub struct ConnectionWatcher {
    tx: watch::Sender<bool>,
}

impl ConnectionWatcher {
    pub fn new(initially_online: bool) -> Self {
        let (tx, _) = watch::channel(initially_online);
        Self { tx }
    }

    pub fn set_online(&self, online: bool) {
        let changed = self.tx.send_if_modified(|current| {
            if *current == online {
                false
            } else {
                *current = online;
                true
            }
        });
        if changed {
            info!(online, "Connectivity changed");
        }
    }
}

impl ConnectivityMonitor for ConnectionWatcher {
    fn is_online(&self) -> bool {
        *self.tx.borrow()
    }

    fn subscribe(&self) -> watch::Receiver<bool> {
        self.tx.subscribe()
    }
}
