//! Global daemon state

use std::time::Instant;

use tokio::sync::Mutex;

use mw_core::traits::Connector;
use mw_remote::NodeManager;

/// Global state for the warden daemon
pub struct DaemonState<C: Connector> {
    /// The single node manager; the lock serialises all callers
    manager: Mutex<NodeManager<C>>,
    /// When the daemon started
    start_time: Instant,
}

impl<C: Connector> DaemonState<C> {
    pub fn new(manager: NodeManager<C>) -> Self {
        Self {
            manager: Mutex::new(manager),
            start_time: Instant::now(),
        }
    }

    /// Get the node manager
    pub fn manager(&self) -> &Mutex<NodeManager<C>> {
        &self.manager
    }

    pub fn uptime_secs(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    /// Close the SSH session on the way out; errors are only logged
    pub async fn shutdown(&self) {
        self.manager.lock().await.shutdown().await;
    }
}
