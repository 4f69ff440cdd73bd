use std::time::Duration;

use tracing::{debug, info};

use crate::services::session::SessionStore;

/// Periodically drops expired admin sessions.
pub struct SessionSweeper {
    sessions: SessionStore,
    interval: Duration,
}

impl SessionSweeper {
    pub fn new(sessions: SessionStore, interval_secs: u64) -> Self {
        Self {
            sessions,
            interval: Duration::from_secs(interval_secs),
        }
    }

    /// Runs until the task is aborted.
    pub async fn start(self) {
        info!("Starting session sweeper (interval: {:?})", self.interval);

        loop {
            tokio::time::sleep(self.interval).await;
            self.sweep().await;
        }
    }

    pub async fn sweep(&self) -> usize {
        let purged = self.sessions.purge_expired().await;
        if purged > 0 {
            info!("Purged {} expired admin sessions", purged);
        } else {
            debug!("No expired admin sessions");
        }
        purged
    }
}
