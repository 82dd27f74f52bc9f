//! Backend abstraction.
//!
//! # Responsibilities
//! - Represent a single upstream server
//! - Track liveness as decided by the health monitor
//!
//! The health monitor is the only writer of the status; everyone else
//! reads a snapshot under the read lock.

use std::sync::RwLock;
use std::time::Instant;

use url::Url;

/// Liveness snapshot for one backend.
#[derive(Debug, Clone, Copy)]
pub struct BackendStatus {
    /// Whether the last probe round considered this backend reachable.
    pub alive: bool,
    /// When the backend was last probed, if ever.
    pub last_checked: Option<Instant>,
}

/// A single upstream server.
#[derive(Debug)]
pub struct Backend {
    /// Base URL, immutable after construction.
    url: Url,
    status: RwLock<BackendStatus>,
}

impl Backend {
    /// Create a new backend. Starts out alive; the first probe round
    /// corrects that if the server is unreachable.
    pub fn new(url: Url) -> Self {
        Self {
            url,
            status: RwLock::new(BackendStatus {
                alive: true,
                last_checked: None,
            }),
        }
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn is_alive(&self) -> bool {
        self.status.read().expect("backend status lock poisoned").alive
    }

    /// Record the outcome of one probe. Health-monitor use only.
    pub fn set_alive(&self, alive: bool) {
        let mut status = self.status.write().expect("backend status lock poisoned");
        status.alive = alive;
        status.last_checked = Some(Instant::now());
    }

    pub fn status(&self) -> BackendStatus {
        *self.status.read().expect("backend status lock poisoned")
    }
}
