//! Shutdown coordination.

use tokio::sync::broadcast;

/// Fan-out shutdown signal shared by the listeners and background tasks.
///
/// Each long-running task holds a [`broadcast::Receiver`] and exits its
/// loop once the signal fires. Subscribing after the trigger still
/// observes the shutdown (the channel closes when the sender drops).
pub struct Shutdown {
    tx: broadcast::Sender<()>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self { tx }
    }

    /// Hand out a receiver for a task to select on.
    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }

    /// Signal every subscribed task to stop.
    pub fn trigger(&self) {
        let _ = self.tx.send(());
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}
