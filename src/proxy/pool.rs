//! Outbound client pool.
//!
//! # Responsibilities
//! - Reuse outbound HTTP client objects across requests
//! - Hand out ownership for the duration of one dispatch
//!
//! A client that saw a request-level error (timeout, refused
//! connection) is still reusable, so `release` takes everything back
//! without inspection. The free list has no upper bound; growth is
//! limited in practice by request concurrency, since every borrower
//! returns its client when the dispatch resolves.

use std::sync::Mutex;

use axum::body::Body;
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};

/// The pooled outbound client type.
pub type PooledClient = Client<HttpConnector, Body>;

/// Concurrent free-list of outbound clients.
pub struct ClientPool {
    idle: Mutex<Vec<PooledClient>>,
}

impl ClientPool {
    pub fn new() -> Self {
        Self {
            idle: Mutex::new(Vec::new()),
        }
    }

    /// Take an idle client, or construct a fresh one when the free
    /// list is empty.
    pub fn acquire(&self) -> PooledClient {
        if let Some(client) = self
            .idle
            .lock()
            .expect("client pool mutex poisoned")
            .pop()
        {
            return client;
        }
        Client::builder(TokioExecutor::new()).build(HttpConnector::new())
    }

    /// Return a client to the free list, unconditionally.
    pub fn release(&self, client: PooledClient) {
        self.idle
            .lock()
            .expect("client pool mutex poisoned")
            .push(client);
    }

    /// Number of idle clients currently parked in the pool.
    pub fn idle_count(&self) -> usize {
        self.idle.lock().expect("client pool mutex poisoned").len()
    }
}

impl Default for ClientPool {
    fn default() -> Self {
        Self::new()
    }
}
