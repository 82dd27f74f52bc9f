//! Per-source admission control.
//!
//! # Responsibilities
//! - Count requests per source IP within a fixed-origin window
//! - Block an IP for a configured duration once it exceeds the limit
//! - Expose the block list for the admin API
//!
//! The window is anchored at the first request seen from an IP, not a
//! rolling window: an IP's counter resets `window` after that first
//! request regardless of later activity.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use dashmap::DashMap;
use tokio::sync::broadcast;
use tokio::time::{self, Duration, Instant};

use crate::config::schema::FirewallConfig;
use crate::observability::metrics;

/// Why a request was turned away.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Denial {
    /// The source IP has an active block entry.
    Blocked,
    /// This request pushed the IP over the window limit.
    RateExceeded,
}

impl Denial {
    pub fn as_str(&self) -> &'static str {
        match self {
            Denial::Blocked => "blocked",
            Denial::RateExceeded => "rate_exceeded",
        }
    }
}

impl IntoResponse for Denial {
    fn into_response(self) -> Response {
        match self {
            Denial::Blocked => (StatusCode::FORBIDDEN, "Access denied").into_response(),
            Denial::RateExceeded => {
                (StatusCode::TOO_MANY_REQUESTS, "Too many requests").into_response()
            }
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct WindowCounter {
    window_start: Instant,
    count: u32,
}

/// Per-IP rate limiting and temporary blocking.
///
/// Both tables are sharded maps, so request workers increment and read
/// concurrently without a global lock. Entries carry their own expiry
/// instant: it is evaluated on access, and [`FirewallGuard::sweep`]
/// trims entries no request touches anymore.
pub struct FirewallGuard {
    limit: u32,
    window: Duration,
    block_duration: Duration,
    counters: DashMap<String, WindowCounter>,
    blocked: DashMap<String, Instant>,
}

impl FirewallGuard {
    pub fn new(config: &FirewallConfig) -> Self {
        Self {
            limit: config.request_limit,
            window: Duration::from_secs(config.window_secs),
            block_duration: Duration::from_secs(config.block_secs),
            counters: DashMap::new(),
            blocked: DashMap::new(),
        }
    }

    /// Admission decision for one request from `ip`.
    ///
    /// An actively blocked IP is denied without touching its counter.
    /// Otherwise the counter is bumped, and the request that pushes it
    /// past the limit both blocks the IP and is itself denied.
    pub fn admit(&self, ip: &str) -> Result<(), Denial> {
        let now = Instant::now();

        let block_deadline = self.blocked.get(ip).map(|entry| *entry);
        if let Some(deadline) = block_deadline {
            if now < deadline {
                return Err(Denial::Blocked);
            }
            self.blocked.remove(ip);
        }

        let count = {
            let mut entry = self
                .counters
                .entry(ip.to_string())
                .or_insert(WindowCounter {
                    window_start: now,
                    count: 0,
                });
            // An elapsed window resets in place; same observable
            // behavior as delete-then-recreate.
            if now.duration_since(entry.window_start) >= self.window {
                entry.window_start = now;
                entry.count = 0;
            }
            entry.count += 1;
            entry.count
        };

        if count > self.limit {
            self.block(ip);
            return Err(Denial::RateExceeded);
        }

        Ok(())
    }

    /// Block `ip` for the configured duration. Idempotent: re-blocking
    /// refreshes the expiry.
    pub fn block(&self, ip: &str) {
        self.blocked
            .insert(ip.to_string(), Instant::now() + self.block_duration);
    }

    /// IPs with an active block entry.
    pub fn list_blocked(&self) -> Vec<String> {
        let now = Instant::now();
        self.blocked
            .iter()
            .filter(|entry| *entry.value() > now)
            .map(|entry| entry.key().clone())
            .collect()
    }

    /// Drop counter and block entries whose expiry has passed. Keeps
    /// the tables bounded under unique-IP churn even for IPs that are
    /// never seen again.
    pub fn sweep(&self) {
        let now = Instant::now();
        self.counters
            .retain(|_, counter| now.duration_since(counter.window_start) < self.window);
        self.blocked.retain(|_, deadline| *deadline > now);
    }

    /// Periodic sweep task. Runs until the shutdown signal fires.
    pub async fn run_sweeper(self: Arc<Self>, mut shutdown: broadcast::Receiver<()>) {
        let mut ticker = time::interval(self.window);
        loop {
            tokio::select! {
                _ = ticker.tick() => self.sweep(),
                _ = shutdown.recv() => {
                    tracing::info!("firewall sweeper stopping");
                    break;
                }
            }
        }
    }
}

/// Admission middleware for the main listener.
pub async fn firewall_middleware(
    State(guard): State<Arc<FirewallGuard>>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let ip = addr.ip().to_string();
    match guard.admit(&ip) {
        Ok(()) => next.run(request).await,
        Err(denial) => {
            tracing::warn!(client = %ip, reason = denial.as_str(), "request denied");
            metrics::record_denied(denial.as_str());
            denial.into_response()
        }
    }
}
