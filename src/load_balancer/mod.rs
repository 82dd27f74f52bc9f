//! Load balancing subsystem.
//!
//! # Data Flow
//! ```text
//! Reverse-mode request
//!     → selector.rs (snapshot healthy set from health monitor)
//!     → Apply balancing policy:
//!         - round_robin.rs (mutex-guarded cursor over the healthy set)
//!     → Return backend URL or none (caller surfaces 503)
//! ```
//!
//! # Design Decisions
//! - Policy is a trait seam so new strategies slot in without touching
//!   the health monitor or the proxy engines
//! - The cursor is an index into the healthy set computed at call time,
//!   not a stable backend identity; when the set changes between calls,
//!   rotation is fair only over the set that is healthy at that moment
//! - Unhealthy backends are filtered out before the policy ever sees them

pub mod backend;
pub mod round_robin;
pub mod selector;

use url::Url;

pub use selector::BackendSelector;

/// Balancing policy over the healthy-backend snapshot.
pub trait BalancePolicy: Send + Sync + std::fmt::Debug {
    /// Pick the next backend from the healthy set, or `None` if the
    /// set is empty.
    fn select_next(&self, healthy: &[Url]) -> Option<Url>;
}
