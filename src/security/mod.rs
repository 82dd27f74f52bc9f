//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → firewall.rs (block-list check, then per-IP counting window)
//!     → Pass to routing, or reject with 403/429
//! ```
//!
//! # Design Decisions
//! - Admission is decided before any proxying work happens
//! - Denials are terminal for the request; nothing retries them
//! - Expiry is lazy on access plus one periodic sweep; no task is
//!   spawned per increment

pub mod firewall;

pub use firewall::FirewallGuard;
