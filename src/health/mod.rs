//! Health checking subsystem.
//!
//! # Data Flow
//! ```text
//! Periodic timer (active.rs)
//!     → fan out one GET <backend>/health probe per backend,
//!       all concurrent, each bounded by the probe timeout
//!     → fan in: the round completes only when every probe resolved
//!     → per-backend alive flag updated (the flag write is the atomic
//!       unit, so readers never see a half-finished round mid-backend)
//!     → sleep for the interval, repeat
//! ```
//!
//! # Design Decisions
//! - A backend is alive only on HTTP 200 within the timeout; transport
//!   errors, timeouts and any other status mark it dead
//! - `healthy_backends()` preserves configuration order, not probe
//!   completion order
//! - Probe outcomes never surface to request callers; they only shape
//!   the next selection decision

pub mod active;

pub use active::HealthMonitor;
