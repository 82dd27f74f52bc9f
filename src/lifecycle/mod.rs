//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (main.rs):
//!     Load config → Validate → Initialize subsystems → Bind → Serve
//!
//! Shutdown (shutdown.rs):
//!     Ctrl+C or explicit trigger
//!     → listener stops accepting, in-flight requests drain
//!     → background tasks (health monitor, firewall sweeper) observe
//!       the signal and exit their loops
//! ```
//!
//! # Design Decisions
//! - Startup errors are fatal; the process exits rather than limping
//! - One broadcast signal fans out to every long-running task

pub mod shutdown;

pub use shutdown::Shutdown;
