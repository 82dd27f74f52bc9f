//! HTTP dispatch subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, firewall admission, path routing)
//!     → /reverse...  → proxy::reverse (policy-selected backend)
//!     → /forward     → proxy::forward (caller-named target)
//!     → /, /health   → dispatcher's own liveness answers
//!     → anything else → 404
//! ```

pub mod server;

pub use server::{AppState, HttpServer};
