//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Proxy engines and firewall produce:
//!     → logging.rs (structured log events via tracing)
//!     → metrics.rs (request counter, duration histogram, denials)
//!
//! Consumers:
//!     → Log aggregation (stdout)
//!     → Prometheus scrape of the admin listener's /metrics
//! ```
//!
//! # Design Decisions
//! - Metrics go through the `metrics` facade, so the core works with
//!   no recorder installed (the macros become no-ops)
//! - Labels are method/path/status only; paths here have bounded
//!   cardinality because the dispatcher owns the route namespace

pub mod logging;
pub mod metrics;
