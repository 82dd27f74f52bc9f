//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the
//! load balancer. All types derive Serde traits for deserialization
//! from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the load balancer.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ProxyConfig {
    /// Main listener configuration.
    pub listener: ListenerConfig,

    /// Backend list and balancing policy.
    pub balancer: BalancerConfig,

    /// Firewall (per-IP rate limiting) settings.
    pub firewall: FirewallConfig,

    /// Health check settings.
    pub health_check: HealthCheckConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Admin API settings.
    pub admin: AdminConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Backend list and balancing policy.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BalancerConfig {
    /// Balancing policy name. Only "round_robin" ships today; the name
    /// is validated so a typo fails at startup instead of at runtime.
    pub algorithm: String,

    /// Backend base URLs (e.g., "http://127.0.0.1:9001").
    pub backends: Vec<String>,
}

impl Default for BalancerConfig {
    fn default() -> Self {
        Self {
            algorithm: "round_robin".to_string(),
            backends: Vec::new(),
        }
    }
}

/// Firewall configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct FirewallConfig {
    /// Enable per-IP admission control.
    pub enabled: bool,

    /// Maximum requests per IP within one window.
    pub request_limit: u32,

    /// Counting window length in seconds, anchored at the first
    /// request seen from an IP (not a rolling window).
    pub window_secs: u64,

    /// How long an IP stays blocked after exceeding the limit.
    pub block_secs: u64,
}

impl Default for FirewallConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            request_limit: 100,
            window_secs: 60,
            block_secs: 300,
        }
    }
}

/// Health check configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HealthCheckConfig {
    /// Enable active health checks.
    pub enabled: bool,

    /// Probe round interval in seconds.
    pub interval_secs: u64,

    /// Per-probe timeout in seconds.
    pub probe_timeout_secs: u64,

    /// Path probed on each backend.
    pub path: String,
}

impl Default for HealthCheckConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_secs: 5,
            probe_timeout_secs: 2,
            path: "/health".to_string(),
        }
    }
}

/// Timeout configuration for various operations.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Outer limit on handling one inbound request, in seconds.
    pub request_secs: u64,

    /// Per-dispatch timeout for proxied upstream calls, in seconds.
    pub upstream_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            request_secs: 30,
            upstream_secs: 3,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Record request metrics and expose them on the admin listener.
    pub metrics_enabled: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: true,
        }
    }
}

/// Admin API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AdminConfig {
    /// Enable the admin/metrics listener.
    pub enabled: bool,

    /// Admin API bind address.
    pub bind_address: String,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            bind_address: "0.0.0.0:9090".to_string(),
        }
    }
}
