//! Configuration validation.
//!
//! Semantic checks on top of what serde already guarantees
//! syntactically. Validation is a pure function and collects every
//! violation instead of stopping at the first.

use url::Url;

use crate::config::schema::ProxyConfig;

/// A single semantic violation in a loaded configuration.
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("no backends configured")]
    NoBackends,

    #[error("invalid backend address `{address}`: {reason}")]
    InvalidBackend { address: String, reason: String },

    #[error("unknown balancing algorithm `{0}`")]
    UnknownAlgorithm(String),

    #[error("firewall.request_limit must be greater than zero")]
    ZeroRequestLimit,

    #[error("{field} must be greater than zero")]
    ZeroDuration { field: &'static str },
}

const KNOWN_ALGORITHMS: &[&str] = &["round_robin"];

/// Validate a configuration, returning all violations found.
pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.balancer.backends.is_empty() {
        errors.push(ValidationError::NoBackends);
    }
    for address in &config.balancer.backends {
        match Url::parse(address) {
            Ok(url) => {
                if !matches!(url.scheme(), "http" | "https") {
                    errors.push(ValidationError::InvalidBackend {
                        address: address.clone(),
                        reason: format!("unsupported scheme `{}`", url.scheme()),
                    });
                } else if url.host_str().is_none() {
                    errors.push(ValidationError::InvalidBackend {
                        address: address.clone(),
                        reason: "missing host".to_string(),
                    });
                }
            }
            Err(e) => errors.push(ValidationError::InvalidBackend {
                address: address.clone(),
                reason: e.to_string(),
            }),
        }
    }

    if !KNOWN_ALGORITHMS.contains(&config.balancer.algorithm.as_str()) {
        errors.push(ValidationError::UnknownAlgorithm(
            config.balancer.algorithm.clone(),
        ));
    }

    if config.firewall.request_limit == 0 {
        errors.push(ValidationError::ZeroRequestLimit);
    }
    for (field, value) in [
        ("firewall.window_secs", config.firewall.window_secs),
        ("firewall.block_secs", config.firewall.block_secs),
        ("health_check.interval_secs", config.health_check.interval_secs),
        (
            "health_check.probe_timeout_secs",
            config.health_check.probe_timeout_secs,
        ),
        ("timeouts.request_secs", config.timeouts.request_secs),
        ("timeouts.upstream_secs", config.timeouts.upstream_secs),
    ] {
        if value == 0 {
            errors.push(ValidationError::ZeroDuration { field });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
