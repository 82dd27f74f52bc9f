//! Backend selection over the live health snapshot.

use std::sync::Arc;

use url::Url;

use crate::health::active::HealthMonitor;
use crate::load_balancer::BalancePolicy;

/// Glues the health monitor's snapshot to a balancing policy.
pub struct BackendSelector {
    monitor: Arc<HealthMonitor>,
    policy: Box<dyn BalancePolicy>,
}

impl BackendSelector {
    pub fn new(monitor: Arc<HealthMonitor>, policy: Box<dyn BalancePolicy>) -> Self {
        Self { monitor, policy }
    }

    /// Next backend to dispatch to, or `None` when nothing is healthy.
    pub fn next(&self) -> Option<Url> {
        let healthy = self.monitor.healthy_backends();
        self.policy.select_next(&healthy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::HealthCheckConfig;
    use crate::load_balancer::round_robin::RoundRobin;

    fn monitor_with(addrs: &[&str]) -> Arc<HealthMonitor> {
        let urls: Vec<Url> = addrs.iter().map(|a| Url::parse(a).unwrap()).collect();
        Arc::new(HealthMonitor::new(&urls, &HealthCheckConfig::default()))
    }

    #[tokio::test]
    async fn skips_backends_marked_dead() {
        let monitor = monitor_with(&["http://127.0.0.1:9001", "http://127.0.0.1:9002"]);
        monitor.backends()[0].set_alive(false);

        let selector = BackendSelector::new(monitor, Box::new(RoundRobin::new()));
        let first = selector.next().unwrap();
        let second = selector.next().unwrap();
        assert_eq!(first.port(), Some(9002));
        assert_eq!(second.port(), Some(9002));
    }

    #[tokio::test]
    async fn returns_none_until_a_backend_recovers() {
        let monitor = monitor_with(&["http://127.0.0.1:9001"]);
        monitor.backends()[0].set_alive(false);

        let selector = BackendSelector::new(monitor.clone(), Box::new(RoundRobin::new()));
        assert!(selector.next().is_none());
        assert!(selector.next().is_none());

        monitor.backends()[0].set_alive(true);
        assert!(selector.next().is_some());
    }
}
