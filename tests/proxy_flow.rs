//! End-to-end dispatch scenarios against mock backends.

mod common;

use std::collections::HashSet;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use lean_balancer::config::ProxyConfig;
use lean_balancer::http::HttpServer;
use lean_balancer::lifecycle::Shutdown;
use reqwest::StatusCode;

/// Bind the balancer on an ephemeral port and run it in the background.
async fn spawn_balancer(config: ProxyConfig) -> (SocketAddr, Shutdown) {
    let shutdown = Shutdown::new();
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = HttpServer::new(config);
    let rx = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, rx).await;
    });
    (addr, shutdown)
}

/// Config with firewall and health checks off, so tests opt in to the
/// subsystem they exercise.
fn config_with_backends(backends: Vec<String>) -> ProxyConfig {
    let mut config = ProxyConfig::default();
    config.balancer.backends = backends;
    config.firewall.enabled = false;
    config.health_check.enabled = false;
    config
}

fn client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}

#[tokio::test]
async fn reverse_mode_cycles_round_robin() {
    let b1 = common::start_mock_backend("b1").await;
    let b2 = common::start_mock_backend("b2").await;
    let config = config_with_backends(vec![format!("http://{b1}"), format!("http://{b2}")]);
    let (addr, shutdown) = spawn_balancer(config).await;

    let client = client();
    let mut bodies = Vec::new();
    for _ in 0..4 {
        let res = client
            .get(format!("http://{addr}/reverse/echo"))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        bodies.push(res.text().await.unwrap());
    }
    assert_eq!(bodies, ["b1", "b2", "b1", "b2"]);

    shutdown.trigger();
}

#[tokio::test]
async fn failing_probe_evicts_backend_until_recovery() {
    let b1 = common::start_mock_backend("b1").await;

    let b2_healthy = Arc::new(AtomicBool::new(true));
    let flag = b2_healthy.clone();
    let b2 = common::start_programmable_backend(move || {
        let flag = flag.clone();
        async move {
            if flag.load(Ordering::SeqCst) {
                (200, "b2".to_string())
            } else {
                (500, "dead".to_string())
            }
        }
    })
    .await;

    let mut config = config_with_backends(vec![format!("http://{b1}"), format!("http://{b2}")]);
    config.health_check.enabled = true;
    config.health_check.interval_secs = 1;
    let (addr, shutdown) = spawn_balancer(config).await;
    let client = client();

    tokio::time::sleep(Duration::from_millis(1500)).await;

    let mut seen = HashSet::new();
    for _ in 0..4 {
        let body = client
            .get(format!("http://{addr}/reverse"))
            .send()
            .await
            .unwrap()
            .text()
            .await
            .unwrap();
        seen.insert(body);
    }
    assert!(seen.contains("b1") && seen.contains("b2"), "both backends in rotation: {seen:?}");

    // Kill b2's health answers; it leaves the rotation after the next
    // completed round.
    b2_healthy.store(false, Ordering::SeqCst);
    tokio::time::sleep(Duration::from_millis(2500)).await;

    for _ in 0..6 {
        let body = client
            .get(format!("http://{addr}/reverse"))
            .send()
            .await
            .unwrap()
            .text()
            .await
            .unwrap();
        assert_eq!(body, "b1", "only b1 should serve while b2 is dead");
    }

    // And it comes back once probes see 200 again.
    b2_healthy.store(true, Ordering::SeqCst);
    tokio::time::sleep(Duration::from_millis(2500)).await;

    let mut seen = HashSet::new();
    for _ in 0..4 {
        let body = client
            .get(format!("http://{addr}/reverse"))
            .send()
            .await
            .unwrap()
            .text()
            .await
            .unwrap();
        seen.insert(body);
    }
    assert!(seen.contains("b2"), "b2 should rejoin the rotation: {seen:?}");

    shutdown.trigger();
}

#[tokio::test]
async fn reverse_returns_503_with_no_healthy_backends() {
    // Nothing listens on port 1; the first probe round marks it dead.
    let mut config = config_with_backends(vec!["http://127.0.0.1:1".to_string()]);
    config.health_check.enabled = true;
    config.health_check.interval_secs = 1;
    let (addr, shutdown) = spawn_balancer(config).await;

    tokio::time::sleep(Duration::from_millis(1500)).await;

    let client = client();
    for _ in 0..2 {
        let res = client
            .get(format!("http://{addr}/reverse/x"))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    shutdown.trigger();
}

#[tokio::test]
async fn forward_mode_dispatches_to_target() {
    let backend = common::start_mock_backend("forwarded").await;
    let (addr, shutdown) = spawn_balancer(config_with_backends(Vec::new())).await;

    let res = client()
        .get(format!("http://{addr}/forward?target=http://{backend}/data"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.text().await.unwrap(), "forwarded");

    shutdown.trigger();
}

#[tokio::test]
async fn forward_without_target_is_bad_request() {
    let (addr, shutdown) = spawn_balancer(config_with_backends(Vec::new())).await;

    let res = client()
        .get(format!("http://{addr}/forward"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(res.text().await.unwrap(), "Missing target parameter");

    shutdown.trigger();
}

#[tokio::test]
async fn upstream_timeout_surfaces_503() {
    let hole = common::start_black_hole().await;
    let mut config = config_with_backends(vec![format!("http://{hole}")]);
    config.timeouts.upstream_secs = 1;
    let (addr, shutdown) = spawn_balancer(config).await;

    let started = std::time::Instant::now();
    let res = client()
        .get(format!("http://{addr}/reverse/slow"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert!(
        started.elapsed() < Duration::from_secs(5),
        "dispatch must be bounded by the upstream timeout"
    );

    shutdown.trigger();
}

#[tokio::test]
async fn firewall_limits_then_blocks() {
    let backend = common::start_mock_backend("ok").await;
    let mut config = config_with_backends(vec![format!("http://{backend}")]);
    config.firewall.enabled = true;
    config.firewall.request_limit = 3;
    let (addr, shutdown) = spawn_balancer(config).await;
    let client = client();

    for _ in 0..3 {
        let res = client.get(format!("http://{addr}/")).send().await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
    }

    // The breaching request gets 429 and creates the block...
    let res = client.get(format!("http://{addr}/")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(res.text().await.unwrap(), "Too many requests");

    // ...and from then on the block answers first.
    let res = client.get(format!("http://{addr}/")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    assert_eq!(res.text().await.unwrap(), "Access denied");

    shutdown.trigger();
}

#[tokio::test]
async fn dispatcher_default_routes() {
    let (addr, shutdown) = spawn_balancer(config_with_backends(Vec::new())).await;
    let client = client();

    let res = client.get(format!("http://{addr}/")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.text().await.unwrap(), "lean-balancer OK");

    let res = client
        .get(format!("http://{addr}/health"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.text().await.unwrap(), "OK");

    let res = client
        .get(format!("http://{addr}/nothing/here"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    shutdown.trigger();
}
