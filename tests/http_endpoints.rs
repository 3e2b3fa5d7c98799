// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Jesof

use async_trait::async_trait;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use network_telemetry_exporter::{
    AppState, Config, DeviceError, FactClient, Getter, Host, RawFacts, create_router,
};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

/// Serves the same facts for every host except those named `down*`
struct StubClient;

#[async_trait]
impl FactClient for StubClient {
    async fn fetch_facts(&self, host: &Host, _getters: &[Getter]) -> Result<RawFacts, DeviceError> {
        if host.name.starts_with("down") {
            return Err(DeviceError::Auth("invalid user name or password".to_string()));
        }
        Ok(RawFacts::new()
            .with(
                Getter::InterfacesCounters,
                json!({"eth0": {"rx_packets": 10, "tx_errors": 2}}),
            )
            .with(
                Getter::BgpNeighbors,
                json!({
                    "global": {
                        "router_id": "10.0.0.254",
                        "peers": {
                            "10.0.0.1": {
                                "is_up": true,
                                "address_family": {"ipv4": {"received_prefixes": 5}}
                            }
                        }
                    }
                }),
            ))
    }
}

fn test_host(name: &str) -> Host {
    Host {
        name: name.to_string(),
        address: "192.0.2.1:8728".to_string(),
        username: "admin".to_string(),
        password: "password".to_string(),
        platform: "routeros".to_string(),
    }
}

fn make_config(hosts: &[&str]) -> Config {
    Config {
        server_addr: "127.0.0.1:5000".to_string(),
        inventory: hosts
            .iter()
            .map(|name| ((*name).to_string(), test_host(name)))
            .collect(),
        num_workers: 10,
        host_timeout: Duration::from_secs(5),
        cycle_deadline: Some(Duration::from_secs(10)),
    }
}

fn make_state(hosts: &[&str]) -> Arc<AppState> {
    Arc::new(AppState::new(make_config(hosts), Arc::new(StubClient)))
}

async fn get(state: Arc<AppState>, uri: &str) -> (StatusCode, Option<String>, String) {
    let resp = create_router(state)
        .oneshot(Request::get(uri).body(String::new()).unwrap())
        .await
        .unwrap();

    let status = resp.status();
    let content_type = resp
        .headers()
        .get("content-type")
        .map(|v| v.to_str().unwrap().to_string());
    let body = String::from_utf8(
        resp.into_body()
            .collect()
            .await
            .unwrap()
            .to_bytes()
            .to_vec(),
    )
    .unwrap();
    (status, content_type, body)
}

// --- /metrics endpoint ---

#[tokio::test]
async fn metrics_renders_single_host_exactly() {
    let (status, content_type, body) = get(make_state(&["r1"]), "/metrics").await;

    assert_eq!(status, StatusCode::OK);
    assert!(content_type.unwrap().starts_with("text/plain"));
    assert_eq!(
        body,
        concat!(
            "network_device_interface_counter {net_device=\"r1\", interface=\"eth0\", direction=\"rx\", metric=\"packets\"} 10\n",
            "network_device_interface_counter {net_device=\"r1\", interface=\"eth0\", direction=\"tx\", metric=\"errors\"} 2\n",
            "bgp_session_up {net_device=\"r1\", peer=\"10.0.0.1\"} 1\n",
            "bgp_prefixes {net_device=\"r1\", peer=\"10.0.0.1\", metric=\"received_prefixes\"} 5\n",
        )
    );
}

#[tokio::test]
async fn metrics_separates_hosts_with_blank_line() {
    let (status, _, body) = get(make_state(&["r1", "r2"]), "/metrics").await;

    assert_eq!(status, StatusCode::OK);
    let blocks: Vec<&str> = body.split("\n\n").collect();
    assert_eq!(blocks.len(), 2);
    assert!(blocks.iter().any(|b| b.contains(r#"net_device="r1""#)));
    assert!(blocks.iter().any(|b| b.contains(r#"net_device="r2""#)));
}

#[tokio::test]
async fn metrics_omits_failed_hosts() {
    let (status, _, body) = get(make_state(&["r1", "r2", "down1"]), "/metrics").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.matches("bgp_session_up").count(), 2);
    assert!(!body.contains("down1"));
    assert!(!body.contains("invalid user name"));
}

#[tokio::test]
async fn metrics_all_hosts_failed_is_empty_ok() {
    let (status, _, body) = get(make_state(&["down1", "down2"]), "/metrics").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.is_empty());
}

#[tokio::test]
async fn metrics_empty_inventory_is_empty_ok() {
    let (status, _, body) = get(make_state(&[]), "/metrics").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.is_empty());
}

#[tokio::test]
async fn metrics_returns_500_when_worker_pool_cannot_start() {
    let mut config = make_config(&["r1"]);
    config.num_workers = 0;
    let state = Arc::new(AppState::new(config, Arc::new(StubClient)));

    let (status, _, body) = get(state, "/metrics").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(!body.contains("network_device_interface_counter"));
}

#[tokio::test]
async fn metrics_cycles_are_independent() {
    let state = make_state(&["r1", "down1"]);

    let (_, _, first) = get(state.clone(), "/metrics").await;
    let (_, _, second) = get(state, "/metrics").await;

    assert_eq!(first, second);
}

// --- /exporter/metrics endpoint ---

#[tokio::test]
async fn exporter_metrics_records_host_failures() {
    let state = make_state(&["r1", "down1"]);
    let _ = get(state.clone(), "/metrics").await;

    let (status, content_type, body) = get(state.clone(), "/exporter/metrics").await;

    assert_eq!(status, StatusCode::OK);
    assert!(content_type.unwrap().contains("openmetrics-text"));
    assert!(body.contains("exporter_host_scrape_errors_total"));
    assert!(body.contains(r#"kind="auth""#));
    assert!(body.contains("exporter_collection_hosts_failed 1"));
    assert_eq!(state.telemetry.host_success_count("r1"), 1);
    assert_eq!(state.telemetry.host_error_count("down1", "auth"), 1);
}

// --- /health endpoint ---

#[tokio::test]
async fn health_reports_inventory_size() {
    let (status, _, body) = get(make_state(&["r1", "r2", "down1"]), "/health").await;

    assert_eq!(status, StatusCode::OK);
    let health: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(health["status"], "ok");
    assert_eq!(health["hosts"], 3);
}

// --- 404 for unknown routes ---

#[tokio::test]
async fn unknown_route_returns_404() {
    let (status, _, _) = get(make_state(&[]), "/unknown").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
