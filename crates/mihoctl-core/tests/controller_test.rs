#![allow(clippy::unwrap_used)]
// Controller round-trips against a wiremock daemon, fed through ViewState
// the way the TUI loop does it.

use std::time::Duration;

use pretty_assertions::assert_eq;
use serde_json::json;
use tokio::sync::mpsc;
use url::Url;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use mihoctl_api::GeoClient;
use mihoctl_core::config::ProbeSettings;
use mihoctl_core::{
    ClientConfig, Command, Controller, CoreError, Event, LatencyOutcome, ProxyNode, ViewState,
};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, Controller, mpsc::Receiver<Event>) {
    let server = MockServer::start().await;
    let config = ClientConfig::new(Url::parse(&server.uri()).unwrap());
    let (controller, rx) = Controller::with_geo(config, None).unwrap();
    (server, controller, rx)
}

fn proxies_body(selected: &str) -> serde_json::Value {
    json!({
        "proxies": {
            "Proxy": {
                "name": "Proxy",
                "type": "Selector",
                "udp": true,
                "all": ["A", "B", "C"],
                "now": selected,
                "history": []
            },
            "A": { "name": "A", "type": "Shadowsocks", "udp": true, "history": [] },
            "B": { "name": "B", "type": "Trojan", "udp": true, "history": [] },
            "C": { "name": "C", "type": "Vmess", "udp": false, "history": [] }
        }
    })
}

async fn mount_proxies(server: &MockServer, selected: &str) {
    Mock::given(method("GET"))
        .and(path("/proxies"))
        .respond_with(ResponseTemplate::new(200).set_body_json(proxies_body(selected)))
        .mount(server)
        .await;
}

async fn mount_delay(server: &MockServer, node: &str, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path(format!("/proxies/{node}/delay")))
        .respond_with(response)
        .mount(server)
        .await;
}

async fn next_event(rx: &mut mpsc::Receiver<Event>) -> Event {
    tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .expect("event within 5s")
        .expect("queue open")
}

fn probe() -> ProbeSettings {
    ProbeSettings {
        test_url: "http://www.gstatic.com/generate_204".into(),
        timeout_ms: 2000,
    }
}

/// A mocked 3-node group where B times out.
async fn mount_three_node_group(server: &MockServer) {
    mount_proxies(server, "A").await;
    mount_delay(
        server,
        "A",
        ResponseTemplate::new(200).set_body_json(json!({ "delay": 120 })),
    )
    .await;
    mount_delay(
        server,
        "B",
        ResponseTemplate::new(504).set_body_json(json!({ "message": "Timeout" })),
    )
    .await;
    mount_delay(
        server,
        "C",
        ResponseTemplate::new(200).set_body_json(json!({ "delay": 80 })),
    )
    .await;
}

fn abc() -> Vec<String> {
    vec!["A".into(), "B".into(), "C".into()]
}

// ── Selection ───────────────────────────────────────────────────────

#[tokio::test]
async fn test_select_refreshes_groups_and_nodes_together() {
    let (server, controller, mut rx) = setup().await;

    Mock::given(method("PUT"))
        .and(path("/proxies/Proxy"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    mount_proxies(&server, "B").await;

    let mut state = ViewState::default();
    controller.execute(Command::SelectProxy {
        group: "Proxy".into(),
        proxy: "B".into(),
    });
    let event = next_event(&mut rx).await;
    assert!(matches!(event, Event::ProxySelected { .. }));
    state.apply(event);

    let group = state.nodes.current_group().unwrap();
    assert!(group.is_selected("B"));
    assert_eq!(state.nodes.current_member(), Some("A"));
    assert_eq!(state.nodes.listing.nodes.len(), 4);
}

#[tokio::test]
async fn test_select_unknown_group_reports_failure() {
    let (server, controller, mut rx) = setup().await;

    Mock::given(method("PUT"))
        .and(path("/proxies/Nope"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(json!({ "message": "resource not found" })),
        )
        .mount(&server)
        .await;

    let err = controller.select_proxy("Nope", "A").await.unwrap_err();
    assert!(matches!(err, CoreError::NotFound { .. }));

    let mut state = ViewState::default();
    controller.execute(Command::SelectProxy {
        group: "Nope".into(),
        proxy: "A".into(),
    });
    state.apply(next_event(&mut rx).await);
    assert!(state.last_error.unwrap().contains("resource not found"));
}

// ── Latency ─────────────────────────────────────────────────────────

#[tokio::test]
async fn test_group_falls_back_to_single_probes() {
    let (server, controller, _rx) = setup().await;
    mount_three_node_group(&server).await;
    Mock::given(method("GET"))
        .and(path("/group/Proxy/delay"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let mut results = controller.test_group("Proxy", &abc(), &probe()).await;
    results.sort_by(|a, b| a.0.cmp(&b.0));

    assert_eq!(
        results,
        vec![
            ("A".to_owned(), LatencyOutcome::Millis(120)),
            ("B".to_owned(), LatencyOutcome::Failed("Timeout".into())),
            ("C".to_owned(), LatencyOutcome::Millis(80)),
        ]
    );
}

#[tokio::test]
async fn test_group_uses_bulk_endpoint_when_available() {
    let (server, controller, _rx) = setup().await;
    Mock::given(method("GET"))
        .and(path("/group/Proxy/delay"))
        .and(query_param("timeout", "2000"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "A": 120, "C": 80 })))
        .expect(1)
        .mount(&server)
        .await;

    let results = controller.test_group("Proxy", &abc(), &probe()).await;

    assert_eq!(results[0], ("A".to_owned(), LatencyOutcome::Millis(120)));
    assert!(results[1].1.is_failed());
    assert_eq!(results[2], ("C".to_owned(), LatencyOutcome::Millis(80)));
}

#[tokio::test]
async fn test_all_completes_with_one_failure_when_a_node_times_out() {
    let (server, controller, mut rx) = setup().await;
    mount_three_node_group(&server).await;
    Mock::given(method("GET"))
        .and(path("/group/Proxy/delay"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let mut state = ViewState::default();
    controller.execute(Command::RefreshProxies);
    state.apply(next_event(&mut rx).await);

    // Same path the `a` key takes.
    let commands = mihoctl_core::dispatch::handle_key(&mut state, mihoctl_core::Key::Char('a'));
    assert_eq!(commands.len(), 1);
    for command in commands {
        controller.execute(command);
    }

    let follow_up = loop {
        let follow_up = state.apply(next_event(&mut rx).await);
        if !follow_up.is_empty() {
            break follow_up;
        }
    };

    assert_eq!(follow_up, vec![Command::RefreshProxies]);
    assert!(!state.nodes.is_testing());
    assert_eq!(state.nodes.failures.len(), 1);
    assert_eq!(state.nodes.failures[0].node, "B");
    assert_eq!(
        state.nodes.node("A").and_then(ProxyNode::latest),
        Some(&LatencyOutcome::Millis(120))
    );
    assert_eq!(
        state.nodes.node("C").and_then(ProxyNode::latest),
        Some(&LatencyOutcome::Millis(80))
    );
}

#[tokio::test]
async fn test_probe_settings_apply_live() {
    let (server, controller, _rx) = setup().await;
    Mock::given(method("GET"))
        .and(path("/proxies/A/delay"))
        .and(query_param("url", "https://cp.cloudflare.com/"))
        .and(query_param("timeout", "1500"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "delay": 42 })))
        .expect(1)
        .mount(&server)
        .await;

    controller.update_probe(ProbeSettings {
        test_url: "https://cp.cloudflare.com/".into(),
        timeout_ms: 1500,
    });
    let probe = controller.probe_settings();
    assert_eq!(
        controller.test_latency("A", &probe).await,
        LatencyOutcome::Millis(42)
    );
}

// ── Connections ─────────────────────────────────────────────────────

#[tokio::test]
async fn test_close_connection_emits_confirmation() {
    let (server, controller, mut rx) = setup().await;
    Mock::given(method("DELETE"))
        .and(path("/connections/abc-123"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    controller.execute(Command::CloseConnection {
        id: "abc-123".into(),
    });
    match next_event(&mut rx).await {
        Event::ConnectionClosed { id } => assert_eq!(id, "abc-123"),
        other => panic!("unexpected event: {other:?}"),
    }
}

#[tokio::test]
async fn test_geo_lookup_failure_is_unavailable() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/geoip/1.1.1.1"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let geo = GeoClient::with_base_url(Url::parse(&format!("{}/geoip/", server.uri())).unwrap())
        .unwrap();
    let config = ClientConfig::new(Url::parse(&server.uri()).unwrap());
    let (controller, _rx) = Controller::with_geo(config, Some(geo)).unwrap();

    assert_eq!(controller.lookup_geo("1.1.1.1").await, None);
}

// ── Unreachable daemon ──────────────────────────────────────────────

#[tokio::test]
async fn test_unreachable_daemon_is_transport_error() {
    let config = ClientConfig::new(Url::parse("http://127.0.0.1:9").unwrap());
    let (controller, mut rx) = Controller::with_geo(config, None).unwrap();

    let err = controller.proxies().await.unwrap_err();
    assert!(err.is_unreachable(), "got {err:?}");

    controller.execute(Command::RefreshProxies);
    assert!(matches!(next_event(&mut rx).await, Event::Failed(_)));
}

#[tokio::test]
async fn test_shutdown_stops_streams() {
    let (_server, controller, _rx) = setup().await;
    controller.start_streams().unwrap();
    assert!(controller.streams_running());
    controller.shutdown();
    assert!(!controller.streams_running());
}
