// End-to-end sync tests: an in-process backend pushes envelopes and the
// dashboard stores follow.
#![allow(clippy::unwrap_used)]

use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use serde_json::json;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use pilotsync_core::{
    ConnectionState, ControlRequest, CoreError, Dashboard, DashboardConfig, MediaSource,
    ReconnectConfig, SettingsPayload, StoreStream,
};

// ── Helpers ─────────────────────────────────────────────────────────

const STEP: Duration = Duration::from_secs(5);

fn config_for(host: String) -> DashboardConfig {
    DashboardConfig {
        reconnect: ReconnectConfig {
            initial_delay: Duration::from_millis(10),
            max_delay: Duration::from_millis(50),
            ..ReconnectConfig::default()
        },
        ..DashboardConfig::for_host(host)
    }
}

/// A fake backend: sends every frame it is handed, and reports every
/// text frame it receives.
async fn backend() -> (String, mpsc::Sender<serde_json::Value>, mpsc::Receiver<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let host = listener.local_addr().unwrap().to_string();
    let (push_tx, mut push_rx) = mpsc::channel::<serde_json::Value>(16);
    let (seen_tx, seen_rx) = mpsc::channel::<String>(16);

    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let mut ws = tokio_tungstenite::accept_async(stream).await.unwrap();
        loop {
            tokio::select! {
                Some(value) = push_rx.recv() => {
                    ws.send(Message::text(value.to_string())).await.unwrap();
                }
                frame = ws.next() => match frame {
                    Some(Ok(Message::Text(text))) => {
                        let _ = seen_tx.send(text.to_string()).await;
                    }
                    Some(Ok(_)) => {}
                    _ => break,
                },
            }
        }
    });

    (host, push_tx, seen_rx)
}

async fn wait_until<T, F>(mut sub: StoreStream<T>, pred: F) -> Arc<T>
where
    T: Send + Sync + 'static,
    F: Fn(&T) -> bool,
{
    tokio::time::timeout(STEP, async {
        loop {
            let latest = sub.latest();
            if pred(&latest) {
                return latest;
            }
            sub.changed().await.expect("store dropped");
        }
    })
    .await
    .expect("timed out waiting for store")
}

async fn wait_connected(dashboard: &Dashboard) {
    let mut state = dashboard.connection_state();
    tokio::time::timeout(STEP, state.wait_for(ConnectionState::is_connected))
        .await
        .expect("timed out waiting for connection")
        .unwrap();
}

// ── Sync ────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_envelopes_flow_into_stores() {
    let (host, push, _seen) = backend().await;
    let dashboard = Dashboard::new(config_for(host)).unwrap();
    dashboard.connect().await.unwrap();
    wait_connected(&dashboard).await;

    push.send(json!({ "type": "settings", "settings": { "selectedTheme": "dark", "metricUnits": true } }))
        .await
        .unwrap();
    push.send(json!({ "type": "media", "media": { "source": "radio", "radio": { "stationName": "KEXP" } } }))
        .await
        .unwrap();

    let media = wait_until(dashboard.store().media().subscribe(), |m| {
        m.radio.station_name.is_some()
    })
    .await;
    assert_eq!(media.source, MediaSource::Radio);

    // Envelopes apply in order, so settings landed first.
    let settings = dashboard.store().settings().snapshot();
    assert!(settings.metric_units);
    let theme = (*dashboard.store().theme().snapshot()).clone();
    assert_eq!(theme.map(|t| t.name).as_deref(), Some("dark"));

    dashboard.disconnect().await;
    assert_eq!(*dashboard.connection_state().borrow(), ConnectionState::Idle);
    // Stores keep their last values.
    assert!(dashboard.store().settings().snapshot().metric_units);
}

#[tokio::test]
async fn test_malformed_frames_are_skipped() {
    let (host, push, _seen) = backend().await;
    let dashboard = Dashboard::new(config_for(host)).unwrap();
    dashboard.connect().await.unwrap();
    wait_connected(&dashboard).await;

    push.send(json!({ "type": "phone", "vehicle": { "connected": true } }))
        .await
        .unwrap();
    push.send(json!({ "type": "vehicle", "vehicle": { "connected": true, "rpm": 850.0 } }))
        .await
        .unwrap();

    let vehicle = wait_until(dashboard.store().vehicle().subscribe(), |v| v.connected).await;
    assert_eq!(vehicle.rpm, Some(850.0));
    assert!(!dashboard.store().phone().snapshot().enabled);

    dashboard.disconnect().await;
}

#[tokio::test]
async fn test_push_settings_goes_out_without_version() {
    let (host, _push, mut seen) = backend().await;
    let dashboard = Dashboard::new(config_for(host)).unwrap();
    dashboard.connect().await.unwrap();
    wait_connected(&dashboard).await;

    let settings = SettingsPayload {
        version: Some("9.9.9".into()),
        tf_hour_time: Some(true),
        ..SettingsPayload::default()
    };
    dashboard.push_settings(settings).await.unwrap();

    let text = tokio::time::timeout(STEP, seen.recv()).await.unwrap().unwrap();
    let sent: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(sent, json!({ "type": "settings", "settings": { "tfHourTime": true } }));

    dashboard.disconnect().await;
}

#[tokio::test]
async fn test_connect_twice_is_rejected() {
    let (host, _push, _seen) = backend().await;
    let dashboard = Dashboard::new(config_for(host)).unwrap();
    dashboard.connect().await.unwrap();

    let err = dashboard.connect().await.unwrap_err();
    assert!(matches!(err, CoreError::AlreadyStarted));

    dashboard.disconnect().await;
}

#[tokio::test]
async fn test_unreachable_backend_reports_disconnected() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let host = listener.local_addr().unwrap().to_string();
    drop(listener);

    let dashboard = Dashboard::new(config_for(host)).unwrap();
    dashboard.connect().await.unwrap();

    let mut state = dashboard.connection_state();
    let seen = tokio::time::timeout(
        STEP,
        state.wait_for(|s| matches!(s, ConnectionState::Connecting { attempt } if *attempt >= 3)),
    )
    .await
    .unwrap()
    .unwrap()
    .clone();
    assert!(!seen.is_connected());

    dashboard.disconnect().await;
}

// ── Control requests ────────────────────────────────────────────────

#[tokio::test]
async fn test_check_for_update_is_broadcast() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/updater/check"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "update": { "version": "1.1.0", "completed": true }
        })))
        .mount(&server)
        .await;

    let host = server.address().to_string();
    let dashboard = Dashboard::new(config_for(host)).unwrap();
    let mut updates = dashboard.updates();

    let payload = dashboard.check_for_update().await.unwrap();
    assert_eq!(payload.update.as_ref().map(|u| u.version.as_str()), Some("1.1.0"));
    assert_eq!(updates.recv().await.unwrap(), payload);
}

#[tokio::test]
async fn test_request_hits_media_endpoint() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/media/play-pause"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let dashboard = Dashboard::new(config_for(server.address().to_string())).unwrap();
    dashboard.send_request(ControlRequest::TogglePlayback).await.unwrap();

    Mock::given(method("POST"))
        .and(path("/media/next"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    let err = dashboard.send_request(ControlRequest::NextTrack).await.unwrap_err();
    assert!(matches!(err, CoreError::ControlRequest { status: Some(500), .. }));
}
