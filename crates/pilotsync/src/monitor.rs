// Stream store changes to stdout as JSON lines.
//
// Stands in for a view layer: subscribes to every store and derived
// projection and prints each new snapshot as it lands.

use std::time::Duration;

use color_eyre::eyre::Result;
use serde::Serialize;
use serde_json::json;
use tracing::{debug, info};

use pilotsync_core::{ConnectionState, Dashboard};

/// Print one change record.
fn emit<T: Serialize + ?Sized>(kind: &str, value: &T) {
    match serde_json::to_string(&json!({ "kind": kind, "value": value })) {
        Ok(line) => println!("{line}"),
        Err(e) => debug!(error = %e, kind, "unprintable snapshot"),
    }
}

fn describe(state: &ConnectionState) -> serde_json::Value {
    match state {
        ConnectionState::Idle => json!({ "state": "idle" }),
        ConnectionState::Connecting { attempt } => {
            json!({ "state": "connecting", "attempt": attempt })
        }
        ConnectionState::Connected => json!({ "state": "connected" }),
        ConnectionState::Disconnected { reason, retry_in } => json!({
            "state": "disconnected",
            "reason": reason,
            "retryIn": humantime::format_duration(*retry_in).to_string(),
        }),
    }
}

/// Run until Ctrl-C or `duration` elapses.
pub async fn watch(dashboard: &Dashboard, duration: Option<Duration>) -> Result<()> {
    let store = dashboard.store().clone();

    let mut bluetooth = store.bluetooth().subscribe();
    let mut media = store.media().subscribe();
    let mut phone = store.phone().subscribe();
    let mut vehicle = store.vehicle().subscribe();
    let mut settings = store.settings().subscribe();
    let mut theme = store.theme().subscribe();
    let mut readout = store.vehicle_readout().subscribe();
    let mut conn_state = dashboard.connection_state();
    let mut updates = dashboard.updates();

    // Initial snapshots so the consumer starts from a complete picture.
    emit("settings", settings.current().as_ref());
    emit("theme", theme.current().as_ref());
    emit("bluetooth", bluetooth.current().as_ref());
    emit("media", media.current().as_ref());
    emit("phone", phone.current().as_ref());
    emit("vehicle", vehicle.current().as_ref());

    dashboard.connect().await?;

    let deadline = async {
        match duration {
            Some(d) => tokio::time::sleep(d).await,
            None => std::future::pending().await,
        }
    };
    tokio::pin!(deadline);

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("interrupted");
                break;
            }
            () = &mut deadline => break,
            Ok(()) = conn_state.changed() => {
                let state = conn_state.borrow_and_update().clone();
                emit("connection", &describe(&state));
            }
            Some(snap) = bluetooth.changed() => emit("bluetooth", snap.as_ref()),
            Some(snap) = media.changed() => emit("media", snap.as_ref()),
            Some(snap) = phone.changed() => emit("phone", snap.as_ref()),
            Some(snap) = vehicle.changed() => emit("vehicle", snap.as_ref()),
            Some(snap) = settings.changed() => emit("settings", snap.as_ref()),
            Some(snap) = theme.changed() => {
                emit("theme", snap.as_ref());
                if let Some(resolved) = snap.as_ref() {
                    let vars: serde_json::Map<_, _> = resolved
                        .css_variables()
                        .into_iter()
                        .map(|(name, value)| (name.to_owned(), value.into()))
                        .collect();
                    emit("css", &vars);
                }
            }
            Some(snap) = readout.changed() => emit("readout", snap.as_ref()),
            Ok(update) = updates.recv() => emit("updater", &update),
        }
    }

    dashboard.disconnect().await;
    Ok(())
}
