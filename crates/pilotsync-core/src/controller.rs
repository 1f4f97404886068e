// ── Dashboard sync context ──
//
// Owns the backend channel, the stores, and the task that feeds one into
// the other. Everything the view layer needs hangs off a `Dashboard`.

use std::sync::Arc;
use std::time::Duration;

use chrono::Timelike;
use tokio::sync::{Mutex, broadcast, mpsc, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use pilotsync_api::protocol::{Envelope, SettingsPayload, UpdaterPayload};
use pilotsync_api::transport::TransportConfig;
use pilotsync_api::{ChannelEvent, ControlClient, ControlRequest, WebSocketHandle};

use crate::config::DashboardConfig;
use crate::convert::{self, ClockTime};
use crate::error::CoreError;
use crate::router::Router;
use crate::store::DashboardStore;

const UPDATE_CHANNEL_SIZE: usize = 16;

// ── ConnectionState ──────────────────────────────────────────────

/// Connection state observable by consumers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionState {
    /// Not started, or stopped with [`Dashboard::disconnect`].
    Idle,
    Connecting { attempt: u32 },
    Connected,
    /// Lost or never reached; the next attempt follows after `retry_in`.
    Disconnected { reason: String, retry_in: Duration },
}

impl ConnectionState {
    pub fn is_connected(&self) -> bool {
        matches!(self, Self::Connected)
    }
}

// ── Dashboard ────────────────────────────────────────────────────

/// The main entry point for consumers.
///
/// Cheaply cloneable. Stores are readable at any time; they fill in once
/// [`connect`](Self::connect) has started syncing.
#[derive(Clone)]
pub struct Dashboard {
    inner: Arc<DashboardInner>,
}

struct DashboardInner {
    config: DashboardConfig,
    store: Arc<DashboardStore>,
    router: Router,
    connection_state: watch::Sender<ConnectionState>,
    updates: broadcast::Sender<UpdaterPayload>,
    control: ControlClient,
    session: Mutex<Option<Session>>,
}

/// A running sync task and the means to reach it.
struct Session {
    cancel: CancellationToken,
    outbound: mpsc::Sender<Envelope>,
    task: JoinHandle<()>,
}

impl Dashboard {
    /// Create a dashboard from configuration. Does NOT connect; call
    /// [`connect()`](Self::connect) to start syncing.
    pub fn new(config: DashboardConfig) -> Result<Self, CoreError> {
        let transport = TransportConfig::default().with_timeout(config.request_timeout);
        let control = ControlClient::new(config.control_url()?, &transport)?;

        let store = Arc::new(DashboardStore::new());
        let (connection_state, _) = watch::channel(ConnectionState::Idle);
        let (updates, _) = broadcast::channel(UPDATE_CHANNEL_SIZE);
        let router = Router::new(Arc::clone(&store), updates.clone());

        Ok(Self {
            inner: Arc::new(DashboardInner {
                config,
                store,
                router,
                connection_state,
                updates,
                control,
                session: Mutex::new(None),
            }),
        })
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.inner.config
    }

    /// Access the stores.
    pub fn store(&self) -> &Arc<DashboardStore> {
        &self.inner.store
    }

    // ── Connection lifecycle ─────────────────────────────────────

    /// Start syncing with the backend.
    ///
    /// Returns once the sync task is running; the channel itself comes up
    /// asynchronously and keeps reconnecting until
    /// [`disconnect`](Self::disconnect).
    pub async fn connect(&self) -> Result<(), CoreError> {
        let mut session = self.inner.session.lock().await;
        if session.as_ref().is_some_and(|s| !s.task.is_finished()) {
            return Err(CoreError::AlreadyStarted);
        }

        let url = self.inner.config.channel_url()?;
        let cancel = CancellationToken::new();
        let handle = WebSocketHandle::connect(
            url.clone(),
            self.inner.config.reconnect.clone(),
            cancel.clone(),
        )?;
        let outbound = handle.sender();

        let task = tokio::spawn(sync_task(self.clone(), handle));
        *session = Some(Session {
            cancel,
            outbound,
            task,
        });

        info!(url = %url, "dashboard sync started");
        Ok(())
    }

    /// Stop syncing. Stores keep their last values.
    pub async fn disconnect(&self) {
        let session = self.inner.session.lock().await.take();
        if let Some(session) = session {
            session.cancel.cancel();
            if let Err(e) = session.task.await {
                warn!(error = %e, "sync task ended abnormally");
            }
        }
        self.inner.connection_state.send_replace(ConnectionState::Idle);
        debug!("disconnected");
    }

    // ── Outbound ─────────────────────────────────────────────────

    /// Fire a control request without waiting for it. Failures are logged.
    pub fn request(&self, request: ControlRequest) {
        let control = self.inner.control.clone();
        tokio::spawn(async move {
            match control.send(request).await {
                Ok(()) => debug!(%request, "control request accepted"),
                Err(e) if e.is_transient() => {
                    warn!(%request, error = %e, "backend unreachable, control request dropped");
                }
                Err(e) => warn!(%request, error = %e, "control request rejected"),
            }
        });
    }

    /// Send a control request and wait for the backend to accept it.
    pub async fn send_request(&self, request: ControlRequest) -> Result<(), CoreError> {
        self.inner.control.send(request).await?;
        Ok(())
    }

    /// Ask the backend for an update check. The answer is returned and
    /// also published on [`updates`](Self::updates).
    pub async fn check_for_update(&self) -> Result<UpdaterPayload, CoreError> {
        let payload = self.inner.control.check_for_update().await?;
        let _ = self.inner.updates.send(payload.clone());
        Ok(payload)
    }

    /// Write settings back to the backend over the channel.
    ///
    /// Local stores are not touched; they change when the backend echoes
    /// the new settings. `version` is never sent.
    pub async fn push_settings(&self, mut settings: SettingsPayload) -> Result<(), CoreError> {
        settings.version = None;

        let outbound = self
            .inner
            .session
            .lock()
            .await
            .as_ref()
            .map(|s| s.outbound.clone())
            .ok_or_else(|| CoreError::ConnectionLost {
                reason: "dashboard is not connected".into(),
            })?;

        outbound
            .send(Envelope::Settings(settings))
            .await
            .map_err(|_| CoreError::ConnectionLost {
                reason: "sync task is not running".into(),
            })
    }

    // ── State observation ────────────────────────────────────────

    /// Subscribe to connection state changes.
    pub fn connection_state(&self) -> watch::Receiver<ConnectionState> {
        self.inner.connection_state.subscribe()
    }

    pub fn is_connected(&self) -> bool {
        self.inner.connection_state.borrow().is_connected()
    }

    /// Subscribe to updater results.
    pub fn updates(&self) -> broadcast::Receiver<UpdaterPayload> {
        self.inner.updates.subscribe()
    }

    /// Current local time, formatted per the clock preference.
    pub fn clock_now(&self) -> ClockTime {
        self.clock_at(&chrono::Local::now())
    }

    /// Format any time of day per the clock preference.
    pub fn clock_at(&self, time: &impl Timelike) -> ClockTime {
        let format = self.inner.store.preferences.snapshot().clock;
        convert::format_clock(time.hour(), time.minute(), format)
    }
}

// ── Background task ──────────────────────────────────────────────

/// Drain channel events in order: lifecycle events drive the connection
/// state, envelopes go through the router.
async fn sync_task(dashboard: Dashboard, mut handle: WebSocketHandle) {
    let inner = &dashboard.inner;

    while let Some(event) = handle.next_event().await {
        match event {
            ChannelEvent::Connecting { attempt } => {
                inner
                    .connection_state
                    .send_replace(ConnectionState::Connecting { attempt });
            }
            ChannelEvent::Connected => {
                info!("dashboard connected");
                inner.connection_state.send_replace(ConnectionState::Connected);
            }
            ChannelEvent::Disconnected { reason, retry_in } => {
                inner
                    .connection_state
                    .send_replace(ConnectionState::Disconnected { reason, retry_in });
            }
            ChannelEvent::Message(envelope) => inner.router.apply(envelope),
        }
    }

    handle.shutdown().await;
    debug!("sync task exiting");
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::convert::Meridiem;
    use chrono::NaiveTime;

    #[test]
    fn new_dashboard_is_idle() {
        let dashboard = Dashboard::new(DashboardConfig::default()).unwrap();
        assert_eq!(*dashboard.connection_state().borrow(), ConnectionState::Idle);
        assert!(!dashboard.is_connected());
    }

    #[test]
    fn rejects_bad_host() {
        let result = Dashboard::new(DashboardConfig::for_host("http://oops"));
        assert!(matches!(result, Err(CoreError::Config { .. })));
    }

    #[test]
    fn clock_follows_preferences() {
        let dashboard = Dashboard::new(DashboardConfig::default()).unwrap();
        let time = NaiveTime::from_hms_opt(0, 5, 0).unwrap();
        let clock = dashboard.clock_at(&time);
        assert_eq!(clock.digits(), "12:05");
        assert_eq!(clock.meridiem, Some(Meridiem::Am));
    }

    #[tokio::test]
    async fn push_settings_requires_a_session() {
        let dashboard = Dashboard::new(DashboardConfig::default()).unwrap();
        let err = dashboard
            .push_settings(SettingsPayload::default())
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::ConnectionLost { .. }));
    }
}
