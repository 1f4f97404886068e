// ── Merge router ──
//
// Maps each validated envelope to exactly one store mutation, then
// recomputes whatever derived state depends on that store. Runs on a
// single task, so envelopes apply strictly in arrival order.

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::broadcast;
use tracing::{debug, warn};

use pilotsync_api::protocol::{Envelope, MessageType, UpdaterPayload};

use crate::error::CoreError;
use crate::store::{DashboardStore, Merge};
use crate::theme;

/// Applies envelopes to a [`DashboardStore`].
#[derive(Clone)]
pub struct Router {
    store: Arc<DashboardStore>,
    updates: broadcast::Sender<UpdaterPayload>,
}

impl Router {
    pub fn new(store: Arc<DashboardStore>, updates: broadcast::Sender<UpdaterPayload>) -> Self {
        Self { store, updates }
    }

    pub fn store(&self) -> &Arc<DashboardStore> {
        &self.store
    }

    /// Merge one envelope into its store.
    pub fn apply(&self, envelope: Envelope) {
        let message_type = envelope.message_type();
        let store = &self.store;

        let changed = match envelope {
            Envelope::Bluetooth(patch) => store.bluetooth.update(|s| s.merge(patch)),
            Envelope::Media(patch) => store.media.update(|s| s.merge(patch)),
            Envelope::Phone(patch) => store.phone.update(|s| s.merge(patch)),
            Envelope::Vehicle(patch) => {
                let changed = store.vehicle.update(|s| s.merge(patch));
                if changed {
                    store.refresh_readout();
                }
                changed
            }
            Envelope::Settings(patch) => {
                let theme_selected = patch.selected_theme.is_some();
                let changed = store.settings.update(|s| s.merge(patch));
                if changed && store.refresh_preferences() {
                    store.refresh_readout();
                }
                if theme_selected {
                    self.apply_selected_theme();
                }
                changed
            }
            Envelope::Updater(payload) => {
                // Not a store; nobody listening is fine.
                let _ = self.updates.send(payload);
                false
            }
        };

        store.last_message.replace(Some(Utc::now()));
        debug!(%message_type, changed, "Envelope applied");
    }

    /// Parse a raw frame and apply it. A bad frame touches nothing.
    pub fn apply_frame(&self, text: &str) -> Result<MessageType, CoreError> {
        let envelope = Envelope::parse(text).inspect_err(|e| {
            warn!(error = %e, "Dropping inbound frame");
        })?;
        let message_type = envelope.message_type();
        self.apply(envelope);
        Ok(message_type)
    }

    /// Resolve the selected theme against the current catalog. On a miss
    /// the previous theme stays active.
    fn apply_selected_theme(&self) {
        let settings = self.store.settings.snapshot();
        match theme::resolve(&settings.selected_theme, &settings.themes) {
            Ok(resolved) => {
                if self.store.theme.replace(Some(resolved)) {
                    debug!(theme = %settings.selected_theme, "Theme applied");
                }
            }
            Err(e) => warn!(error = %e, "Keeping previous theme"),
        }
    }
}
