// ── Dashboard store ──
//
// The five domain stores plus the projections derived from them.
// Only the router writes here; everything else reads snapshots or
// subscribes.

use chrono::{DateTime, Utc};

use super::Store;
use crate::model::{Bluetooth, Media, Phone, Preferences, Settings, Vehicle, VehicleReadout};
use crate::theme::{self, ResolvedTheme};

/// All dashboard state.
pub struct DashboardStore {
    pub(crate) bluetooth: Store<Bluetooth>,
    pub(crate) media: Store<Media>,
    pub(crate) phone: Store<Phone>,
    pub(crate) vehicle: Store<Vehicle>,
    pub(crate) settings: Store<Settings>,
    pub(crate) theme: Store<Option<ResolvedTheme>>,
    pub(crate) preferences: Store<Preferences>,
    pub(crate) readout: Store<VehicleReadout>,
    pub(crate) last_message: Store<Option<DateTime<Utc>>>,
}

impl DashboardStore {
    pub fn new() -> Self {
        let settings = Settings::default();
        let theme = theme::resolve(&settings.selected_theme, &settings.themes).ok();
        let preferences = Preferences::from(&settings);
        let readout = VehicleReadout::new(&Vehicle::default(), preferences.units);

        Self {
            bluetooth: Store::default(),
            media: Store::default(),
            phone: Store::default(),
            vehicle: Store::default(),
            settings: Store::new(settings),
            theme: Store::new(theme),
            preferences: Store::new(preferences),
            readout: Store::new(readout),
            last_message: Store::default(),
        }
    }

    // ── Domain stores ────────────────────────────────────────────────

    pub fn bluetooth(&self) -> &Store<Bluetooth> {
        &self.bluetooth
    }

    pub fn media(&self) -> &Store<Media> {
        &self.media
    }

    pub fn phone(&self) -> &Store<Phone> {
        &self.phone
    }

    pub fn vehicle(&self) -> &Store<Vehicle> {
        &self.vehicle
    }

    pub fn settings(&self) -> &Store<Settings> {
        &self.settings
    }

    // ── Derived ──────────────────────────────────────────────────────

    /// The active theme. `None` only if the startup selection is missing
    /// from the catalog and no valid selection has arrived since.
    pub fn theme(&self) -> &Store<Option<ResolvedTheme>> {
        &self.theme
    }

    pub fn preferences(&self) -> &Store<Preferences> {
        &self.preferences
    }

    pub fn vehicle_readout(&self) -> &Store<VehicleReadout> {
        &self.readout
    }

    /// When the last valid envelope was applied.
    pub fn last_message(&self) -> &Store<Option<DateTime<Utc>>> {
        &self.last_message
    }

    // ── Recompute helpers ────────────────────────────────────────────

    /// Recompute preferences from settings. Returns whether they changed.
    pub(crate) fn refresh_preferences(&self) -> bool {
        let preferences = Preferences::from(self.settings.snapshot().as_ref());
        self.preferences.replace(preferences)
    }

    pub(crate) fn refresh_readout(&self) -> bool {
        let units = self.preferences.snapshot().units;
        let readout = VehicleReadout::new(self.vehicle.snapshot().as_ref(), units);
        self.readout.replace(readout)
    }
}

impl Default for DashboardStore {
    fn default() -> Self {
        Self::new()
    }
}
