use serde::Serialize;

use pilotsync_api::protocol::VehicleStat;

/// Last OBD readings.
///
/// When `connected` is false the readings are stale; they are kept so
/// the view can grey them out instead of blanking.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Vehicle {
    pub enabled: bool,
    pub connected: bool,
    /// km/h.
    pub speed: Option<f64>,
    /// Percent.
    pub fuel_level: Option<f64>,
    /// Volts.
    pub voltage: Option<f64>,
    pub rpm: Option<f64>,
    /// Percent.
    pub engine_load: Option<f64>,
    /// A diagnostic trouble code is set.
    pub dtc: bool,
    /// The adapter reported read failures.
    pub failures: bool,
    pub stats: Vec<VehicleStat>,
}

impl Vehicle {
    /// Readings are live (not stale).
    pub fn is_live(&self) -> bool {
        self.enabled && self.connected
    }

    pub fn stat(&self, name: &str) -> Option<&VehicleStat> {
        self.stats.iter().find(|s| s.name.eq_ignore_ascii_case(name))
    }
}
