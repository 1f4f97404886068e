// Projections recomputed from the stores; never written by the router
// directly.

use serde::Serialize;

use crate::convert::{ClockFormat, Measurement, UnitSystem};
use crate::model::{Settings, Vehicle};

/// Display preferences derived from [`Settings`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Preferences {
    #[serde(serialize_with = "serialize_display")]
    pub units: UnitSystem,
    #[serde(serialize_with = "serialize_display")]
    pub clock: ClockFormat,
}

impl From<&Settings> for Preferences {
    fn from(settings: &Settings) -> Self {
        Self {
            units: UnitSystem::from_metric_flag(settings.metric_units),
            clock: ClockFormat::from_24h_flag(settings.tf_hour_time),
        }
    }
}

/// Vehicle readings ready for display in the current unit system.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleReadout {
    /// Readings are current; otherwise they are the last values seen.
    pub live: bool,
    #[serde(serialize_with = "serialize_measurement")]
    pub speed: Option<Measurement>,
    pub fuel_level: Option<f64>,
    pub voltage: Option<f64>,
    pub rpm: Option<f64>,
    pub engine_load: Option<f64>,
    pub warning: bool,
}

impl VehicleReadout {
    pub fn new(vehicle: &Vehicle, units: UnitSystem) -> Self {
        Self {
            live: vehicle.is_live(),
            speed: vehicle.speed.map(|kmh| units.speed(kmh)),
            fuel_level: vehicle.fuel_level,
            voltage: vehicle.voltage,
            rpm: vehicle.rpm,
            engine_load: vehicle.engine_load,
            warning: vehicle.dtc || vehicle.failures,
        }
    }
}

fn serialize_display<S, T>(value: &T, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
    T: std::fmt::Display,
{
    serializer.collect_str(value)
}

#[allow(clippy::ref_option)]
fn serialize_measurement<S>(value: &Option<Measurement>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    match value {
        Some(m) => serializer.collect_str(&format_args!("{m:.0}")),
        None => serializer.serialize_none(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::Unit;

    #[test]
    fn preferences_follow_settings_flags() {
        let settings = Settings {
            metric_units: true,
            tf_hour_time: true,
            ..Settings::default()
        };
        let prefs = Preferences::from(&settings);
        assert_eq!(prefs.units, UnitSystem::Metric);
        assert_eq!(prefs.clock, ClockFormat::TwentyFourHour);
        assert_eq!(Preferences::from(&Settings::default()), Preferences::default());
    }

    #[test]
    fn readout_converts_speed_and_flags_staleness() {
        let vehicle = Vehicle {
            enabled: true,
            connected: false,
            speed: Some(100.0),
            failures: true,
            ..Vehicle::default()
        };

        let readout = VehicleReadout::new(&vehicle, UnitSystem::Imperial);
        assert!(!readout.live);
        assert!(readout.warning);
        let speed = readout.speed.unwrap_or(Measurement::new(0.0, Unit::Miles));
        assert_eq!(speed.unit, Unit::MilesPerHour);
        assert!((speed.value - 62.137_12).abs() < 1e-6);

        let metric = VehicleReadout::new(&vehicle, UnitSystem::Metric);
        assert_eq!(metric.speed, Some(Measurement::new(100.0, Unit::KilometersPerHour)));
    }
}
