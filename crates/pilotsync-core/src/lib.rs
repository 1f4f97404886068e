// pilotsync-core: reactive dashboard state between pilotsync-api and the view layer.

pub mod config;
pub mod controller;
pub mod convert;
pub mod error;
pub mod model;
pub mod router;
pub mod store;
pub mod stream;
pub mod theme;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::DashboardConfig;
pub use controller::{ConnectionState, Dashboard};
pub use convert::{ClockFormat, ClockTime, Measurement, Meridiem, Unit, UnitSystem};
pub use error::CoreError;
pub use router::Router;
pub use store::{DashboardStore, Store};
pub use stream::StoreStream;
pub use theme::{Contrast, ResolvedTheme};

pub use model::{
    Bluetooth, Media, Phone, Preferences, Radio, Settings, Song, Vehicle, VehicleReadout,
};

// Wire types that appear in store fields, so consumers need only this crate.
pub use pilotsync_api::protocol::{
    BluetoothDevice, MediaSource, Notification, PhoneState, PhoneType, Rgb, SettingsPayload,
    Theme, UpdateInfo, UpdaterPayload, VehicleStat,
};
pub use pilotsync_api::{ControlRequest, ReconnectConfig};
