// ── Dashboard domain model ──
//
// One record per domain store, holding the last-known-good state for
// that domain. Records start from the same defaults the dashboard shows
// before the backend has said anything, and change only through the
// merge routines in `store::merge`.

pub mod bluetooth;
pub mod derived;
pub mod media;
pub mod phone;
pub mod settings;
pub mod vehicle;

pub use bluetooth::Bluetooth;
pub use derived::{Preferences, VehicleReadout};
pub use media::{Media, Radio, Song};
pub use phone::Phone;
pub use settings::{Settings, default_themes};
pub use vehicle::Vehicle;
