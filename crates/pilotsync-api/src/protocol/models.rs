// Payload shapes carried inside an envelope.
//
// Every field is optional: the backend sends partial updates, and a
// field that is absent must leave the consumer's state untouched. Fields
// that the consumer stores as optional use `Option<Option<T>>` so an
// explicit JSON `null` (clear) is distinguishable from absence (keep).

use serde::{Deserialize, Deserializer, Serialize};

/// Deserialize a nullable field, mapping `null` to `Some(None)`.
///
/// Combined with `#[serde(default)]`, an absent field stays `None`.
fn nullable<'de, D, T>(de: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(de).map(Some)
}

// ── Colors ───────────────────────────────────────────────────────────

/// An sRGB color, carried on the wire as a `[r, g, b]` array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "[u8; 3]", into = "[u8; 3]")]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Self = Self::new(0, 0, 0);
    pub const WHITE: Self = Self::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

impl From<[u8; 3]> for Rgb {
    fn from([r, g, b]: [u8; 3]) -> Self {
        Self { r, g, b }
    }
}

impl From<Rgb> for [u8; 3] {
    fn from(c: Rgb) -> Self {
        [c.r, c.g, c.b]
    }
}

impl std::fmt::Display for Rgb {
    /// CSS functional notation, e.g. `rgb(28,30,33)`.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "rgb({},{},{})", self.r, self.g, self.b)
    }
}

// ── Bluetooth ────────────────────────────────────────────────────────

/// Adapter state plus the list of known devices.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BluetoothPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub powered: Option<bool>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub address: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub hostname: Option<Option<String>>,
    /// Full device list. Replaces the stored list when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub devices: Option<Vec<BluetoothDevice>>,
}

/// A paired Bluetooth device as reported by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BluetoothDevice {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    pub address: String,
    #[serde(default)]
    pub connected: bool,
    /// Exposes the A2DP/AVRCP media profiles.
    #[serde(default)]
    pub media: bool,
    /// Exposes Apple Notification Center Service.
    #[serde(default)]
    pub ancs: bool,
}

// ── Media ────────────────────────────────────────────────────────────

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, strum::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum MediaSource {
    #[default]
    Bluetooth,
    Radio,
    Files,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<MediaSource>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub song: Option<SongPatch>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub radio: Option<RadioPatch>,
}

/// Track metadata for Bluetooth and file playback.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SongPatch {
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub title: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub artist: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub album: Option<Option<String>>,
    /// Track length in milliseconds.
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub duration: Option<Option<u64>>,
    /// Playback position in milliseconds.
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub position: Option<Option<u64>>,
    #[serde(default, alias = "isPlaying", skip_serializing_if = "Option::is_none")]
    pub playing: Option<bool>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub cover: Option<Option<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RadioPatch {
    /// Tuned frequency.
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub station_address: Option<Option<f64>>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub station_name: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub title: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub artist: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub album: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub cover: Option<Option<String>>,
}

// ── Phone ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PhoneType {
    Android,
    Ios,
}

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, strum::Display,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum PhoneState {
    Connected,
    /// Device is attached but locked (ADB cannot read it).
    Locked,
    #[default]
    Disconnected,
    /// Device has not trusted this host yet.
    Untrusted,
    BluetoothDisabled,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhonePayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connected: Option<bool>,
    #[serde(
        rename = "type",
        alias = "deviceType",
        default,
        deserialize_with = "nullable",
        skip_serializing_if = "Option::is_none"
    )]
    pub device_type: Option<Option<PhoneType>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<PhoneState>,
    /// Upserted by `id` into the stored list.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notifications: Option<Vec<Notification>>,
}

/// A phone notification, identified by `id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub id: u64,
    #[serde(default)]
    pub app_id: String,
    #[serde(default)]
    pub app_name: String,
    #[serde(default)]
    pub title: String,
    /// Epoch seconds; `0` when the source does not report it.
    #[serde(default)]
    pub time: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    /// Name of the phone that raised it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device: Option<String>,
}

// ── Vehicle ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VehiclePayload {
    /// Is OBD reading enabled at all.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connected: Option<bool>,
    /// km/h.
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub speed: Option<Option<f64>>,
    /// Percent of tank.
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub fuel_level: Option<Option<f64>>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub voltage: Option<Option<f64>>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub rpm: Option<Option<f64>>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub engine_load: Option<Option<f64>>,
    /// A diagnostic trouble code is set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dtc: Option<bool>,
    /// The OBD reader reported query failures.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failures: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stats: Option<Vec<VehicleStat>>,
}

/// A named OBD reading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleStat {
    pub name: String,
    pub value: StatValue,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatValue {
    pub quantity: f64,
    pub units: String,
    pub magnitude: f64,
}

// ── Settings ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// 24-hour clock.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tf_hour_time: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metric_units: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vehicle_enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_theme: Option<String>,
    /// Route shown on startup.
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub home: Option<Option<String>>,
    /// Theme catalog. Replaces the stored catalog when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub themes: Option<Vec<Theme>>,
}

/// A named color triple.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Theme {
    pub name: String,
    pub primary: Rgb,
    pub secondary: Rgb,
    pub accent: Rgb,
}

// ── Updater ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdaterPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update: Option<UpdateInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateInfo {
    pub version: String,
    /// `false` while the release is only available, `true` once installed.
    pub completed: bool,
}
