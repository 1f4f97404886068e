// ── Partial merge ──
//
// Folds a partial payload into a store record. Only fields present in
// the payload are written; nested objects merge one level deep; lists
// are replaced, except notifications which are upserted by id against
// the full feed (ids absent from it are dropped). Every merge is
// idempotent.

use pilotsync_api::protocol::{
    BluetoothPayload, MediaPayload, PhonePayload, RadioPatch, SettingsPayload, SongPatch,
    VehiclePayload,
};

use crate::model::{Bluetooth, Media, Phone, Radio, Settings, Song, Vehicle};

/// Merge a partial update of type `P` into `self`.
pub trait Merge<P> {
    fn merge(&mut self, patch: P);
}

/// Overwrite `slot` when the patch carries a value.
///
/// With `T = Option<U>` this also covers nullable fields: an explicit
/// `null` arrives as `Some(None)` and clears the slot.
fn set<T>(slot: &mut T, value: Option<T>) {
    if let Some(value) = value {
        *slot = value;
    }
}

impl Merge<BluetoothPayload> for Bluetooth {
    fn merge(&mut self, patch: BluetoothPayload) {
        set(&mut self.powered, patch.powered);
        set(&mut self.address, patch.address);
        set(&mut self.hostname, patch.hostname);
        set(&mut self.devices, patch.devices);
    }
}

impl Merge<MediaPayload> for Media {
    fn merge(&mut self, patch: MediaPayload) {
        set(&mut self.source, patch.source);
        if let Some(song) = patch.song {
            self.song.merge(song);
        }
        if let Some(radio) = patch.radio {
            self.radio.merge(radio);
        }
    }
}

impl Merge<SongPatch> for Song {
    fn merge(&mut self, patch: SongPatch) {
        set(&mut self.title, patch.title);
        set(&mut self.artist, patch.artist);
        set(&mut self.album, patch.album);
        set(&mut self.duration, patch.duration);
        set(&mut self.position, patch.position);
        set(&mut self.playing, patch.playing);
        set(&mut self.cover, patch.cover);
    }
}

impl Merge<RadioPatch> for Radio {
    fn merge(&mut self, patch: RadioPatch) {
        set(&mut self.station_address, patch.station_address);
        set(&mut self.station_name, patch.station_name);
        set(&mut self.title, patch.title);
        set(&mut self.artist, patch.artist);
        set(&mut self.album, patch.album);
        set(&mut self.cover, patch.cover);
    }
}

impl Merge<PhonePayload> for Phone {
    fn merge(&mut self, patch: PhonePayload) {
        set(&mut self.enabled, patch.enabled);
        set(&mut self.connected, patch.connected);
        set(&mut self.device_type, patch.device_type);
        set(&mut self.state, patch.state);
        if let Some(feed) = patch.notifications {
            self.sync_notifications(feed);
        }
    }
}

impl Merge<VehiclePayload> for Vehicle {
    fn merge(&mut self, patch: VehiclePayload) {
        set(&mut self.enabled, patch.enabled);
        set(&mut self.connected, patch.connected);
        set(&mut self.speed, patch.speed);
        set(&mut self.fuel_level, patch.fuel_level);
        set(&mut self.voltage, patch.voltage);
        set(&mut self.rpm, patch.rpm);
        set(&mut self.engine_load, patch.engine_load);
        set(&mut self.dtc, patch.dtc);
        set(&mut self.failures, patch.failures);
        set(&mut self.stats, patch.stats);
    }
}

impl Merge<SettingsPayload> for Settings {
    fn merge(&mut self, patch: SettingsPayload) {
        set(&mut self.version, patch.version);
        set(&mut self.tf_hour_time, patch.tf_hour_time);
        set(&mut self.metric_units, patch.metric_units);
        set(&mut self.phone_enabled, patch.phone_enabled);
        set(&mut self.vehicle_enabled, patch.vehicle_enabled);
        set(&mut self.selected_theme, patch.selected_theme);
        set(&mut self.home, patch.home);
        set(&mut self.themes, patch.themes);
    }
}
