//! Envelope framing for the backend channel.
//!
//! Every text frame is a JSON object of the shape
//! `{ "type": "<domain>", "<domain>": { ...partial payload... } }`.
//! The `type` discriminant must name a known domain and exactly one
//! payload field must be present: the one matching `type`. Anything
//! else is rejected before it can reach a store.

pub mod models;

use serde::de::Error as _;
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use strum::IntoEnumIterator;

use crate::error::Error;

pub use models::{
    BluetoothDevice, BluetoothPayload, MediaPayload, MediaSource, Notification, PhonePayload,
    PhoneState, PhoneType, RadioPatch, Rgb, SettingsPayload, SongPatch, StatValue, Theme,
    UpdateInfo, UpdaterPayload, VehiclePayload, VehicleStat,
};

/// Envelope discriminant. Doubles as the payload field name.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
    strum::EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum MessageType {
    Bluetooth,
    Media,
    Phone,
    Vehicle,
    Settings,
    Updater,
}

/// A validated inbound (or outbound) message: one domain payload.
#[derive(Debug, Clone, PartialEq)]
pub enum Envelope {
    Bluetooth(BluetoothPayload),
    Media(MediaPayload),
    Phone(PhonePayload),
    Vehicle(VehiclePayload),
    Settings(SettingsPayload),
    Updater(UpdaterPayload),
}

impl Envelope {
    pub fn message_type(&self) -> MessageType {
        match self {
            Self::Bluetooth(_) => MessageType::Bluetooth,
            Self::Media(_) => MessageType::Media,
            Self::Phone(_) => MessageType::Phone,
            Self::Vehicle(_) => MessageType::Vehicle,
            Self::Settings(_) => MessageType::Settings,
            Self::Updater(_) => MessageType::Updater,
        }
    }

    /// Parse and validate a raw text frame.
    pub fn parse(text: &str) -> Result<Self, Error> {
        let raw: Map<String, Value> = serde_json::from_str(text)
            .map_err(|e| Error::malformed(format!("not a JSON object: {e}")))?;
        Self::from_map(raw)
    }

    /// Validate an already-decoded JSON object.
    pub fn from_map(mut raw: Map<String, Value>) -> Result<Self, Error> {
        let kind = match raw.remove("type") {
            Some(Value::String(kind)) => kind,
            Some(other) => {
                return Err(Error::malformed(format!(
                    "`type` must be a string, got {other}"
                )));
            }
            None => return Err(Error::malformed("missing `type` discriminant")),
        };

        let Ok(message_type) = kind.parse::<MessageType>() else {
            return Err(Error::UnknownMessageType { kind });
        };

        let present: Vec<MessageType> = MessageType::iter()
            .filter(|t| raw.get(t.as_ref()).is_some_and(|v| !v.is_null()))
            .collect();

        match present.as_slice() {
            [only] if *only == message_type => {}
            [] => {
                return Err(Error::malformed(format!(
                    "`{message_type}` envelope carries no payload"
                )));
            }
            fields => {
                let names: Vec<&str> = fields.iter().map(|t| t.as_ref()).collect();
                return Err(Error::malformed(format!(
                    "`{message_type}` envelope carries payload field(s) {names:?}"
                )));
            }
        }

        let payload = raw.remove(message_type.as_ref()).unwrap_or(Value::Null);
        decode_payload(message_type, payload)
    }

    /// Serialize to a text frame.
    pub fn to_json(&self) -> Result<String, Error> {
        Ok(serde_json::to_string(self)?)
    }
}

fn decode_payload(message_type: MessageType, payload: Value) -> Result<Envelope, Error> {
    fn typed<T: serde::de::DeserializeOwned>(
        message_type: MessageType,
        payload: Value,
    ) -> Result<T, Error> {
        serde_json::from_value(payload)
            .map_err(|e| Error::malformed(format!("invalid {message_type} payload: {e}")))
    }

    Ok(match message_type {
        MessageType::Bluetooth => Envelope::Bluetooth(typed(message_type, payload)?),
        MessageType::Media => Envelope::Media(typed(message_type, payload)?),
        MessageType::Phone => Envelope::Phone(typed(message_type, payload)?),
        MessageType::Vehicle => Envelope::Vehicle(typed(message_type, payload)?),
        MessageType::Settings => Envelope::Settings(typed(message_type, payload)?),
        MessageType::Updater => Envelope::Updater(typed(message_type, payload)?),
    })
}

impl Serialize for Envelope {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let message_type = self.message_type();
        let mut map = serializer.serialize_map(Some(2))?;
        map.serialize_entry("type", &message_type)?;
        match self {
            Self::Bluetooth(p) => map.serialize_entry(message_type.as_ref(), p)?,
            Self::Media(p) => map.serialize_entry(message_type.as_ref(), p)?,
            Self::Phone(p) => map.serialize_entry(message_type.as_ref(), p)?,
            Self::Vehicle(p) => map.serialize_entry(message_type.as_ref(), p)?,
            Self::Settings(p) => map.serialize_entry(message_type.as_ref(), p)?,
            Self::Updater(p) => map.serialize_entry(message_type.as_ref(), p)?,
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Envelope {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Map::<String, Value>::deserialize(deserializer)?;
        Self::from_map(raw).map_err(D::Error::custom)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn parses_media_envelope() {
        let raw = json!({
            "type": "media",
            "media": {
                "source": "bluetooth",
                "song": { "title": "Halcyon", "playing": true }
            }
        });

        let env = Envelope::parse(&raw.to_string()).unwrap();
        let media = match env {
            Envelope::Media(media) => media,
            other => panic!("expected media envelope, got {other:?}"),
        };
        assert_eq!(media.source, Some(MediaSource::Bluetooth));
        let song = media.song.unwrap();
        assert_eq!(song.title, Some(Some("Halcyon".into())));
        assert_eq!(song.playing, Some(true));
        assert_eq!(song.artist, None);
        assert!(media.radio.is_none());
    }

    #[test]
    fn rejects_mismatched_payload_field() {
        let raw = json!({ "type": "phone", "vehicle": { "speed": 10.0 } });
        let err = Envelope::parse(&raw.to_string()).unwrap_err();
        assert!(matches!(err, Error::MalformedMessage { .. }), "{err:?}");
    }

    #[test]
    fn rejects_extra_payload_field() {
        let raw = json!({
            "type": "phone",
            "phone": { "enabled": true },
            "vehicle": { "connected": true }
        });
        let err = Envelope::parse(&raw.to_string()).unwrap_err();
        assert!(matches!(err, Error::MalformedMessage { .. }), "{err:?}");
    }

    #[test]
    fn rejects_missing_or_null_payload() {
        for raw in [
            json!({ "type": "settings" }),
            json!({ "type": "settings", "settings": null }),
        ] {
            let err = Envelope::parse(&raw.to_string()).unwrap_err();
            assert!(matches!(err, Error::MalformedMessage { .. }), "{err:?}");
        }
    }

    #[test]
    fn rejects_unknown_type() {
        let raw = json!({ "type": "camera", "camera": {} });
        let err = Envelope::parse(&raw.to_string()).unwrap_err();
        match err {
            Error::UnknownMessageType { kind } => assert_eq!(kind, "camera"),
            other => panic!("expected UnknownMessageType, got {other:?}"),
        }
    }

    #[test]
    fn rejects_missing_discriminant_and_bad_json() {
        for text in [r#"{ "media": {} }"#, r#"{ "type": 3, "media": {} }"#, "not json", "[]"] {
            let err = Envelope::parse(text).unwrap_err();
            assert!(matches!(err, Error::MalformedMessage { .. }), "{text}: {err:?}");
        }
    }

    #[test]
    fn rejects_payload_of_wrong_shape() {
        let raw = json!({ "type": "vehicle", "vehicle": { "connected": "yes" } });
        let err = Envelope::parse(&raw.to_string()).unwrap_err();
        assert!(err.to_string().contains("invalid vehicle payload"), "{err}");
    }

    #[test]
    fn ignores_unrelated_top_level_keys() {
        let raw = json!({ "type": "updater", "updater": { "error": "offline" }, "seq": 7 });
        let env = Envelope::parse(&raw.to_string()).unwrap();
        assert_eq!(
            env,
            Envelope::Updater(UpdaterPayload {
                update: None,
                error: Some("offline".into()),
            })
        );
    }

    #[test]
    fn round_trips_through_wire_format() {
        let raw = json!({
            "type": "settings",
            "settings": {
                "version": "1.2.0",
                "tfHourTime": false,
                "metricUnits": true,
                "selectedTheme": "dark",
                "home": null,
                "themes": [
                    { "name": "dark", "primary": [28, 30, 33], "secondary": [215, 208, 200], "accent": [131, 52, 45] }
                ]
            }
        });

        let env: Envelope = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(env.message_type(), MessageType::Settings);
        assert_eq!(serde_json::to_value(&env).unwrap(), raw);
    }

    #[test]
    fn message_type_names_match_payload_fields() {
        assert_eq!(MessageType::Vehicle.as_ref(), "vehicle");
        assert_eq!("updater".parse::<MessageType>().unwrap(), MessageType::Updater);
        assert!("Vehicle".parse::<MessageType>().is_err());
    }
}
