use serde::Serialize;

use pilotsync_api::protocol::MediaSource;

/// What is playing, per source.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Media {
    pub source: MediaSource,
    pub song: Song,
    pub radio: Radio,
}

/// Track metadata from a Bluetooth or file source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Song {
    pub title: Option<String>,
    pub artist: Option<String>,
    pub album: Option<String>,
    /// Milliseconds.
    pub duration: Option<u64>,
    /// Milliseconds.
    pub position: Option<u64>,
    pub playing: bool,
    pub cover: Option<String>,
}

impl Song {
    /// Playback progress in `0.0..=1.0`, if both bounds are known.
    #[allow(clippy::cast_precision_loss)]
    pub fn progress(&self) -> Option<f64> {
        match (self.position, self.duration) {
            (Some(position), Some(duration)) if duration > 0 => {
                Some((position as f64 / duration as f64).clamp(0.0, 1.0))
            }
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Radio {
    /// Tuned frequency in MHz.
    pub station_address: Option<f64>,
    pub station_name: Option<String>,
    pub title: Option<String>,
    pub artist: Option<String>,
    pub album: Option<String>,
    pub cover: Option<String>,
}

impl Media {
    /// Title of whatever the active source is playing.
    pub fn now_playing(&self) -> Option<&str> {
        match self.source {
            MediaSource::Radio => self
                .radio
                .title
                .as_deref()
                .or(self.radio.station_name.as_deref()),
            MediaSource::Bluetooth | MediaSource::Files => self.song.title.as_deref(),
        }
    }
}
