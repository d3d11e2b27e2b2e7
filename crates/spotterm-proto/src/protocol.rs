//! go-librespot wire format: the `/status` record and the `/events` messages.

use serde::{Deserialize, Serialize};

/// Playback status returned by `GET /status`, limited to the fields the
/// client reads.  Other keys the daemon sends are ignored.
///
/// An idle daemon answers `204 No Content`; callers map that to
/// `Status::default()`, which reads as "stopped, nothing loaded".
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Status {
    #[serde(default)]
    pub stopped: bool,
    #[serde(default)]
    pub paused: bool,
    #[serde(default)]
    pub volume: u32,
    #[serde(default)]
    pub volume_steps: u32,
    #[serde(default)]
    pub repeat_context: bool,
    #[serde(default)]
    pub repeat_track: bool,
    #[serde(default)]
    pub shuffle_context: bool,
    #[serde(default)]
    pub track: Option<Track>,
}

/// A track as reported by the daemon. Durations are milliseconds.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Track {
    pub uri: String,
    pub name: String,
    #[serde(default)]
    pub artist_names: Vec<String>,
    #[serde(default)]
    pub album_name: String,
    #[serde(default)]
    pub position: u64,
    pub duration: u64,
}

/// One frame from the `/events` WebSocket.  `data` stays opaque until the
/// normalizer knows which payload `kind` calls for.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RawEvent {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub data: serde_json::Value,
}

impl RawEvent {
    pub fn decode(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }
}

/// Payload of `metadata` events.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct EventMetadata {
    pub uri: String,
    pub name: String,
    #[serde(default)]
    pub artist_names: Vec<String>,
    #[serde(default)]
    pub album_name: String,
    pub duration: u64,
    #[serde(default)]
    pub position: u64,
}

/// Payload of `seek` events.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq)]
pub struct EventSeek {
    pub position: u64,
    pub duration: u64,
}

/// Payload of `volume` events.  `max` is the daemon's `volume_steps`.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq)]
pub struct EventVolume {
    pub value: u32,
    #[serde(default)]
    pub max: u32,
}

/// Payload of `shuffle_context`, `repeat_context` and `repeat_track` events.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq)]
pub struct EventBool {
    pub value: bool,
}

/// Request bodies for the control endpoints.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct VolumeBody {
    pub volume: i32,
    pub relative: bool,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SeekBody {
    pub position: u64,
    pub relative: bool,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ShuffleBody {
    pub shuffle_context: bool,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RepeatContextBody {
    pub repeat_context: bool,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RepeatTrackBody {
    pub repeat_track: bool,
}

/// Scale a daemon volume (`0..=steps`) to a percentage.  `steps == 0` means the
/// daemon did not report a scale, in which case the value is taken as-is.
pub fn volume_percent(value: u32, steps: u32) -> u8 {
    let pct = if steps == 0 {
        value as f64
    } else {
        value as f64 * 100.0 / steps as f64
    };
    pct.round().clamp(0.0, 100.0) as u8
}
