//! Canonical updates: source-agnostic facts about a playback state change.

use std::time::Duration;

use spotterm_proto::state::{PlaybackView, TrackInfo};

#[derive(Debug, Clone, PartialEq)]
pub enum Update {
    /// A new track started; `initial_progress` is where it starts.
    TrackChanged {
        track: TrackInfo,
        initial_progress: Duration,
    },
    PlayStateChanged(bool),
    Stopped,
    /// Authoritative position correction.
    SeekTo {
        progress: Duration,
        total_duration: Duration,
    },
    /// Volume as a percentage.
    VolumeSet(u8),
    ShuffleSet(bool),
    RepeatContextSet(bool),
    RepeatTrackSet(bool),
    /// Full `/status` result; only used to seed the view.
    Snapshot(PlaybackView),
    /// Local clock: one tick worth of elapsed playback.
    Tick(Duration),
}

impl Update {
    /// Short label for logs.
    pub fn label(&self) -> &'static str {
        match self {
            Update::TrackChanged { .. } => "track_changed",
            Update::PlayStateChanged(_) => "play_state",
            Update::Stopped => "stopped",
            Update::SeekTo { .. } => "seek",
            Update::VolumeSet(_) => "volume",
            Update::ShuffleSet(_) => "shuffle",
            Update::RepeatContextSet(_) => "repeat_context",
            Update::RepeatTrackSet(_) => "repeat_track",
            Update::Snapshot(_) => "snapshot",
            Update::Tick(_) => "tick",
        }
    }
}
