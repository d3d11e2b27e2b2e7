//! The playback view: what the client believes is playing right now.
//!
//! Only the sync core mutates a `PlaybackView`; everybody else gets a clone.
//! Every write to `progress` goes through [`PlaybackView::set_progress`] so
//! the `0 <= progress <= total_duration` bound holds after each transition.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

pub const MAX_VOLUME: u8 = 100;

/// Repeat is one three-way setting: the player's context repeat and track
/// repeat are mutually exclusive in this model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RepeatMode {
    #[default]
    Off,
    Context,
    Track,
}

impl RepeatMode {
    /// `Off → Context → Track → Off`.
    pub fn cycle(self) -> Self {
        match self {
            RepeatMode::Off => RepeatMode::Context,
            RepeatMode::Context => RepeatMode::Track,
            RepeatMode::Track => RepeatMode::Off,
        }
    }

    /// Collapse the daemon's two independent flags; track repeat wins.
    pub fn from_flags(context: bool, track: bool) -> Self {
        if track {
            RepeatMode::Track
        } else if context {
            RepeatMode::Context
        } else {
            RepeatMode::Off
        }
    }
}

impl fmt::Display for RepeatMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RepeatMode::Off => "off",
            RepeatMode::Context => "context",
            RepeatMode::Track => "track",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TrackInfo {
    pub id: String,
    pub title: String,
    /// Artist names joined with ", ".
    pub artist_display: String,
    pub album_title: String,
    pub total_duration: Duration,
}

impl TrackInfo {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        artists: &[String],
        album_title: impl Into<String>,
        total_duration: Duration,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            artist_display: artists.join(", "),
            album_title: album_title.into(),
            total_duration,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaybackView {
    pub track: Option<TrackInfo>,
    progress: Duration,
    pub is_playing: bool,
    /// When set, renderers treat `track` as absent.
    pub stopped: bool,
    pub shuffle: bool,
    pub repeat: RepeatMode,
    volume: u8,
}

impl Default for PlaybackView {
    fn default() -> Self {
        Self {
            track: None,
            progress: Duration::ZERO,
            is_playing: false,
            stopped: true,
            shuffle: false,
            repeat: RepeatMode::Off,
            volume: 0,
        }
    }
}

impl PlaybackView {
    pub fn progress(&self) -> Duration {
        self.progress
    }

    pub fn volume(&self) -> u8 {
        self.volume
    }

    /// Upper bound for `progress`: the current track's length, zero without one.
    pub fn total_duration(&self) -> Duration {
        self.track
            .as_ref()
            .map(|t| t.total_duration)
            .unwrap_or(Duration::ZERO)
    }

    /// Store `progress`, clamped to the current track length.
    pub fn set_progress(&mut self, progress: Duration) {
        self.progress = progress.min(self.total_duration());
    }

    /// Store `volume`, clamped to `0..=100`.
    pub fn set_volume(&mut self, volume: i32) {
        self.volume = volume.clamp(0, MAX_VOLUME as i32) as u8;
    }

    /// The track to draw, or `None` while stopped.
    pub fn visible_track(&self) -> Option<&TrackInfo> {
        if self.stopped {
            None
        } else {
            self.track.as_ref()
        }
    }

    /// Builder used by snapshot normalization and tests.
    pub fn with_track(mut self, track: TrackInfo, progress: Duration) -> Self {
        self.track = Some(track);
        self.set_progress(progress);
        self
    }

    pub fn with_volume(mut self, volume: i32) -> Self {
        self.set_volume(volume);
        self
    }
}
