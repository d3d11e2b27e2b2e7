//! Raw daemon messages → canonical `Update`s.
//!
//! Both functions are pure.  A payload that does not decode yields `None`
//! and a warning; the caller keeps reading.  Unknown event kinds are dropped
//! quietly so newer daemons do not break older clients.

use std::time::Duration;

use serde::de::DeserializeOwned;
use spotterm_proto::protocol::{
    volume_percent, EventBool, EventMetadata, EventSeek, EventVolume, RawEvent, Status,
};
use spotterm_proto::state::{PlaybackView, RepeatMode, TrackInfo};
use tracing::{debug, warn};

use crate::update::Update;

pub fn event(raw: &RawEvent) -> Option<Update> {
    match raw.kind.as_str() {
        "metadata" => payload::<EventMetadata>(raw).map(|m| Update::TrackChanged {
            track: TrackInfo::new(
                m.uri,
                m.name,
                &m.artist_names,
                m.album_name,
                Duration::from_millis(m.duration),
            ),
            initial_progress: Duration::from_millis(m.position),
        }),
        "playing" => Some(Update::PlayStateChanged(true)),
        "paused" | "not_playing" => Some(Update::PlayStateChanged(false)),
        "stopped" => Some(Update::Stopped),
        "seek" => payload::<EventSeek>(raw).map(|s| Update::SeekTo {
            progress: Duration::from_millis(s.position),
            total_duration: Duration::from_millis(s.duration),
        }),
        "volume" => {
            payload::<EventVolume>(raw).map(|v| Update::VolumeSet(volume_percent(v.value, v.max)))
        }
        "shuffle_context" => payload::<EventBool>(raw).map(|b| Update::ShuffleSet(b.value)),
        "repeat_context" => payload::<EventBool>(raw).map(|b| Update::RepeatContextSet(b.value)),
        "repeat_track" => payload::<EventBool>(raw).map(|b| Update::RepeatTrackSet(b.value)),
        other => {
            debug!("normalize: dropping event kind {:?}", other);
            None
        }
    }
}

fn payload<T: DeserializeOwned>(raw: &RawEvent) -> Option<T> {
    match T::deserialize(&raw.data) {
        Ok(v) => Some(v),
        Err(e) => {
            warn!("normalize: malformed {:?} payload: {}", raw.kind, e);
            None
        }
    }
}

/// Turn a `/status` record into a seeding `Snapshot`.
pub fn snapshot(status: &Status) -> Update {
    let stopped = status.stopped || status.track.is_none();
    let mut view =
        PlaybackView::default().with_volume(volume_percent(status.volume, status.volume_steps) as i32);
    view.is_playing = !stopped && !status.paused;
    view.stopped = stopped;
    view.shuffle = status.shuffle_context;
    view.repeat = RepeatMode::from_flags(status.repeat_context, status.repeat_track);

    if let Some(t) = &status.track {
        view = view.with_track(
            TrackInfo::new(
                t.uri.clone(),
                t.name.clone(),
                &t.artist_names,
                t.album_name.clone(),
                Duration::from_millis(t.duration),
            ),
            Duration::from_millis(t.position),
        );
    }

    Update::Snapshot(view)
}
