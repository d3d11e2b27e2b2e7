//! Reconciler: the only code that writes a `PlaybackView`.
//!
//! Rules, strongest first:
//!
//! 1. `Snapshot` seeds the whole view, but only until a track is known.  Once
//!    live events are flowing a stale poll would drag progress backwards.
//! 2. `TrackChanged` replaces the track and restarts progress.
//! 3. `SeekTo` is an explicit correction and beats local extrapolation.
//! 4. `PlayStateChanged` / `Stopped` flip flags, never position.
//! 5. Volume, shuffle and repeat touch one field each.  A repeat "off" for a
//!    mode the view is not in is ignored, so an out-of-order track-repeat-off
//!    cannot clobber a fresh context repeat.
//! 6. `Tick` extrapolates while playing; anything above overwrites it.

use spotterm_proto::state::{PlaybackView, RepeatMode};
use tracing::debug;

use crate::action::Command;
use crate::dispatch::{self, Dispatch};
use crate::update::Update;

#[derive(Debug, Default)]
pub struct Reconciler {
    view: PlaybackView,
}

impl Reconciler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view(&self) -> &PlaybackView {
        &self.view
    }

    /// Apply one update.  Returns `true` if the view changed.
    pub fn apply(&mut self, update: Update) -> bool {
        let before = self.view.clone();
        let v = &mut self.view;

        match update {
            Update::Snapshot(seed) => {
                if v.track.is_some() {
                    debug!("reconcile: late snapshot rejected, track already established");
                    return false;
                }
                *v = seed;
            }
            Update::TrackChanged {
                track,
                initial_progress,
            } => {
                v.track = Some(track);
                v.set_progress(initial_progress);
                v.stopped = false;
            }
            Update::SeekTo {
                progress,
                total_duration,
            } => {
                if let Some(track) = v.track.as_mut() {
                    track.total_duration = total_duration;
                }
                v.set_progress(progress);
            }
            Update::PlayStateChanged(playing) => {
                v.is_playing = playing;
                if playing {
                    v.stopped = false;
                }
            }
            Update::Stopped => {
                v.stopped = true;
                v.is_playing = false;
            }
            Update::VolumeSet(volume) => v.set_volume(volume as i32),
            Update::ShuffleSet(on) => v.shuffle = on,
            Update::RepeatContextSet(on) => set_repeat(v, RepeatMode::Context, on),
            Update::RepeatTrackSet(on) => set_repeat(v, RepeatMode::Track, on),
            Update::Tick(unit) => {
                if v.is_playing && !v.stopped {
                    let next = v.progress().saturating_add(unit);
                    v.set_progress(next);
                }
            }
        }

        self.view != before
    }

    /// Plan a command, install its optimistic view and return the plan so the
    /// caller can ship the requests.
    pub fn command(&mut self, cmd: &Command) -> Dispatch {
        let plan = dispatch::plan(cmd, &self.view);
        self.view = plan.view.clone();
        plan
    }
}

fn set_repeat(view: &mut PlaybackView, mode: RepeatMode, on: bool) {
    if on {
        view.repeat = mode;
    } else if view.repeat == mode {
        view.repeat = RepeatMode::Off;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use spotterm_proto::state::TrackInfo;

    use crate::dispatch::ControlRequest;

    const SEC: Duration = Duration::from_secs(1);

    fn track(id: &str, secs: u64) -> TrackInfo {
        TrackInfo::new(id, id, &["Artist".to_string()], "Album", Duration::from_secs(secs))
    }

    fn changed(id: &str, secs: u64, at: Duration) -> Update {
        Update::TrackChanged {
            track: track(id, secs),
            initial_progress: at,
        }
    }

    /// A reconciler with a 200s track playing from zero.
    fn playing() -> Reconciler {
        let mut r = Reconciler::new();
        r.apply(changed("a", 200, Duration::ZERO));
        r.apply(Update::PlayStateChanged(true));
        r
    }

    #[test]
    fn test_initial_state() {
        let r = Reconciler::new();
        assert_eq!(*r.view(), PlaybackView::default());
    }

    #[test]
    fn test_seek_then_two_ticks() {
        let mut r = playing();
        r.apply(Update::SeekTo {
            progress: Duration::from_millis(90_000),
            total_duration: Duration::from_millis(200_000),
        });
        r.apply(Update::Tick(SEC));
        r.apply(Update::Tick(SEC));
        assert_eq!(r.view().progress(), Duration::from_millis(92_000));
    }

    #[test]
    fn test_tick_is_ignored_when_paused_or_stopped() {
        let mut r = playing();
        r.apply(Update::PlayStateChanged(false));
        assert!(!r.apply(Update::Tick(SEC)));
        assert_eq!(r.view().progress(), Duration::ZERO);

        let mut r = playing();
        r.apply(Update::Stopped);
        assert!(!r.apply(Update::Tick(SEC)));
        assert_eq!(r.view().progress(), Duration::ZERO);
    }

    #[test]
    fn test_tick_clamps_at_track_end() {
        let mut r = Reconciler::new();
        r.apply(changed("short", 2, Duration::from_millis(1_500)));
        r.apply(Update::PlayStateChanged(true));
        r.apply(Update::Tick(SEC));
        r.apply(Update::Tick(SEC));
        assert_eq!(r.view().progress(), Duration::from_secs(2));
    }

    #[test]
    fn test_track_change_discards_extrapolation() {
        let mut r = playing();
        for _ in 0..10 {
            r.apply(Update::Tick(SEC));
        }
        assert_eq!(r.view().progress(), Duration::from_secs(10));
        r.apply(changed("b", 300, Duration::from_secs(3)));
        assert_eq!(r.view().progress(), Duration::from_secs(3));
        assert_eq!(r.view().track.as_ref().map(|t| t.id.as_str()), Some("b"));
    }

    #[test]
    fn test_track_change_clears_stopped() {
        let mut r = Reconciler::new();
        assert!(r.view().stopped);
        r.apply(changed("a", 10, Duration::ZERO));
        assert!(!r.view().stopped);
        assert!(r.view().visible_track().is_some());
    }

    #[test]
    fn test_seek_updates_total_duration() {
        let mut r = playing();
        r.apply(Update::SeekTo {
            progress: Duration::from_secs(250),
            total_duration: Duration::from_secs(260),
        });
        assert_eq!(r.view().total_duration(), Duration::from_secs(260));
        assert_eq!(r.view().progress(), Duration::from_secs(250));
    }

    #[test]
    fn test_seek_past_end_is_clamped() {
        let mut r = playing();
        r.apply(Update::SeekTo {
            progress: Duration::from_secs(500),
            total_duration: Duration::from_secs(200),
        });
        assert_eq!(r.view().progress(), Duration::from_secs(200));
    }

    #[test]
    fn test_play_state_does_not_touch_progress() {
        let mut r = playing();
        r.apply(Update::Tick(SEC));
        r.apply(Update::PlayStateChanged(false));
        r.apply(Update::Stopped);
        assert_eq!(r.view().progress(), SEC);
        assert!(r.view().track.is_some());
        assert!(!r.view().is_playing);
    }

    #[test]
    fn test_snapshot_seeds_once() {
        let mut r = Reconciler::new();
        let seed = PlaybackView::default()
            .with_track(track("seed", 100), Duration::from_secs(40))
            .with_volume(55);
        assert!(r.apply(Update::Snapshot(seed.clone())));
        assert_eq!(*r.view(), seed);

        let late = PlaybackView::default()
            .with_track(track("stale", 100), Duration::from_secs(5))
            .with_volume(10);
        assert!(!r.apply(Update::Snapshot(late)));
        assert_eq!(*r.view(), seed);
    }

    #[test]
    fn test_snapshot_rejected_after_live_track() {
        let mut r = playing();
        r.apply(Update::Tick(SEC));
        let stale = PlaybackView::default().with_track(track("a", 200), Duration::ZERO);
        assert!(!r.apply(Update::Snapshot(stale)));
        assert_eq!(r.view().progress(), SEC);
    }

    #[test]
    fn test_idle_snapshot_does_not_block_later_seed() {
        let mut r = Reconciler::new();
        r.apply(Update::Snapshot(PlaybackView::default().with_volume(30)));
        assert_eq!(r.view().volume(), 30);
        let seed = PlaybackView::default().with_track(track("x", 60), Duration::ZERO);
        assert!(r.apply(Update::Snapshot(seed)));
    }

    #[test]
    fn test_repeat_track_supersedes_context() {
        let mut r = Reconciler::new();
        r.apply(Update::RepeatContextSet(true));
        assert_eq!(r.view().repeat, RepeatMode::Context);
        r.apply(Update::RepeatTrackSet(true));
        assert_eq!(r.view().repeat, RepeatMode::Track);
    }

    #[test]
    fn test_repeat_off_for_other_mode_is_noop() {
        let mut r = Reconciler::new();
        r.apply(Update::RepeatContextSet(true));
        assert!(!r.apply(Update::RepeatTrackSet(false)));
        assert_eq!(r.view().repeat, RepeatMode::Context);
        r.apply(Update::RepeatContextSet(false));
        assert_eq!(r.view().repeat, RepeatMode::Off);
    }

    #[test]
    fn test_cycle_repeat_three_times_returns_to_off() {
        let mut r = Reconciler::new();
        for _ in 0..3 {
            r.command(&Command::CycleRepeat);
        }
        assert_eq!(r.view().repeat, RepeatMode::Off);
    }

    #[test]
    fn test_cycle_from_both_flags_clears_both() {
        let mut r = Reconciler::new();
        r.apply(Update::RepeatContextSet(true));
        r.apply(Update::RepeatTrackSet(true));
        assert_eq!(r.view().repeat, RepeatMode::Track);

        let plan = r.command(&Command::CycleRepeat);
        assert_eq!(r.view().repeat, RepeatMode::Off);
        assert!(plan.requests.contains(&ControlRequest::SetRepeatTrack(false)));
        assert!(plan.requests.contains(&ControlRequest::SetRepeatContext(false)));

        // the daemon echoes both flags off
        assert!(!r.apply(Update::RepeatTrackSet(false)));
        assert!(!r.apply(Update::RepeatContextSet(false)));
        assert_eq!(r.view().repeat, RepeatMode::Off);
    }

    #[test]
    fn test_context_echoes_keep_context() {
        let mut r = Reconciler::new();
        let plan = r.command(&Command::CycleRepeat);
        assert_eq!(
            plan.requests,
            vec![
                ControlRequest::SetRepeatContext(true),
                ControlRequest::SetRepeatTrack(false)
            ]
        );
        r.apply(Update::RepeatContextSet(true));
        r.apply(Update::RepeatTrackSet(false));
        assert_eq!(r.view().repeat, RepeatMode::Context);
    }

    #[test]
    fn test_optimistic_toggle_then_authoritative_pause() {
        let mut r = playing();
        let plan = r.command(&Command::TogglePlayPause);
        assert!(!plan.view.is_playing);
        assert!(!r.view().is_playing);
        // flip back to playing, then the daemon says paused
        r.command(&Command::TogglePlayPause);
        assert!(r.view().is_playing);
        r.apply(Update::PlayStateChanged(false));
        assert!(!r.view().is_playing);
    }

    #[test]
    fn test_volume_command_corrected_by_authoritative_value() {
        let mut r = Reconciler::new();
        r.apply(Update::VolumeSet(50));
        r.command(&Command::VolumeDelta(5));
        assert_eq!(r.view().volume(), 55);
        r.apply(Update::VolumeSet(52));
        assert_eq!(r.view().volume(), 52);
    }

    #[test]
    fn test_progress_never_exceeds_duration() {
        let mut r = Reconciler::new();
        let script = vec![
            Update::Tick(SEC),
            changed("a", 3, Duration::from_secs(9)),
            Update::PlayStateChanged(true),
            Update::Tick(SEC),
            Update::SeekTo {
                progress: Duration::from_secs(7),
                total_duration: Duration::from_secs(5),
            },
            Update::Tick(SEC),
            Update::Stopped,
            Update::Tick(SEC),
            changed("b", 1, Duration::from_secs(2)),
            Update::PlayStateChanged(true),
            Update::Tick(SEC * 4),
            Update::SeekTo {
                progress: Duration::from_secs(1),
                total_duration: Duration::from_millis(500),
            },
        ];
        for update in script {
            r.apply(update);
            assert!(r.view().progress() <= r.view().total_duration());
        }
    }
}
