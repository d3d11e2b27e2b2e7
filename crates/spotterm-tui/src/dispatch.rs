//! Command dispatcher: optimistic view + outbound control requests.
//!
//! `plan` is pure.  The sync core installs the optimistic view right away and
//! hands the requests to the sender task, which talks to the daemon without
//! ever making the core wait.  Nothing is rolled back when a request fails;
//! the next authoritative event corrects the view.

use std::time::Duration;

use spotterm_proto::config::ControlsConfig;
use spotterm_proto::state::{PlaybackView, RepeatMode};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::action::Command;
use crate::player::PlayerClient;

/// One fire-and-forget call on the daemon's control API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlRequest {
    PlayPause,
    Next,
    Previous,
    SetVolume(u8),
    /// Absolute position in milliseconds.
    Seek(u64),
    SetShuffle(bool),
    SetRepeatContext(bool),
    SetRepeatTrack(bool),
}

/// User-tunable step sizes.
#[derive(Debug, Clone, Copy)]
pub struct Controls {
    pub volume_step: i8,
    pub seek_step_secs: i32,
}

impl Default for Controls {
    fn default() -> Self {
        Self {
            volume_step: 5,
            seek_step_secs: 10,
        }
    }
}

impl From<&ControlsConfig> for Controls {
    fn from(cfg: &ControlsConfig) -> Self {
        Self {
            volume_step: cfg.volume_step.min(100) as i8,
            seek_step_secs: cfg.seek_step_secs.min(i32::MAX as u32) as i32,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Dispatch {
    pub view: PlaybackView,
    pub requests: Vec<ControlRequest>,
    pub quit: bool,
}

pub fn plan(cmd: &Command, current: &PlaybackView) -> Dispatch {
    let mut view = current.clone();
    let mut requests = Vec::new();
    let mut quit = false;

    match *cmd {
        Command::TogglePlayPause => {
            view.is_playing = !view.is_playing;
            requests.push(ControlRequest::PlayPause);
        }
        Command::Next => requests.push(ControlRequest::Next),
        Command::Previous => requests.push(ControlRequest::Previous),
        Command::VolumeDelta(delta) => {
            view.set_volume(view.volume() as i32 + delta as i32);
            requests.push(ControlRequest::SetVolume(view.volume()));
        }
        Command::ToggleShuffle => {
            view.shuffle = !view.shuffle;
            requests.push(ControlRequest::SetShuffle(view.shuffle));
        }
        Command::CycleRepeat => {
            let next = view.repeat.cycle();
            requests.extend(repeat_requests(next));
            view.repeat = next;
        }
        Command::Seek(secs) => {
            if view.track.is_some() {
                let target = shift(view.progress(), secs);
                view.set_progress(target);
                requests.push(ControlRequest::Seek(view.progress().as_millis() as u64));
            }
        }
        Command::Quit => quit = true,
    }

    Dispatch {
        view,
        requests,
        quit,
    }
}

/// Requests that move the daemon into `next`.  Both flags are always set:
/// the daemon may hold context and track repeat at once, and the view only
/// shows the stronger of the two.
fn repeat_requests(next: RepeatMode) -> Vec<ControlRequest> {
    match next {
        RepeatMode::Context => vec![
            ControlRequest::SetRepeatContext(true),
            ControlRequest::SetRepeatTrack(false),
        ],
        RepeatMode::Track => vec![
            ControlRequest::SetRepeatTrack(true),
            ControlRequest::SetRepeatContext(false),
        ],
        RepeatMode::Off => vec![
            ControlRequest::SetRepeatTrack(false),
            ControlRequest::SetRepeatContext(false),
        ],
    }
}

fn shift(progress: Duration, secs: i32) -> Duration {
    let delta = Duration::from_secs(secs.unsigned_abs() as u64);
    if secs >= 0 {
        progress.saturating_add(delta)
    } else {
        progress.saturating_sub(delta)
    }
}

/// Drain the outbound queue in order.  Failures are logged and dropped.
pub async fn run_sender(
    client: PlayerClient,
    mut rx: mpsc::Receiver<ControlRequest>,
    shutdown: CancellationToken,
) {
    info!("sender: started");
    loop {
        let req = tokio::select! {
            _ = shutdown.cancelled() => break,
            req = rx.recv() => match req {
                Some(req) => req,
                None => break,
            },
        };
        debug!("sender: {:?}", req);
        if let Err(e) = client.send(&req).await {
            warn!("sender: {:?} failed: {}", req, e);
        }
    }
    info!("sender: stopped");
}
