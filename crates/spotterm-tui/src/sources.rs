//! Intake producers other than the push stream: the local clock, the
//! optional `/status` poller and the keyboard reader.
//!
//! Every producer blocks on a full intake (`send().await`) rather than
//! dropping, and stops as soon as the shutdown token fires.

use std::io;
use std::time::Duration;

use ratatui::crossterm::event::{self, Event};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::core::CoreEvent;
use crate::dispatch::Controls;
use crate::keys;
use crate::normalize;
use crate::player::PlayerClient;
use crate::update::Update;

const KEY_POLL: Duration = Duration::from_millis(100);

/// Emit `Tick(period)` every `period`.  Late ticks are skipped, never
/// bunched, so a stalled runtime cannot fast-forward the clock.
pub async fn run_ticker(
    period: Duration,
    intake: mpsc::Sender<CoreEvent>,
    shutdown: CancellationToken,
) {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    // the first tick completes immediately
    interval.tick().await;

    loop {
        tokio::select! {
            _ = shutdown.cancelled() => break,
            _ = interval.tick() => {
                if intake.send(CoreEvent::Update(Update::Tick(period))).await.is_err() {
                    break;
                }
            }
        }
    }
    debug!("ticker: stopped");
}

/// Re-fetch `/status` every `period`.  Failures are transient here; only
/// the push stream decides that the daemon is gone.
pub async fn run_snapshot_poller(
    client: PlayerClient,
    period: Duration,
    intake: mpsc::Sender<CoreEvent>,
    shutdown: CancellationToken,
) {
    info!("poller: every {:?}", period);
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    interval.tick().await;

    loop {
        tokio::select! {
            _ = shutdown.cancelled() => break,
            _ = interval.tick() => {}
        }
        let status = tokio::select! {
            _ = shutdown.cancelled() => break,
            status = client.status() => status,
        };
        match status {
            Ok(status) => {
                let update = normalize::snapshot(&status);
                if intake.send(CoreEvent::Update(update)).await.is_err() {
                    break;
                }
            }
            Err(e) => warn!("poller: /status failed: {}", e),
        }
    }
    debug!("poller: stopped");
}

/// Read keys on a blocking thread.  Polls with a short timeout so the
/// thread notices cancellation without waiting for a keypress.  Resolves to
/// the terminal error if input failed.
pub fn spawn_keyboard(
    controls: Controls,
    intake: mpsc::Sender<CoreEvent>,
    shutdown: CancellationToken,
) -> JoinHandle<Option<String>> {
    tokio::task::spawn_blocking(move || {
        let failure = read_keys(event::poll, event::read, &controls, &intake, &shutdown);
        debug!("keyboard: stopped");
        failure
    })
}

/// Keyboard loop over any terminal event source.  A poll or read error
/// cancels `shutdown` and is returned.
fn read_keys(
    mut poll: impl FnMut(Duration) -> io::Result<bool>,
    mut read: impl FnMut() -> io::Result<Event>,
    controls: &Controls,
    intake: &mpsc::Sender<CoreEvent>,
    shutdown: &CancellationToken,
) -> Option<String> {
    while !shutdown.is_cancelled() {
        let ready = poll(KEY_POLL).map_err(|e| format!("keyboard poll failed: {}", e));
        let ev = match ready {
            Ok(false) => continue,
            Ok(true) => read().map_err(|e| format!("keyboard read failed: {}", e)),
            Err(e) => Err(e),
        };
        let ev = match ev {
            Ok(ev) => ev,
            Err(e) => {
                error!("keyboard: {}", e);
                shutdown.cancel();
                return Some(e);
            }
        };
        let Event::Key(key) = ev else {
            continue;
        };
        if let Some(cmd) = keys::command_for(key, controls) {
            if intake.blocking_send(CoreEvent::Command(cmd)).is_err() {
                break;
            }
        }
    }
    None
}
