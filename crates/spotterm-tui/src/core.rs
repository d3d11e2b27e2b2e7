//! SyncCore: single-owner event loop for the playback view.
//!
//! Every producer (push stream, snapshot poller, clock tick, keyboard) sends
//! `CoreEvent`s into one bounded intake.  SyncCore owns the `Reconciler`
//! exclusively; no other task reads or writes the view except through the
//! published `watch` snapshots.
//!
//! Commands never wait on the network: the optimistic view is installed and
//! published first, then the control requests are queued on the outbound
//! channel for the sender task.
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::action::Command;
use crate::dispatch::ControlRequest;
use crate::reconcile::Reconciler;
use crate::render::RenderTrigger;
use crate::update::Update;

// ── CoreEvent ─────────────────────────────────────────────────────────────────

/// All inputs into the SyncCore loop.
#[derive(Debug)]
pub enum CoreEvent {
    /// A normalized state change from any source.
    Update(Update),
    /// A user command from the keyboard.
    Command(Command),
    /// The push channel is gone; nothing more will arrive.
    StreamLost(String),
}

/// Why the loop stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExitReason {
    Quit,
    StreamLost(String),
    /// The shutdown token was cancelled from outside (OS signal).
    Cancelled,
    /// Every producer dropped its sender.
    IntakeClosed,
    /// Drawing or reading the terminal failed.
    TerminalFailed(String),
}

impl ExitReason {
    /// Fatal reasons end the process with a non-zero status.
    pub fn is_fatal(&self) -> bool {
        matches!(self, ExitReason::StreamLost(_) | ExitReason::TerminalFailed(_))
    }

    /// Fold in a terminal failure reported outside the core.  A failing
    /// terminal cancels the token, so the core itself only sees `Cancelled`.
    pub fn with_terminal_failure(self, failure: Option<String>) -> Self {
        match failure {
            Some(msg) if !self.is_fatal() => ExitReason::TerminalFailed(msg),
            _ => self,
        }
    }
}

impl std::fmt::Display for ExitReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExitReason::Quit => write!(f, "quit"),
            ExitReason::StreamLost(reason) => write!(f, "connection to player lost: {}", reason),
            ExitReason::Cancelled => write!(f, "interrupted"),
            ExitReason::IntakeClosed => write!(f, "all event sources closed"),
            ExitReason::TerminalFailed(reason) => write!(f, "terminal failed: {}", reason),
        }
    }
}

// ── SyncCore ──────────────────────────────────────────────────────────────────

pub struct SyncCore {
    reconciler: Reconciler,
    trigger: RenderTrigger,
    /// Outbound control requests, drained by `dispatch::run_sender`.
    outbound: mpsc::Sender<ControlRequest>,
    shutdown: CancellationToken,
}

impl SyncCore {
    pub fn new(
        trigger: RenderTrigger,
        outbound: mpsc::Sender<ControlRequest>,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            reconciler: Reconciler::new(),
            trigger,
            outbound,
            shutdown,
        }
    }

    /// Run until quit, stream loss, cancellation or intake closure.  The
    /// shutdown token is always cancelled on return so producers stop too.
    pub async fn run(mut self, mut intake: mpsc::Receiver<CoreEvent>) -> ExitReason {
        info!("SyncCore: starting event loop");

        let reason = loop {
            let evt = tokio::select! {
                biased;
                _ = self.shutdown.cancelled() => break ExitReason::Cancelled,
                evt = intake.recv() => evt,
            };

            match evt {
                None => {
                    info!("SyncCore: intake closed, shutting down");
                    break ExitReason::IntakeClosed;
                }

                Some(CoreEvent::StreamLost(reason)) => {
                    error!("SyncCore: stream lost: {}", reason);
                    break ExitReason::StreamLost(reason);
                }

                Some(CoreEvent::Update(update)) => {
                    let label = update.label();
                    let changed = self.reconciler.apply(update);
                    debug!("SyncCore: {} (changed={})", label, changed);
                    self.trigger.publish(self.reconciler.view(), changed);
                }

                Some(CoreEvent::Command(cmd)) => {
                    info!("SyncCore: command {:?}", cmd);
                    let before = self.reconciler.view().clone();
                    let plan = self.reconciler.command(&cmd);
                    if plan.quit {
                        break ExitReason::Quit;
                    }
                    self.trigger
                        .publish(self.reconciler.view(), *self.reconciler.view() != before);
                    for req in plan.requests {
                        self.enqueue(req);
                    }
                }
            }
        };

        info!("SyncCore: exiting ({})", reason);
        self.shutdown.cancel();
        reason
    }

    fn enqueue(&self, req: ControlRequest) {
        match self.outbound.try_send(req) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(req)) => {
                warn!("SyncCore: outbound queue full, dropping {:?}", req);
            }
            Err(mpsc::error::TrySendError::Closed(req)) => {
                warn!("SyncCore: sender task gone, dropping {:?}", req);
            }
        }
    }
}
