//! Render trigger (core side) and the renderer task (terminal side).
//!
//! The two meet at a `watch` channel: the core publishes with
//! `send_replace`, the renderer draws whatever is latest.  A slow terminal
//! skips intermediate views instead of backing up the core.

use std::io::{self, Stdout};

use ratatui::crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use spotterm_proto::config::RenderPolicy;
use spotterm_proto::state::PlaybackView;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::ui::{self, UiContext};

pub type Tui = Terminal<CrosstermBackend<Stdout>>;

// ── RenderTrigger ─────────────────────────────────────────────────────────────

pub struct RenderTrigger {
    policy: RenderPolicy,
    tx: watch::Sender<PlaybackView>,
}

impl RenderTrigger {
    pub fn new(policy: RenderPolicy) -> (Self, watch::Receiver<PlaybackView>) {
        let (tx, rx) = watch::channel(PlaybackView::default());
        (Self { policy, tx }, rx)
    }

    /// Publish `view` if the policy asks for it.  Returns whether it did.
    pub fn publish(&self, view: &PlaybackView, changed: bool) -> bool {
        let publish = match self.policy {
            RenderPolicy::Always => true,
            RenderPolicy::OnChange => changed,
        };
        if publish {
            self.tx.send_replace(view.clone());
        }
        publish
    }
}

// ── Terminal lifecycle ────────────────────────────────────────────────────────

pub fn init_terminal() -> anyhow::Result<Tui> {
    debug!("render: enabling raw mode");
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let terminal = Terminal::new(CrosstermBackend::new(stdout))?;
    debug!("render: terminal created, size={:?}", terminal.size());
    Ok(terminal)
}

/// Undo `init_terminal`.  Safe to call more than once.
pub fn restore_terminal(terminal: &mut Tui) -> anyhow::Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

// ── Renderer task ─────────────────────────────────────────────────────────────

/// Draw every published view until cancelled.  Hands the terminal back so
/// the caller restores it after all other tasks are done.
pub async fn run_renderer(
    mut terminal: Tui,
    mut views: watch::Receiver<PlaybackView>,
    ctx: UiContext,
    shutdown: CancellationToken,
) -> (Tui, anyhow::Result<()>) {
    info!("renderer: started");
    let result: anyhow::Result<()> = async {
        loop {
            let view = views.borrow_and_update().clone();
            terminal.draw(|f| ui::draw(f, &view, &ctx))?;

            tokio::select! {
                _ = shutdown.cancelled() => break,
                changed = views.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
            }
        }
        Ok::<(), anyhow::Error>(())
    }
    .await;
    info!("renderer: stopped");
    (terminal, result)
}
