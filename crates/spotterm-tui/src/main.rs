mod action;
mod core;
mod daemon;
mod dispatch;
mod keys;
mod normalize;
mod player;
mod reconcile;
mod render;
mod sources;
mod stream;
mod theme;
mod ui;
mod update;
mod widgets;

use anyhow::Context;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::core::{CoreEvent, SyncCore};
use crate::dispatch::{ControlRequest, Controls};
use crate::player::PlayerClient;
use crate::render::RenderTrigger;
use crate::ui::UiContext;

const OUTBOUND_CAPACITY: usize = 16;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let data_dir = spotterm_proto::platform::data_dir();
    std::fs::create_dir_all(&data_dir)?;
    let log_path = data_dir.join("spotterm.log");

    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)?;

    // Allow RUST_LOG override; default to debug for app code but suppress noisy
    // connection-level DEBUG from HTTP and WebSocket internals.
    let log_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        "debug,hyper_util=warn,reqwest=warn,hyper=warn,tungstenite=warn".to_string()
    });
    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_env_filter(log_filter.as_str())
        .with_ansi(false)
        .init();

    // Print log path to stderr so the operator can tail it immediately.
    eprintln!("spotterm log: {}", log_path.display());

    tracing::info!("spotterm starting…");

    // ── Load config ──────────────────────────────────────────────────────────
    let config = spotterm_proto::config::Config::load().unwrap_or_else(|e| {
        tracing::warn!("config: {:#}, using defaults", e);
        spotterm_proto::config::Config::default()
    });
    tracing::info!(
        "daemon at {} (device {:?})",
        config.daemon.base_url(),
        config.daemon.device_name
    );

    let client = PlayerClient::new(config.daemon.base_url())?;

    // ── Optional daemon launch ───────────────────────────────────────────────
    let launcher = if config.daemon.launch {
        eprintln!("starting go-librespot…");
        Some(daemon::Launcher::start(&config.daemon, &client).await?)
    } else {
        None
    };

    // ── Initial snapshot and push stream: both fatal on failure ─────────────
    let status = client
        .status()
        .await
        .with_context(|| format!("cannot reach player at {}", config.daemon.base_url()))?;
    let socket = stream::connect(&config.daemon.events_url()).await?;

    // ── Channels ─────────────────────────────────────────────────────────────
    let shutdown = CancellationToken::new();
    let (intake_tx, intake_rx) = mpsc::channel::<CoreEvent>(config.sync.intake_capacity.max(1));
    let (outbound_tx, outbound_rx) = mpsc::channel::<ControlRequest>(OUTBOUND_CAPACITY);
    let (trigger, views) = RenderTrigger::new(config.sync.render);

    // Seed before any live event can arrive.
    intake_tx
        .send(CoreEvent::Update(normalize::snapshot(&status)))
        .await?;

    let terminal = render::init_terminal()?;

    // ── Spawn tasks ──────────────────────────────────────────────────────────
    let core = SyncCore::new(trigger, outbound_tx, shutdown.clone());
    let core_handle = tokio::spawn(core.run(intake_rx));

    let mut handles = vec![
        tokio::spawn(dispatch::run_sender(
            client.clone(),
            outbound_rx,
            shutdown.clone(),
        )),
        tokio::spawn(stream::run_reader(
            socket,
            intake_tx.clone(),
            shutdown.clone(),
        )),
        tokio::spawn(sources::run_ticker(
            config.sync.tick(),
            intake_tx.clone(),
            shutdown.clone(),
        )),
        tokio::spawn(watch_signals(shutdown.clone())),
    ];
    let keyboard = sources::spawn_keyboard(
        Controls::from(&config.controls),
        intake_tx.clone(),
        shutdown.clone(),
    );
    if let Some(period) = config.sync.snapshot_interval() {
        handles.push(tokio::spawn(sources::run_snapshot_poller(
            client.clone(),
            period,
            intake_tx.clone(),
            shutdown.clone(),
        )));
    }
    drop(intake_tx);

    let ctx = UiContext {
        device_name: config.daemon.device_name.clone(),
    };
    let render_shutdown = shutdown.clone();
    let renderer = tokio::spawn(async move {
        let (terminal, result) =
            render::run_renderer(terminal, views, ctx, render_shutdown.clone()).await;
        let failure = match result {
            Ok(()) => None,
            Err(e) => {
                tracing::error!("renderer failed: {:#}", e);
                render_shutdown.cancel();
                Some(format!("{:#}", e))
            }
        };
        (terminal, failure)
    });

    // ── Wait for the core, then tear down top-down ───────────────────────────
    let reason = match core_handle.await {
        Ok(reason) => reason,
        Err(e) => {
            shutdown.cancel();
            core::ExitReason::StreamLost(format!("sync core panicked: {}", e))
        }
    };
    for handle in handles {
        if let Err(e) = handle.await {
            tracing::warn!("task ended abnormally: {}", e);
        }
    }
    let key_failure = keyboard
        .await
        .unwrap_or_else(|e| Some(format!("keyboard task panicked: {}", e)));
    let render_failure = match renderer.await {
        Ok((mut terminal, failure)) => {
            render::restore_terminal(&mut terminal)?;
            failure
        }
        Err(e) => Some(format!("renderer task panicked: {}", e)),
    };
    let reason = reason
        .with_terminal_failure(render_failure)
        .with_terminal_failure(key_failure);

    if let Some(launcher) = launcher {
        launcher.stop().await;
    }

    tracing::info!("spotterm exiting: {}", reason);
    if reason.is_fatal() {
        anyhow::bail!("{}", reason);
    }
    Ok(())
}

/// Cancel on SIGINT / SIGTERM.  Ctrl-C in raw mode arrives as a key instead.
async fn watch_signals(shutdown: CancellationToken) {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let mut term = match signal(SignalKind::terminate()) {
            Ok(s) => s,
            Err(e) => {
                tracing::warn!("cannot install SIGTERM handler: {}", e);
                tokio::select! {
                    _ = shutdown.cancelled() => {}
                    _ = tokio::signal::ctrl_c() => shutdown.cancel(),
                }
                return;
            }
        };
        tokio::select! {
            _ = shutdown.cancelled() => {}
            _ = tokio::signal::ctrl_c() => shutdown.cancel(),
            _ = term.recv() => shutdown.cancel(),
        }
    }
    #[cfg(not(unix))]
    {
        tokio::select! {
            _ = shutdown.cancelled() => {}
            _ = tokio::signal::ctrl_c() => shutdown.cancel(),
        }
    }
}
