//! Opt-in launcher for a local go-librespot process.
//!
//! Writes the daemon's `config.yml`, spawns it, and waits until `/status`
//! answers.  The child is killed when the `Launcher` is stopped or dropped.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use spotterm_proto::config::DaemonConfig;
use spotterm_proto::platform;
use tokio::process::{Child, Command};
use tracing::{debug, info, warn};

use crate::player::PlayerClient;

const READY_POLL: Duration = Duration::from_millis(250);

pub struct Launcher {
    child: Child,
}

/// go-librespot's `config.yml`, limited to the keys we set.
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct LibrespotConfig {
    pub device_name: String,
    pub device_type: String,
    pub audio_backend: String,
    pub credentials: Credentials,
    pub server: ServerSection,
    pub volume_steps: u32,
    pub log_level: String,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct Credentials {
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct ServerSection {
    pub enabled: bool,
    pub address: String,
    pub port: u16,
}

impl LibrespotConfig {
    pub fn new(cfg: &DaemonConfig, audio_backend: &str) -> Self {
        Self {
            device_name: cfg.device_name.clone(),
            device_type: "computer".into(),
            audio_backend: audio_backend.into(),
            credentials: Credentials {
                kind: "zeroconf".into(),
            },
            server: ServerSection {
                enabled: true,
                address: cfg.host.clone(),
                port: cfg.port,
            },
            volume_steps: 100,
            log_level: "warn".into(),
        }
    }
}

pub fn render_config(cfg: &DaemonConfig, audio_backend: &str) -> anyhow::Result<String> {
    serde_yaml::to_string(&LibrespotConfig::new(cfg, audio_backend))
        .context("serializing go-librespot config")
}

pub fn write_config(dir: &Path, cfg: &DaemonConfig, audio_backend: &str) -> anyhow::Result<PathBuf> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("creating daemon config dir {}", dir.display()))?;
    let path = dir.join("config.yml");
    std::fs::write(&path, render_config(cfg, audio_backend)?)
        .with_context(|| format!("writing {}", path.display()))?;
    Ok(path)
}

impl Launcher {
    /// Write the config, spawn the daemon and wait for its API.
    pub async fn start(cfg: &DaemonConfig, client: &PlayerClient) -> anyhow::Result<Self> {
        let binary = platform::find_librespot_binary(cfg.binary.as_deref())
            .ok_or_else(|| anyhow::anyhow!("go-librespot binary not found (set daemon.binary)"))?;

        let config_dir = platform::librespot_config_dir();
        let backend = platform::detect_audio_backend();
        let path = write_config(&config_dir, cfg, backend)?;
        info!("daemon: wrote {:?} (audio_backend={})", path, backend);

        let stderr_path = platform::data_dir().join("go-librespot.log");
        let stderr_file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&stderr_path)?;
        info!("daemon: logging stderr to {:?}", stderr_path);

        let child = Command::new(&binary)
            .arg("--config_dir")
            .arg(&config_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(stderr_file)
            .kill_on_drop(true)
            .spawn()
            .with_context(|| format!("spawning {}", binary.display()))?;
        info!("daemon: spawned {:?} with pid {:?}", binary, child.id());

        let mut launcher = Self { child };
        let timeout = Duration::from_secs(cfg.ready_timeout_secs);
        if let Err(e) = launcher.wait_ready(client, timeout).await {
            launcher.stop().await;
            return Err(e);
        }
        Ok(launcher)
    }

    async fn wait_ready(&mut self, client: &PlayerClient, timeout: Duration) -> anyhow::Result<()> {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            if let Some(status) = self.child.try_wait()? {
                anyhow::bail!("go-librespot exited during startup ({})", status);
            }
            match client.status().await {
                Ok(_) => {
                    info!("daemon: ready");
                    return Ok(());
                }
                Err(e) => debug!("daemon: not ready yet: {}", e),
            }
            if tokio::time::Instant::now() >= deadline {
                anyhow::bail!("go-librespot did not respond within {:?}", timeout);
            }
            tokio::time::sleep(READY_POLL).await;
        }
    }

    pub async fn stop(mut self) {
        if let Err(e) = self.child.kill().await {
            warn!("daemon: kill failed: {}", e);
        } else {
            info!("daemon: stopped");
        }
    }
}
