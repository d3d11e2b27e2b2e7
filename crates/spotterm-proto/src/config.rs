use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::warn;

use super::platform;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub daemon: DaemonConfig,
    #[serde(default)]
    pub sync: SyncConfig,
    #[serde(default)]
    pub controls: ControlsConfig,
}

/// Where the go-librespot daemon lives and whether we start it ourselves.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DaemonConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Spotify Connect device name advertised by the daemon.
    #[serde(default = "default_device_name")]
    pub device_name: String,
    /// Spawn the daemon on startup instead of attaching to a running one.
    #[serde(default)]
    pub launch: bool,
    /// Explicit daemon binary; searched beside the exe and on PATH when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub binary: Option<PathBuf>,
    #[serde(default = "default_ready_timeout_secs")]
    pub ready_timeout_secs: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderPolicy {
    /// Redraw after every processed update or command.
    #[default]
    Always,
    /// Redraw only when the view actually changed.
    OnChange,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Local clock tick; also the amount of progress one tick adds.
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,
    /// Periodic `/status` poll.  0 disables it; the startup fetch always runs.
    #[serde(default)]
    pub snapshot_interval_secs: u64,
    #[serde(default = "default_intake_capacity")]
    pub intake_capacity: usize,
    #[serde(default)]
    pub render: RenderPolicy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControlsConfig {
    #[serde(default = "default_volume_step")]
    pub volume_step: u8,
    #[serde(default = "default_seek_step_secs")]
    pub seek_step_secs: u32,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            device_name: default_device_name(),
            launch: false,
            binary: None,
            ready_timeout_secs: default_ready_timeout_secs(),
        }
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            tick_ms: default_tick_ms(),
            snapshot_interval_secs: 0,
            intake_capacity: default_intake_capacity(),
            render: RenderPolicy::default(),
        }
    }
}

impl Default for ControlsConfig {
    fn default() -> Self {
        Self {
            volume_step: default_volume_step(),
            seek_step_secs: default_seek_step_secs(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3678
}

fn default_device_name() -> String {
    "Spotify CLI".to_string()
}

fn default_ready_timeout_secs() -> u64 {
    30
}

fn default_tick_ms() -> u64 {
    1000
}

fn default_intake_capacity() -> usize {
    32
}

fn default_volume_step() -> u8 {
    5
}

fn default_seek_step_secs() -> u32 {
    10
}

impl DaemonConfig {
    pub fn base_url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }

    pub fn events_url(&self) -> String {
        format!("ws://{}:{}/events", self.host, self.port)
    }
}

impl SyncConfig {
    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms.max(1))
    }

    pub fn snapshot_interval(&self) -> Option<Duration> {
        (self.snapshot_interval_secs > 0).then(|| Duration::from_secs(self.snapshot_interval_secs))
    }
}

impl Config {
    /// Load `config.toml` (writing defaults on first run), then apply
    /// `SPOTIFY_*` environment overrides.  A `.env` file in the working
    /// directory is read first.
    pub fn load() -> anyhow::Result<Self> {
        let _ = dotenvy::dotenv();
        let mut config = Self::load_from(&Self::config_path())?;
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            let config = Self::default();
            config.save_to(path)?;
            return Ok(config);
        }

        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        platform::config_dir().join("config.toml")
    }

    /// Overlay environment variables.  `lookup` is injectable so tests do not
    /// race on the process environment.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(v) = lookup("SPOTIFY_DAEMON_PORT") {
            match v.trim().parse::<u16>() {
                Ok(port) => self.daemon.port = port,
                Err(_) => warn!("ignoring invalid SPOTIFY_DAEMON_PORT={:?}", v),
            }
        }
        if let Some(v) = lookup("SPOTIFY_DAEMON_HOST").filter(|v| !v.is_empty()) {
            self.daemon.host = v;
        }
        if let Some(v) = lookup("SPOTIFY_DEVICE_NAME").filter(|v| !v.is_empty()) {
            self.daemon.device_name = v;
        }
    }
}
