use std::path::{Path, PathBuf};

const APP_DIR: &str = "spotterm";

#[cfg(unix)]
pub fn librespot_binary_name() -> &'static str {
    "go-librespot"
}

#[cfg(windows)]
pub fn librespot_binary_name() -> &'static str {
    "go-librespot.exe"
}

pub fn data_dir() -> PathBuf {
    // On macOS and Linux, use ~/.local/share/spotterm/ (XDG standard)
    // instead of macOS Application Support for consistency
    #[cfg(unix)]
    {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("/tmp"))
            .join(".local")
            .join("share")
            .join(APP_DIR)
    }
    #[cfg(windows)]
    {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_DIR)
    }
}

pub fn config_dir() -> PathBuf {
    #[cfg(unix)]
    {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".config")
            .join(APP_DIR)
    }

    #[cfg(windows)]
    {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_DIR)
    }
}

/// Directory handed to go-librespot as `--config_dir`.
pub fn librespot_config_dir() -> PathBuf {
    config_dir().join("librespot")
}

fn find_beside_exe(name: &str) -> Option<PathBuf> {
    let current_exe = std::env::current_exe().ok()?;
    let dir = current_exe.parent()?;
    let p = dir.join(name);
    if p.exists() {
        return Some(p);
    }
    let p = dir.join("external").join(name);
    if p.exists() {
        return Some(p);
    }
    None
}

pub fn find_on_path(name: &str) -> Option<PathBuf> {
    let path = std::env::var_os("PATH")?;
    std::env::split_paths(&path)
        .map(|dir| dir.join(name))
        .find(|p| p.exists())
}

/// Find the go-librespot binary.
///
/// Checks an explicit override first, then beside the current exe, then PATH.
pub fn find_librespot_binary(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(p) = explicit {
        return p.exists().then(|| p.to_path_buf());
    }
    let name = librespot_binary_name();
    find_beside_exe(name).or_else(|| find_on_path(name))
}

/// go-librespot audio backend: pulseaudio when `pactl` is installed, otherwise alsa.
pub fn detect_audio_backend() -> &'static str {
    if find_on_path("pactl").is_some() {
        "pulseaudio"
    } else {
        "alsa"
    }
}
