//! Shared types for spotterm: go-librespot wire format, the playback view
//! model, configuration and platform paths.

pub mod config;
pub mod platform;
pub mod protocol;
pub mod state;
