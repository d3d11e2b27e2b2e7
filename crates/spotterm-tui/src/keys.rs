//! Key map: crossterm key events → `Command`s.

use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::action::Command;
use crate::dispatch::Controls;

pub fn command_for(key: KeyEvent, controls: &Controls) -> Option<Command> {
    if key.kind == KeyEventKind::Release {
        return None;
    }

    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('c') => Some(Command::Quit),
            _ => None,
        };
    }
    if key.modifiers.contains(KeyModifiers::ALT) {
        return None;
    }

    let vol = controls.volume_step;
    let seek = controls.seek_step_secs;
    let cmd = match key.code {
        KeyCode::Char(' ') => Command::TogglePlayPause,
        KeyCode::Right | KeyCode::Char('n') => Command::Next,
        KeyCode::Left | KeyCode::Char('p') => Command::Previous,
        KeyCode::Up | KeyCode::Char('+') | KeyCode::Char('=') => Command::VolumeDelta(vol),
        KeyCode::Down | KeyCode::Char('-') => Command::VolumeDelta(-vol),
        KeyCode::Char('s') => Command::ToggleShuffle,
        KeyCode::Char('r') => Command::CycleRepeat,
        KeyCode::Char('.') => Command::Seek(seek),
        KeyCode::Char(',') => Command::Seek(-seek),
        KeyCode::Char('q') | KeyCode::Esc => Command::Quit,
        _ => return None,
    };
    Some(cmd)
}
