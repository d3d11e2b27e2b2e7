//! Status bar: play state, shuffle, repeat and volume, plus the keys footer.

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};
use spotterm_proto::state::{PlaybackView, RepeatMode};

use crate::theme::{style_muted, style_secondary, style_toggle, C_MUTED, C_PAUSED, C_PLAYING, C_SEPARATOR};

fn play_icon(view: &PlaybackView) -> Span<'static> {
    if view.stopped {
        Span::styled("■", Style::default().fg(C_MUTED))
    } else if view.is_playing {
        Span::styled("▶", Style::default().fg(C_PLAYING).add_modifier(Modifier::BOLD))
    } else {
        Span::styled("⏸", Style::default().fg(C_PAUSED).add_modifier(Modifier::BOLD))
    }
}

fn repeat_label(mode: RepeatMode) -> &'static str {
    match mode {
        RepeatMode::Off => "repeat off",
        RepeatMode::Context => "repeat all",
        RepeatMode::Track => "repeat one",
    }
}

/// One-row status: `▶  shuffle  repeat all  vol 55%`.
pub fn draw_status(frame: &mut Frame, area: Rect, view: &PlaybackView) {
    let line = Line::from(vec![
        Span::raw(" "),
        play_icon(view),
        Span::raw("  "),
        Span::styled("shuffle", style_toggle(view.shuffle)),
        Span::raw("  "),
        Span::styled(repeat_label(view.repeat), style_toggle(view.repeat != RepeatMode::Off)),
        Span::raw("  "),
        Span::styled(format!("vol {}%", view.volume()), style_secondary()),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

/// Draw a horizontal separator line.
pub fn draw_separator(frame: &mut Frame, area: Rect) {
    let line = Line::from(Span::styled(
        "─".repeat(area.width as usize),
        Style::default().fg(C_SEPARATOR),
    ));
    frame.render_widget(Paragraph::new(line), area);
}

/// Draw the keybindings footer bar (one row).
pub fn draw_keys_bar(frame: &mut Frame, area: Rect) {
    let keys = " Space play/pause  ←→/n p track  ↑↓/+- vol  ,/. seek  s shuffle  r repeat  q quit";
    frame.render_widget(Paragraph::new(Line::from(Span::styled(keys, style_muted()))), area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_play_icon_states() {
        let mut v = PlaybackView::default();
        assert_eq!(play_icon(&v).content, "■");
        v.stopped = false;
        assert_eq!(play_icon(&v).content, "⏸");
        v.is_playing = true;
        assert_eq!(play_icon(&v).content, "▶");
    }

    #[test]
    fn test_repeat_labels() {
        assert_eq!(repeat_label(RepeatMode::Track), "repeat one");
        assert_eq!(repeat_label(RepeatMode::Context), "repeat all");
    }
}
