//! Screen layout: now-playing panel, progress, status line and keys footer.
//!
//! Pure function of the published view; no state of its own.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use spotterm_proto::state::{PlaybackView, TrackInfo};
use unicode_width::UnicodeWidthChar;

use crate::theme::{style_border, style_muted, style_secondary, style_title, C_BG};
use crate::widgets::progress_bar::draw_progress;
use crate::widgets::status_bar::{draw_keys_bar, draw_separator, draw_status};

/// Static context the renderer needs besides the view.
#[derive(Debug, Clone)]
pub struct UiContext {
    /// Connect device name shown on the idle screen.
    pub device_name: String,
}

pub fn draw(frame: &mut Frame, view: &PlaybackView, ctx: &UiContext) {
    let area = frame.area();
    frame.render_widget(Block::default().style(Style::default().bg(C_BG)), area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(5),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(area);

    let panel = Block::default()
        .borders(Borders::ALL)
        .border_style(style_border())
        .title(Span::styled(" spotterm ", style_secondary()));
    let inner = panel.inner(rows[0]);
    frame.render_widget(panel, rows[0]);

    match view.visible_track() {
        Some(track) => draw_now_playing(frame, inner, view, track),
        None => draw_idle(frame, inner, ctx),
    }

    draw_status(frame, rows[1], view);
    draw_separator(frame, rows[2]);
    draw_keys_bar(frame, rows[3]);
}

fn draw_now_playing(frame: &mut Frame, area: Rect, view: &PlaybackView, track: &TrackInfo) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(area);

    let width = area.width.saturating_sub(2) as usize;
    let lines = [
        (track.title.as_str(), style_title()),
        (track.artist_display.as_str(), style_secondary()),
        (track.album_title.as_str(), style_muted()),
    ];
    for (row, (text, style)) in rows.iter().take(3).zip(lines) {
        let line = Line::from(Span::styled(format!(" {}", truncate(text, width)), style));
        frame.render_widget(Paragraph::new(line), *row);
    }

    let bar_area = Rect {
        x: rows[4].x + 1,
        width: rows[4].width.saturating_sub(2),
        ..rows[4]
    };
    draw_progress(frame, bar_area, view.progress(), view.total_duration());
}

fn draw_idle(frame: &mut Frame, area: Rect, ctx: &UiContext) {
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(" Nothing playing", style_title())),
        Line::from(Span::styled(
            format!(" Select \"{}\" in a Spotify app to start.", ctx.device_name),
            style_secondary(),
        )),
    ];
    frame.render_widget(Paragraph::new(lines), area);
}

/// Cut `text` to `max` display columns, ending with `…` when shortened.
fn truncate(text: &str, max: usize) -> String {
    let total: usize = text.chars().map(|c| c.width().unwrap_or(0)).sum();
    if total <= max {
        return text.to_string();
    }
    if max == 0 {
        return String::new();
    }
    let mut out = String::new();
    let mut used = 0;
    for c in text.chars() {
        let w = c.width().unwrap_or(0);
        if used + w + 1 > max {
            break;
        }
        used += w;
        out.push(c);
    }
    out.push('…');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::{backend::TestBackend, Terminal};
    use std::time::Duration;

    fn screen_text(view: &PlaybackView) -> String {
        let mut terminal = Terminal::new(TestBackend::new(80, 12)).unwrap();
        let ctx = UiContext {
            device_name: "Desk".into(),
        };
        terminal.draw(|f| draw(f, view, &ctx)).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    #[test]
    fn test_idle_screen_names_device() {
        let text = screen_text(&PlaybackView::default());
        assert!(text.contains("Nothing playing"));
        assert!(text.contains("\"Desk\""));
    }

    #[test]
    fn test_now_playing_shows_track_and_time() {
        let mut view = PlaybackView::default().with_track(
            TrackInfo::new(
                "id",
                "Song Title",
                &["Artist One".to_string()],
                "The Album",
                Duration::from_secs(200),
            ),
            Duration::from_secs(92),
        );
        view.stopped = false;
        view.is_playing = true;
        let text = screen_text(&view);
        assert!(text.contains("Song Title"));
        assert!(text.contains("Artist One"));
        assert!(text.contains("1:32"));
        assert!(text.contains("3:20"));
        assert!(!text.contains("Nothing playing"));
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdefgh", 5), "abcd…");
        assert_eq!(truncate("日本語テキスト", 5), "日本…");
        assert_eq!(truncate("abc", 0), "");
    }
}
