//! UI rendering helpers for the terminal user interface.
//!
//! This module contains functions to render the TUI using `ratatui`. It only
//! reads: the view model from `App` and transport state from the controller.

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style, Stylize},
    widgets::{Block, Borders, Clear, Gauge, List, ListItem, ListState, Padding, Paragraph, Wrap},
};
use std::time::Duration;

use crate::app::App;
use crate::config::{ControlsSettings, TimeField, UiSettings};
use crate::library::{Track, display_from_fields};
use crate::player::{Phase, PlaybackState};

/// Footer help, in display order. Seek and volume entries are filled in
/// from the configured steps.
const CONTROLS: &[(&str, &str)] = &[
    ("j/k", "up/down"),
    ("enter", "play selected"),
    ("space/p", "play/pause"),
    ("N/P", "next/prev track"),
    ("H/L", ""),
    ("+/-", ""),
    ("m", "mute"),
    ("gg/G", "top/bottom"),
    ("/", "filter"),
    ("J/K", "move track"),
    ("x", "remove"),
    ("a/e", "add/edit track"),
    ("w", "save"),
    ("tab", "next playlist"),
    ("n/D", "new/delete playlist"),
    ("i", "metadata"),
    ("o", "open link"),
    ("q", "quit"),
];

fn controls_text(controls: &ControlsSettings) -> String {
    CONTROLS
        .iter()
        .map(|&(key, action)| match key {
            "H/L" => format!("[H/L] seek -/+{}s", controls.seek_step_seconds),
            "+/-" => format!("[+/-] volume +/-{}%", (controls.volume_step * 100.0).round()),
            _ => format!("[{key}] {action}"),
        })
        .collect::<Vec<_>>()
        .join(" | ")
}

/// An open prompt replaces the help; a status message goes in front of it.
fn footer_text(app: &App, controls: &ControlsSettings) -> String {
    if let Some(prompt) = &app.prompt {
        return format!("{}: {}_", prompt.kind.label(), prompt.input);
    }
    let help = controls_text(controls);
    match &app.status_message {
        Some(msg) => format!("{msg}  ::  {help}"),
        None => help,
    }
}

/// `Duration` from seconds reported by the controller; garbage becomes zero.
fn secs(s: f64) -> Duration {
    if s.is_finite() && s > 0.0 {
        Duration::from_secs_f64(s)
    } else {
        Duration::ZERO
    }
}

/// Format a `Duration` as `MM:SS`.
fn format_mmss(d: Duration) -> String {
    let secs = d.as_secs();
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

/// Build the now-playing time text (elapsed/total/remaining) per `UiSettings`.
fn now_playing_time_text(
    elapsed: Duration,
    total: Option<Duration>,
    ui: &UiSettings,
) -> Option<String> {
    if ui.now_playing_time_fields.is_empty() {
        return None;
    }

    let mut parts: Vec<String> = Vec::new();
    for f in &ui.now_playing_time_fields {
        match f {
            TimeField::Elapsed => parts.push(format_mmss(elapsed)),
            TimeField::Total => {
                if let Some(t) = total {
                    parts.push(format_mmss(t));
                }
            }
            TimeField::Remaining => {
                if let Some(t) = total {
                    let rem = t.saturating_sub(elapsed);
                    parts.push(format!("-{}", format_mmss(rem)));
                }
            }
        }
    }

    if parts.is_empty() {
        None
    } else {
        Some(parts.join(&ui.now_playing_time_separator))
    }
}

/// Total length to show: the backend's report, else the source's hint.
fn total_duration(state: &PlaybackState, track: &Track) -> Option<Duration> {
    if state.duration_seconds > 0.0 {
        Some(secs(state.duration_seconds))
    } else {
        track.duration_hint.map(Duration::from_secs)
    }
}

fn phase_label(state: &PlaybackState) -> String {
    match state.phase() {
        Phase::Idle => "Stopped".to_string(),
        Phase::Loading if state.is_playing => "Loading".to_string(),
        Phase::Loading => "Loading (paused)".to_string(),
        Phase::Playing => "Playing".to_string(),
        Phase::Paused => "Paused".to_string(),
        Phase::Unplayable => "No playable audio".to_string(),
        Phase::Errored => match &state.error {
            Some(e) => format!("Error: {e}"),
            None => "Error".to_string(),
        },
    }
}

fn volume_label(state: &PlaybackState) -> String {
    if state.is_muted() {
        "VOL: muted".to_string()
    } else {
        format!("VOL: {:.0}%", state.volume * 100.0)
    }
}

/// Compute a centered rectangle with given size constrained to `r`.
fn centered_rect_sized(mut width: u16, mut height: u16, r: Rect) -> Rect {
    // Keep the popup smaller and avoid covering the entire UI.
    width = width.min(r.width.saturating_sub(2)).max(10);
    height = height.min(r.height.saturating_sub(2)).max(5);

    let x = r.x + (r.width.saturating_sub(width) / 2);
    let y = r.y + (r.height.saturating_sub(height) / 2);
    Rect {
        x,
        y,
        width,
        height,
    }
}

/// Format an optional whole-second duration, showing total seconds.
fn format_duration_hint(secs: Option<u64>) -> String {
    let Some(total_secs) = secs else {
        return "-".to_string();
    };
    format!("{}:{:02} ({}s)", total_secs / 60, total_secs % 60, total_secs)
}

fn status_text(app: &App, state: &PlaybackState, ui_settings: &UiSettings) -> String {
    let mut parts: Vec<String> = Vec::new();

    // cursor mode
    if app.follow_playback {
        parts.push(" CURSOR: Follow".to_string());
    } else {
        parts.push(" CURSOR: Free-roam".to_string());
    }

    if let Some(name) = app.current_playlist() {
        let marker = if app.edited { " (modified)" } else { "" };
        parts.push(format!("PLAYLIST: {name}{marker}"));
    }

    // filter
    let q = app.filter_query.trim();
    if app.filter_mode || !q.is_empty() {
        let mut filter_part = String::from("FILTER:");
        if !q.is_empty() {
            filter_part.push(' ');
            filter_part.push_str(q);
        }
        parts.push(filter_part);
    }

    if let Some(track) = state.current_track() {
        let song = display_from_fields(
            track,
            &ui_settings.now_playing_track_fields,
            &ui_settings.now_playing_track_separator,
        );
        let time = now_playing_time_text(
            secs(state.position_seconds),
            total_duration(state, track),
            ui_settings,
        );
        match time {
            Some(time) => parts.push(format!("Song: {} [{}]", song, time)),
            None => parts.push(format!("Song: {}", song)),
        }
    }
    parts.push(phase_label(state));
    parts.push(volume_label(state));

    if state.phase() == Phase::Unplayable {
        if let Some(url) = state.current_track().and_then(|t| t.external_url.as_deref()) {
            parts.push(format!("press o to open {url}"));
        }
    }

    parts.join(" • ")
}

fn progress_ratio(state: &PlaybackState) -> f64 {
    if state.duration_seconds > 0.0 {
        (state.position_seconds / state.duration_seconds).clamp(0.0, 1.0)
    } else {
        0.0
    }
}

fn padded_block(title: &str) -> Block<'_> {
    Block::bordered().padding(Padding::left(1)).title(title)
}

/// First and one-past-last positions of `display` to render so the cursor
/// stays centered where possible, and the cursor's row within that window.
fn visible_window(total: usize, height: usize, cursor: usize) -> (usize, usize, usize) {
    if total <= height || height == 0 {
        return (0, total, cursor);
    }
    let start = cursor.saturating_sub(height / 2).min(total - height);
    (start, start + height, cursor - start)
}

/// Uppercase the matched characters so they stand out in the list.
fn highlight(text: &str, positions: &[usize]) -> String {
    let mut marks = positions.iter().peekable();
    let mut out = String::with_capacity(text.len());
    for (i, ch) in text.chars().enumerate() {
        if marks.peek() == Some(&&i) {
            marks.next();
            out.extend(ch.to_uppercase());
        } else {
            out.push(ch);
        }
    }
    out
}

fn metadata_text(track: Option<&Track>) -> String {
    let Some(track) = track else {
        return "No track selected".to_string();
    };
    let or_dash = |v: Option<&str>| v.unwrap_or("-").to_string();
    [
        format!("Title: {}", track.title),
        format!("Artist: {}", track.artist),
        format!("Album: {}", or_dash(track.album.as_deref())),
        format!("Duration: {}", format_duration_hint(track.duration_hint)),
        format!("URL: {}", or_dash(track.playable_url.as_deref())),
        format!("External: {}", or_dash(track.external_url.as_deref())),
    ]
    .join("\n")
}

fn draw_tracks(frame: &mut Frame, app: &App, state: &PlaybackState, display: &[usize], area: Rect) {
    let query = app.filter_query.trim();
    let cursor = display.iter().position(|&i| i == app.selected).unwrap_or(0);
    let height = area.height.saturating_sub(2) as usize;
    let (start, end, row) = visible_window(display.len(), height, cursor);

    // only the visible window is turned into list items
    let items: Vec<ListItem> = display[start..end]
        .iter()
        .map(|&i| {
            let track = &app.tracks[i];
            let title = track.display();
            let mut text = match (!query.is_empty()).then(|| app.match_positions(i, query)).flatten() {
                Some(positions) => highlight(&title, &positions),
                None => title,
            };
            if !track.is_playable() {
                text.push_str("  [external]");
            }
            let item = ListItem::new(text);
            if state.current_track_id.as_ref() == Some(&track.id) {
                item.bold()
            } else {
                item
            }
        })
        .collect();

    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(" tracks "))
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("> ");
    let mut list_state = ListState::default();
    if !display.is_empty() {
        list_state.select(Some(row));
    }
    frame.render_stateful_widget(list, area, &mut list_state);

    if app.metadata_window {
        let popup = centered_rect_sized(72, 10, area);
        frame.render_widget(Clear, popup);
        let meta = Paragraph::new(metadata_text(app.selected_track()))
            .block(padded_block(" metadata (i closes) "))
            .wrap(Wrap { trim: true });
        frame.render_widget(meta, popup);
    }
}

/// Render the entire UI into the provided `frame` using `app` and `state`.
pub fn draw(
    frame: &mut Frame,
    app: &App,
    state: &PlaybackState,
    display: &[usize],
    ui_settings: &UiSettings,
    controls_settings: &ControlsSettings,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(5),
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(4),
        ])
        .split(frame.area());
    // Header
    let header = Paragraph::new(ui_settings.header_text.as_str())
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" setlist ")
                .title_alignment(Alignment::Center),
        );
    frame.render_widget(header, chunks[0]);

    let status_par = Paragraph::new(status_text(app, state, ui_settings))
        .block(padded_block(" status "))
        .wrap(Wrap { trim: true });
    frame.render_widget(status_par, chunks[1]);

    // Progress
    let gauge = Gauge::default()
        .block(Block::default().borders(Borders::ALL).title(" progress "))
        .gauge_style(Style::default().bold())
        .ratio(progress_ratio(state))
        .label(format!(
            "{} / {}",
            format_mmss(secs(state.position_seconds)),
            format_mmss(secs(state.duration_seconds))
        ));
    frame.render_widget(gauge, chunks[2]);

    draw_tracks(frame, app, state, display, chunks[3]);

    let footer = Paragraph::new(footer_text(app, controls_settings))
        .block(padded_block(" controls "))
        .wrap(Wrap { trim: true });

    frame.render_widget(footer, chunks[4]);
}
