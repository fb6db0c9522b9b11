use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing::warn;

use crate::app::{App, PromptKind, TrackFields, confirmed};
use crate::config;
use crate::error::Error;
use crate::keymap;
use crate::library::TrackSource;
use crate::player::{Intent, PlaybackController};
use crate::runtime::startup::{create_playlist, delete_playlist, save_playlist, switch_playlist};
use crate::ui;

/// State tracked by the runtime event loop across iterations.
#[derive(Default)]
pub struct EventLoopState {
    // two-key prefixes: `gg` and `zz`
    pending_gg: bool,
    pending_zz: bool,
}

/// Everything a key press may act on.
pub struct Session<'a> {
    pub settings: &'a config::Settings,
    pub app: &'a mut App,
    pub controller: &'a mut PlaybackController,
    pub source: &'a dyn TrackSource,
}

/// Main terminal event loop: drains backend signals, draws, and handles
/// input. Returns `Ok(())` when the user quits.
pub fn run(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    session: &mut Session<'_>,
    state: &mut EventLoopState,
) -> Result<(), Error> {
    loop {
        session.controller.pump();
        session.controller.tick(Instant::now());
        session
            .app
            .follow(session.controller.state().current_track_id.as_ref());

        let settings = session.settings;
        let display = session.app.display_indices();
        let (app, playback) = (&*session.app, session.controller.state());
        terminal.draw(|f| ui::draw(f, app, playback, &display, &settings.ui, &settings.controls))?;

        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if handle_key_event(key, session, state) {
                    break;
                }
            }
        }
    }

    Ok(())
}

/// Play whatever is under the cursor, unless it is already playing.
fn play_selected(session: &mut Session<'_>) {
    let Some(track) = session.app.selected_track() else {
        return;
    };
    let id = track.id.clone();
    let state = session.controller.state();
    let is_playing_selected = state.is_playing && state.current_track_id.as_ref() == Some(&id);
    if !is_playing_selected {
        session.app.follow_playback_on();
        session.controller.play(&id);
    }
}

fn open_external(session: &mut Session<'_>) {
    let app = &*session.app;
    let url = app
        .selected_track()
        .and_then(|t| t.external_url.clone())
        .or_else(|| {
            session
                .controller
                .current_track()
                .and_then(|t| t.external_url.clone())
        });

    let Some(url) = url else {
        session.app.set_status("no external link for this track");
        return;
    };
    match webbrowser::open(&url) {
        Ok(()) => session.app.set_status(format!("opened {url}")),
        Err(e) => {
            warn!(url, "cannot open browser: {e}");
            session.app.set_status(format!("cannot open {url}: {e}"));
        }
    }
}

/// Push the edited order into the controller.
fn push_edits(session: &mut Session<'_>) {
    session.controller.set_playlist(session.app.tracks.clone());
}

/// Act on a submitted prompt line.
fn submit_prompt(kind: PromptKind, input: &str, session: &mut Session<'_>) {
    let app = &mut *session.app;
    match kind {
        PromptKind::AddTrack => match TrackFields::parse(input) {
            Ok(fields) => {
                let added = app.append_track(fields).display();
                app.set_status(format!("added {added} (w saves)"));
                push_edits(session);
            }
            Err(e) => app.set_status(e),
        },
        PromptKind::EditTrack => match TrackFields::parse(input) {
            Ok(fields) => {
                if app.update_selected(fields) {
                    push_edits(session);
                }
            }
            Err(e) => app.set_status(e),
        },
        PromptKind::NewPlaylist => {
            create_playlist(app, session.controller, session.source, input)
        }
        PromptKind::DeletePlaylist => {
            if confirmed(input) {
                delete_playlist(app, session.controller, session.source);
            }
        }
    }
}

/// While a prompt is open it takes every key.
fn handle_prompt_key(key: KeyEvent, session: &mut Session<'_>) {
    let app = &mut *session.app;
    match key.code {
        KeyCode::Esc => {
            app.take_prompt();
        }
        KeyCode::Backspace => app.prompt_pop(),
        KeyCode::Enter => {
            if let Some(prompt) = app.take_prompt() {
                submit_prompt(prompt.kind, &prompt.input, session);
            }
        }
        KeyCode::Char(c) if !c.is_control() => {
            let kind = app.prompt.as_ref().map(|p| p.kind);
            app.prompt_push(c);
            // a yes/no question needs no Enter
            if kind == Some(PromptKind::DeletePlaylist) {
                if let Some(prompt) = app.take_prompt() {
                    submit_prompt(prompt.kind, &prompt.input, session);
                }
            }
        }
        _ => {}
    }
}

/// Handle one key press. Returns true when the user asked to quit.
pub fn handle_key_event(key: KeyEvent, session: &mut Session<'_>, state: &mut EventLoopState) -> bool {
    if session.app.prompt.is_some() {
        handle_prompt_key(key, session);
        return false;
    }

    let app_filtering = session.app.filter_mode;
    if let Some(intent) = keymap::intent_for(&key, app_filtering, &session.settings.controls) {
        state.pending_gg = false;
        state.pending_zz = false;
        if matches!(intent, Intent::NextTrack | Intent::PreviousTrack) {
            session.app.follow_playback_on();
        }
        session.controller.handle_intent(intent);
        return false;
    }

    let app = &mut *session.app;

    if app.filter_mode {
        state.pending_gg = false;
        match key.code {
            KeyCode::Esc => app.clear_filter(),
            KeyCode::Backspace => app.pop_filter_char(),
            KeyCode::Char('j') | KeyCode::Char('n')
                if key.modifiers.contains(KeyModifiers::CONTROL) =>
            {
                app.follow_playback_off();
                app.next();
            }
            KeyCode::Char('k') | KeyCode::Char('p')
                if key.modifiers.contains(KeyModifiers::CONTROL) =>
            {
                app.follow_playback_off();
                app.prev();
            }
            KeyCode::Down => app.next(),
            KeyCode::Up => app.prev(),
            KeyCode::Char(c) => {
                if !c.is_control() {
                    app.push_filter_char(c);
                }
            }
            KeyCode::Enter => {
                if app.display_indices().is_empty() {
                    return false;
                }
                app.exit_filter_mode();
                play_selected(session);
            }
            _ => {}
        }
        return false;
    }

    app.clear_status();
    if key.code != KeyCode::Char('z') {
        state.pending_zz = false;
    }

    match key.code {
        KeyCode::Char('q') => {
            state.pending_gg = false;
            return true;
        }
        KeyCode::Char('/') => {
            state.pending_gg = false;
            app.enter_filter_mode();
        }
        KeyCode::Char('z') => {
            state.pending_gg = false;
            if state.pending_zz {
                state.pending_zz = false;
                app.follow_playback_on();
                app.follow(session.controller.state().current_track_id.as_ref());
            } else {
                state.pending_zz = true;
            }
        }
        KeyCode::Char('g') => {
            if state.pending_gg {
                state.pending_gg = false;
                app.follow_playback_off();
                let display = app.display_indices();
                if let Some(&first) = display.first() {
                    app.set_selected(first);
                }
            } else {
                state.pending_gg = true;
            }
        }
        KeyCode::Char('G') => {
            state.pending_gg = false;
            app.follow_playback_off();
            let display = app.display_indices();
            if let Some(&last) = display.last() {
                app.set_selected(last);
            }
        }
        KeyCode::Char('j') | KeyCode::Down => {
            state.pending_gg = false;
            app.follow_playback_off();
            app.next();
        }
        KeyCode::Char('k') | KeyCode::Up => {
            state.pending_gg = false;
            app.follow_playback_off();
            app.prev();
        }
        KeyCode::Enter => {
            state.pending_gg = false;
            play_selected(session);
        }
        KeyCode::Char('J') => {
            state.pending_gg = false;
            app.follow_playback_off();
            if app.move_selected_down() {
                push_edits(session);
            }
        }
        KeyCode::Char('K') => {
            state.pending_gg = false;
            app.follow_playback_off();
            if app.move_selected_up() {
                push_edits(session);
            }
        }
        KeyCode::Char('x') => {
            state.pending_gg = false;
            if let Some(removed) = app.remove_selected() {
                app.set_status(format!("removed {}", removed.display()));
                push_edits(session);
            }
        }
        KeyCode::Char('w') => {
            state.pending_gg = false;
            save_playlist(app, session.source);
        }
        KeyCode::Char('a') => {
            state.pending_gg = false;
            app.open_prompt(PromptKind::AddTrack);
        }
        KeyCode::Char('e') => {
            state.pending_gg = false;
            app.open_prompt(PromptKind::EditTrack);
        }
        KeyCode::Char('n') => {
            state.pending_gg = false;
            app.open_prompt(PromptKind::NewPlaylist);
        }
        KeyCode::Char('D') => {
            state.pending_gg = false;
            app.open_prompt(PromptKind::DeletePlaylist);
        }
        KeyCode::Tab => {
            state.pending_gg = false;
            match app.next_playlist_pos() {
                Some(pos) => switch_playlist(app, session.controller, session.source, pos),
                None => app.set_status("no other playlist"),
            }
        }
        KeyCode::Char('i') => {
            state.pending_gg = false;
            app.toggle_metadata_window();
        }
        KeyCode::Char('o') => {
            state.pending_gg = false;
            open_external(session);
        }
        KeyCode::Char(_) => {
            // g pending should clear on any other printable char
            state.pending_gg = false;
        }
        _ => {}
    }

    false
}
