//! Transport key bindings.
//!
//! Only keys that drive playback live here; list navigation and editing
//! are handled by the event loop.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::config::ControlsSettings;
use crate::player::Intent;

/// Map a key press to a playback intent.
///
/// Returns `None` while a text input has focus, so typing into the filter
/// never drives playback.
pub fn intent_for(key: &KeyEvent, in_text_input: bool, controls: &ControlsSettings) -> Option<Intent> {
    if in_text_input {
        return None;
    }

    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    let seek = controls.seek_step_seconds as f64;
    let step = controls.volume_step;

    let intent = match key.code {
        KeyCode::Char(' ') | KeyCode::Char('p') => Intent::TogglePlayPause,
        KeyCode::Right if ctrl => Intent::NextTrack,
        KeyCode::Left if ctrl => Intent::PreviousTrack,
        KeyCode::Right | KeyCode::Char('L') => Intent::SeekBy(seek),
        KeyCode::Left | KeyCode::Char('H') => Intent::SeekBy(-seek),
        KeyCode::Char('+') | KeyCode::Char('=') => Intent::VolumeBy(step),
        KeyCode::Char('-') => Intent::VolumeBy(-step),
        KeyCode::Char('m') => Intent::ToggleMute,
        // Terminals report Shift+n as 'N', sometimes with SHIFT set as well.
        KeyCode::Char('N') => Intent::NextTrack,
        KeyCode::Char('P') => Intent::PreviousTrack,
        _ => return None,
    };
    Some(intent)
}
