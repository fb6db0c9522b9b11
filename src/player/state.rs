use crate::error::PlaybackError;
use crate::library::{Track, TrackId};

/// Transport state as seen by everything outside the controller.
///
/// Only `PlaybackController` mutates this; the UI gets a shared reference.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackState {
    /// Order defines skip direction and auto-advance.
    pub playlist: Vec<Track>,
    /// Always `None` or the id of a track in `playlist`.
    pub current_track_id: Option<TrackId>,
    /// Intent, not confirmation: true as soon as playback is requested.
    pub is_playing: bool,
    pub position_seconds: f64,
    /// `0.0` until the backend reports a valid duration.
    pub duration_seconds: f64,
    pub volume: f32,
    /// Set only by an explicit mute toggle.
    pub muted_previous_volume: Option<f32>,
    pub backend_ready: bool,
    /// Last failure of the current track; cleared when a new load begins.
    pub error: Option<PlaybackError>,
}

/// Coarse state derived from `PlaybackState`, never stored.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Loading,
    Playing,
    Paused,
    /// The current track has no playable url.
    Unplayable,
    Errored,
}

impl PlaybackState {
    pub fn new(volume: f32) -> Self {
        Self {
            playlist: Vec::new(),
            current_track_id: None,
            is_playing: false,
            position_seconds: 0.0,
            duration_seconds: 0.0,
            volume,
            muted_previous_volume: None,
            backend_ready: false,
            error: None,
        }
    }

    pub fn index_of(&self, id: &TrackId) -> Option<usize> {
        self.playlist.iter().position(|t| &t.id == id)
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current_track_id
            .as_ref()
            .and_then(|id| self.index_of(id))
    }

    pub fn current_track(&self) -> Option<&Track> {
        self.current_index().map(|i| &self.playlist[i])
    }

    pub fn phase(&self) -> Phase {
        let Some(track) = self.current_track() else {
            return Phase::Idle;
        };
        if self.error.is_some() {
            Phase::Errored
        } else if !track.is_playable() {
            Phase::Unplayable
        } else if !self.backend_ready {
            Phase::Loading
        } else if self.is_playing {
            Phase::Playing
        } else {
            Phase::Paused
        }
    }

    /// Volume at zero, whether from the mute toggle or a drag.
    pub fn is_muted(&self) -> bool {
        self.volume == 0.0
    }
}

impl Default for PlaybackState {
    fn default() -> Self {
        Self::new(1.0)
    }
}
