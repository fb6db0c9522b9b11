use std::sync::mpsc::{Receiver, Sender};
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::backend::{LoadId, MediaAdapter, MediaBackend, MediaEvent, Signal};
use crate::config::AudioSettings;
use crate::error::PlaybackError;
use crate::library::{Track, TrackId};

use super::state::{PlaybackState, Phase};

/// Transport commands coming from the keyboard.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Intent {
    TogglePlayPause,
    SeekBy(f64),
    VolumeBy(f32),
    ToggleMute,
    NextTrack,
    PreviousTrack,
}

/// The load the controller currently cares about.
#[derive(Debug)]
struct LoadTicket {
    id: LoadId,
    started: Instant,
    ended: bool,
}

/// Owns the playback state and the media adapter.
///
/// Every operation runs to completion and returns without waiting on the
/// backend. Backend outcomes arrive later as signals, applied by `pump`.
pub struct PlaybackController {
    state: PlaybackState,
    adapter: MediaAdapter,
    signals: Receiver<Signal>,
    load: Option<LoadTicket>,
    /// Sequence number of the latest play/pause the controller issued.
    intent_seq: u64,
    load_timeout: Duration,
}

impl PlaybackController {
    /// `signals`/`events` are both ends of the channel `backend` reports on.
    pub fn new(
        backend: Box<dyn MediaBackend>,
        signals: Sender<Signal>,
        events: Receiver<Signal>,
        settings: &AudioSettings,
    ) -> Self {
        let adapter = MediaAdapter::new(backend, signals, settings.initial_volume);
        Self {
            state: PlaybackState::new(adapter.volume()),
            adapter,
            signals: events,
            load: None,
            intent_seq: 0,
            load_timeout: Duration::from_millis(settings.load_timeout_ms),
        }
    }

    pub fn state(&self) -> &PlaybackState {
        &self.state
    }

    pub fn phase(&self) -> Phase {
        self.state.phase()
    }

    pub fn current_track(&self) -> Option<&Track> {
        self.state.current_track()
    }

    pub fn is_muted(&self) -> bool {
        self.state.is_muted()
    }

    // ---- track selection ----

    /// Select and play `id`. Resumes in place when `id` is the current,
    /// paused and still loaded track.
    pub fn play(&mut self, id: &TrackId) {
        let Some(index) = self.state.index_of(id) else {
            warn!(track = %id, "play ignored: track is not in the playlist");
            return;
        };

        let same = self.state.current_track_id.as_ref() == Some(id);
        if same && !self.state.is_playing && self.load.is_some() {
            self.resume();
        } else {
            self.start(index);
        }
    }

    fn start(&mut self, index: usize) {
        let track = self.state.playlist[index].clone();
        let state = &mut self.state;
        state.current_track_id = Some(track.id.clone());
        state.position_seconds = 0.0;
        state.duration_seconds = 0.0;
        state.backend_ready = false;
        state.error = None;

        let Some(url) = track.playable_url.as_deref() else {
            info!(track = %track.id, "no playable url; leaving it to an external player");
            state.is_playing = false;
            if self.load.take().is_some() {
                self.intent_seq = self.adapter.pause().seq;
            }
            return;
        };

        state.is_playing = true;
        let stamp = self.adapter.load(url);
        self.load = Some(LoadTicket {
            id: stamp.load,
            started: Instant::now(),
            ended: false,
        });
        self.intent_seq = self.adapter.play().seq;
        debug!(track = %track.id, load = stamp.load.0, "started loading");
    }

    pub fn pause(&mut self) {
        if !self.state.is_playing {
            return;
        }
        self.state.is_playing = false;
        if self.load.is_some() {
            self.intent_seq = self.adapter.pause().seq;
        }
    }

    /// Resume the current track. A load abandoned after an error or a
    /// timeout is started over.
    pub fn resume(&mut self) {
        if self.state.is_playing {
            return;
        }
        let Some(index) = self.state.current_index() else {
            return;
        };
        if !self.state.playlist[index].is_playable() {
            debug!("resume ignored: current track has no playable url");
            return;
        }

        match self.load.as_mut() {
            Some(ticket) => {
                ticket.ended = false;
                self.state.is_playing = true;
                self.intent_seq = self.adapter.play().seq;
            }
            None => self.start(index),
        }
    }

    pub fn toggle_play_pause(&mut self) {
        if self.state.is_playing {
            self.pause();
        } else {
            self.resume();
        }
    }

    /// Move to the following track. No wraparound.
    pub fn next(&mut self) {
        if self.state.playlist.len() <= 1 {
            return;
        }
        let Some(index) = self.state.current_index() else {
            return;
        };
        if index + 1 < self.state.playlist.len() {
            self.start(index + 1);
        }
    }

    /// Move to the preceding track. No wraparound.
    pub fn previous(&mut self) {
        if self.state.playlist.len() <= 1 {
            return;
        }
        match self.state.current_index() {
            Some(index) if index > 0 => self.start(index - 1),
            _ => {}
        }
    }

    fn on_ended(&mut self) {
        if let Some(ticket) = self.load.as_mut() {
            ticket.ended = true;
        }
        self.state.is_playing = false;
        self.state.position_seconds = 0.0;

        let Some(index) = self.state.current_index() else {
            return;
        };
        if index + 1 < self.state.playlist.len() {
            self.start(index + 1);
        } else {
            info!("end of playlist");
        }
    }

    // ---- position ----

    /// Jump to `seconds`. Invalid targets are logged and ignored.
    pub fn seek(&mut self, seconds: f64) {
        if self.load.is_none() {
            debug!(seconds, "seek ignored: nothing loaded");
            return;
        }
        match self.adapter.seek(seconds) {
            Ok(stamp) => {
                self.intent_seq = stamp.seq;
                self.state.position_seconds = seconds;
                if let Some(ticket) = self.load.as_mut() {
                    ticket.ended = false;
                }
            }
            Err(e) => debug!("seek ignored: {e}"),
        }
    }

    /// Relative seek, clamped to the known bounds of the track.
    pub fn seek_by(&mut self, delta: f64) {
        if !delta.is_finite() {
            warn!(delta, "ignoring non-finite seek offset");
            return;
        }
        let mut target = (self.state.position_seconds + delta).max(0.0);
        if self.state.duration_seconds > 0.0 {
            target = target.min(self.state.duration_seconds);
        }
        self.seek(target);
    }

    // ---- volume ----

    fn apply_volume(&mut self, volume: f32) {
        self.state.volume = self.adapter.set_volume(volume);
    }

    /// Set the volume directly. A drag to zero is not a mute toggle, so the
    /// remembered volume is forgotten.
    pub fn set_volume(&mut self, volume: f32) {
        if !volume.is_finite() {
            warn!(volume, "ignoring non-finite volume");
            return;
        }
        self.apply_volume(volume);
        self.state.muted_previous_volume = None;
    }

    pub fn adjust_volume(&mut self, delta: f32) {
        let target = ((self.state.volume + delta) * 100.0).round() / 100.0;
        self.set_volume(target);
    }

    pub fn toggle_mute(&mut self) {
        if self.state.volume == 0.0 {
            let restore = self.state.muted_previous_volume.take().unwrap_or(1.0);
            self.apply_volume(restore);
        } else {
            let previous = self.state.volume;
            self.apply_volume(0.0);
            self.state.muted_previous_volume = Some(previous);
        }
    }

    // ---- playlist ----

    /// Replace the sequence in place (after an edit). The selection survives
    /// unless the current track is gone.
    pub fn set_playlist(&mut self, tracks: Vec<Track>) {
        self.state.playlist = tracks;
        let gone = self
            .state
            .current_track_id
            .as_ref()
            .is_some_and(|id| self.state.index_of(id).is_none());
        if gone {
            info!("current track left the playlist; stopping");
            self.reset();
        }
    }

    /// Attach a different playlist, replacing state wholesale. Volume and
    /// mute memory are kept.
    pub fn attach_playlist(&mut self, tracks: Vec<Track>) {
        self.reset();
        self.state.playlist = tracks;
    }

    fn reset(&mut self) {
        if self.load.take().is_some() {
            self.intent_seq = self.adapter.pause().seq;
        }
        let state = &mut self.state;
        state.current_track_id = None;
        state.is_playing = false;
        state.position_seconds = 0.0;
        state.duration_seconds = 0.0;
        state.backend_ready = false;
        state.error = None;
    }

    // ---- backend signals ----

    /// Apply every signal the backend has sent so far. Returns how many
    /// were received.
    pub fn pump(&mut self) -> usize {
        let mut n = 0;
        while let Ok(signal) = self.signals.try_recv() {
            self.handle_signal(signal);
            n += 1;
        }
        n
    }

    /// Apply one backend signal, discarding it if it no longer refers to
    /// the current load or lost against a newer user command.
    pub fn handle_signal(&mut self, signal: Signal) {
        let Some((stamp, event)) = self.adapter.translate(signal) else {
            return;
        };
        let Some(ticket) = self.load.as_ref() else {
            debug!(?event, "discarding signal: no active load");
            return;
        };
        if stamp.load != ticket.id {
            debug!(?event, load = stamp.load.0, "discarding signal from a superseded load");
            return;
        }
        let ended = ticket.ended;

        match event {
            MediaEvent::Ready => self.state.backend_ready = true,
            MediaEvent::Started => {
                if stamp.seq < self.intent_seq {
                    debug!(seq = stamp.seq, "discarding stale start");
                    return;
                }
                self.state.backend_ready = true;
                self.state.is_playing = true;
            }
            MediaEvent::Paused => {
                if stamp.seq < self.intent_seq {
                    debug!(seq = stamp.seq, "discarding stale pause");
                    return;
                }
                self.state.is_playing = false;
            }
            MediaEvent::TimeUpdate { seconds } => {
                if ended {
                    return;
                }
                let duration = self.state.duration_seconds;
                self.state.position_seconds = if duration > 0.0 {
                    seconds.min(duration)
                } else {
                    seconds
                };
            }
            MediaEvent::DurationKnown { seconds } => {
                self.state.duration_seconds = seconds;
                if self.state.position_seconds > seconds {
                    self.state.position_seconds = seconds;
                }
            }
            MediaEvent::Ended if stamp.seq < self.intent_seq => {
                // a newer pause or seek wins: the track is finished but nothing advances
                debug!(seq = stamp.seq, "end reported before a newer command; not advancing");
                if let Some(ticket) = self.load.as_mut() {
                    ticket.ended = true;
                }
                self.state.position_seconds = 0.0;
            }
            MediaEvent::Ended => self.on_ended(),
            MediaEvent::Error { message } => {
                warn!(load = stamp.load.0, "playback failed: {message}");
                self.load = None;
                self.state.is_playing = false;
                self.state.backend_ready = false;
                self.state.error = Some(PlaybackError::Backend(message));
            }
        }
    }

    /// Fail a load that has not become ready within the configured timeout.
    pub fn tick(&mut self, now: Instant) {
        let Some(ticket) = self.load.as_ref() else {
            return;
        };
        if self.state.backend_ready {
            return;
        }
        if now.saturating_duration_since(ticket.started) < self.load_timeout {
            return;
        }

        warn!(load = ticket.id.0, timeout = ?self.load_timeout, "load timed out");
        self.load = None;
        // Cancels a deferred play should the backend become ready later.
        self.intent_seq = self.adapter.pause().seq;
        self.state.is_playing = false;
        self.state.error = Some(PlaybackError::LoadTimedOut(self.load_timeout));
    }

    pub fn handle_intent(&mut self, intent: Intent) {
        match intent {
            Intent::TogglePlayPause => self.toggle_play_pause(),
            Intent::SeekBy(delta) => self.seek_by(delta),
            Intent::VolumeBy(delta) => self.adjust_volume(delta),
            Intent::ToggleMute => self.toggle_mute(),
            Intent::NextTrack => self.next(),
            Intent::PreviousTrack => self.previous(),
        }
    }
}
