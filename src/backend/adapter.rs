use std::sync::mpsc::Sender;
use std::time::Duration;

use tracing::{debug, warn};

use crate::error::{BackendError, SeekRejected};

use super::types::{LoadId, MediaEvent, RawEvent, Signal, Stamp};

/// A single playable-media primitive.
///
/// Implementations must never block the caller on I/O and report outcomes
/// as `Signal`s stamped with the latest command they processed.
pub trait MediaBackend {
    fn load(&mut self, stamp: Stamp, url: &str);
    fn play(&mut self, stamp: Stamp);
    fn pause(&mut self, stamp: Stamp);
    fn seek(&mut self, stamp: Stamp, position: Duration);
    fn set_volume(&mut self, volume: f32);
}

/// Check that `url` names something a backend can open: `http(s)://`,
/// `file://` or a bare filesystem path.
pub fn check_url(url: &str) -> Result<(), BackendError> {
    let url = url.trim();
    if url.is_empty() {
        return Err(BackendError::Unsupported(String::new()));
    }

    match url.split_once("://") {
        Some((scheme, rest)) => match scheme.to_ascii_lowercase().as_str() {
            "http" | "https" if !rest.is_empty() => Ok(()),
            "file" if !rest.is_empty() => Ok(()),
            _ => Err(BackendError::Unsupported(url.to_string())),
        },
        None => {
            let bytes = url.as_bytes();
            let drive_letter = bytes.len() > 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':';
            if url.contains(':') && !drive_letter {
                // e.g. `spotify:track:...`
                Err(BackendError::Unsupported(url.to_string()))
            } else {
                Ok(())
            }
        }
    }
}

/// Validate a seek target against an optional known duration.
pub fn validate_seek(seconds: f64, duration: Option<f64>) -> Result<(), SeekRejected> {
    if !seconds.is_finite() {
        return Err(SeekRejected::NotFinite);
    }
    if seconds < 0.0 {
        return Err(SeekRejected::Negative(seconds));
    }
    if let Some(duration) = duration {
        if seconds > duration {
            return Err(SeekRejected::PastEnd {
                requested: seconds,
                duration,
            });
        }
    }
    Ok(())
}

/// Uniform front for a `MediaBackend`.
///
/// Allocates load ids and command stamps, validates inputs before they reach
/// the backend, defers `play`/`seek` until the backend is ready, and turns
/// raw backend signals into `MediaEvent`s.
pub struct MediaAdapter {
    backend: Box<dyn MediaBackend>,
    signals: Sender<Signal>,
    stamp: Stamp,
    loaded: Option<LoadId>,
    ready: bool,
    known_duration: Option<f64>,
    pending_play: Option<Stamp>,
    pending_seek: Option<f64>,
    volume: f32,
}

impl MediaAdapter {
    /// `signals` is the same channel the backend reports on; the adapter uses
    /// it for failures it detects itself.
    pub fn new(mut backend: Box<dyn MediaBackend>, signals: Sender<Signal>, volume: f32) -> Self {
        let volume = if volume.is_finite() {
            volume.clamp(0.0, 1.0)
        } else {
            1.0
        };
        backend.set_volume(volume);

        Self {
            backend,
            signals,
            stamp: Stamp::default(),
            loaded: None,
            ready: false,
            known_duration: None,
            pending_play: None,
            pending_seek: None,
            volume,
        }
    }

    /// Stamp of the most recent command.
    pub fn stamp(&self) -> Stamp {
        self.stamp
    }

    #[cfg(test)]
    pub fn is_ready(&self) -> bool {
        self.ready
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    fn next_seq(&mut self) -> Stamp {
        self.stamp.seq += 1;
        self.stamp
    }

    fn emit(&self, stamp: Stamp, event: RawEvent) {
        if self.signals.send(Signal::new(stamp, event)).is_err() {
            debug!("signal receiver dropped");
        }
    }

    /// Begin loading `url` as a new resource. Invalid urls are reported as an
    /// `Error` signal, never returned to the caller.
    pub fn load(&mut self, url: &str) -> Stamp {
        self.stamp = Stamp {
            load: LoadId(self.stamp.load.0 + 1),
            seq: self.stamp.seq + 1,
        };
        self.loaded = Some(self.stamp.load);
        self.ready = false;
        self.known_duration = None;
        self.pending_play = None;
        self.pending_seek = None;

        if let Err(e) = check_url(url) {
            warn!(url, load = self.stamp.load.0, "refusing to load: {e}");
            self.emit(self.stamp, RawEvent::Error(e.to_string()));
            return self.stamp;
        }

        debug!(url, load = self.stamp.load.0, "load");
        self.backend.load(self.stamp, url.trim());
        self.stamp
    }

    /// Request playback; deferred until the current load is ready.
    pub fn play(&mut self) -> Stamp {
        let stamp = self.next_seq();
        if self.loaded.is_none() {
            debug!("play ignored: nothing loaded");
        } else if self.ready {
            self.backend.play(stamp);
        } else {
            self.pending_play = Some(stamp);
        }
        stamp
    }

    pub fn pause(&mut self) -> Stamp {
        let stamp = self.next_seq();
        self.pending_play = None;
        if self.loaded.is_some() {
            self.backend.pause(stamp);
        }
        stamp
    }

    /// Jump to `seconds`. Rejected targets are logged and never forwarded.
    ///
    /// An accepted seek is a transport command of its own: it gets a fresh
    /// sequence number, so events the backend produced before it are older.
    pub fn seek(&mut self, seconds: f64) -> Result<Stamp, SeekRejected> {
        if let Err(e) = validate_seek(seconds, self.known_duration) {
            warn!("seek rejected: {e}");
            return Err(e);
        }
        if self.loaded.is_none() {
            return Err(SeekRejected::NothingLoaded);
        }

        let stamp = self.next_seq();
        if self.ready {
            self.backend.seek(stamp, Duration::from_secs_f64(seconds));
        } else {
            self.pending_seek = Some(seconds);
        }
        Ok(stamp)
    }

    /// Clamp to `[0, 1]` and forward immediately. Returns the applied value.
    pub fn set_volume(&mut self, volume: f32) -> f32 {
        if !volume.is_finite() {
            warn!(volume, "ignoring non-finite volume");
            return self.volume;
        }
        self.volume = volume.clamp(0.0, 1.0);
        self.backend.set_volume(self.volume);
        self.volume
    }

    fn mark_ready(&mut self) {
        if self.ready {
            return;
        }
        self.ready = true;
        if let Some(seconds) = self.pending_seek.take() {
            self.backend
                .seek(self.stamp, Duration::from_secs_f64(seconds));
        }
        if let Some(stamp) = self.pending_play.take() {
            self.backend.play(stamp);
        }
    }

    /// Translate a raw backend signal into a validated event.
    ///
    /// Malformed payloads are dropped here. Signals for other loads are
    /// passed through untouched; deciding staleness is the caller's job.
    pub fn translate(&mut self, signal: Signal) -> Option<(Stamp, MediaEvent)> {
        let current = self.loaded == Some(signal.stamp.load);

        let event = match signal.event {
            RawEvent::CanPlay => {
                if current {
                    self.mark_ready();
                }
                MediaEvent::Ready
            }
            RawEvent::Play | RawEvent::Playing => {
                if current {
                    self.mark_ready();
                }
                MediaEvent::Started
            }
            RawEvent::Pause => MediaEvent::Paused,
            RawEvent::TimeUpdate(t) => {
                if !t.is_finite() || t < 0.0 {
                    warn!(t, "dropping invalid time update");
                    return None;
                }
                MediaEvent::TimeUpdate { seconds: t }
            }
            RawEvent::DurationChange(d) => {
                if !d.is_finite() || d <= 0.0 {
                    warn!(d, "dropping invalid duration");
                    return None;
                }
                if current {
                    self.known_duration = Some(d);
                }
                MediaEvent::DurationKnown { seconds: d }
            }
            RawEvent::Ended => MediaEvent::Ended,
            RawEvent::Error(message) => {
                if current {
                    self.pending_play = None;
                    self.pending_seek = None;
                }
                MediaEvent::Error { message }
            }
        };

        Some((signal.stamp, event))
    }
}
