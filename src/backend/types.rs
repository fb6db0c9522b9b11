//! Backend commands, raw signals and the validated events the player sees.

use std::time::Duration;

/// Identity of one `load()` call. Every later signal for that resource
/// carries it, so signals from a superseded load can be told apart.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LoadId(pub u64);

/// Tag attached to commands and echoed back on signals.
///
/// `seq` grows with every transport command (load/play/pause); a backend
/// stamps each signal with the latest command it has processed.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct Stamp {
    pub load: LoadId,
    pub seq: u64,
}

/// Signal vocabulary spoken by media primitives.
///
/// Payloads are unvalidated; `MediaAdapter::translate` turns these into
/// `MediaEvent`s.
#[derive(Debug, Clone, PartialEq)]
pub enum RawEvent {
    /// Enough is buffered to accept commands.
    CanPlay,
    /// Playback was requested and has begun.
    Play,
    /// Audio is flowing.
    Playing,
    Pause,
    TimeUpdate(f64),
    DurationChange(f64),
    Ended,
    Error(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Signal {
    pub stamp: Stamp,
    pub event: RawEvent,
}

impl Signal {
    pub fn new(stamp: Stamp, event: RawEvent) -> Self {
        Self { stamp, event }
    }
}

/// Lifecycle events after validation at the adapter boundary.
#[derive(Debug, Clone, PartialEq)]
pub enum MediaEvent {
    Ready,
    Started,
    Paused,
    TimeUpdate { seconds: f64 },
    DurationKnown { seconds: f64 },
    Ended,
    Error { message: String },
}

/// Commands understood by the audio thread.
#[derive(Debug)]
pub enum BackendCmd {
    Load { stamp: Stamp, url: String },
    Play(Stamp),
    Pause(Stamp),
    Seek { stamp: Stamp, position: Duration },
    SetVolume(f32),
    /// Quit the audio thread, fading out over `fade_out_ms` milliseconds.
    Quit { fade_out_ms: u64 },
}
