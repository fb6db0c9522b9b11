//! Error types shared across the crate.
//!
//! Playback itself never fails loudly: the controller absorbs backend
//! failures into `PlaybackError`, which is stored on the playback state
//! for the UI to render. Everything else propagates with `?`.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Failures while resolving or saving playlists.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse playlist {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("failed to serialize playlist: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("playlist {playlist}: track #{index} {reason}")]
    InvalidTrack {
        playlist: String,
        index: usize,
        reason: String,
    },

    #[error("playlist {playlist}: duplicate track id {id:?}")]
    DuplicateId { playlist: String, id: String },

    #[error("unknown playlist {0:?}")]
    UnknownPlaylist(String),

    #[error("playlist {0:?} is read-only")]
    ReadOnly(String),

    #[error("playlist {0:?} already exists")]
    AlreadyExists(String),

    #[error("{0:?} is not a usable playlist name")]
    InvalidName(String),
}

/// Failures of the underlying media primitive.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("no audio output device: {0}")]
    NoOutputDevice(String),

    #[error("failed to fetch media: {0}")]
    Fetch(#[from] reqwest::Error),

    #[error("failed to open media: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to decode media: {0}")]
    Decode(String),

    #[error("unsupported media url {0:?}")]
    Unsupported(String),

    #[error("audio thread is not running")]
    ThreadGone,
}

/// Error indicator retained on the playback state for the current track.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlaybackError {
    #[error("{0}")]
    Backend(String),

    #[error("track did not become ready within {}s", .0.as_secs())]
    LoadTimedOut(Duration),
}

/// Top-level application error.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Source(#[from] SourceError),

    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error("terminal error: {0}")]
    Io(#[from] std::io::Error),

    #[error("no playlists found under {}", .0.display())]
    NoPlaylists(PathBuf),
}

/// Reasons a seek request is not forwarded to the backend.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum SeekRejected {
    #[error("seek target is not a finite number")]
    NotFinite,

    #[error("seek target {0}s is negative")]
    Negative(f64),

    #[error("seek target {requested}s is past the end ({duration}s)")]
    PastEnd { requested: f64, duration: f64 },

    #[error("nothing is loaded")]
    NothingLoaded,
}
