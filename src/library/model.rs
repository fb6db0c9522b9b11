use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of a track, unique within one playlist.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrackId(String);

impl TrackId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TrackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TrackId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Identifier of a playlist as known to its `TrackSource`.
pub type PlaylistId = String;

/// One playable/display unit of a playlist.
///
/// Immutable once resolved; `playable_url` is the only location ever handed
/// to the media backend, `external_url` is for opening elsewhere.
#[derive(Clone, Debug, PartialEq)]
pub struct Track {
    pub id: TrackId,
    pub title: String,
    pub artist: String,
    pub album: Option<String>,
    /// Seconds, as claimed by the source. The backend's report wins once playing.
    pub duration_hint: Option<u64>,
    pub playable_url: Option<String>,
    pub external_url: Option<String>,
}

impl Track {
    pub fn is_playable(&self) -> bool {
        self.playable_url.is_some()
    }

    /// "Artist - Title".
    pub fn display(&self) -> String {
        super::display::make_display(&self.title, Some(&self.artist))
    }
}
