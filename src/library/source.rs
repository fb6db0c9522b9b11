use std::path::Path;

use crate::config::LibrarySettings;
use crate::error::SourceError;

use super::model::{PlaylistId, Track};
use super::scan::FolderSource;
use super::store::PlaylistFiles;

/// Resolves playlists into ordered track sequences.
///
/// Resolution is a one-shot snapshot; callers push a fresh sequence into the
/// player themselves when a playlist changes.
pub trait TrackSource {
    /// Available playlist ids, sorted.
    fn playlists(&self) -> Result<Vec<PlaylistId>, SourceError>;

    fn resolve_playlist(&self, id: &str) -> Result<Vec<Track>, SourceError>;

    /// Persist an edited track order.
    fn save_playlist(&self, id: &str, _tracks: &[Track]) -> Result<(), SourceError> {
        Err(SourceError::ReadOnly(id.to_string()))
    }

    /// Create an empty playlist called `name` and return its id.
    fn create_playlist(&self, name: &str) -> Result<PlaylistId, SourceError> {
        Err(SourceError::ReadOnly(name.to_string()))
    }

    fn delete_playlist(&self, id: &str) -> Result<(), SourceError> {
        Err(SourceError::ReadOnly(id.to_string()))
    }
}

/// Pick a source for `path`: playlist files when it is (or contains)
/// `.toml` files, otherwise a scanned folder of audio files.
pub fn open_source(path: &Path, settings: &LibrarySettings) -> Result<Box<dyn TrackSource>, SourceError> {
    if PlaylistFiles::looks_like_playlists(path) {
        Ok(Box::new(PlaylistFiles::from_path(path)?))
    } else {
        Ok(Box::new(FolderSource::new(path, settings.clone())))
    }
}
