use std::path::{Path, PathBuf};

use lofty::prelude::*;
use tracing::debug;
use walkdir::WalkDir;

use crate::config::LibrarySettings;
use crate::error::SourceError;

use super::display::display_from_fields;
use super::model::{PlaylistId, Track, TrackId};
use super::source::TrackSource;

pub(crate) const UNKNOWN_ARTIST: &str = "Unknown artist";

fn has_audio_extension(path: &Path, settings: &LibrarySettings) -> bool {
    let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
        return false;
    };
    settings.extensions.iter().any(|wanted| {
        let wanted = wanted.trim().trim_start_matches('.');
        !wanted.is_empty() && wanted.eq_ignore_ascii_case(ext)
    })
}

fn is_dotfile(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.starts_with('.'))
}

fn tag_text(tag: &lofty::tag::Tag, key: ItemKey) -> Option<String> {
    tag.get_string(&key)
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Build a track from `path`. Tags win over the file stem; a file without
/// readable tags still becomes a playable track.
fn read_track(root: &Path, path: &Path) -> Track {
    let tagged = lofty::read_from_path(path)
        .inspect_err(|e| debug!(path = %path.display(), error = %e, "no readable tags"))
        .ok();
    let tag = tagged.as_ref().and_then(|t| t.primary_tag().or_else(|| t.first_tag()));
    let field = |key| tag.and_then(|t| tag_text(t, key));

    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("untitled");
    let id = path.strip_prefix(root).unwrap_or(path).to_string_lossy();

    Track {
        id: TrackId::new(id),
        title: field(ItemKey::TrackTitle).unwrap_or_else(|| stem.to_string()),
        artist: field(ItemKey::TrackArtist).unwrap_or_else(|| UNKNOWN_ARTIST.to_string()),
        album: field(ItemKey::AlbumTitle),
        duration_hint: tagged.as_ref().map(|t| t.properties().duration().as_secs()),
        playable_url: Some(path.to_string_lossy().into_owned()),
        external_url: None,
    }
}

/// Scan `dir` for audio files, ordered by the configured display fields.
pub fn scan(dir: &Path, settings: &LibrarySettings) -> Vec<Track> {
    // not recursive: the root's own entries only
    let max_depth = if settings.recursive { settings.max_depth } else { Some(1) };
    let mut walker = WalkDir::new(dir).follow_links(settings.follow_links);
    if let Some(depth) = max_depth {
        walker = walker.max_depth(depth);
    }

    let visible = |e: &walkdir::DirEntry| settings.include_hidden || e.depth() == 0 || !is_dotfile(e.path());
    let mut keyed: Vec<(String, Track)> = walker
        .into_iter()
        .filter_entry(visible)
        .filter_map(Result::ok)
        .filter(|e| e.path().is_file())
        .filter(|e| has_audio_extension(e.path(), settings))
        .map(|e| {
            let track = read_track(dir, e.path());
            let key = display_from_fields(&track, &settings.display_fields, &settings.display_separator);
            (key.to_lowercase(), track)
        })
        .collect();

    keyed.sort_by(|a, b| a.0.cmp(&b.0));
    keyed.into_iter().map(|(_, track)| track).collect()
}

/// A folder of audio files exposed as a single, read-only playlist.
pub struct FolderSource {
    root: PathBuf,
    settings: LibrarySettings,
}

impl FolderSource {
    pub fn new(root: impl Into<PathBuf>, settings: LibrarySettings) -> Self {
        Self {
            root: root.into(),
            settings,
        }
    }

    fn playlist_id(&self) -> PlaylistId {
        self.root
            .file_name()
            .and_then(|s| s.to_str())
            .map(str::to_string)
            .unwrap_or_else(|| self.root.display().to_string())
    }
}

impl TrackSource for FolderSource {
    fn playlists(&self) -> Result<Vec<PlaylistId>, SourceError> {
        Ok(vec![self.playlist_id()])
    }

    fn resolve_playlist(&self, id: &str) -> Result<Vec<Track>, SourceError> {
        if id != self.playlist_id() {
            return Err(SourceError::UnknownPlaylist(id.to_string()));
        }
        Ok(scan(&self.root, &self.settings))
    }
}
