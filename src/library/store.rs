//! Playlists stored as TOML files.
//!
//! ```toml
//! name = "Road trip"
//!
//! [[tracks]]
//! id = "intro"
//! title = "Song"
//! artist = "Artist"
//! duration = 215
//! url = "https://example.com/preview.mp3"
//! external_url = "https://open.spotify.com/track/abc"
//! ```

use std::cell::RefCell;
use std::collections::{BTreeMap, HashSet};
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::SourceError;

use super::model::{PlaylistId, Track, TrackId};
use super::source::TrackSource;

#[derive(Debug, Default, Deserialize, Serialize)]
struct PlaylistFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(default)]
    tracks: Vec<TrackEntry>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
struct TrackEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    #[serde(default)]
    title: String,
    #[serde(default)]
    artist: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    album: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    duration: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    external_url: Option<String>,
}

fn non_empty(s: Option<String>) -> Option<String> {
    s.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn has_scheme(url: &str) -> bool {
    // `https://…`, `spotify:track:…`; a drive letter like `C:\` is a path
    match url.find(':') {
        Some(i) => i > 1 || url.contains("://"),
        None => false,
    }
}

/// Bare relative paths in a playlist are relative to the playlist file.
fn resolve_location(base: &Path, url: String) -> String {
    if has_scheme(&url) || Path::new(&url).is_absolute() {
        url
    } else {
        base.join(&url).to_string_lossy().into_owned()
    }
}

/// Inverse of `resolve_location` for paths under `base`.
fn stored_location(base: &Path, url: &str) -> String {
    if has_scheme(url) || base.as_os_str().is_empty() {
        return url.to_string();
    }
    match Path::new(url).strip_prefix(base) {
        Ok(rel) => rel.to_string_lossy().into_owned(),
        Err(_) => url.to_string(),
    }
}

/// File stem for a playlist called `name`: lowercase words joined by `-`.
fn playlist_id_for(name: &str) -> String {
    name.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("-")
}

fn is_playlist_file(path: &Path) -> bool {
    path.is_file()
        && path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.eq_ignore_ascii_case("toml"))
            .unwrap_or(false)
}

fn parse_playlist(playlist: &str, path: &Path, text: &str) -> Result<Vec<Track>, SourceError> {
    let file: PlaylistFile = toml::from_str(text).map_err(|source| SourceError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    let base = path.parent().unwrap_or(Path::new(""));
    let mut seen: HashSet<String> = HashSet::new();
    let mut tracks = Vec::with_capacity(file.tracks.len());

    for (index, entry) in file.tracks.into_iter().enumerate() {
        let title = entry.title.trim().to_string();
        if title.is_empty() {
            return Err(SourceError::InvalidTrack {
                playlist: playlist.to_string(),
                index,
                reason: "has an empty title".to_string(),
            });
        }
        let artist = entry.artist.trim().to_string();
        if artist.is_empty() {
            return Err(SourceError::InvalidTrack {
                playlist: playlist.to_string(),
                index,
                reason: "has an empty artist".to_string(),
            });
        }

        let id = non_empty(entry.id).unwrap_or_else(|| format!("t{index}"));
        if !seen.insert(id.clone()) {
            return Err(SourceError::DuplicateId {
                playlist: playlist.to_string(),
                id,
            });
        }

        tracks.push(Track {
            id: TrackId::new(id),
            title,
            artist,
            album: non_empty(entry.album),
            duration_hint: entry.duration,
            playable_url: non_empty(entry.url).map(|url| resolve_location(base, url)),
            external_url: non_empty(entry.external_url),
        });
    }

    Ok(tracks)
}

/// One or more playlist files, addressed by file stem. New playlists are
/// created next to them.
pub struct PlaylistFiles {
    dir: PathBuf,
    files: RefCell<BTreeMap<PlaylistId, PathBuf>>,
}

impl PlaylistFiles {
    /// True for a `.toml` file or a directory that holds at least one.
    pub fn looks_like_playlists(path: &Path) -> bool {
        if path.is_dir() {
            fs::read_dir(path)
                .map(|rd| rd.filter_map(Result::ok).any(|e| is_playlist_file(&e.path())))
                .unwrap_or(false)
        } else {
            is_playlist_file(path)
        }
    }

    pub fn from_path(path: &Path) -> Result<Self, SourceError> {
        let io_err = |source| SourceError::Io {
            path: path.to_path_buf(),
            source,
        };

        let (dir, candidates): (PathBuf, Vec<PathBuf>) = if path.is_dir() {
            let found = fs::read_dir(path)
                .map_err(io_err)?
                .filter_map(Result::ok)
                .map(|e| e.path())
                .filter(|p| is_playlist_file(p))
                .collect();
            (path.to_path_buf(), found)
        } else {
            let dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
            (dir, vec![path.to_path_buf()])
        };

        let files = candidates
            .into_iter()
            .filter_map(|p| {
                let id = p.file_stem()?.to_str()?.to_string();
                Some((id, p))
            })
            .collect();

        Ok(Self {
            dir,
            files: RefCell::new(files),
        })
    }

    fn path_of(&self, id: &str) -> Result<PathBuf, SourceError> {
        self.files
            .borrow()
            .get(id)
            .cloned()
            .ok_or_else(|| SourceError::UnknownPlaylist(id.to_string()))
    }
}

impl TrackSource for PlaylistFiles {
    fn playlists(&self) -> Result<Vec<PlaylistId>, SourceError> {
        Ok(self.files.borrow().keys().cloned().collect())
    }

    fn resolve_playlist(&self, id: &str) -> Result<Vec<Track>, SourceError> {
        let path = self.path_of(id)?;
        let text = fs::read_to_string(&path).map_err(|source| SourceError::Io {
            path: path.clone(),
            source,
        })?;
        parse_playlist(id, &path, &text)
    }

    fn save_playlist(&self, id: &str, tracks: &[Track]) -> Result<(), SourceError> {
        let path = self.path_of(id)?;
        let base = path.parent().unwrap_or(Path::new(""));

        // Keep the display name of the existing file, if it still parses.
        let name = fs::read_to_string(&path)
            .ok()
            .and_then(|text| toml::from_str::<PlaylistFile>(&text).ok())
            .and_then(|f| f.name);

        let file = PlaylistFile {
            name,
            tracks: tracks
                .iter()
                .map(|t| TrackEntry {
                    id: Some(t.id.to_string()),
                    title: t.title.clone(),
                    artist: t.artist.clone(),
                    album: t.album.clone(),
                    duration: t.duration_hint,
                    url: t.playable_url.as_deref().map(|u| stored_location(base, u)),
                    external_url: t.external_url.clone(),
                })
                .collect(),
        };

        let text = toml::to_string_pretty(&file)?;
        fs::write(&path, text).map_err(|source| SourceError::Io {
            path: path.clone(),
            source,
        })?;
        info!(playlist = id, tracks = tracks.len(), "playlist saved");
        Ok(())
    }

    fn create_playlist(&self, name: &str) -> Result<PlaylistId, SourceError> {
        let name = name.trim();
        let id = playlist_id_for(name);
        if id.is_empty() {
            return Err(SourceError::InvalidName(name.to_string()));
        }
        if self.files.borrow().contains_key(&id) {
            return Err(SourceError::AlreadyExists(id));
        }

        let path = self.dir.join(format!("{id}.toml"));
        let text = toml::to_string_pretty(&PlaylistFile {
            name: Some(name.to_string()),
            tracks: Vec::new(),
        })?;
        let written = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .and_then(|mut f| f.write_all(text.as_bytes()));
        match written {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                return Err(SourceError::AlreadyExists(id));
            }
            Err(source) => return Err(SourceError::Io { path, source }),
        }

        info!(playlist = %id, "playlist created");
        self.files.borrow_mut().insert(id.clone(), path);
        Ok(id)
    }

    fn delete_playlist(&self, id: &str) -> Result<(), SourceError> {
        let path = self.path_of(id)?;
        fs::remove_file(&path).map_err(|source| SourceError::Io { path, source })?;
        self.files.borrow_mut().remove(id);
        info!(playlist = id, "playlist deleted");
        Ok(())
    }
}
