//! One-line text prompts for editing tracks and playlists.

use crate::library::Track;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptKind {
    AddTrack,
    EditTrack,
    NewPlaylist,
    DeletePlaylist,
}

impl PromptKind {
    pub fn label(self) -> &'static str {
        match self {
            PromptKind::AddTrack => "add (artist - title | url)",
            PromptKind::EditTrack => "edit (artist - title | url)",
            PromptKind::NewPlaylist => "new playlist name",
            PromptKind::DeletePlaylist => "delete this playlist? (y/n)",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Prompt {
    pub kind: PromptKind,
    pub input: String,
}

/// Fields a user can type for a track.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackFields {
    pub artist: String,
    pub title: String,
    pub url: Option<String>,
}

impl TrackFields {
    /// Parse `Artist - Title` with an optional ` | url` suffix.
    pub fn parse(line: &str) -> Result<Self, String> {
        let (names, url) = match line.split_once('|') {
            Some((names, url)) => (names, Some(url.trim())),
            None => (line, None),
        };
        let Some((artist, title)) = names.split_once(" - ") else {
            return Err("expected \"artist - title\"".to_string());
        };
        let (artist, title) = (artist.trim(), title.trim());
        if artist.is_empty() || title.is_empty() {
            return Err("artist and title must not be empty".to_string());
        }
        Ok(Self {
            artist: artist.to_string(),
            title: title.to_string(),
            url: url.filter(|u| !u.is_empty()).map(str::to_string),
        })
    }

    /// The line `parse` reads back into the same fields.
    pub fn line_for(track: &Track) -> String {
        match &track.playable_url {
            Some(url) => format!("{} - {} | {url}", track.artist, track.title),
            None => format!("{} - {}", track.artist, track.title),
        }
    }
}

/// Whether a confirmation prompt was answered with yes.
pub fn confirmed(input: &str) -> bool {
    matches!(input.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}
