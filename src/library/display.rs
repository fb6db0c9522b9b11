use std::path::Path;

use crate::config::TrackDisplayField;

use super::model::Track;

pub(crate) fn make_display(title: &str, artist: Option<&str>) -> String {
    match artist.map(str::trim) {
        Some(a) if !a.is_empty() => format!("{} - {}", a, title.trim()),
        _ => title.trim().to_string(),
    }
}

/// File stem of a playable location, for both bare paths and URLs.
pub fn location_stem(location: &str) -> Option<&str> {
    let last = location
        .rsplit(['/', '\\'])
        .next()
        .filter(|s| !s.is_empty())?;
    let last = last.split(['?', '#']).next().unwrap_or(last);
    Path::new(last)
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.trim().is_empty())
}

/// Build a display string for a track according to the provided `fields` and separator.
///
/// Fields that are missing for the track are skipped; when nothing was
/// produced this falls back to the title.
pub fn display_from_fields(track: &Track, fields: &[TrackDisplayField], sep: &str) -> String {
    let mut parts: Vec<String> = Vec::new();

    for f in fields {
        match f {
            TrackDisplayField::Display => parts.push(track.display()),
            TrackDisplayField::Title => {
                if !track.title.trim().is_empty() {
                    parts.push(track.title.trim().to_string());
                }
            }
            TrackDisplayField::Artist => {
                if !track.artist.trim().is_empty() {
                    parts.push(track.artist.trim().to_string());
                }
            }
            TrackDisplayField::Album => {
                if let Some(a) = track.album.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
                    parts.push(a.to_string());
                }
            }
            TrackDisplayField::Filename => {
                if let Some(stem) = track.playable_url.as_deref().and_then(location_stem) {
                    parts.push(stem.to_string());
                }
            }
            TrackDisplayField::Url => {
                if let Some(url) = track.playable_url.as_deref() {
                    parts.push(url.to_string());
                }
            }
        }
    }

    if parts.is_empty() {
        track.title.clone()
    } else {
        parts.join(sep)
    }
}
