use std::path::Path;

use tracing::{info, warn};

use crate::app::App;
use crate::config::Settings;
use crate::error::{Error, SourceError};
use crate::library::TrackSource;
use crate::player::PlaybackController;

/// Resolve the playlist to open first and build the view model around it.
///
/// `wanted` selects a playlist by id; without it the first id wins.
pub fn open_first_playlist(
    source: &dyn TrackSource,
    root: &Path,
    wanted: Option<&str>,
    settings: &Settings,
) -> Result<App, Error> {
    let ids = source.playlists()?;
    if ids.is_empty() {
        return Err(Error::NoPlaylists(root.to_path_buf()));
    }

    let pos = match wanted {
        Some(name) => ids
            .iter()
            .position(|id| id == name)
            .ok_or_else(|| SourceError::UnknownPlaylist(name.to_string()))?,
        None => 0,
    };

    let tracks = source.resolve_playlist(&ids[pos])?;
    info!(playlist = %ids[pos], tracks = tracks.len(), "opened playlist");

    let mut app = App::new(tracks);
    app.set_playlists(ids, pos);
    app.follow_playback = settings.ui.follow_playback;
    Ok(app)
}

/// Attach the playlist at `pos`, replacing what the controller plays.
/// Failures keep the current playlist and are reported in the status line.
pub fn switch_playlist(
    app: &mut App,
    controller: &mut PlaybackController,
    source: &dyn TrackSource,
    pos: usize,
) {
    let Some(id) = app.playlists.get(pos).cloned() else {
        return;
    };

    match source.resolve_playlist(&id) {
        Ok(tracks) => {
            let discarded = app.edited;
            app.replace_tracks(tracks);
            app.playlist_pos = pos;
            controller.attach_playlist(app.tracks.clone());
            info!(playlist = %id, tracks = app.tracks.len(), "attached playlist");
            if discarded {
                app.set_status("unsaved edits were discarded");
            }
        }
        Err(e) => {
            warn!(playlist = %id, "cannot open playlist: {e}");
            app.set_status(format!("cannot open {id}: {e}"));
        }
    }
}

/// Persist the edited order of the attached playlist.
pub fn save_playlist(app: &mut App, source: &dyn TrackSource) {
    let Some(id) = app.current_playlist().map(str::to_string) else {
        return;
    };

    match source.save_playlist(&id, &app.tracks) {
        Ok(()) => {
            app.edited = false;
            app.set_status(format!("saved {id}"));
        }
        Err(e) => {
            warn!(playlist = %id, "save failed: {e}");
            app.set_status(format!("not saved: {e}"));
        }
    }
}

/// Re-read the playlist ids after one was created or deleted.
fn refresh_playlists(app: &mut App, source: &dyn TrackSource) -> bool {
    match source.playlists() {
        Ok(ids) => {
            app.playlists = ids;
            true
        }
        Err(e) => {
            warn!("cannot list playlists: {e}");
            app.set_status(format!("cannot list playlists: {e}"));
            false
        }
    }
}

/// Create an empty playlist called `name` and switch to it.
pub fn create_playlist(
    app: &mut App,
    controller: &mut PlaybackController,
    source: &dyn TrackSource,
    name: &str,
) {
    let id = match source.create_playlist(name) {
        Ok(id) => id,
        Err(e) => {
            warn!(name, "cannot create playlist: {e}");
            app.set_status(format!("not created: {e}"));
            return;
        }
    };
    if !refresh_playlists(app, source) {
        return;
    }
    let Some(pos) = app.playlists.iter().position(|p| *p == id) else {
        return;
    };

    let discarded = app.edited;
    switch_playlist(app, controller, source, pos);
    if !discarded {
        app.set_status(format!("created {id}"));
    }
}

/// Delete the attached playlist and move to its neighbour. The last
/// remaining playlist is kept.
pub fn delete_playlist(
    app: &mut App,
    controller: &mut PlaybackController,
    source: &dyn TrackSource,
) {
    let Some(id) = app.current_playlist().map(str::to_string) else {
        return;
    };
    if app.playlists.len() < 2 {
        app.set_status("cannot delete the only playlist");
        return;
    }

    if let Err(e) = source.delete_playlist(&id) {
        warn!(playlist = %id, "cannot delete playlist: {e}");
        app.set_status(format!("not deleted: {e}"));
        return;
    }
    info!(playlist = %id, "deleted playlist");
    app.edited = false;
    if !refresh_playlists(app, source) {
        return;
    }

    let pos = app.playlist_pos.min(app.playlists.len().saturating_sub(1));
    switch_playlist(app, controller, source, pos);
    app.set_status(format!("deleted {id}"));
}
