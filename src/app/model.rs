//! Presentation-side view model: `App`.
//!
//! `App` owns the editable copy of the attached playlist, the cursor, the
//! fuzzy filter and a few UI flags. It never touches transport state;
//! edits are pushed to the controller by the runtime.

use crate::library::{PlaylistId, Track, TrackId};

use super::prompt::{Prompt, PromptKind, TrackFields};

/// The main application model.
pub struct App {
    pub tracks: Vec<Track>,
    pub selected: usize,

    lower_titles: Option<Vec<String>>,

    pub follow_playback: bool,

    pub filter_mode: bool,
    pub filter_query: String,
    pub metadata_window: bool,

    /// Ids offered by the track source, sorted.
    pub playlists: Vec<PlaylistId>,
    /// Position of the attached playlist in `playlists`.
    pub playlist_pos: usize,
    /// The track list differs from what was last loaded or saved.
    pub edited: bool,
    /// One-line feedback shown in the footer until the next action.
    pub status_message: Option<String>,
    /// Open text prompt; it takes every key until submitted or cancelled.
    pub prompt: Option<Prompt>,
}

impl App {
    pub fn toggle_metadata_window(&mut self) {
        self.metadata_window = !self.metadata_window;
    }

    /// Create a new `App` with the provided list of `tracks`.
    pub fn new(tracks: Vec<Track>) -> Self {
        let mut app = Self {
            tracks: Vec::new(),
            selected: 0,
            lower_titles: None,
            follow_playback: true,
            filter_mode: false,
            filter_query: String::new(),
            metadata_window: false,
            playlists: Vec::new(),
            playlist_pos: 0,
            edited: false,
            status_message: None,
            prompt: None,
        };
        app.replace_tracks(tracks);
        app
    }

    fn rebuild_lower_titles(&mut self) {
        // filtering runs on every keystroke and redraw
        self.lower_titles = (self.tracks.len() > 100)
            .then(|| self.tracks.iter().map(|t| t.display().to_ascii_lowercase()).collect());
    }

    /// Swap in a freshly resolved playlist. Resets cursor, filter and the
    /// edited flag.
    pub fn replace_tracks(&mut self, tracks: Vec<Track>) {
        self.tracks = tracks;
        self.selected = 0;
        self.filter_query.clear();
        self.filter_mode = false;
        self.edited = false;
        self.rebuild_lower_titles();
    }

    pub fn set_playlists(&mut self, playlists: Vec<PlaylistId>, pos: usize) {
        self.playlist_pos = pos.min(playlists.len().saturating_sub(1));
        self.playlists = playlists;
    }

    pub fn current_playlist(&self) -> Option<&str> {
        self.playlists.get(self.playlist_pos).map(String::as_str)
    }

    /// Position of the playlist after the attached one, wrapping around.
    /// `None` when there is nothing else to switch to.
    pub fn next_playlist_pos(&self) -> Option<usize> {
        if self.playlists.len() <= 1 {
            return None;
        }
        Some((self.playlist_pos + 1) % self.playlists.len())
    }

    pub fn set_status(&mut self, msg: impl Into<String>) {
        self.status_message = Some(msg.into());
    }

    pub fn clear_status(&mut self) {
        self.status_message = None;
    }

    /// Enable following playback (cursor follows currently playing track).
    pub fn follow_playback_on(&mut self) {
        self.follow_playback = true;
    }

    pub fn follow_playback_off(&mut self) {
        self.follow_playback = false;
    }

    /// Move the cursor onto `id` if following playback is on.
    pub fn follow(&mut self, id: Option<&TrackId>) {
        if !self.follow_playback || self.filter_mode {
            return;
        }
        if let Some(idx) = id.and_then(|id| self.index_of(id)) {
            if self.selected != idx {
                self.set_selected(idx);
            }
        }
    }

    pub fn index_of(&self, id: &TrackId) -> Option<usize> {
        self.tracks.iter().position(|t| &t.id == id)
    }

    pub fn selected_track(&self) -> Option<&Track> {
        self.tracks.get(self.selected)
    }

    /// Indices of the tracks matching the filter, in playlist order.
    pub fn display_indices(&self) -> Vec<usize> {
        let query = self.filter_query.trim();
        (0..self.tracks.len())
            .filter(|&i| query.is_empty() || self.match_positions(i, query).is_some())
            .collect()
    }

    pub fn uses_lower_titles(&self) -> bool {
        self.lower_titles.is_some()
    }

    /// Character positions of `query` within the display string of track
    /// `index`, compared case-insensitively. `None` when it does not match.
    pub fn match_positions(&self, index: usize, query: &str) -> Option<Vec<usize>> {
        match self.lower_titles.as_deref() {
            Some(lower) => {
                let query = query.to_ascii_lowercase();
                subsequence(&lower[index], &query, |a, b| a == b)
            }
            None => Self::fuzzy_match_positions(&self.tracks[index].display(), query),
        }
    }

    /// Next visible index after `current`, wrapping to the first.
    pub fn next_in_view_from(&self, current: usize) -> Option<usize> {
        self.step_in_view(current, true)
    }

    /// Previous visible index before `current`, wrapping to the last.
    pub fn prev_in_view_from(&self, current: usize) -> Option<usize> {
        self.step_in_view(current, false)
    }

    fn step_in_view(&self, current: usize, forward: bool) -> Option<usize> {
        let display = self.display_indices();
        let len = display.len();
        if len == 0 {
            return None;
        }
        let pos = match display.iter().position(|&i| i == current) {
            Some(p) if forward => (p + 1) % len,
            Some(p) => (p + len - 1) % len,
            None if forward => 0,
            None => len - 1,
        };
        Some(display[pos])
    }

    pub fn set_selected(&mut self, idx: usize) {
        self.selected = idx;
        self.ensure_selected_visible();
    }

    pub fn has_tracks(&self) -> bool {
        !self.tracks.is_empty()
    }

    /// Case-insensitive subsequence match of `query` in `title`.
    pub fn fuzzy_match_positions(title: &str, query: &str) -> Option<Vec<usize>> {
        subsequence(title, query, |a, b| a.eq_ignore_ascii_case(&b))
    }

    /// Enter filter mode: enable filtering and adjust cursor behavior.
    pub fn enter_filter_mode(&mut self) {
        self.filter_mode = true;
        self.follow_playback_off();
        self.ensure_selected_visible();
    }

    pub fn exit_filter_mode(&mut self) {
        self.filter_mode = false;
    }

    /// Clear the active filter and restore selection visibility.
    pub fn clear_filter(&mut self) {
        self.filter_query.clear();
        self.filter_mode = false;
        self.ensure_selected_visible();
    }

    pub fn push_filter_char(&mut self, c: char) {
        self.filter_query.push(c);
        self.ensure_selected_visible();
    }

    pub fn pop_filter_char(&mut self) {
        self.filter_query.pop();
        self.ensure_selected_visible();
    }

    /// Ensure that `selected` is part of the current filtered view,
    /// otherwise move selection to the first visible track.
    fn ensure_selected_visible(&mut self) {
        let display = self.display_indices();
        if display.is_empty() {
            self.selected = 0;
            return;
        }

        if !display.contains(&self.selected) {
            self.selected = display[0];
        }
    }

    /// Move selection to the next visible track.
    pub fn next(&mut self) {
        if let Some(next) = self.next_in_view_from(self.selected) {
            self.selected = next;
        }
    }

    /// Move selection to the previous visible track.
    pub fn prev(&mut self) {
        if let Some(prev) = self.prev_in_view_from(self.selected) {
            self.selected = prev;
        }
    }

    fn can_edit(&mut self) -> bool {
        if !self.filter_query.trim().is_empty() {
            self.set_status("clear the filter before reordering");
            return false;
        }
        self.has_tracks()
    }

    fn swap_selected_with(&mut self, other: usize) {
        self.tracks.swap(self.selected, other);
        self.selected = other;
        self.edited = true;
        self.rebuild_lower_titles();
    }

    /// Move the selected track one place down. Returns whether the order changed.
    pub fn move_selected_down(&mut self) -> bool {
        if !self.can_edit() || self.selected + 1 >= self.tracks.len() {
            return false;
        }
        self.swap_selected_with(self.selected + 1);
        true
    }

    /// Move the selected track one place up. Returns whether the order changed.
    pub fn move_selected_up(&mut self) -> bool {
        if !self.can_edit() || self.selected == 0 {
            return false;
        }
        self.swap_selected_with(self.selected - 1);
        true
    }

    /// Remove the selected track, keeping the cursor on its neighbour.
    pub fn remove_selected(&mut self) -> Option<Track> {
        if !self.can_edit() || self.selected >= self.tracks.len() {
            return None;
        }
        let removed = self.tracks.remove(self.selected);
        if self.selected >= self.tracks.len() {
            self.selected = self.tracks.len().saturating_sub(1);
        }
        self.edited = true;
        self.rebuild_lower_titles();
        Some(removed)
    }

    // ---- prompts ----

    /// Open a prompt. Editing starts from the selected track's fields and
    /// is refused when nothing is selected.
    pub fn open_prompt(&mut self, kind: PromptKind) {
        let input = match kind {
            PromptKind::EditTrack => match self.selected_track() {
                Some(track) => TrackFields::line_for(track),
                None => return,
            },
            _ => String::new(),
        };
        self.prompt = Some(Prompt { kind, input });
    }

    pub fn prompt_push(&mut self, c: char) {
        if let Some(p) = self.prompt.as_mut() {
            p.input.push(c);
        }
    }

    pub fn prompt_pop(&mut self) {
        if let Some(p) = self.prompt.as_mut() {
            p.input.pop();
        }
    }

    pub fn take_prompt(&mut self) -> Option<Prompt> {
        self.prompt.take()
    }

    // ---- adding and editing tracks ----

    /// An id not used by any track in the list.
    fn fresh_track_id(&self) -> TrackId {
        (self.tracks.len()..)
            .map(|n| TrackId::new(format!("t{n}")))
            .find(|id| self.index_of(id).is_none())
            .unwrap_or_else(|| TrackId::new(format!("t{}", self.tracks.len())))
    }

    /// Append a track built from `fields` and move the cursor onto it.
    pub fn append_track(&mut self, fields: TrackFields) -> &Track {
        let track = Track {
            id: self.fresh_track_id(),
            title: fields.title,
            artist: fields.artist,
            album: None,
            duration_hint: None,
            playable_url: fields.url,
            external_url: None,
        };
        self.tracks.push(track);
        self.edited = true;
        self.rebuild_lower_titles();
        self.follow_playback_off();
        self.clear_filter();
        self.set_selected(self.tracks.len() - 1);
        &self.tracks[self.tracks.len() - 1]
    }

    /// Replace the names and playable url of the selected track. Its id and
    /// the other fields are kept.
    pub fn update_selected(&mut self, fields: TrackFields) -> bool {
        let Some(track) = self.tracks.get_mut(self.selected) else {
            return false;
        };
        track.artist = fields.artist;
        track.title = fields.title;
        track.playable_url = fields.url;
        self.edited = true;
        self.rebuild_lower_titles();
        true
    }
}

/// Positions in `haystack` of each char of `needle`, matched in order.
fn subsequence(haystack: &str, needle: &str, eq: impl Fn(char, char) -> bool) -> Option<Vec<usize>> {
    let mut chars = haystack.chars().enumerate();
    needle
        .chars()
        .map(|nc| chars.find(|&(_, hc)| eq(hc, nc)).map(|(i, _)| i))
        .collect()
}
