//! Playlists and their tracks.
//!
//! `Track` is the immutable unit handed to the player. Playlists come from
//! a `TrackSource`: TOML playlist files or a scanned folder of audio files.

mod display;
mod model;
mod scan;
mod source;
mod store;

pub use display::display_from_fields;
pub use model::*;
pub use scan::FolderSource;
pub use source::{TrackSource, open_source};
pub use store::PlaylistFiles;
