//! Application module: the view model used by the TUI and runtime.
//!
//! `App` lives in `app::model` and holds the attached playlist as edited in
//! the UI, the cursor and the filter.

mod model;
mod prompt;

pub use model::*;
pub use prompt::{PromptKind, TrackFields, confirmed};
