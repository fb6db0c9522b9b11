//! The playback controller: single owner of transport state.
//!
//! One `PlaybackController` is built at startup and passed by reference to
//! whatever needs it. The UI reads `PlaybackState` and calls operations;
//! backend signals are drained on the same thread through `pump`.

mod controller;
mod state;

pub use controller::{Intent, PlaybackController};
pub use state::{Phase, PlaybackState};

#[cfg(test)]
mod tests;
