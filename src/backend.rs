//! Media backend: the uniform adapter the player talks to, and a rodio
//! powered media primitive running on its own thread.
//!
//! Commands flow player -> `MediaAdapter` -> `MediaBackend`. Backends answer
//! with stamped `Signal`s on a channel that the player drains on its own
//! thread.

mod adapter;
mod device;
mod fetch;
mod sink;
mod thread;
mod types;

pub use adapter::{MediaAdapter, MediaBackend, check_url, validate_seek};
pub use device::RodioBackend;
pub use types::*;

#[cfg(test)]
pub(crate) mod testing;
