//! Building `rodio` sinks from fetched media bytes.

use std::io::Cursor;
use std::sync::Arc;
use std::time::Duration;

use rodio::{Decoder, OutputStream, Sink, Source};

use crate::error::BackendError;

/// In-memory media shared between successive sinks of one load.
#[derive(Clone)]
pub(super) struct Media {
    bytes: Arc<[u8]>,
}

impl Media {
    pub(super) fn new(bytes: Arc<[u8]>) -> Self {
        Self { bytes }
    }

    fn decoder(&self) -> Result<Decoder<Cursor<Arc<[u8]>>>, BackendError> {
        Decoder::new(Cursor::new(self.bytes.clone())).map_err(|e| BackendError::Decode(e.to_string()))
    }

    /// Probe the total duration without keeping a sink around.
    pub(super) fn duration(&self) -> Result<Option<Duration>, BackendError> {
        Ok(self.decoder()?.total_duration())
    }
}

/// Create a paused `Sink` for `media` that starts playback at `start_at`.
pub(super) fn create_sink_at(
    stream: &OutputStream,
    media: &Media,
    start_at: Duration,
    volume: f32,
) -> Result<Sink, BackendError> {
    // `skip_duration` is our fallback seeking primitive; even Duration::ZERO is fine.
    let source = media.decoder()?.skip_duration(start_at);

    let sink = Sink::connect_new(stream.mixer());
    sink.set_volume(volume);
    sink.append(source);
    sink.pause();
    Ok(sink)
}
