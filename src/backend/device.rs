use std::sync::mpsc::{self, Sender};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::Duration;

use tracing::warn;

use crate::config::AudioSettings;
use crate::error::BackendError;

use super::adapter::MediaBackend;
use super::thread::spawn_audio_thread;
use super::types::{BackendCmd, Signal, Stamp};

/// Handle to the rodio audio thread.
///
/// Cloning yields another handle to the same thread; the runtime keeps one
/// for shutdown while the adapter owns another.
#[derive(Clone)]
pub struct RodioBackend {
    tx: Sender<BackendCmd>,
    join: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl RodioBackend {
    /// Start the audio thread and wait until the output device is open.
    pub fn spawn(signals: Sender<Signal>, settings: &AudioSettings) -> Result<Self, BackendError> {
        let (tx, rx) = mpsc::channel::<BackendCmd>();
        let (ready_tx, ready_rx) = mpsc::sync_channel(1);

        let handle = spawn_audio_thread(rx, signals, ready_tx, settings.clone());
        ready_rx.recv().map_err(|_| BackendError::ThreadGone)??;

        Ok(Self {
            tx,
            join: Arc::new(Mutex::new(Some(handle))),
        })
    }

    fn send(&self, cmd: BackendCmd) {
        if self.tx.send(cmd).is_err() {
            warn!("audio thread is gone; dropping command");
        }
    }

    /// Fade out, stop the audio thread and wait for it.
    pub fn quit_softly(&self, fade_out: Duration) {
        self.send(BackendCmd::Quit {
            fade_out_ms: fade_out.as_millis() as u64,
        });

        if let Ok(mut j) = self.join.lock() {
            if let Some(h) = j.take() {
                let _ = h.join();
            }
        }
    }
}

impl MediaBackend for RodioBackend {
    fn load(&mut self, stamp: Stamp, url: &str) {
        self.send(BackendCmd::Load {
            stamp,
            url: url.to_string(),
        });
    }

    fn play(&mut self, stamp: Stamp) {
        self.send(BackendCmd::Play(stamp));
    }

    fn pause(&mut self, stamp: Stamp) {
        self.send(BackendCmd::Pause(stamp));
    }

    fn seek(&mut self, stamp: Stamp, position: Duration) {
        self.send(BackendCmd::Seek { stamp, position });
    }

    fn set_volume(&mut self, volume: f32) {
        self.send(BackendCmd::SetVolume(volume));
    }
}
