use std::sync::mpsc::{Receiver, RecvTimeoutError, Sender, SyncSender};
use std::thread;
use std::thread::JoinHandle;
use std::time::Duration;

use rodio::{OutputStream, OutputStreamBuilder, Sink};
use tracing::{debug, info, warn};

use crate::config::AudioSettings;
use crate::error::BackendError;

use super::fetch::{Downloads, Fetched, Fetcher};
use super::sink::{Media, create_sink_at};
use super::types::{BackendCmd, RawEvent, Signal, Stamp};

/// State owned by the audio thread. rodio types never leave it.
struct Worker {
    stream: OutputStream,
    downloads: Downloads,
    signals: Sender<Signal>,
    stamp: Stamp,
    media: Option<Media>,
    sink: Option<Sink>,
    playing: bool,
    volume: f32,
}

impl Worker {
    fn emit(&self, event: RawEvent) {
        let _ = self.signals.send(Signal::new(self.stamp, event));
    }

    fn stop_sink(&mut self) {
        if let Some(s) = self.sink.take() {
            s.stop();
        }
        self.playing = false;
    }

    /// Forget the current resource and start fetching `url`. The sink is
    /// built once the download for this load arrives.
    fn load(&mut self, stamp: Stamp, url: String) {
        self.stamp = stamp;
        self.stop_sink();
        self.media = None;
        self.downloads.start(stamp, url);
    }

    fn fetched(&mut self, fetched: Fetched) {
        if !self.downloads.accept(&fetched) {
            return;
        }
        let url = fetched.url.as_str();
        let media = match fetched.result {
            Ok(bytes) => Media::new(bytes),
            Err(e) => {
                warn!(url, "load failed: {e}");
                self.emit(RawEvent::Error(e.to_string()));
                return;
            }
        };

        let duration = match media.duration() {
            Ok(d) => d,
            Err(e) => {
                warn!(url, "decode failed: {e}");
                self.emit(RawEvent::Error(e.to_string()));
                return;
            }
        };

        match create_sink_at(&self.stream, &media, Duration::ZERO, self.volume) {
            Ok(sink) => {
                self.sink = Some(sink);
                self.media = Some(media);
                if let Some(d) = duration {
                    self.emit(RawEvent::DurationChange(d.as_secs_f64()));
                }
                info!(url, "loaded");
                self.emit(RawEvent::CanPlay);
            }
            Err(e) => {
                warn!(url, "sink creation failed: {e}");
                self.emit(RawEvent::Error(e.to_string()));
            }
        }
    }

    /// Rebuild the sink from the cached media at `position`.
    fn rebuild(&mut self, position: Duration) -> bool {
        let Some(media) = self.media.clone() else {
            return false;
        };
        if let Some(s) = self.sink.take() {
            s.stop();
        }
        match create_sink_at(&self.stream, &media, position, self.volume) {
            Ok(sink) => {
                self.sink = Some(sink);
                true
            }
            Err(e) => {
                warn!("rebuilding sink failed: {e}");
                self.emit(RawEvent::Error(e.to_string()));
                false
            }
        }
    }

    fn play(&mut self, stamp: Stamp) {
        self.stamp = stamp;
        // A drained sink means the resource ended; start over from 0.
        let drained = self.sink.as_ref().map(Sink::empty).unwrap_or(true);
        if drained && !self.rebuild(Duration::ZERO) {
            return;
        }
        if let Some(s) = self.sink.as_ref() {
            s.play();
            self.playing = true;
            self.emit(RawEvent::Playing);
        }
    }

    fn pause(&mut self, stamp: Stamp) {
        self.stamp = stamp;
        if let Some(s) = self.sink.as_ref() {
            s.pause();
        }
        self.playing = false;
        self.emit(RawEvent::Pause);
    }

    fn seek(&mut self, stamp: Stamp, position: Duration) {
        self.stamp = stamp;
        let seeked = match self.sink.as_ref() {
            Some(s) if !s.empty() => match s.try_seek(position) {
                Ok(()) => true,
                Err(e) => {
                    debug!("try_seek failed, rebuilding sink: {e}");
                    false
                }
            },
            _ => false,
        };

        if !seeked {
            if !self.rebuild(position) {
                return;
            }
            if self.playing {
                if let Some(s) = self.sink.as_ref() {
                    s.play();
                }
            }
        }
        self.emit(RawEvent::TimeUpdate(position.as_secs_f64()));
    }

    fn set_volume(&mut self, volume: f32) {
        self.volume = volume;
        if let Some(s) = self.sink.as_ref() {
            s.set_volume(volume);
        }
    }

    /// Periodic progress report and end-of-resource detection.
    fn tick(&mut self) {
        if !self.playing {
            return;
        }
        let Some(s) = self.sink.as_ref() else {
            return;
        };
        if s.empty() {
            self.playing = false;
            self.emit(RawEvent::Ended);
        } else {
            let pos = s.get_pos().as_secs_f64();
            self.emit(RawEvent::TimeUpdate(pos));
        }
    }

    fn fade_out(&self, fade_out_ms: u64) {
        let Some(sink) = self.sink.as_ref() else {
            return;
        };
        if fade_out_ms == 0 || !self.playing {
            sink.set_volume(0.0);
            return;
        }
        let steps: u64 = 20;
        let step_ms = (fade_out_ms / steps).max(1);
        for step in 1..=steps {
            let t = step as f32 / steps as f32;
            sink.set_volume(self.volume * (1.0 - t));
            thread::sleep(Duration::from_millis(step_ms));
        }
        sink.set_volume(0.0);
    }
}

/// Spawn the audio thread. `ready` receives the outcome of opening the
/// output device before any command is processed.
pub(super) fn spawn_audio_thread(
    rx: Receiver<BackendCmd>,
    signals: Sender<Signal>,
    ready: SyncSender<Result<(), BackendError>>,
    settings: AudioSettings,
) -> JoinHandle<()> {
    thread::spawn(move || {
        let mut stream = match OutputStreamBuilder::open_default_stream() {
            Ok(s) => s,
            Err(e) => {
                let _ = ready.send(Err(BackendError::NoOutputDevice(e.to_string())));
                return;
            }
        };
        // rodio logs to stderr when OutputStream is dropped. That's useful in debugging,
        // but noisy for a TUI app.
        stream.log_on_drop(false);
        let _ = ready.send(Ok(()));

        let (downloads, fetched_rx) =
            Downloads::new(Fetcher::new(Duration::from_millis(settings.fetch_timeout_ms)));
        let mut worker = Worker {
            stream,
            downloads,
            signals,
            stamp: Stamp::default(),
            media: None,
            sink: None,
            playing: false,
            volume: settings.initial_volume,
        };

        let interval = Duration::from_millis(settings.progress_interval_ms.max(1));

        loop {
            while let Ok(fetched) = fetched_rx.try_recv() {
                worker.fetched(fetched);
            }
            match rx.recv_timeout(interval) {
                Ok(cmd) => match cmd {
                    BackendCmd::Load { stamp, url } => worker.load(stamp, url),
                    BackendCmd::Play(stamp) => worker.play(stamp),
                    BackendCmd::Pause(stamp) => worker.pause(stamp),
                    BackendCmd::Seek { stamp, position } => worker.seek(stamp, position),
                    BackendCmd::SetVolume(v) => worker.set_volume(v),
                    BackendCmd::Quit { fade_out_ms } => {
                        worker.fade_out(fade_out_ms);
                        worker.stop_sink();
                        break;
                    }
                },
                Err(RecvTimeoutError::Timeout) => worker.tick(),
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }
        debug!("audio thread finished");
    })
}
