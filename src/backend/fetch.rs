//! Reading media bytes from a playable url.

use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;

use reqwest::blocking::Client;
use tracing::debug;

use crate::error::BackendError;

use super::types::{LoadId, Stamp};

/// Fetches whole media resources into memory.
///
/// Keeping the bytes lets the audio thread restart or rebuild a sink
/// without touching the network again.
#[derive(Clone)]
pub(super) struct Fetcher {
    client: Option<Client>,
    timeout: Duration,
}

impl Fetcher {
    pub(super) fn new(timeout: Duration) -> Self {
        Self {
            client: None,
            timeout,
        }
    }

    fn client(&mut self) -> Result<Client, BackendError> {
        if let Some(client) = &self.client {
            return Ok(client.clone());
        }
        let client = Client::builder().timeout(self.timeout).build()?;
        self.client = Some(client.clone());
        Ok(client)
    }

    /// Read `url` fully. Supports `http(s)://`, `file://` and bare paths.
    pub(super) fn fetch(&mut self, url: &str) -> Result<Arc<[u8]>, BackendError> {
        let lower = url.to_ascii_lowercase();
        if is_http(url) {
            let response = self.client()?.get(url).send()?.error_for_status()?;
            let bytes = response.bytes()?;
            return Ok(Arc::from(bytes.as_ref()));
        }

        let path = if lower.starts_with("file://") {
            &url["file://".len()..]
        } else {
            url
        };
        let bytes = fs::read(Path::new(path))?;
        Ok(Arc::from(bytes))
    }
}

fn is_http(url: &str) -> bool {
    let lower = url.to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// A finished download, tagged with the load that asked for it.
#[derive(Debug)]
pub(super) struct Fetched {
    pub(super) stamp: Stamp,
    pub(super) url: String,
    pub(super) result: Result<Arc<[u8]>, BackendError>,
}

/// Downloads run on helper threads so a slow fetch never holds up the
/// commands queued behind it. Only the latest load's result is accepted.
pub(super) struct Downloads {
    fetcher: Fetcher,
    done: Sender<Fetched>,
    latest: Option<LoadId>,
}

impl Downloads {
    pub(super) fn new(fetcher: Fetcher) -> (Self, Receiver<Fetched>) {
        let (done, rx) = mpsc::channel();
        let downloads = Self {
            fetcher,
            done,
            latest: None,
        };
        (downloads, rx)
    }

    /// Start fetching `url` for the load in `stamp`. Any download still
    /// running for an older load becomes stale.
    pub(super) fn start(&mut self, stamp: Stamp, url: String) {
        self.latest = Some(stamp.load);

        if is_http(&url) {
            // one client, and its connection pool, for every download
            if let Err(e) = self.fetcher.client() {
                self.finish(Fetched { stamp, url, result: Err(e) });
                return;
            }
        }

        let mut fetcher = self.fetcher.clone();
        let done = self.done.clone();
        let job_url = url.clone();
        let spawned = thread::Builder::new()
            .name("setlist-fetch".into())
            .spawn(move || {
                let result = fetcher.fetch(&job_url);
                let _ = done.send(Fetched {
                    stamp,
                    url: job_url,
                    result,
                });
            });
        if let Err(e) = spawned {
            self.finish(Fetched {
                stamp,
                url,
                result: Err(e.into()),
            });
        }
    }

    fn finish(&self, fetched: Fetched) {
        let _ = self.done.send(fetched);
    }

    /// Whether `fetched` belongs to the latest load. Accepting consumes it,
    /// so a repeated result for the same load is refused.
    pub(super) fn accept(&mut self, fetched: &Fetched) -> bool {
        if self.latest == Some(fetched.stamp.load) {
            self.latest = None;
            true
        } else {
            debug!(load = fetched.stamp.load.0, url = %fetched.url, "dropping superseded download");
            false
        }
    }
}
