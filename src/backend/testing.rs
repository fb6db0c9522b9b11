//! In-memory backend that records every command it receives.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use super::adapter::MediaBackend;
use super::types::Stamp;

#[derive(Debug, Clone, PartialEq)]
pub enum Recorded {
    Load { stamp: Stamp, url: String },
    Play(Stamp),
    Pause(Stamp),
    Seek { stamp: Stamp, position: Duration },
    Volume(f32),
}

#[derive(Clone, Default)]
pub struct RecordingBackend {
    log: Rc<RefCell<Vec<Recorded>>>,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> Vec<Recorded> {
        self.log.borrow().clone()
    }

    pub fn clear(&self) {
        self.log.borrow_mut().clear();
    }

    pub fn loads(&self) -> Vec<String> {
        self.log
            .borrow()
            .iter()
            .filter_map(|c| match c {
                Recorded::Load { url, .. } => Some(url.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn plays(&self) -> usize {
        self.log
            .borrow()
            .iter()
            .filter(|c| matches!(c, Recorded::Play(_)))
            .count()
    }

    pub fn last(&self) -> Option<Recorded> {
        self.log.borrow().last().cloned()
    }
}

impl MediaBackend for RecordingBackend {
    fn load(&mut self, stamp: Stamp, url: &str) {
        self.log.borrow_mut().push(Recorded::Load {
            stamp,
            url: url.to_string(),
        });
    }

    fn play(&mut self, stamp: Stamp) {
        self.log.borrow_mut().push(Recorded::Play(stamp));
    }

    fn pause(&mut self, stamp: Stamp) {
        self.log.borrow_mut().push(Recorded::Pause(stamp));
    }

    fn seek(&mut self, stamp: Stamp, position: Duration) {
        self.log.borrow_mut().push(Recorded::Seek { stamp, position });
    }

    fn set_volume(&mut self, volume: f32) {
        self.log.borrow_mut().push(Recorded::Volume(volume));
    }
}
