use std::sync::mpsc::{self, Sender};
use std::time::{Duration, Instant};

use super::*;
use crate::backend::testing::{Recorded, RecordingBackend};
use crate::backend::{RawEvent, Signal, Stamp};
use crate::config::AudioSettings;
use crate::error::PlaybackError;
use crate::library::{Track, TrackId};

fn t(id: &str) -> Track {
    Track {
        id: TrackId::new(id),
        title: id.to_uppercase(),
        artist: "Band".into(),
        album: None,
        duration_hint: None,
        playable_url: Some(format!("/music/{id}.mp3")),
        external_url: None,
    }
}

fn unplayable(id: &str) -> Track {
    Track {
        playable_url: None,
        external_url: Some(format!("https://example.com/{id}")),
        ..t(id)
    }
}

fn id(s: &str) -> TrackId {
    TrackId::new(s)
}

struct Harness {
    ctl: PlaybackController,
    backend: RecordingBackend,
    tx: Sender<Signal>,
}

impl Harness {
    fn with_settings(tracks: Vec<Track>, settings: AudioSettings) -> Self {
        let backend = RecordingBackend::new();
        let (tx, rx) = mpsc::channel();
        let mut ctl = PlaybackController::new(Box::new(backend.clone()), tx.clone(), rx, &settings);
        ctl.attach_playlist(tracks);
        backend.clear();
        Self { ctl, backend, tx }
    }

    fn new(tracks: Vec<Track>) -> Self {
        Self::with_settings(tracks, AudioSettings::default())
    }

    fn load_stamp(&self) -> Stamp {
        self.backend
            .commands()
            .iter()
            .rev()
            .find_map(|c| match c {
                Recorded::Load { stamp, .. } => Some(*stamp),
                _ => None,
            })
            .expect("nothing was loaded")
    }

    fn last_play_stamp(&self) -> Option<Stamp> {
        self.backend.commands().iter().rev().find_map(|c| match c {
            Recorded::Play(stamp) => Some(*stamp),
            _ => None,
        })
    }

    fn signal(&mut self, stamp: Stamp, event: RawEvent) {
        self.ctl.handle_signal(Signal::new(stamp, event));
    }

    /// Behave like a backend that finished loading and, if asked to, started.
    fn confirm(&mut self) {
        let load = self.load_stamp();
        let plays_before = self.backend.plays();
        self.signal(load, RawEvent::CanPlay);
        if self.backend.plays() > plays_before {
            let play = self.last_play_stamp().unwrap();
            self.signal(play, RawEvent::Playing);
        }
    }

    fn current(&self) -> Option<&str> {
        self.ctl.state().current_track_id.as_ref().map(TrackId::as_str)
    }
}

#[test]
fn new_controller_is_idle_at_full_volume() {
    let h = Harness::new(vec![t("a")]);
    let state = h.ctl.state();
    assert_eq!(h.ctl.phase(), Phase::Idle);
    assert_eq!(state.volume, 1.0);
    assert!(!state.is_playing);
    assert_eq!(state.position_seconds, 0.0);
    assert_eq!(state.duration_seconds, 0.0);
}

#[test]
fn play_without_playable_url_selects_but_issues_no_commands() {
    let mut h = Harness::new(vec![unplayable("a"), t("b")]);

    h.ctl.play(&id("a"));

    assert_eq!(h.current(), Some("a"));
    assert!(!h.ctl.state().is_playing);
    assert!(h.backend.commands().is_empty());
    assert_eq!(h.ctl.phase(), Phase::Unplayable);
}

#[test]
fn play_loads_and_defers_playback_until_ready() {
    let mut h = Harness::new(vec![t("a")]);

    h.ctl.play(&id("a"));
    assert_eq!(h.backend.loads(), vec!["/music/a.mp3".to_string()]);
    assert_eq!(h.backend.plays(), 0);
    assert!(h.ctl.state().is_playing);
    assert_eq!(h.ctl.phase(), Phase::Loading);

    h.confirm();
    assert_eq!(h.backend.plays(), 1);
    assert!(h.ctl.state().backend_ready);
    assert_eq!(h.ctl.phase(), Phase::Playing);
}

#[test]
fn play_of_unknown_track_is_ignored() {
    let mut h = Harness::new(vec![t("a")]);
    h.ctl.play(&id("zzz"));
    assert_eq!(h.ctl.phase(), Phase::Idle);
    assert!(h.backend.commands().is_empty());
}

#[test]
fn play_next_previous_scenario() {
    let mut h = Harness::new(vec![t("a"), t("b"), t("c")]);

    h.ctl.play(&id("a"));
    h.ctl.next();
    assert_eq!(h.current(), Some("b"));
    assert!(h.ctl.state().is_playing);

    h.ctl.previous();
    assert_eq!(h.current(), Some("a"));
}

#[test]
fn next_and_previous_do_not_wrap() {
    let mut h = Harness::new(vec![t("a"), t("b"), t("c")]);

    h.ctl.play(&id("a"));
    h.ctl.next();
    h.ctl.next();
    assert_eq!(h.current(), Some("c"));
    h.ctl.next();
    assert_eq!(h.current(), Some("c"));
    assert_eq!(h.backend.loads().len(), 3);

    h.ctl.previous();
    h.ctl.previous();
    assert_eq!(h.current(), Some("a"));
    h.ctl.previous();
    assert_eq!(h.current(), Some("a"));
    assert_eq!(h.backend.loads().len(), 5);
}

#[test]
fn next_is_a_noop_without_selection_or_with_a_single_track() {
    let mut h = Harness::new(vec![t("a"), t("b")]);
    h.ctl.next();
    h.ctl.previous();
    assert_eq!(h.ctl.phase(), Phase::Idle);

    let mut h = Harness::new(vec![t("a")]);
    h.ctl.play(&id("a"));
    h.ctl.next();
    h.ctl.previous();
    assert_eq!(h.backend.loads().len(), 1);
}

#[test]
fn ended_on_last_track_stays_paused_at_zero() {
    let mut h = Harness::new(vec![t("a"), t("b")]);
    h.ctl.play(&id("b"));
    h.confirm();
    let play = h.last_play_stamp().unwrap();
    h.signal(play, RawEvent::TimeUpdate(30.0));

    h.signal(play, RawEvent::Ended);

    let state = h.ctl.state();
    assert_eq!(h.current(), Some("b"));
    assert!(!state.is_playing);
    assert_eq!(state.position_seconds, 0.0);
    assert_eq!(h.ctl.phase(), Phase::Paused);

    // A late progress report for the finished resource changes nothing.
    h.signal(play, RawEvent::TimeUpdate(30.5));
    assert_eq!(h.ctl.state().position_seconds, 0.0);
}

#[test]
fn ended_auto_advances_with_autoplay() {
    let mut h = Harness::new(vec![t("a"), t("b")]);
    h.ctl.play(&id("a"));
    h.confirm();
    let play = h.last_play_stamp().unwrap();

    h.signal(play, RawEvent::Ended);

    assert_eq!(h.current(), Some("b"));
    assert!(h.ctl.state().is_playing);
    assert_eq!(h.backend.loads().last().map(String::as_str), Some("/music/b.mp3"));
    assert_eq!(h.ctl.phase(), Phase::Loading);
}

#[test]
fn ended_advances_onto_an_unplayable_track_without_playing_it() {
    let mut h = Harness::new(vec![t("a"), unplayable("b")]);
    h.ctl.play(&id("a"));
    h.confirm();
    let play = h.last_play_stamp().unwrap();

    h.signal(play, RawEvent::Ended);

    assert_eq!(h.current(), Some("b"));
    assert!(!h.ctl.state().is_playing);
    assert_eq!(h.backend.loads().len(), 1);
}

#[test]
fn resume_after_end_restarts_the_same_load() {
    let mut h = Harness::new(vec![t("a")]);
    h.ctl.play(&id("a"));
    h.confirm();
    let play = h.last_play_stamp().unwrap();
    h.signal(play, RawEvent::Ended);

    h.ctl.resume();
    assert!(h.ctl.state().is_playing);
    assert_eq!(h.backend.loads().len(), 1);
    assert_eq!(h.backend.plays(), 2);

    let replay = h.last_play_stamp().unwrap();
    h.signal(replay, RawEvent::TimeUpdate(1.0));
    assert_eq!(h.ctl.state().position_seconds, 1.0);
}

#[test]
fn play_on_the_paused_current_track_resumes_in_place() {
    let mut h = Harness::new(vec![t("a")]);
    h.ctl.play(&id("a"));
    h.confirm();
    h.ctl.pause();
    assert!(matches!(h.backend.last(), Some(Recorded::Pause(_))));

    h.ctl.play(&id("a"));

    assert_eq!(h.backend.loads().len(), 1);
    assert_eq!(h.backend.plays(), 2);
    assert!(h.ctl.state().is_playing);
}

#[test]
fn pause_is_a_noop_when_already_paused() {
    let mut h = Harness::new(vec![t("a")]);
    h.ctl.play(&id("a"));
    h.confirm();
    h.ctl.pause();
    let before = h.backend.commands().len();

    h.ctl.pause();
    assert_eq!(h.backend.commands().len(), before);
}

#[test]
fn toggle_play_pause_switches_intent() {
    let mut h = Harness::new(vec![t("a")]);
    h.ctl.play(&id("a"));
    h.confirm();

    h.ctl.toggle_play_pause();
    assert!(!h.ctl.state().is_playing);
    assert_eq!(h.ctl.phase(), Phase::Paused);

    h.ctl.toggle_play_pause();
    assert!(h.ctl.state().is_playing);

    // Nothing selected: nothing to resume.
    let mut idle = Harness::new(vec![t("a")]);
    idle.ctl.toggle_play_pause();
    assert!(!idle.ctl.state().is_playing);
    assert!(idle.backend.commands().is_empty());
}

#[test]
fn invalid_seeks_leave_position_unchanged() {
    let mut h = Harness::new(vec![t("a")]);
    h.ctl.play(&id("a"));
    h.confirm();
    let play = h.last_play_stamp().unwrap();
    h.signal(play, RawEvent::TimeUpdate(12.0));

    for bad in [-1.0, f64::NAN, f64::INFINITY] {
        h.ctl.seek(bad);
        assert_eq!(h.ctl.state().position_seconds, 12.0);
    }
    assert!(!h.backend.commands().iter().any(|c| matches!(c, Recorded::Seek { .. })));

    h.ctl.seek(20.0);
    assert_eq!(h.ctl.state().position_seconds, 20.0);
    assert!(matches!(
        h.backend.last(),
        Some(Recorded::Seek { position, .. }) if position == Duration::from_secs(20)
    ));
}

#[test]
fn seek_past_known_duration_is_ignored() {
    let mut h = Harness::new(vec![t("a")]);
    h.ctl.play(&id("a"));
    let load = h.load_stamp();
    h.signal(load, RawEvent::DurationChange(30.0));
    h.confirm();

    h.ctl.seek(45.0);
    assert_eq!(h.ctl.state().position_seconds, 0.0);
}

#[test]
fn seek_with_nothing_loaded_is_ignored() {
    let mut h = Harness::new(vec![unplayable("a")]);
    h.ctl.seek(5.0);
    h.ctl.play(&id("a"));
    h.ctl.seek(5.0);
    assert_eq!(h.ctl.state().position_seconds, 0.0);
    assert!(h.backend.commands().is_empty());
}

#[test]
fn seek_by_clamps_to_track_bounds() {
    let mut h = Harness::new(vec![t("a")]);
    h.ctl.play(&id("a"));
    let load = h.load_stamp();
    h.signal(load, RawEvent::DurationChange(30.0));
    h.confirm();
    let play = h.last_play_stamp().unwrap();
    h.signal(play, RawEvent::TimeUpdate(25.0));

    h.ctl.seek_by(10.0);
    assert_eq!(h.ctl.state().position_seconds, 30.0);

    h.ctl.seek_by(-100.0);
    assert_eq!(h.ctl.state().position_seconds, 0.0);

    h.ctl.seek_by(f64::NAN);
    assert_eq!(h.ctl.state().position_seconds, 0.0);
}

#[test]
fn toggle_mute_remembers_and_restores_volume() {
    let mut h = Harness::new(vec![]);
    h.ctl.set_volume(0.7);

    h.ctl.toggle_mute();
    assert_eq!(h.ctl.state().volume, 0.0);
    assert_eq!(h.ctl.state().muted_previous_volume, Some(0.7));
    assert!(h.ctl.is_muted());

    h.ctl.toggle_mute();
    assert_eq!(h.ctl.state().volume, 0.7);
    assert_eq!(h.ctl.state().muted_previous_volume, None);
    assert_eq!(h.backend.last(), Some(Recorded::Volume(0.7)));
}

#[test]
fn dragging_volume_to_zero_does_not_remember_previous_volume() {
    let mut h = Harness::new(vec![]);
    h.ctl.set_volume(0.7);
    h.ctl.set_volume(0.0);

    assert_eq!(h.ctl.state().muted_previous_volume, None);
    assert!(h.ctl.is_muted());

    h.ctl.toggle_mute();
    assert_eq!(h.ctl.state().volume, 1.0);
}

#[test]
fn dragging_volume_after_mute_forgets_remembered_volume() {
    let mut h = Harness::new(vec![]);
    h.ctl.set_volume(0.7);
    h.ctl.toggle_mute();
    h.ctl.set_volume(0.4);
    assert_eq!(h.ctl.state().muted_previous_volume, None);

    h.ctl.toggle_mute();
    assert_eq!(h.ctl.state().muted_previous_volume, Some(0.4));
}

#[test]
fn set_volume_clamps_and_forwards_while_paused() {
    let mut h = Harness::new(vec![]);
    h.ctl.set_volume(1.5);
    assert_eq!(h.ctl.state().volume, 1.0);
    h.ctl.set_volume(-3.0);
    assert_eq!(h.ctl.state().volume, 0.0);
    h.ctl.set_volume(f32::NAN);
    assert_eq!(h.ctl.state().volume, 0.0);
    assert_eq!(
        h.backend.commands(),
        vec![Recorded::Volume(1.0), Recorded::Volume(0.0)]
    );
}

#[test]
fn adjust_volume_steps_in_hundredths() {
    let mut h = Harness::new(vec![]);
    h.ctl.set_volume(0.7);
    h.ctl.adjust_volume(0.1);
    assert_eq!(h.ctl.state().volume, 0.8);
    h.ctl.adjust_volume(0.5);
    assert_eq!(h.ctl.state().volume, 1.0);
    h.ctl.adjust_volume(-0.3);
    assert_eq!(h.ctl.state().volume, 0.7);
}

#[test]
fn invalid_durations_are_discarded() {
    let mut h = Harness::new(vec![t("a")]);
    h.ctl.play(&id("a"));
    let load = h.load_stamp();
    h.signal(load, RawEvent::DurationChange(120.0));

    h.signal(load, RawEvent::DurationChange(-5.0));
    assert_eq!(h.ctl.state().duration_seconds, 120.0);
    h.signal(load, RawEvent::DurationChange(f64::NAN));
    assert_eq!(h.ctl.state().duration_seconds, 120.0);
}

#[test]
fn time_updates_apply_before_duration_and_clamp_after() {
    let mut h = Harness::new(vec![t("a")]);
    h.ctl.play(&id("a"));
    h.confirm();
    let play = h.last_play_stamp().unwrap();

    h.signal(play, RawEvent::TimeUpdate(50.0));
    assert_eq!(h.ctl.state().position_seconds, 50.0);

    h.signal(play, RawEvent::DurationChange(40.0));
    assert_eq!(h.ctl.state().position_seconds, 40.0);

    h.signal(play, RawEvent::TimeUpdate(45.0));
    assert_eq!(h.ctl.state().position_seconds, 40.0);
}

#[test]
fn pause_while_loading_beats_a_stale_started_event() {
    let mut h = Harness::new(vec![t("a")]);
    h.ctl.play(&id("a"));
    let load = h.load_stamp();
    let requested_play = Stamp {
        load: load.load,
        seq: load.seq + 1,
    };
    assert!(!h.ctl.state().backend_ready);

    h.ctl.pause();
    h.signal(load, RawEvent::CanPlay);
    h.signal(requested_play, RawEvent::Playing);

    assert!(!h.ctl.state().is_playing);
    assert_eq!(h.backend.plays(), 0);
    assert_eq!(h.ctl.phase(), Phase::Paused);
}

#[test]
fn user_pause_wins_over_a_queued_started_event() {
    let mut h = Harness::new(vec![t("a")]);
    h.ctl.play(&id("a"));
    h.confirm();
    let play = h.last_play_stamp().unwrap();

    h.ctl.pause();
    h.signal(play, RawEvent::Playing);
    assert!(!h.ctl.state().is_playing);

    let pause = match h.backend.last() {
        Some(Recorded::Pause(stamp)) => stamp,
        other => panic!("expected a pause, got {other:?}"),
    };
    h.signal(pause, RawEvent::Pause);
    assert!(!h.ctl.state().is_playing);
}

#[test]
fn backend_pause_not_issued_by_the_user_is_applied() {
    let mut h = Harness::new(vec![t("a")]);
    h.ctl.play(&id("a"));
    h.confirm();
    let play = h.last_play_stamp().unwrap();

    h.signal(play, RawEvent::Pause);
    assert!(!h.ctl.state().is_playing);
    assert_eq!(h.ctl.phase(), Phase::Paused);
}

#[test]
fn signals_from_a_superseded_load_are_discarded() {
    let mut h = Harness::new(vec![t("a"), t("b")]);
    h.ctl.play(&id("a"));
    let old = h.load_stamp();

    h.ctl.next();
    h.signal(old, RawEvent::CanPlay);
    h.signal(old, RawEvent::DurationChange(99.0));
    h.signal(old, RawEvent::TimeUpdate(12.0));
    h.signal(old, RawEvent::Ended);
    h.signal(old, RawEvent::Error("gone".into()));

    let state = h.ctl.state();
    assert_eq!(h.current(), Some("b"));
    assert!(state.is_playing);
    assert!(!state.backend_ready);
    assert_eq!(state.position_seconds, 0.0);
    assert_eq!(state.duration_seconds, 0.0);
    assert_eq!(state.error, None);
}

#[test]
fn backend_error_stops_playback_but_keeps_selection() {
    let mut h = Harness::new(vec![t("a"), t("b")]);
    h.ctl.play(&id("a"));
    let load = h.load_stamp();

    h.signal(load, RawEvent::Error("failed to decode media".into()));

    let state = h.ctl.state();
    assert_eq!(h.current(), Some("a"));
    assert!(!state.is_playing);
    assert_eq!(
        state.error,
        Some(PlaybackError::Backend("failed to decode media".into()))
    );
    assert_eq!(h.ctl.phase(), Phase::Errored);
    assert_eq!(h.backend.loads().len(), 1);

    // No automatic retry; an explicit resume loads the track again.
    h.ctl.resume();
    assert_eq!(h.backend.loads().len(), 2);
    assert_eq!(h.ctl.state().error, None);
    assert_eq!(h.ctl.phase(), Phase::Loading);
}

#[test]
fn unsupported_url_surfaces_as_an_error_after_pump() {
    let mut track = t("a");
    track.playable_url = Some("spotify:track:4uLU6hMCjMI75M1A2tKUQC".into());
    let mut h = Harness::new(vec![track]);

    h.ctl.play(&id("a"));
    assert!(h.backend.loads().is_empty());

    assert_eq!(h.ctl.pump(), 1);
    assert_eq!(h.ctl.phase(), Phase::Errored);
    assert!(!h.ctl.state().is_playing);
}

#[test]
fn pump_applies_signals_in_delivery_order() {
    let mut h = Harness::new(vec![t("a")]);
    h.ctl.play(&id("a"));
    let load = h.load_stamp();

    h.tx.send(Signal::new(load, RawEvent::DurationChange(200.0))).unwrap();
    h.tx.send(Signal::new(load, RawEvent::CanPlay)).unwrap();
    assert_eq!(h.ctl.pump(), 2);
    assert_eq!(h.backend.plays(), 1);

    let play = h.last_play_stamp().unwrap();
    h.tx.send(Signal::new(play, RawEvent::Playing)).unwrap();
    h.tx.send(Signal::new(play, RawEvent::TimeUpdate(3.0))).unwrap();
    h.tx.send(Signal::new(play, RawEvent::TimeUpdate(3.25))).unwrap();
    assert_eq!(h.ctl.pump(), 3);

    let state = h.ctl.state();
    assert_eq!(h.ctl.phase(), Phase::Playing);
    assert_eq!(state.duration_seconds, 200.0);
    assert_eq!(state.position_seconds, 3.25);
    assert_eq!(h.ctl.pump(), 0);
}

#[test]
fn stuck_load_times_out_into_an_error() {
    let settings = AudioSettings {
        load_timeout_ms: 500,
        ..AudioSettings::default()
    };
    let mut h = Harness::with_settings(vec![t("a")], settings);
    h.ctl.play(&id("a"));
    let load = h.load_stamp();

    h.ctl.tick(Instant::now());
    assert_eq!(h.ctl.phase(), Phase::Loading);

    h.ctl.tick(Instant::now() + Duration::from_secs(5));
    assert_eq!(h.ctl.phase(), Phase::Errored);
    assert!(!h.ctl.state().is_playing);
    assert_eq!(
        h.ctl.state().error,
        Some(PlaybackError::LoadTimedOut(Duration::from_millis(500)))
    );

    // The backend waking up later must not start audio behind our back.
    h.signal(load, RawEvent::CanPlay);
    assert_eq!(h.backend.plays(), 0);
    assert!(!h.ctl.state().backend_ready);
}

#[test]
fn ready_load_never_times_out() {
    let settings = AudioSettings {
        load_timeout_ms: 500,
        ..AudioSettings::default()
    };
    let mut h = Harness::with_settings(vec![t("a")], settings);
    h.ctl.play(&id("a"));
    h.confirm();

    h.ctl.tick(Instant::now() + Duration::from_secs(5));
    assert_eq!(h.ctl.phase(), Phase::Playing);
}

#[test]
fn set_playlist_keeps_selection_while_the_track_survives() {
    let mut h = Harness::new(vec![t("a"), t("b"), t("c")]);
    h.ctl.play(&id("b"));
    h.confirm();

    h.ctl.set_playlist(vec![t("c"), t("b")]);
    assert_eq!(h.current(), Some("b"));
    assert!(h.ctl.state().is_playing);
    assert_eq!(h.backend.loads().len(), 1);
    assert_eq!(h.ctl.state().current_index(), Some(1));

    h.ctl.set_playlist(vec![t("a"), t("c")]);
    assert_eq!(h.ctl.phase(), Phase::Idle);
    assert!(!h.ctl.state().is_playing);
    assert!(matches!(h.backend.last(), Some(Recorded::Pause(_))));
}

#[test]
fn attach_playlist_resets_transport_but_keeps_volume() {
    let mut h = Harness::new(vec![t("a")]);
    h.ctl.set_volume(0.5);
    h.ctl.toggle_mute();
    h.ctl.play(&id("a"));
    h.confirm();

    h.ctl.attach_playlist(vec![t("x"), t("y")]);

    let state = h.ctl.state();
    assert_eq!(h.ctl.phase(), Phase::Idle);
    assert_eq!(state.playlist.len(), 2);
    assert_eq!(state.volume, 0.0);
    assert_eq!(state.muted_previous_volume, Some(0.5));
    assert!(matches!(h.backend.last(), Some(Recorded::Pause(_))));
}

#[test]
fn handle_intent_dispatches_to_operations() {
    let mut h = Harness::new(vec![t("a"), t("b")]);
    h.ctl.play(&id("a"));
    h.confirm();

    h.ctl.handle_intent(Intent::VolumeBy(-0.1));
    assert_eq!(h.ctl.state().volume, 0.9);

    h.ctl.handle_intent(Intent::ToggleMute);
    assert!(h.ctl.is_muted());

    h.ctl.handle_intent(Intent::SeekBy(10.0));
    assert_eq!(h.ctl.state().position_seconds, 10.0);

    h.ctl.handle_intent(Intent::TogglePlayPause);
    assert!(!h.ctl.state().is_playing);

    h.ctl.handle_intent(Intent::NextTrack);
    assert_eq!(h.current(), Some("b"));

    h.ctl.handle_intent(Intent::PreviousTrack);
    assert_eq!(h.current(), Some("a"));
}

#[test]
fn user_pause_wins_over_a_queued_ended_event() {
    let mut h = Harness::new(vec![t("a"), t("b")]);
    h.ctl.play(&id("a"));
    h.confirm();
    let play = h.last_play_stamp().unwrap();
    h.signal(play, RawEvent::TimeUpdate(179.0));

    h.ctl.pause();
    h.signal(play, RawEvent::Ended);

    assert_eq!(h.current(), Some("a"));
    assert!(!h.ctl.state().is_playing);
    assert_eq!(h.ctl.state().position_seconds, 0.0);
    assert_eq!(h.backend.loads(), vec!["/music/a.mp3".to_string()]);

    // Resuming replays the finished track from the start.
    h.ctl.resume();
    assert!(h.ctl.state().is_playing);
    assert_eq!(h.backend.loads().len(), 1);
}

#[test]
fn seek_wins_over_a_queued_ended_event() {
    let mut h = Harness::new(vec![t("a"), t("b")]);
    h.ctl.play(&id("a"));
    h.confirm();
    let play = h.last_play_stamp().unwrap();
    h.signal(play, RawEvent::TimeUpdate(179.0));

    h.ctl.seek(10.0);
    h.signal(play, RawEvent::Ended);

    assert_eq!(h.current(), Some("a"));
    assert_eq!(h.backend.loads().len(), 1);

    // The end reported after the seek was processed still advances.
    let seek = match h.backend.last() {
        Some(Recorded::Seek { stamp, .. }) => stamp,
        other => panic!("expected a seek, got {other:?}"),
    };
    h.signal(seek, RawEvent::Ended);
    assert_eq!(h.current(), Some("b"));
}
