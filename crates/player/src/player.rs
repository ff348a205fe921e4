//! Playback controller: a Stopped/Playing/Paused state machine driven by one
//! self-rescheduling animation frame, with practice mode layered on top.

use std::collections::BTreeSet;

use clairkeys_audio::{validate_tempo_scale, TimingInfo, Transport};
use clairkeys_domain::{Note, Song};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::{clamp_look_ahead, PlayerConfig};
use crate::events::{EventBus, EventKind, PlayerEvent, SubscriptionId};
use crate::frame::{FrameLoop, FrameToken};
use crate::practice::{PracticeSession, PracticeState, PracticeStatus, StepOutcome};
use crate::PlayerError;

#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq)]
pub enum PlayerStatus {
    Stopped,
    Playing,
    Paused,
}

#[derive(Clone, Copy, Debug, Serialize, PartialEq)]
pub struct PlaybackState {
    pub is_playing: bool,
    pub current_time: f64,
    pub tempo_scale: f64,
    pub mute: bool,
    pub look_ahead_sec: f64,
}

/// Everything a UI reads from the controller in one value.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct PlayerSnapshot {
    pub is_playing: bool,
    pub current_time: f64,
    pub tempo_scale: f64,
    pub mute: bool,
    pub look_ahead_sec: f64,
    pub total_length: f64,
    pub practice_state: Option<PracticeState>,
}

/// One controller per loaded song session. All methods are expected to be
/// called sequentially from the owning (UI) thread.
pub struct PlaybackController<T: Transport> {
    transport: T,
    config: PlayerConfig,
    notes: Vec<Note>,
    total_length: f64,
    status: PlayerStatus,
    state: PlaybackState,
    events: EventBus,
    frames: FrameLoop,
    /// Wall time and displayed time at the last drift check.
    drift_reference: Option<(f64, f64)>,
    drift_corrections: u64,
    active_notes: BTreeSet<usize>,
    practice: Option<PracticeSession>,
}

impl<T: Transport> PlaybackController<T> {
    pub fn new(transport: T, config: PlayerConfig) -> Self {
        let state = PlaybackState {
            is_playing: false,
            current_time: 0.0,
            tempo_scale: 1.0,
            mute: false,
            look_ahead_sec: clamp_look_ahead(config.look_ahead_sec),
        };
        Self {
            transport,
            config,
            notes: Vec::new(),
            total_length: 0.0,
            status: PlayerStatus::Stopped,
            state,
            events: EventBus::new(),
            frames: FrameLoop::new(),
            drift_reference: None,
            drift_corrections: 0,
            active_notes: BTreeSet::new(),
            practice: None,
        }
    }

    pub fn load_song(&mut self, song: &Song) {
        self.load_notes(song.notes().to_vec());
    }

    /// Replaces the note sequence. Stops playback and leaves practice mode.
    pub fn load_notes(&mut self, mut notes: Vec<Note>) {
        self.stop();
        self.practice = None;
        notes.sort_by(|a, b| a.start.total_cmp(&b.start));
        self.total_length = clairkeys_domain::note::total_length(&notes);
        self.notes = notes;
        info!(
            notes = self.notes.len(),
            total_length = self.total_length,
            "song loaded"
        );
    }

    // -- observers --------------------------------------------------------

    pub fn on<F>(&mut self, kind: EventKind, listener: F) -> SubscriptionId
    where
        F: FnMut(&PlayerEvent) + 'static,
    {
        self.events.on(kind, listener)
    }

    pub fn on_any<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: FnMut(&PlayerEvent) + 'static,
    {
        self.events.on_any(listener)
    }

    pub fn off(&mut self, id: SubscriptionId) -> bool {
        self.events.off(id)
    }

    // -- read state -------------------------------------------------------

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn snapshot(&self) -> PlayerSnapshot {
        PlayerSnapshot {
            is_playing: self.state.is_playing,
            current_time: self.state.current_time,
            tempo_scale: self.state.tempo_scale,
            mute: self.state.mute,
            look_ahead_sec: self.state.look_ahead_sec,
            total_length: self.total_length,
            practice_state: self.practice_state().cloned(),
        }
    }

    pub fn status(&self) -> PlayerStatus {
        self.status
    }

    pub fn is_playing(&self) -> bool {
        self.state.is_playing
    }

    /// Last displayed time.
    pub fn current_time(&self) -> f64 {
        self.state.current_time
    }

    /// Time as the transport reports it right now.
    pub fn audio_time(&self) -> f64 {
        self.transport.current_time(self.state.tempo_scale)
    }

    pub fn timing_info(&self) -> TimingInfo {
        self.transport.timing_info()
    }

    pub fn total_length(&self) -> f64 {
        self.total_length
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn practice_state(&self) -> Option<&PracticeState> {
        self.practice.as_ref().map(PracticeSession::state)
    }

    pub fn drift_corrections(&self) -> u64 {
        self.drift_corrections
    }

    pub fn config(&self) -> &PlayerConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Notes starting within the look-ahead window after the current time.
    pub fn upcoming_notes(&self) -> impl Iterator<Item = &Note> {
        let from = self.state.current_time;
        let until = from + self.state.look_ahead_sec;
        let first = self.notes.partition_point(|note| note.start < from);
        self.notes[first..]
            .iter()
            .take_while(move |note| note.start < until)
    }

    /// Indices of the notes currently highlighted.
    pub fn active_notes(&self) -> impl Iterator<Item = usize> + '_ {
        self.active_notes.iter().copied()
    }

    // -- commands ---------------------------------------------------------

    pub fn play(&mut self) -> Result<(), PlayerError> {
        if self.status == PlayerStatus::Playing {
            return Ok(());
        }
        let offset = self.state.current_time;
        if let Err(err) = self.transport.start_audio(
            &self.notes,
            offset,
            self.state.tempo_scale,
            self.state.mute,
        ) {
            warn!(%err, "playback could not start");
            self.transport.set_offset_time(offset);
            return Err(err.into());
        }
        if let Some(practice) = self.practice.as_mut() {
            practice.set_waiting(false);
        }
        debug!(offset, "play");
        self.drift_reference = None;
        self.set_status(PlayerStatus::Playing);
        self.frames.request();
        Ok(())
    }

    pub fn pause(&mut self) {
        if self.status != PlayerStatus::Playing {
            return;
        }
        let snapshot = self.clamp_to_timeline(self.transport.current_time(self.state.tempo_scale));
        self.transport.stop_audio();
        self.transport.set_offset_time(snapshot);
        self.frames.cancel();
        self.state.current_time = snapshot;
        debug!(at = snapshot, "pause");
        self.set_status(PlayerStatus::Paused);
        self.events.emit(PlayerEvent::TimeUpdate {
            current_time: snapshot,
        });
    }

    /// Harder reset than pause: rewinds to zero.
    pub fn stop(&mut self) {
        self.transport.stop_audio();
        self.transport.set_offset_time(0.0);
        self.frames.cancel();
        self.drift_reference = None;
        self.release_all_notes();
        if let Some(practice) = self.practice.as_mut() {
            practice.set_waiting(false);
        }
        self.state.current_time = 0.0;
        self.set_status(PlayerStatus::Stopped);
        self.events.emit(PlayerEvent::TimeUpdate { current_time: 0.0 });
    }

    pub fn toggle_play_pause(&mut self) -> Result<(), PlayerError> {
        if self.status == PlayerStatus::Playing {
            self.pause();
            Ok(())
        } else {
            self.play()
        }
    }

    /// Moves to `time`, clamped into `[0, total_length]`.
    pub fn seek(&mut self, time: f64) -> Result<(), PlayerError> {
        let target = if time.is_nan() {
            0.0
        } else {
            time.clamp(0.0, self.total_length)
        };
        self.state.current_time = target;
        self.drift_reference = None;
        let result = if self.status == PlayerStatus::Playing {
            self.restart_audio(target)
        } else {
            self.transport.set_offset_time(target);
            Ok(())
        };
        let tolerance = self.config.step_onset_tolerance_sec;
        if let Some(practice) = self.practice.as_mut() {
            practice.align_to(&self.notes, target, tolerance);
        }
        debug!(to = target, "seek");
        self.emit_practice_position();
        self.sync_active_notes(target);
        self.events.emit(PlayerEvent::TimeUpdate {
            current_time: target,
        });
        result
    }

    /// Changes playback speed without a jump in musical time.
    pub fn set_tempo_scale(&mut self, scale: f64) -> Result<(), PlayerError> {
        let scale = validate_tempo_scale(scale)?;
        let result = if self.status == PlayerStatus::Playing {
            let at = self.clamp_to_timeline(self.transport.current_time(self.state.tempo_scale));
            self.state.tempo_scale = scale;
            self.transport.update_tempo_scale(scale);
            self.state.current_time = at;
            self.restart_audio(at)
        } else {
            self.state.tempo_scale = scale;
            self.transport.update_tempo_scale(scale);
            Ok(())
        };
        if let Some(practice) = self.practice.as_mut() {
            practice.set_tempo_scale(scale);
        }
        debug!(tempo_scale = scale, "tempo changed");
        self.events.emit(PlayerEvent::SpeedChange { tempo_scale: scale });
        result
    }

    pub fn set_mute(&mut self, mute: bool) -> Result<(), PlayerError> {
        if self.state.mute == mute {
            return Ok(());
        }
        self.state.mute = mute;
        if self.status == PlayerStatus::Playing {
            let at = self.clamp_to_timeline(self.transport.current_time(self.state.tempo_scale));
            self.state.current_time = at;
            return self.restart_audio(at);
        }
        Ok(())
    }

    pub fn set_look_ahead_sec(&mut self, seconds: f64) {
        self.state.look_ahead_sec = clamp_look_ahead(seconds);
    }

    // -- practice mode ----------------------------------------------------

    pub fn start_practice_mode(
        &mut self,
        start_tempo: f64,
        target_tempo: f64,
    ) -> Result<(), PlayerError> {
        let tolerance = self.config.step_onset_tolerance_sec;
        let mut session = PracticeSession::start(
            &self.notes,
            start_tempo,
            target_tempo,
            self.config.practice_increment,
            tolerance,
        )?;
        session.align_to(&self.notes, self.state.current_time, tolerance);
        info!(
            start_tempo,
            target_tempo,
            steps = session.steps().len(),
            "practice mode started"
        );
        self.practice = Some(session);
        self.set_tempo_scale(start_tempo)?;
        self.emit_practice_position();
        Ok(())
    }

    pub fn set_practice_tempo_progression(
        &mut self,
        enabled: bool,
        increment: f64,
    ) -> Result<(), PlayerError> {
        self.practice
            .as_mut()
            .ok_or(PlayerError::PracticeInactive)?
            .set_progression(enabled, increment)
    }

    pub fn next_practice_step(&mut self) -> Result<(), PlayerError> {
        let practice = self.practice.as_mut().ok_or(PlayerError::PracticeInactive)?;
        let was_waiting = practice.state().waiting;
        let outcome = practice.advance(&self.notes);
        match outcome {
            StepOutcome::Advanced { tempo_scale, .. } => {
                if let Some(tempo) = tempo_scale {
                    self.set_tempo_scale(tempo)?;
                }
                self.emit_practice_position();
            }
            StepOutcome::Completed => {
                info!("practice completed");
                self.events.emit(PlayerEvent::PracticeComplete);
            }
            StepOutcome::AlreadyCompleted => return Ok(()),
        }
        if was_waiting {
            self.play()?;
        }
        Ok(())
    }

    /// Leaves practice mode, discarding its state.
    pub fn exit_practice_mode(&mut self) {
        if self.practice.take().is_some() {
            info!("practice mode exited");
        }
    }

    // -- animation loop ---------------------------------------------------

    /// Token of the frame the host should deliver next, if any.
    pub fn pending_frame(&self) -> Option<FrameToken> {
        self.frames.pending()
    }

    /// Runs one animation frame. `wall_time_sec` is the host's frame timestamp;
    /// it paces drift checks and is the reference a stalled audio clock is
    /// measured against. Displayed time always comes from the transport.
    /// Returns false for stale tokens.
    pub fn on_animation_frame(&mut self, token: FrameToken, wall_time_sec: f64) -> bool {
        if !self.frames.accept(token) || self.status != PlayerStatus::Playing {
            return false;
        }
        let tempo = self.state.tempo_scale;
        let mut time = self.transport.current_time(tempo);

        let check_due = self.drift_reference.map_or(true, |(last_wall, _)| {
            wall_time_sec - last_wall >= self.config.drift_check_interval_sec
        });
        if check_due {
            let audio_time = self.transport.timing_info().musical_time(tempo);
            // A stalled audio clock shows up against the host's wall clock even
            // when the transport reading agrees with its own timing info.
            let expected = self
                .drift_reference
                .map(|(last_wall, shown)| shown + (wall_time_sec - last_wall) * tempo);
            let drift = expected
                .map_or(0.0, |expected| (audio_time - expected).abs())
                .max((audio_time - time).abs());
            if drift > self.config.drift_threshold_sec {
                debug!(drift, displayed = time, audio_time, "resyncing to audio clock");
                time = audio_time;
                self.drift_corrections += 1;
            }
            self.drift_reference = Some((wall_time_sec, time));
        }

        let time = self.clamp_to_timeline(time);
        self.state.current_time = time;

        if let Some(hold_at) = self.practice_hold_point(time) {
            self.hold_for_practice(hold_at);
            return true;
        }

        self.events.emit(PlayerEvent::TimeUpdate { current_time: time });
        self.sync_active_notes(time);

        if time >= self.total_length + self.config.tail_allowance_sec {
            info!(at = time, "end of song reached, stopping");
            self.stop();
            return true;
        }
        self.frames.request();
        true
    }

    // -- internals --------------------------------------------------------

    fn set_status(&mut self, status: PlayerStatus) {
        let was_playing = self.state.is_playing;
        self.status = status;
        self.state.is_playing = status == PlayerStatus::Playing;
        if was_playing != self.state.is_playing {
            self.events.emit(PlayerEvent::PlayStateChange {
                is_playing: self.state.is_playing,
            });
        }
    }

    fn clamp_to_timeline(&self, time: f64) -> f64 {
        let end = self.total_length + self.config.tail_allowance_sec;
        if time.is_nan() {
            0.0
        } else {
            time.clamp(0.0, end)
        }
    }

    /// Stop, reposition, restart. Scheduled note timings are computed for one
    /// offset and scale, so any change to either goes through here.
    fn restart_audio(&mut self, at: f64) -> Result<(), PlayerError> {
        self.transport.stop_audio();
        self.transport.set_offset_time(at);
        match self.transport.start_audio(
            &self.notes,
            at,
            self.state.tempo_scale,
            self.state.mute,
        ) {
            Ok(()) => {
                self.drift_reference = None;
                Ok(())
            }
            Err(err) => {
                warn!(%err, "audio restart failed, pausing");
                self.transport.set_offset_time(at);
                self.frames.cancel();
                self.set_status(PlayerStatus::Paused);
                Err(err.into())
            }
        }
    }

    fn practice_hold_point(&self, time: f64) -> Option<f64> {
        let step = self.practice.as_ref()?.current_step()?;
        (time >= step.start).then_some(step.start)
    }

    fn hold_for_practice(&mut self, at: f64) {
        self.transport.stop_audio();
        self.transport.set_offset_time(at);
        self.state.current_time = at;
        if let Some(practice) = self.practice.as_mut() {
            practice.set_waiting(true);
        }
        debug!(at, "holding for practice step");
        self.set_status(PlayerStatus::Paused);
        self.events.emit(PlayerEvent::TimeUpdate { current_time: at });
        self.sync_active_notes(at);
    }

    fn emit_practice_position(&mut self) {
        let Some(state) = self.practice.as_ref().map(PracticeSession::state) else {
            return;
        };
        let event = if state.status == PracticeStatus::Completed {
            PlayerEvent::PracticeComplete
        } else {
            PlayerEvent::PracticeStep {
                step_index: state.current_step_index,
                notes: state.next_notes.clone(),
            }
        };
        self.events.emit(event);
    }

    fn sounding_indices(&self, time: f64) -> BTreeSet<usize> {
        let upper = self.notes.partition_point(|note| note.start <= time);
        self.notes[..upper]
            .iter()
            .enumerate()
            .filter(|(_, note)| note.is_sounding_at(time))
            .map(|(index, _)| index)
            .collect()
    }

    fn sync_active_notes(&mut self, time: f64) {
        let sounding = self.sounding_indices(time);
        let ended: Vec<usize> = self.active_notes.difference(&sounding).copied().collect();
        let started: Vec<usize> = sounding.difference(&self.active_notes).copied().collect();
        for index in ended {
            self.events.emit(PlayerEvent::NoteEnd {
                index,
                note: self.notes[index].clone(),
            });
        }
        for index in started {
            self.events.emit(PlayerEvent::NoteStart {
                index,
                note: self.notes[index].clone(),
            });
        }
        self.active_notes = sounding;
    }

    fn release_all_notes(&mut self) {
        for index in std::mem::take(&mut self.active_notes) {
            if let Some(note) = self.notes.get(index) {
                self.events.emit(PlayerEvent::NoteEnd {
                    index,
                    note: note.clone(),
                });
            }
        }
    }
}

impl<T: Transport> Drop for PlaybackController<T> {
    fn drop(&mut self) {
        self.frames.cancel();
        if self.status == PlayerStatus::Playing {
            self.transport.stop_audio();
        }
        self.events.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use clairkeys_audio::{SimulatedClock, SimulatedRenderer, TransportClock};
    use std::cell::RefCell;
    use std::rc::Rc;

    type Player = PlaybackController<TransportClock<SimulatedRenderer>>;

    fn player() -> (SimulatedClock, Player) {
        let clock = SimulatedClock::new();
        let transport = TransportClock::new(SimulatedRenderer::new(clock.clone()));
        let mut player = PlaybackController::new(transport, PlayerConfig::default());
        player.load_notes(vec![
            Note::new(60, 0.0, 1.0).unwrap(),
            Note::new(64, 1.0, 1.0).unwrap(),
            Note::new(67, 2.0, 1.0).unwrap(),
        ]);
        (clock, player)
    }

    fn frame(player: &mut Player, clock: &SimulatedClock, dt: f64, wall: f64) -> bool {
        clock.advance(dt);
        match player.pending_frame() {
            Some(token) => player.on_animation_frame(token, wall),
            None => false,
        }
    }

    #[test]
    fn play_pause_resumes_from_audio_position() {
        let (clock, mut player) = player();
        player.play().unwrap();
        assert_eq!(player.status(), PlayerStatus::Playing);
        frame(&mut player, &clock, 0.5, 0.0);
        clock.advance(0.25);
        player.pause();
        assert_eq!(player.status(), PlayerStatus::Paused);
        assert_relative_eq!(player.current_time(), 0.75);
        assert_eq!(player.pending_frame(), None);

        clock.advance(10.0);
        player.play().unwrap();
        assert_relative_eq!(player.audio_time(), 0.75);
    }

    #[test]
    fn stop_rewinds() {
        let (clock, mut player) = player();
        player.play().unwrap();
        frame(&mut player, &clock, 1.5, 0.0);
        player.stop();
        assert_eq!(player.status(), PlayerStatus::Stopped);
        assert_eq!(player.current_time(), 0.0);
        assert_eq!(player.audio_time(), 0.0);
        assert_eq!(player.active_notes().count(), 0);
    }

    #[test]
    fn seek_clamps_into_song() {
        let (_clock, mut player) = player();
        player.seek(-5.0).unwrap();
        assert_eq!(player.current_time(), 0.0);
        player.seek(player.total_length() + 100.0).unwrap();
        assert_eq!(player.current_time(), 3.0);
        player.seek(f64::NAN).unwrap();
        assert_eq!(player.current_time(), 0.0);
    }

    #[test]
    fn seek_while_playing_reschedules() {
        let (clock, mut player) = player();
        player.play().unwrap();
        clock.advance(0.2);
        player.seek(1.5).unwrap();
        assert_eq!(player.transport().renderer().schedule_calls(), 2);
        let first = player.transport().renderer().scheduled()[0];
        assert_eq!(first.midi, 64);
        assert_relative_eq!(first.at, clock.now());
        assert_relative_eq!(player.audio_time(), 1.5);
    }

    #[test]
    fn toggle_play_pause() {
        let (_clock, mut player) = player();
        player.toggle_play_pause().unwrap();
        assert!(player.is_playing());
        player.toggle_play_pause().unwrap();
        assert!(!player.is_playing());
    }

    #[test]
    fn blocked_audio_stays_stopped() {
        let (_clock, mut player) = player();
        player.transport_mut().renderer_mut().set_blocked(true);
        let result = player.play();
        assert!(matches!(result, Err(PlayerError::AudioUnavailable(_))));
        assert_eq!(player.status(), PlayerStatus::Stopped);
        assert_eq!(player.pending_frame(), None);

        player.transport_mut().renderer_mut().set_blocked(false);
        player.play().unwrap();
        assert!(player.is_playing());
    }

    #[test]
    fn mute_restarts_with_same_timings() {
        let (clock, mut player) = player();
        player.play().unwrap();
        clock.advance(0.5);
        let before: Vec<f64> = player
            .transport()
            .renderer()
            .scheduled()
            .iter()
            .map(|n| n.at)
            .collect();
        player.set_mute(true).unwrap();
        let renderer = player.transport().renderer();
        assert!(renderer.is_muted());
        assert_eq!(renderer.schedule_calls(), 2);
        let after: Vec<f64> = renderer.scheduled().iter().map(|n| n.at).collect();
        assert_eq!(before.len(), after.len());
        // the first note was already sounding and is retriggered at the restart
        assert_relative_eq!(after[0], 0.5);
        for (a, b) in before[1..].iter().zip(after[1..].iter()) {
            assert_relative_eq!(*a, *b, epsilon = 1e-9);
        }
        assert!(renderer.scheduled().iter().all(|n| n.velocity == 0.0));
    }

    #[test]
    fn rejects_invalid_tempo() {
        let (_clock, mut player) = player();
        assert!(matches!(
            player.set_tempo_scale(0.0),
            Err(PlayerError::InvalidTempo(_))
        ));
        assert!(player.set_tempo_scale(-1.0).is_err());
        assert_eq!(player.state().tempo_scale, 1.0);
    }

    #[test]
    fn look_ahead_is_clamped_and_windows_notes() {
        let (_clock, mut player) = player();
        player.set_look_ahead_sec(0.1);
        assert_eq!(player.state().look_ahead_sec, 1.0);
        let upcoming: Vec<u8> = player.upcoming_notes().map(|n| n.midi).collect();
        assert_eq!(upcoming, vec![60]);
        player.set_look_ahead_sec(9.0);
        assert_eq!(player.state().look_ahead_sec, 5.0);
        assert_eq!(player.upcoming_notes().count(), 3);
    }

    #[test]
    fn stale_frame_tokens_are_ignored() {
        let (_clock, mut player) = player();
        player.play().unwrap();
        let token = player.pending_frame().unwrap();
        player.stop();
        assert!(!player.on_animation_frame(token, 0.0));
    }

    #[test]
    fn emits_play_state_and_speed_events() {
        let (_clock, mut player) = player();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        player.on_any(move |event| sink.borrow_mut().push(event.kind()));
        player.play().unwrap();
        player.set_tempo_scale(0.5).unwrap();
        player.pause();
        let kinds = seen.borrow();
        assert_eq!(kinds[0], EventKind::PlayStateChange);
        assert!(kinds.contains(&EventKind::SpeedChange));
        assert_eq!(
            kinds.iter().filter(|k| **k == EventKind::PlayStateChange).count(),
            2
        );
    }

    #[test]
    fn practice_requires_active_mode() {
        let (_clock, mut player) = player();
        assert!(matches!(
            player.next_practice_step(),
            Err(PlayerError::PracticeInactive)
        ));
        assert!(player.set_practice_tempo_progression(true, 0.1).is_err());
        player.start_practice_mode(0.5, 1.0).unwrap();
        assert!(player.practice_state().is_some());
        player.exit_practice_mode();
        assert!(player.practice_state().is_none());
        assert!(player.snapshot().practice_state.is_none());
    }

    #[test]
    fn load_notes_fixes_total_length() {
        let (_clock, mut player) = player();
        assert_eq!(player.total_length(), 3.0);
        player.load_notes(vec![Note::new(72, 4.0, 2.0).unwrap()]);
        assert_eq!(player.total_length(), 6.0);
        assert_eq!(player.current_time(), 0.0);
    }
}
