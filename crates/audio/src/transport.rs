//! Mapping from the renderer's hardware clock to musical time.
//!
//! `current_time = offset + (audio_clock - base_audio_clock) * tempo_scale`
//! is the only definition of "now". Callers must not integrate frame deltas.

use clairkeys_domain::Note;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::backend::AudioRenderer;
use crate::error::AudioError;
use crate::schedule::schedule_notes;

/// Read-only snapshot of the transport used for drift diagnostics.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct TimingInfo {
    pub is_playing: bool,
    pub audio_clock_time: f64,
    pub base_audio_clock_time: f64,
    pub offset_sec: f64,
}

impl TimingInfo {
    /// Musical time implied by this snapshot at the given tempo scale.
    pub fn musical_time(&self, tempo_scale: f64) -> f64 {
        if self.is_playing {
            self.offset_sec + (self.audio_clock_time - self.base_audio_clock_time) * tempo_scale
        } else {
            self.offset_sec
        }
    }
}

/// Operations the playback controller needs from the audio side.
pub trait Transport {
    fn start_audio(
        &mut self,
        notes: &[Note],
        offset_sec: f64,
        tempo_scale: f64,
        mute: bool,
    ) -> Result<(), AudioError>;
    fn stop_audio(&mut self);
    fn current_time(&self, tempo_scale: f64) -> f64;
    fn set_offset_time(&mut self, seconds: f64);
    fn update_tempo_scale(&mut self, scale: f64);
    fn timing_info(&self) -> TimingInfo;
}

pub fn validate_tempo_scale(scale: f64) -> Result<f64, AudioError> {
    if scale.is_finite() && scale > 0.0 {
        Ok(scale)
    } else {
        Err(AudioError::InvalidTempo(scale))
    }
}

pub struct TransportClock<R> {
    renderer: R,
    is_playing: bool,
    base_audio_clock_time: f64,
    offset_sec: f64,
    tempo_scale: f64,
}

impl<R: AudioRenderer> TransportClock<R> {
    pub fn new(renderer: R) -> Self {
        Self {
            renderer,
            is_playing: false,
            base_audio_clock_time: 0.0,
            offset_sec: 0.0,
            tempo_scale: 1.0,
        }
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    pub fn is_playing(&self) -> bool {
        self.is_playing
    }

    pub fn offset_sec(&self) -> f64 {
        self.offset_sec
    }

    pub fn tempo_scale(&self) -> f64 {
        self.tempo_scale
    }
}

impl<R: AudioRenderer> Transport for TransportClock<R> {
    fn start_audio(
        &mut self,
        notes: &[Note],
        offset_sec: f64,
        tempo_scale: f64,
        mute: bool,
    ) -> Result<(), AudioError> {
        let tempo_scale = validate_tempo_scale(tempo_scale)?;
        if self.is_playing {
            self.renderer.cancel();
            self.is_playing = false;
        }
        self.offset_sec = offset_sec;
        self.tempo_scale = tempo_scale;

        let now = self.renderer.clock_time();
        let scheduled = schedule_notes(notes, offset_sec, tempo_scale, now, mute);
        if let Err(err) = self.renderer.schedule(scheduled, mute) {
            warn!(%err, "audio renderer failed to start");
            return Err(err);
        }
        self.base_audio_clock_time = now;
        self.is_playing = true;
        debug!(offset_sec, tempo_scale, mute, base = now, "transport started");
        Ok(())
    }

    fn stop_audio(&mut self) {
        self.renderer.cancel();
        if self.is_playing {
            debug!(offset_sec = self.offset_sec, "transport stopped");
        }
        self.is_playing = false;
    }

    fn current_time(&self, tempo_scale: f64) -> f64 {
        self.timing_info().musical_time(tempo_scale)
    }

    fn set_offset_time(&mut self, seconds: f64) {
        self.offset_sec = seconds;
        if self.is_playing {
            self.base_audio_clock_time = self.renderer.clock_time();
        }
    }

    fn update_tempo_scale(&mut self, scale: f64) {
        self.tempo_scale = scale;
    }

    fn timing_info(&self) -> TimingInfo {
        TimingInfo {
            is_playing: self.is_playing,
            audio_clock_time: self.renderer.clock_time(),
            base_audio_clock_time: self.base_audio_clock_time,
            offset_sec: self.offset_sec,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{SimulatedClock, SimulatedRenderer};
    use approx::assert_relative_eq;

    fn notes() -> Vec<Note> {
        vec![
            Note::new(60, 0.0, 1.0).unwrap(),
            Note::new(64, 1.0, 1.0).unwrap(),
        ]
    }

    fn transport() -> (SimulatedClock, TransportClock<SimulatedRenderer>) {
        let clock = SimulatedClock::new();
        clock.set(100.0);
        let transport = TransportClock::new(SimulatedRenderer::new(clock.clone()));
        (clock, transport)
    }

    #[test]
    fn current_time_follows_audio_clock() {
        let (clock, mut transport) = transport();
        transport.start_audio(&notes(), 0.5, 1.0, false).unwrap();
        assert_relative_eq!(transport.current_time(1.0), 0.5);
        clock.advance(1.25);
        assert_relative_eq!(transport.current_time(1.0), 1.75);
        assert_relative_eq!(transport.current_time(0.5), 0.5 + 1.25 * 0.5);
    }

    #[test]
    fn stop_keeps_offset() {
        let (clock, mut transport) = transport();
        transport.start_audio(&notes(), 1.0, 1.0, false).unwrap();
        clock.advance(3.0);
        transport.stop_audio();
        assert!(!transport.is_playing());
        assert_relative_eq!(transport.current_time(1.0), 1.0);
        assert!(transport.renderer().scheduled().is_empty());
    }

    #[test]
    fn set_offset_while_stopped() {
        let (_clock, mut transport) = transport();
        transport.set_offset_time(2.5);
        assert_relative_eq!(transport.current_time(1.0), 2.5);
        let info = transport.timing_info();
        assert!(!info.is_playing);
        assert_relative_eq!(info.offset_sec, 2.5);
    }

    #[test]
    fn blocked_renderer_leaves_transport_stopped() {
        let (_clock, mut transport) = transport();
        transport.renderer_mut().set_blocked(true);
        let result = transport.start_audio(&notes(), 0.0, 1.0, false);
        assert!(matches!(result, Err(AudioError::Unavailable(_))));
        assert!(!transport.is_playing());
    }

    #[test]
    fn rejects_invalid_tempo() {
        let (_clock, mut transport) = transport();
        assert_eq!(
            transport.start_audio(&notes(), 0.0, 0.0, false),
            Err(AudioError::InvalidTempo(0.0))
        );
        assert!(transport.start_audio(&notes(), 0.0, f64::NAN, false).is_err());
    }

    #[test]
    fn timing_info_snapshot() {
        let (clock, mut transport) = transport();
        transport.start_audio(&notes(), 0.0, 2.0, false).unwrap();
        clock.advance(0.5);
        let info = transport.timing_info();
        assert!(info.is_playing);
        assert_relative_eq!(info.audio_clock_time, 100.5);
        assert_relative_eq!(info.base_audio_clock_time, 100.0);
        assert_relative_eq!(info.musical_time(2.0), 1.0);
    }
}
