use std::cell::Cell;
use std::rc::Rc;
use std::time::Instant;

use tracing::debug;

use crate::error::AudioError;
use crate::schedule::ScheduledNote;

/// The audio-rendering capability the transport drives.
///
/// Implementations own a hardware-driven clock and sound the notes they are
/// handed. The transport only reads the clock; it never waits on it.
pub trait AudioRenderer {
    /// Current renderer clock in seconds. Must be monotonic.
    fn clock_time(&self) -> f64;
    fn schedule(&mut self, notes: Vec<ScheduledNote>, mute: bool) -> Result<(), AudioError>;
    fn cancel(&mut self);
}

/// Manually advanced clock shared between a test or simulation driver and a
/// [`SimulatedRenderer`].
#[derive(Clone, Debug, Default)]
pub struct SimulatedClock {
    now: Rc<Cell<f64>>,
}

impl SimulatedClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now(&self) -> f64 {
        self.now.get()
    }

    pub fn advance(&self, seconds: f64) {
        self.now.set(self.now.get() + seconds);
    }

    pub fn set(&self, seconds: f64) {
        self.now.set(seconds);
    }
}

/// Deterministic renderer that records what it was asked to play.
#[derive(Debug)]
pub struct SimulatedRenderer {
    clock: SimulatedClock,
    scheduled: Vec<ScheduledNote>,
    muted: bool,
    blocked: bool,
    schedule_calls: usize,
}

impl SimulatedRenderer {
    pub fn new(clock: SimulatedClock) -> Self {
        Self {
            clock,
            scheduled: Vec::new(),
            muted: false,
            blocked: false,
            schedule_calls: 0,
        }
    }

    /// Makes subsequent `schedule` calls fail, as a browser does before the
    /// first user gesture.
    pub fn set_blocked(&mut self, blocked: bool) {
        self.blocked = blocked;
    }

    pub fn clock(&self) -> &SimulatedClock {
        &self.clock
    }

    pub fn scheduled(&self) -> &[ScheduledNote] {
        &self.scheduled
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    pub fn schedule_calls(&self) -> usize {
        self.schedule_calls
    }

    /// Scheduled notes sounding at the current clock time.
    pub fn sounding(&self) -> impl Iterator<Item = &ScheduledNote> {
        let now = self.clock.now();
        self.scheduled
            .iter()
            .filter(move |note| note.at <= now && now < note.end())
    }
}

impl AudioRenderer for SimulatedRenderer {
    fn clock_time(&self) -> f64 {
        self.clock.now()
    }

    fn schedule(&mut self, notes: Vec<ScheduledNote>, mute: bool) -> Result<(), AudioError> {
        if self.blocked {
            return Err(AudioError::unavailable("renderer blocked until user gesture"));
        }
        debug!(count = notes.len(), mute, "scheduling simulated notes");
        self.scheduled = notes;
        self.muted = mute;
        self.schedule_calls += 1;
        Ok(())
    }

    fn cancel(&mut self) {
        self.scheduled.clear();
    }
}

/// Renderer clocked by the monotonic system clock. It keeps the schedule for
/// inspection but produces no sound.
#[derive(Debug)]
pub struct WallClockRenderer {
    origin: Instant,
    scheduled: Vec<ScheduledNote>,
}

impl WallClockRenderer {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            scheduled: Vec::new(),
        }
    }

    pub fn scheduled(&self) -> &[ScheduledNote] {
        &self.scheduled
    }
}

impl Default for WallClockRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioRenderer for WallClockRenderer {
    fn clock_time(&self) -> f64 {
        self.origin.elapsed().as_secs_f64()
    }

    fn schedule(&mut self, notes: Vec<ScheduledNote>, mute: bool) -> Result<(), AudioError> {
        debug!(count = notes.len(), mute, "scheduling wall-clock notes");
        self.scheduled = notes;
        Ok(())
    }

    fn cancel(&mut self) {
        self.scheduled.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simulated_clock_is_shared() {
        let clock = SimulatedClock::new();
        let renderer = SimulatedRenderer::new(clock.clone());
        clock.advance(1.5);
        assert_eq!(renderer.clock_time(), 1.5);
        clock.set(4.0);
        assert_eq!(renderer.clock_time(), 4.0);
    }

    #[test]
    fn blocked_renderer_refuses_schedule() {
        let mut renderer = SimulatedRenderer::new(SimulatedClock::new());
        renderer.set_blocked(true);
        let result = renderer.schedule(Vec::new(), false);
        assert!(matches!(result, Err(AudioError::Unavailable(_))));
        assert_eq!(renderer.schedule_calls(), 0);
    }

    #[test]
    fn sounding_filters_by_clock() {
        let clock = SimulatedClock::new();
        let mut renderer = SimulatedRenderer::new(clock.clone());
        let note = ScheduledNote {
            midi: 60,
            at: 1.0,
            duration: 1.0,
            velocity: 0.8,
        };
        renderer.schedule(vec![note], false).unwrap();
        assert_eq!(renderer.sounding().count(), 0);
        clock.set(1.5);
        assert_eq!(renderer.sounding().count(), 1);
        renderer.cancel();
        assert!(renderer.scheduled().is_empty());
    }

    #[test]
    fn wall_clock_advances() {
        let renderer = WallClockRenderer::new();
        let first = renderer.clock_time();
        assert!(renderer.clock_time() >= first);
    }
}
