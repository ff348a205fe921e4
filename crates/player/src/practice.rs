//! Step-wise practice progression with optional tempo ramp.

use clairkeys_audio::validate_tempo_scale;
use clairkeys_domain::Note;
use serde::Serialize;
use tracing::debug;

use crate::PlayerError;

const TEMPO_SNAP_EPSILON: f64 = 1e-9;

/// Notes with (near-)simultaneous onsets, advanced as one unit.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct PracticeStep {
    pub start: f64,
    pub note_indices: Vec<usize>,
}

/// Groups start-sorted notes into onset clusters.
pub fn group_steps(notes: &[Note], tolerance: f64) -> Vec<PracticeStep> {
    let mut steps: Vec<PracticeStep> = Vec::new();
    for (index, note) in notes.iter().enumerate() {
        match steps.last_mut() {
            Some(step) if note.start - step.start <= tolerance => step.note_indices.push(index),
            _ => steps.push(PracticeStep {
                start: note.start,
                note_indices: vec![index],
            }),
        }
    }
    steps
}

#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq)]
pub enum PracticeStatus {
    Practicing,
    Completed,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct PracticeState {
    pub status: PracticeStatus,
    pub current_step_index: usize,
    pub tempo_scale: f64,
    pub target_tempo: f64,
    /// Notes of the current step, for highlighting.
    pub next_notes: Vec<Note>,
    pub progression_enabled: bool,
    pub increment: f64,
    /// Playback is held at the current step's onset.
    pub waiting: bool,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum StepOutcome {
    Advanced {
        step_index: usize,
        tempo_scale: Option<f64>,
    },
    Completed,
    AlreadyCompleted,
}

#[derive(Clone, Debug)]
pub struct PracticeSession {
    state: PracticeState,
    steps: Vec<PracticeStep>,
}

impl PracticeSession {
    pub fn start(
        notes: &[Note],
        start_tempo: f64,
        target_tempo: f64,
        increment: f64,
        tolerance: f64,
    ) -> Result<Self, PlayerError> {
        let start_tempo = validate_tempo_scale(start_tempo)?;
        let target_tempo = validate_tempo_scale(target_tempo)?;
        let steps = group_steps(notes, tolerance);
        let status = if steps.is_empty() {
            PracticeStatus::Completed
        } else {
            PracticeStatus::Practicing
        };
        let mut session = Self {
            state: PracticeState {
                status,
                current_step_index: 0,
                tempo_scale: start_tempo,
                target_tempo,
                next_notes: Vec::new(),
                progression_enabled: false,
                increment,
                waiting: false,
            },
            steps,
        };
        session.refresh_next_notes(notes);
        Ok(session)
    }

    pub fn state(&self) -> &PracticeState {
        &self.state
    }

    pub fn steps(&self) -> &[PracticeStep] {
        &self.steps
    }

    pub fn current_step(&self) -> Option<&PracticeStep> {
        match self.state.status {
            PracticeStatus::Practicing => self.steps.get(self.state.current_step_index),
            PracticeStatus::Completed => None,
        }
    }

    pub fn is_completed(&self) -> bool {
        self.state.status == PracticeStatus::Completed
    }

    /// Takes effect on the next [`advance`](Self::advance), not retroactively.
    pub fn set_progression(&mut self, enabled: bool, increment: f64) -> Result<(), PlayerError> {
        if !(increment.is_finite() && increment > 0.0) {
            return Err(PlayerError::Config(format!(
                "practice increment must be positive, got {increment}"
            )));
        }
        self.state.progression_enabled = enabled;
        self.state.increment = increment;
        Ok(())
    }

    pub fn set_tempo_scale(&mut self, tempo_scale: f64) {
        self.state.tempo_scale = tempo_scale;
    }

    pub fn set_waiting(&mut self, waiting: bool) {
        self.state.waiting = waiting;
    }

    /// Moves to the first step whose onset is not before `time`.
    pub fn align_to(&mut self, notes: &[Note], time: f64, tolerance: f64) {
        if self.steps.is_empty() {
            return;
        }
        let index = self.steps.partition_point(|step| step.start < time - tolerance);
        if index >= self.steps.len() {
            self.state.status = PracticeStatus::Completed;
        } else {
            self.state.status = PracticeStatus::Practicing;
            self.state.current_step_index = index;
        }
        self.refresh_next_notes(notes);
    }

    pub fn advance(&mut self, notes: &[Note]) -> StepOutcome {
        if self.is_completed() {
            return StepOutcome::AlreadyCompleted;
        }
        let next = self.state.current_step_index + 1;
        if next >= self.steps.len() {
            self.state.status = PracticeStatus::Completed;
            self.state.waiting = false;
            self.refresh_next_notes(notes);
            debug!(steps = self.steps.len(), "practice completed");
            return StepOutcome::Completed;
        }
        self.state.current_step_index = next;
        self.refresh_next_notes(notes);

        let tempo_scale = if self.state.progression_enabled {
            self.ramped_tempo()
        } else {
            None
        };
        if let Some(tempo) = tempo_scale {
            self.state.tempo_scale = tempo;
        }
        StepOutcome::Advanced {
            step_index: next,
            tempo_scale,
        }
    }

    /// Next tempo one increment toward the target, never overshooting it.
    fn ramped_tempo(&self) -> Option<f64> {
        let current = self.state.tempo_scale;
        let target = self.state.target_tempo;
        if current >= target {
            return None;
        }
        let mut next = (current + self.state.increment).min(target);
        if target - next < TEMPO_SNAP_EPSILON {
            next = target;
        }
        Some(next)
    }

    fn refresh_next_notes(&mut self, notes: &[Note]) {
        self.state.next_notes = self
            .current_step()
            .map(|step| {
                step.note_indices
                    .iter()
                    .filter_map(|index| notes.get(*index).cloned())
                    .collect()
            })
            .unwrap_or_default();
    }
}
