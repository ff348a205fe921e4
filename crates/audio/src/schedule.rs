use clairkeys_domain::Note;
use serde::{Deserialize, Serialize};

const DEFAULT_VELOCITY: f32 = 0.8;

/// A note trigger expressed on the renderer's clock.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct ScheduledNote {
    pub midi: u8,
    /// Renderer clock time at which the note sounds.
    pub at: f64,
    /// Sounding length in renderer clock seconds.
    pub duration: f64,
    pub velocity: f32,
}

impl ScheduledNote {
    pub fn end(&self) -> f64 {
        self.at + self.duration
    }
}

/// Maps notes that are still to sound after `offset_sec` onto the renderer clock.
///
/// Notes already sounding at the offset are truncated to start at `clock_now`.
/// Muting zeroes velocity but leaves every trigger time unchanged.
pub fn schedule_notes(
    notes: &[Note],
    offset_sec: f64,
    tempo_scale: f64,
    clock_now: f64,
    mute: bool,
) -> Vec<ScheduledNote> {
    notes
        .iter()
        .filter(|note| note.end() > offset_sec)
        .map(|note| {
            let start = note.start.max(offset_sec);
            ScheduledNote {
                midi: note.midi,
                at: clock_now + (start - offset_sec) / tempo_scale,
                duration: (note.end() - start) / tempo_scale,
                velocity: if mute {
                    0.0
                } else {
                    note.velocity.unwrap_or(DEFAULT_VELOCITY)
                },
            }
        })
        .collect()
}
