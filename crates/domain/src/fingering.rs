//! Hand and finger assignment heuristics.
//!
//! Outputs are approximate by nature. The contractual parts are the hand
//! split around the crossover zone and the finger *sets* each rule draws from.

use rand::rngs::{StdRng, ThreadRng};
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::convert::parse_note_name;
use crate::note::{is_black_key_midi, Finger, Hand, MIDDLE_C};

/// Lower bound of the crossover zone (A3).
pub const CROSSOVER_LOW: u8 = 57;
/// Upper bound of the crossover zone (G4).
pub const CROSSOVER_HIGH: u8 = 67;
const CONTINUITY_RADIUS: u8 = 3;

const BLACK_KEY_FINGERS: [u8; 3] = [2, 3, 4];
const MAJOR_SCALE_STEPS: [u8; 7] = [0, 2, 4, 5, 7, 9, 11];
const SCALE_FINGERS_RIGHT: [u8; 7] = [1, 2, 3, 1, 2, 3, 4];
const SCALE_FINGERS_LEFT: [u8; 7] = [5, 4, 3, 2, 1, 3, 2];

/// Picks the hand for a note.
///
/// Below A3 is always left and above G4 always right. Inside that zone a note
/// within three semitones of middle C keeps `prev_hand`; otherwise the split
/// is at middle C, which itself goes to the left hand.
pub fn assign_hand(midi: u8, prev_hand: Option<Hand>) -> Hand {
    if midi < CROSSOVER_LOW {
        return Hand::Left;
    }
    if midi > CROSSOVER_HIGH {
        return Hand::Right;
    }
    if let Some(prev) = prev_hand {
        if midi.abs_diff(MIDDLE_C) <= CONTINUITY_RADIUS {
            return prev;
        }
    }
    if midi <= MIDDLE_C {
        Hand::Left
    } else {
        Hand::Right
    }
}

/// Musical context that selects a canonical fingering pattern.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum FingeringContext {
    /// Major scale on the given pitch class (0 = C).
    Scale { tonic: u8 },
    /// Root-position triad on the given pitch class.
    Chord { root: u8, minor: bool },
}

impl FingeringContext {
    /// Builds a scale context from a key signature name such as `G` or `F#`.
    pub fn from_key_signature(key: &str) -> Option<Self> {
        let midi = parse_note_name(&format!("{}4", key.trim()))?;
        Some(FingeringContext::Scale {
            tonic: midi.rem_euclid(12) as u8,
        })
    }

    fn pattern_finger(&self, midi: u8, hand: Hand) -> Option<u8> {
        match *self {
            FingeringContext::Scale { tonic } => {
                let interval = (midi % 12 + 12 - tonic % 12) % 12;
                let degree = MAJOR_SCALE_STEPS.iter().position(|s| *s == interval)?;
                Some(match hand {
                    Hand::Right => SCALE_FINGERS_RIGHT[degree],
                    Hand::Left => SCALE_FINGERS_LEFT[degree],
                })
            }
            FingeringContext::Chord { root, minor } => {
                let interval = (midi % 12 + 12 - root % 12) % 12;
                let third = if minor { 3 } else { 4 };
                match (interval, hand) {
                    (0, Hand::Right) | (7, Hand::Left) => Some(1),
                    (0, Hand::Left) | (7, Hand::Right) => Some(5),
                    (i, _) if i == third => Some(3),
                    _ => None,
                }
            }
        }
    }
}

/// White-key fallback: pinky toward the outer register of each hand, thumb
/// and neighbouring fingers near the middle of the keyboard.
fn fallback_fingers(midi: u8, hand: Hand) -> &'static [u8] {
    match hand {
        Hand::Right => match midi {
            0..=64 => &[1, 2],
            65..=83 => &[1, 2, 3],
            84..=95 => &[3, 4],
            _ => &[4, 5],
        },
        Hand::Left => match midi {
            55.. => &[1, 2],
            37..=54 => &[1, 2, 3],
            25..=36 => &[3, 4],
            _ => &[4, 5],
        },
    }
}

/// Finger assignment with an injectable random source.
pub struct FingerAssigner<R = ThreadRng> {
    rng: R,
}

impl FingerAssigner<ThreadRng> {
    pub fn new() -> Self {
        Self {
            rng: rand::thread_rng(),
        }
    }
}

impl Default for FingerAssigner<ThreadRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl FingerAssigner<StdRng> {
    /// Reproducible assigner for tests and offline conversion.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl<R: Rng> FingerAssigner<R> {
    pub fn with_rng(rng: R) -> Self {
        Self { rng }
    }

    pub fn assign(&mut self, midi: u8, hand: Hand, context: Option<&FingeringContext>) -> Finger {
        if is_black_key_midi(midi) {
            return self.choose(&BLACK_KEY_FINGERS);
        }
        if let Some(finger) = context.and_then(|ctx| ctx.pattern_finger(midi, hand)) {
            return Finger(finger);
        }
        self.choose(fallback_fingers(midi, hand))
    }

    fn choose(&mut self, options: &[u8]) -> Finger {
        Finger(options.choose(&mut self.rng).copied().unwrap_or(3))
    }
}

/// Assigns a finger using the thread-local random source.
///
/// Black keys always get 2, 3 or 4.
pub fn assign_finger(midi: u8, hand: Hand, context: Option<&FingeringContext>) -> Finger {
    FingerAssigner::new().assign(midi, hand, context)
}
