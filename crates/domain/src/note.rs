use serde::{Deserialize, Serialize};

use crate::DomainError;

/// Lowest key on an 88-key piano (A0).
pub const MIDI_MIN: u8 = 21;
/// Highest key on an 88-key piano (C8).
pub const MIDI_MAX: u8 = 108;
pub const MIDDLE_C: u8 = 60;

/// Returns true when the pitch class of `midi` is C#, D#, F#, G# or A#.
pub fn is_black_key_midi(midi: u8) -> bool {
    matches!(midi % 12, 1 | 3 | 6 | 8 | 10)
}

pub fn is_piano_key(midi: u8) -> bool {
    (MIDI_MIN..=MIDI_MAX).contains(&midi)
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Hand {
    #[serde(rename = "L")]
    Left,
    #[serde(rename = "R")]
    Right,
}

impl Hand {
    pub fn as_str(&self) -> &'static str {
        match self {
            Hand::Left => "L",
            Hand::Right => "R",
        }
    }
}

/// Piano finger number, thumb = 1 through pinky = 5.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(try_from = "u8", into = "u8")]
pub struct Finger(pub(crate) u8);

impl Finger {
    pub const THUMB: Finger = Finger(1);
    pub const PINKY: Finger = Finger(5);

    pub fn new(value: u8) -> Result<Self, DomainError> {
        if (1..=5).contains(&value) {
            Ok(Self(value))
        } else {
            Err(DomainError::InvalidFinger(value))
        }
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for Finger {
    type Error = DomainError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Finger::new(value)
    }
}

impl From<Finger> for u8 {
    fn from(finger: Finger) -> Self {
        finger.0
    }
}

/// A single note of a loaded song. Times are in seconds at tempo scale 1.0.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Note {
    pub midi: u8,
    pub start: f64,
    pub duration: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hand: Option<Hand>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finger: Option<Finger>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub velocity: Option<f32>,
}

impl Note {
    pub fn new(midi: u8, start: f64, duration: f64) -> Result<Self, DomainError> {
        if !is_piano_key(midi) {
            return Err(DomainError::MidiOutOfRange(midi));
        }
        if !start.is_finite() || start < 0.0 {
            return Err(DomainError::InvalidTiming("start must be >= 0"));
        }
        if !duration.is_finite() || duration <= 0.0 {
            return Err(DomainError::InvalidTiming("duration must be > 0"));
        }
        Ok(Self {
            midi,
            start,
            duration,
            hand: None,
            finger: None,
            velocity: None,
        })
    }

    pub fn with_hand(mut self, hand: Hand) -> Self {
        self.hand = Some(hand);
        self
    }

    pub fn with_finger(mut self, finger: Finger) -> Self {
        self.finger = Some(finger);
        self
    }

    pub fn with_velocity(mut self, velocity: f32) -> Self {
        self.velocity = Some(velocity.clamp(0.0, 1.0));
        self
    }

    pub fn end(&self) -> f64 {
        self.start + self.duration
    }

    /// Half-open sounding interval `[start, end)`.
    pub fn is_sounding_at(&self, time: f64) -> bool {
        self.start <= time && time < self.end()
    }

    pub fn is_black_key(&self) -> bool {
        is_black_key_midi(self.midi)
    }
}

/// Maximum of `start + duration` over all notes, or zero for an empty song.
pub fn total_length(notes: &[Note]) -> f64 {
    notes.iter().map(Note::end).fold(0.0, f64::max)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn black_keys_per_octave() {
        let black = (60..72).filter(|m| is_black_key_midi(*m)).count();
        assert_eq!(black, 5);
        assert!(is_black_key_midi(61));
        assert!(!is_black_key_midi(64));
    }

    #[test]
    fn note_validation() {
        assert!(matches!(
            Note::new(20, 0.0, 1.0),
            Err(DomainError::MidiOutOfRange(20))
        ));
        assert!(Note::new(60, -0.5, 1.0).is_err());
        assert!(Note::new(60, 0.0, 0.0).is_err());
        assert!(Note::new(60, 0.0, 1.0).is_ok());
    }

    #[test]
    fn sounding_interval_is_half_open() {
        let note = Note::new(60, 1.0, 1.0).unwrap();
        assert!(!note.is_sounding_at(0.999));
        assert!(note.is_sounding_at(1.0));
        assert!(!note.is_sounding_at(2.0));
    }

    #[test]
    fn finger_rejects_out_of_range() {
        assert!(Finger::new(0).is_err());
        assert!(Finger::new(6).is_err());
        assert_eq!(Finger::new(3).unwrap().get(), 3);
        assert!(serde_json::from_str::<Finger>("7").is_err());
    }

    #[test]
    fn hand_serializes_as_letter() {
        assert_eq!(serde_json::to_string(&Hand::Left).unwrap(), "\"L\"");
        let hand: Hand = serde_json::from_str("\"R\"").unwrap();
        assert_eq!(hand, Hand::Right);
    }

    #[test]
    fn total_length_uses_latest_end() {
        let notes = vec![
            Note::new(60, 0.0, 4.0).unwrap(),
            Note::new(64, 1.0, 1.0).unwrap(),
        ];
        assert_eq!(total_length(&notes), 4.0);
        assert_eq!(total_length(&[]), 0.0);
    }
}
