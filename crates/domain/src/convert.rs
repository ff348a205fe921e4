//! Note-name and MIDI-number conversion at the ingestion boundary.
//!
//! Malformed upstream data is clamped or defaulted with a warning instead of
//! failing, so one corrupt record cannot abort an otherwise playable song.

use tracing::warn;

use crate::note::{MIDDLE_C, MIDI_MAX, MIDI_MIN};

const NOTE_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

fn letter_semitone(letter: char) -> Option<i64> {
    match letter.to_ascii_uppercase() {
        'C' => Some(0),
        'D' => Some(2),
        'E' => Some(4),
        'F' => Some(5),
        'G' => Some(7),
        'A' => Some(9),
        'B' => Some(11),
        _ => None,
    }
}

/// Parses `letter [#|b] octave` into an unclamped MIDI number. Octaves too
/// large to represent saturate so the caller still clamps them.
pub(crate) fn parse_note_name(name: &str) -> Option<i64> {
    let mut chars = name.trim().chars().peekable();
    let semitone = letter_semitone(chars.next()?)?;
    let alter = match chars.peek() {
        Some('#') | Some('♯') => {
            chars.next();
            1
        }
        Some('b') | Some('♭') => {
            chars.next();
            -1
        }
        _ => 0,
    };
    let octave: String = chars.collect();
    let digits = octave.strip_prefix(&['-', '+'][..]).unwrap_or(&octave);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let saturated = if octave.starts_with('-') {
        i64::MIN
    } else {
        i64::MAX
    };
    let octave: i64 = octave.parse().unwrap_or(saturated);
    Some(
        octave
            .saturating_add(1)
            .saturating_mul(12)
            .saturating_add(semitone + alter),
    )
}

/// Clamps an arbitrary pitch number into the 88-key range, warning when it had to.
pub fn clamp_midi(value: i64) -> u8 {
    let clamped = value.clamp(MIDI_MIN as i64, MIDI_MAX as i64);
    if clamped != value {
        warn!(value, clamped, "midi number outside piano range, clamping");
    }
    clamped as u8
}

/// Converts a note name such as `C4`, `F#3` or `Bb5` into a MIDI number.
///
/// Never fails: names outside the piano range are clamped into `21..=108` and
/// unparseable names resolve to middle C, both with a logged warning.
pub fn note_to_midi(name: &str) -> u8 {
    match parse_note_name(name) {
        Some(value) => clamp_midi(value),
        None => {
            warn!(name, "unparseable note name, defaulting to middle C");
            MIDDLE_C
        }
    }
}

/// Spells a MIDI number with sharps, e.g. 61 -> `C#4`.
pub fn midi_to_note(midi: u8) -> String {
    let octave = (midi / 12) as i32 - 1;
    format!("{}{}", NOTE_NAMES[(midi % 12) as usize], octave)
}
