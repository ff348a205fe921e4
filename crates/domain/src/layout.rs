use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::note::{is_black_key_midi, MIDI_MAX, MIDI_MIN};
use crate::DomainError;

pub const WHITE_KEY_COUNT: usize = 52;
pub const BLACK_KEY_COUNT: usize = 36;
const BLACK_KEY_WIDTH_RATIO: f32 = 0.6;

/// Black-key left edge in white-key widths from the octave's C.
fn black_key_octave_offset(pitch_class: u8) -> Option<f32> {
    match pitch_class {
        1 => Some(0.65),
        3 => Some(1.6),
        6 => Some(3.65),
        8 => Some(4.6),
        10 => Some(5.6),
        _ => None,
    }
}

/// Slot of a white key within its octave, C = 0 through B = 6.
fn white_key_octave_slot(pitch_class: u8) -> f32 {
    match pitch_class {
        0 => 0.0,
        2 => 1.0,
        4 => 2.0,
        5 => 3.0,
        7 => 4.0,
        9 => 5.0,
        _ => 6.0,
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct KeyPosition {
    pub midi: u8,
    pub x: f32,
    pub width: f32,
    pub is_black: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct KeyLayout {
    pub by_midi: BTreeMap<u8, KeyPosition>,
    pub total_width: f32,
}

impl KeyLayout {
    pub fn get(&self, midi: u8) -> Option<&KeyPosition> {
        self.by_midi.get(&midi)
    }

    pub fn white_keys(&self) -> impl Iterator<Item = &KeyPosition> {
        self.by_midi.values().filter(|key| !key.is_black)
    }

    pub fn black_keys(&self) -> impl Iterator<Item = &KeyPosition> {
        self.by_midi.values().filter(|key| key.is_black)
    }

    /// Key under a horizontal pixel offset, preferring black keys since they
    /// are drawn on top.
    pub fn key_at(&self, x: f32) -> Option<&KeyPosition> {
        let hit = |key: &&KeyPosition| x >= key.x && x < key.x + key.width;
        self.black_keys()
            .find(hit)
            .or_else(|| self.white_keys().find(hit))
    }
}

/// Computes x position and width of all 88 keys for a given white-key width.
///
/// Pure and deterministic: the same `key_width` always yields the same layout.
/// `key_width` must be finite and positive.
pub fn build_key_layout(key_width: f32) -> Result<KeyLayout, DomainError> {
    if !(key_width.is_finite() && key_width > 0.0) {
        return Err(DomainError::InvalidKeyWidth(key_width));
    }
    let mut by_midi = BTreeMap::new();
    let mut white_index = 0usize;
    let mut last_white_x = 0.0f32;
    let mut last_white_slot = 0.0f32;

    for midi in MIDI_MIN..=MIDI_MAX {
        let pitch_class = midi % 12;
        if is_black_key_midi(midi) {
            let offset = black_key_octave_offset(pitch_class).unwrap_or(0.6);
            let x = last_white_x + (offset - last_white_slot) * key_width;
            by_midi.insert(
                midi,
                KeyPosition {
                    midi,
                    x,
                    width: BLACK_KEY_WIDTH_RATIO * key_width,
                    is_black: true,
                },
            );
        } else {
            let x = white_index as f32 * key_width;
            by_midi.insert(
                midi,
                KeyPosition {
                    midi,
                    x,
                    width: key_width,
                    is_black: false,
                },
            );
            last_white_x = x;
            last_white_slot = white_key_octave_slot(pitch_class);
            white_index += 1;
        }
    }

    Ok(KeyLayout {
        by_midi,
        total_width: WHITE_KEY_COUNT as f32 * key_width,
    })
}
