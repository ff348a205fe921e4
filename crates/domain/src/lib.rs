pub mod convert;
pub mod error;
pub mod fingering;
pub mod layout;
pub mod note;
pub mod song;

pub use crate::convert::{midi_to_note, note_to_midi};
pub use crate::error::DomainError;
pub use crate::fingering::{assign_finger, assign_hand, FingerAssigner, FingeringContext};
pub use crate::layout::{build_key_layout, KeyLayout, KeyPosition};
pub use crate::note::{is_black_key_midi, Finger, Hand, Note, MIDI_MAX, MIDI_MIN};
pub use crate::song::{AnimationData, RawNoteRecord, Song, SongMetadata};
