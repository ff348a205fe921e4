use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tracing::{info, warn};

use crate::convert::{clamp_midi, note_to_midi};
use crate::fingering::{assign_hand, FingerAssigner, FingeringContext};
use crate::note::{total_length, Finger, Hand, Note, MIDDLE_C};
use crate::DomainError;

const DEFAULT_NOTE_DURATION: f64 = 0.5;

fn default_title() -> String {
    "Untitled".to_string()
}

fn default_composer() -> String {
    "Unknown".to_string()
}

fn default_tempo() -> u32 {
    120
}

fn default_key_signature() -> String {
    "C".to_string()
}

fn default_time_signature() -> String {
    "4/4".to_string()
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct SongMetadata {
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default = "default_composer")]
    pub composer: String,
}

impl Default for SongMetadata {
    fn default() -> Self {
        Self {
            title: default_title(),
            composer: default_composer(),
        }
    }
}

/// A note as it arrives from the sheet-music ingestion pipeline, before
/// validation. Pitch is given either as a MIDI number or a note name.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct RawNoteRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub midi: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(default)]
    pub start: f64,
    #[serde(default)]
    pub duration: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hand: Option<Hand>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finger: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub velocity: Option<f32>,
}

impl From<&Note> for RawNoteRecord {
    fn from(note: &Note) -> Self {
        Self {
            midi: Some(note.midi as i64),
            note: None,
            start: note.start,
            duration: note.duration,
            hand: note.hand,
            finger: note.finger.map(|f| f.get() as i64),
            velocity: note.velocity,
        }
    }
}

/// Animation data document produced by the sheet-music converter.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AnimationData {
    #[serde(default)]
    pub metadata: SongMetadata,
    #[serde(default)]
    pub notes: Vec<RawNoteRecord>,
    #[serde(default)]
    pub duration: f64,
    #[serde(default = "default_tempo")]
    pub tempo: u32,
    #[serde(default = "default_key_signature")]
    pub key_signature: String,
    #[serde(default = "default_time_signature")]
    pub time_signature: String,
    #[serde(
        default,
        rename = "generated_at",
        with = "upstream_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub generated_at: Option<OffsetDateTime>,
}

/// The converter writes naive UTC timestamps (`2024-05-01T12:00:00.123456`).
/// RFC 3339 with an offset is accepted as well. An unreadable timestamp is
/// dropped with a warning rather than failing the whole document.
mod upstream_timestamp {
    use serde::{Deserialize, Deserializer, Serializer};
    use time::format_description::well_known::Rfc3339;
    use time::macros::format_description;
    use time::{OffsetDateTime, PrimitiveDateTime};
    use tracing::warn;

    pub fn serialize<S: Serializer>(
        value: &Option<OffsetDateTime>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        time::serde::rfc3339::option::serialize(value, serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<OffsetDateTime>, D::Error> {
        Ok(Option::<String>::deserialize(deserializer)?.and_then(|text| parse(&text)))
    }

    pub(super) fn parse(text: &str) -> Option<OffsetDateTime> {
        if let Ok(at) = OffsetDateTime::parse(text, &Rfc3339) {
            return Some(at);
        }
        let fractional =
            format_description!("[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond]");
        let whole = format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]");
        match PrimitiveDateTime::parse(text, fractional)
            .or_else(|_| PrimitiveDateTime::parse(text, whole))
        {
            Ok(naive) => Some(naive.assume_utc()),
            Err(err) => {
                warn!(text, %err, "unreadable generated_at timestamp, ignoring");
                None
            }
        }
    }
}

impl AnimationData {
    pub fn from_json(bytes: &[u8]) -> Result<Self, DomainError> {
        Ok(serde_json::from_slice(bytes)?)
    }

    pub fn to_json_pretty(&self) -> Result<Vec<u8>, DomainError> {
        Ok(serde_json::to_vec_pretty(self)?)
    }
}

/// A validated, playable note sequence.
#[derive(Clone, Debug, PartialEq)]
pub struct Song {
    pub metadata: SongMetadata,
    pub tempo_bpm: u32,
    pub key_signature: String,
    pub time_signature: String,
    notes: Vec<Note>,
    total_length: f64,
}

impl Song {
    pub fn new(metadata: SongMetadata, mut notes: Vec<Note>) -> Self {
        notes.sort_by(|a, b| a.start.total_cmp(&b.start).then(a.midi.cmp(&b.midi)));
        let total_length = total_length(&notes);
        Self {
            metadata,
            tempo_bpm: default_tempo(),
            key_signature: default_key_signature(),
            time_signature: default_time_signature(),
            notes,
            total_length,
        }
    }

    /// Converts raw upstream records into notes, repairing what it can.
    pub fn from_records(
        metadata: SongMetadata,
        records: &[RawNoteRecord],
        context: Option<&FingeringContext>,
    ) -> Self {
        let mut assigner = FingerAssigner::new();
        Self::from_records_with(metadata, records, context, &mut assigner)
    }

    pub fn from_records_with<R: rand::Rng>(
        metadata: SongMetadata,
        records: &[RawNoteRecord],
        context: Option<&FingeringContext>,
        assigner: &mut FingerAssigner<R>,
    ) -> Self {
        let mut ordered: Vec<&RawNoteRecord> = records.iter().collect();
        ordered.sort_by(|a, b| a.start.total_cmp(&b.start));

        let mut prev_hand = None;
        let notes = ordered
            .into_iter()
            .map(|record| {
                let note = repair_record(record, prev_hand, context, assigner);
                prev_hand = note.hand;
                note
            })
            .collect();
        let song = Self::new(metadata, notes);
        info!(
            title = %song.metadata.title,
            notes = song.notes.len(),
            total_length = song.total_length,
            "song converted"
        );
        song
    }

    pub fn from_animation_data(data: &AnimationData) -> Self {
        let context = FingeringContext::from_key_signature(&data.key_signature);
        let mut song = Self::from_records(data.metadata.clone(), &data.notes, context.as_ref());
        song.tempo_bpm = data.tempo;
        song.key_signature = data.key_signature.clone();
        song.time_signature = data.time_signature.clone();
        song
    }

    pub fn to_animation_data(&self) -> AnimationData {
        AnimationData {
            metadata: self.metadata.clone(),
            notes: self.notes.iter().map(RawNoteRecord::from).collect(),
            duration: self.total_length,
            tempo: self.tempo_bpm,
            key_signature: self.key_signature.clone(),
            time_signature: self.time_signature.clone(),
            generated_at: Some(OffsetDateTime::now_utc()),
        }
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn into_notes(self) -> Vec<Note> {
        self.notes
    }

    /// Maximum note end time, fixed when the song is built.
    pub fn total_length(&self) -> f64 {
        self.total_length
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }
}

fn repair_record<R: rand::Rng>(
    record: &RawNoteRecord,
    prev_hand: Option<Hand>,
    context: Option<&FingeringContext>,
    assigner: &mut FingerAssigner<R>,
) -> Note {
    let midi = match (record.midi, record.note.as_deref()) {
        (Some(midi), _) => clamp_midi(midi),
        (None, Some(name)) => note_to_midi(name),
        (None, None) => {
            warn!(start = record.start, "note record without pitch, defaulting to middle C");
            MIDDLE_C
        }
    };

    let start = if record.start.is_finite() && record.start >= 0.0 {
        record.start
    } else {
        warn!(midi, start = record.start, "invalid note start, clamping to 0");
        0.0
    };

    let duration = if record.duration.is_finite() && record.duration > 0.0 {
        record.duration
    } else {
        warn!(midi, duration = record.duration, "invalid note duration, using default");
        DEFAULT_NOTE_DURATION
    };

    let hand = record.hand.unwrap_or_else(|| assign_hand(midi, prev_hand));

    let finger = match record.finger {
        Some(value) => u8::try_from(value)
            .ok()
            .and_then(|v| Finger::new(v).ok())
            .unwrap_or_else(|| {
                warn!(midi, finger = value, "finger out of range, reassigning");
                assigner.assign(midi, hand, context)
            }),
        None => assigner.assign(midi, hand, context),
    };

    Note {
        midi,
        start,
        duration,
        hand: Some(hand),
        finger: Some(finger),
        velocity: record.velocity.map(|v| if v.is_finite() { v.clamp(0.0, 1.0) } else { 1.0 }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(note: &str, start: f64, duration: f64) -> RawNoteRecord {
        RawNoteRecord {
            note: Some(note.to_string()),
            start,
            duration,
            ..Default::default()
        }
    }

    #[test]
    fn converts_records_and_computes_length() {
        let records = vec![record("E4", 1.0, 1.0), record("C4", 0.0, 1.0), record("G4", 2.0, 1.0)];
        let mut assigner = FingerAssigner::seeded(3);
        let song =
            Song::from_records_with(SongMetadata::default(), &records, None, &mut assigner);
        let midis: Vec<u8> = song.notes().iter().map(|n| n.midi).collect();
        assert_eq!(midis, vec![60, 64, 67]);
        assert_eq!(song.total_length(), 3.0);
        assert!(song.notes().iter().all(|n| n.hand.is_some() && n.finger.is_some()));
    }

    #[test]
    fn repairs_malformed_records() {
        let records = vec![
            RawNoteRecord {
                midi: Some(150),
                start: -2.0,
                duration: 0.0,
                finger: Some(9),
                velocity: Some(3.0),
                ..Default::default()
            },
            record("not a note", 1.0, 1.0),
        ];
        let song = Song::from_records(SongMetadata::default(), &records, None);
        let first = &song.notes()[0];
        assert_eq!(first.midi, 108);
        assert_eq!(first.start, 0.0);
        assert_eq!(first.duration, DEFAULT_NOTE_DURATION);
        assert_eq!(first.velocity, Some(1.0));
        assert_eq!(first.hand, Some(Hand::Right));
        assert_eq!(song.notes()[1].midi, 60);
    }

    #[test]
    fn keeps_valid_upstream_hand_and_finger() {
        let records = vec![RawNoteRecord {
            midi: Some(72),
            start: 0.0,
            duration: 1.0,
            hand: Some(Hand::Left),
            finger: Some(2),
            ..Default::default()
        }];
        let song = Song::from_records(SongMetadata::default(), &records, None);
        assert_eq!(song.notes()[0].hand, Some(Hand::Left));
        assert_eq!(song.notes()[0].finger.map(Finger::get), Some(2));
    }

    #[test]
    fn crossover_hand_continues_from_previous_note() {
        let records = vec![record("C3", 0.0, 1.0), record("C#4", 1.0, 1.0)];
        let song = Song::from_records(SongMetadata::default(), &records, None);
        assert_eq!(song.notes()[1].hand, Some(Hand::Left));
    }

    #[test]
    fn animation_data_defaults_and_round_trip() {
        let json = br#"{
            "notes": [{"midi": 60, "start": 0.0, "duration": 1.0}],
            "keySignature": "G",
            "generated_at": "2024-05-01T12:00:00Z"
        }"#;
        let data = AnimationData::from_json(json).unwrap();
        assert_eq!(data.metadata.title, "Untitled");
        assert_eq!(data.tempo, 120);
        assert_eq!(data.time_signature, "4/4");
        assert!(data.generated_at.is_some());

        let song = Song::from_animation_data(&data);
        assert_eq!(song.key_signature, "G");
        let exported = song.to_animation_data().to_json_pretty().unwrap();
        let reparsed = AnimationData::from_json(&exported).unwrap();
        assert_eq!(reparsed.notes.len(), 1);
        assert_eq!(reparsed.duration, 1.0);
    }

    #[test]
    fn reads_naive_converter_timestamps_as_utc() {
        let json = br#"{
            "metadata": {"title": "Ode to Joy", "composer": "Beethoven"},
            "notes": [{"note": "E4", "start": 0.0, "duration": 0.5}],
            "generated_at": "2024-05-01T12:00:00.123456"
        }"#;
        let data = AnimationData::from_json(json).unwrap();
        let at = data.generated_at.unwrap();
        assert_eq!(at.offset(), time::UtcOffset::UTC);
        assert_eq!((at.hour(), at.minute(), at.second()), (12, 0, 0));
        assert_eq!(at.microsecond(), 123_456);

        let whole = upstream_timestamp::parse("2024-05-01T12:00:00").unwrap();
        assert_eq!(whole.unix_timestamp(), at.unix_timestamp());
    }

    #[test]
    fn unreadable_timestamp_does_not_reject_document() {
        let json = br#"{
            "notes": [{"midi": 64, "start": 0.0, "duration": 1.0}],
            "generated_at": "yesterday"
        }"#;
        let data = AnimationData::from_json(json).unwrap();
        assert_eq!(data.generated_at, None);
        assert_eq!(data.notes.len(), 1);
    }

    #[test]
    fn rejects_invalid_json() {
        assert!(matches!(
            AnimationData::from_json(b"{ not json"),
            Err(DomainError::Serialization(_))
        ));
    }
}
