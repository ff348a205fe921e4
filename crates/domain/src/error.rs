use thiserror::Error;

/// Errors from constructing domain values directly. The converter path
/// (`Song::from_records`) repairs bad input instead of returning these.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("midi {0} is outside the piano range 21..=108")]
    MidiOutOfRange(u8),
    #[error("finger must be between 1 and 5, got {0}")]
    InvalidFinger(u8),
    #[error("invalid note timing: {0}")]
    InvalidTiming(&'static str),
    #[error("key width must be finite and positive, got {0}")]
    InvalidKeyWidth(f32),
    #[error("animation data: {0}")]
    Serialization(#[from] serde_json::Error),
}
