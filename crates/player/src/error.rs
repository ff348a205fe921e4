use clairkeys_audio::AudioError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PlayerError {
    /// Recoverable: the UI should ask for a user gesture and retry `play`.
    #[error("audio unavailable: {0}")]
    AudioUnavailable(String),
    #[error("tempo scale must be finite and positive, got {0}")]
    InvalidTempo(f64),
    #[error("practice mode is not active")]
    PracticeInactive,
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<AudioError> for PlayerError {
    fn from(err: AudioError) -> Self {
        match err {
            AudioError::Unavailable(reason) => Self::AudioUnavailable(reason),
            AudioError::InvalidTempo(scale) => Self::InvalidTempo(scale),
        }
    }
}
