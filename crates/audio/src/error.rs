use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum AudioError {
    /// The renderer refused to start, e.g. blocked until a user gesture.
    #[error("audio unavailable: {0}")]
    Unavailable(String),
    #[error("tempo scale must be finite and positive, got {0}")]
    InvalidTempo(f64),
}

impl AudioError {
    pub fn unavailable<T: Into<String>>(reason: T) -> Self {
        Self::Unavailable(reason.into())
    }
}
