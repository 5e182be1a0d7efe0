use thiserror::Error;

use crate::params::ParameterError;
use crate::stages::StageKind;

/// Failures surfaced by [`Rack`](crate::Rack) construction and processing.
#[derive(Debug, Error)]
pub enum RackError {
    #[error("no stage implementation registered for `{stage}`")]
    DependencyMissing { stage: StageKind },
    #[error(transparent)]
    Processing(#[from] ProcessingError),
    #[error(transparent)]
    Parameter(#[from] ParameterError),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProcessingError {
    #[error("audio buffer contains no samples")]
    Empty,
    #[error("non-finite sample at channel {channel}, index {index}")]
    NonFinite { channel: usize, index: usize },
    #[error("channel {channel} has {actual} samples, expected {expected}")]
    RaggedChannels {
        channel: usize,
        expected: usize,
        actual: usize,
    },
    #[error("buffer shape {actual:?} does not match {expected:?}")]
    ShapeMismatch {
        expected: (usize, usize),
        actual: (usize, usize),
    },
    #[error("invalid sample rate {0}")]
    InvalidSampleRate(u32),
}

/// Recoverable: an unknown preset is replaced by the defaults.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    #[error("unknown preset `{name}` for {family}")]
    UnknownPreset { family: String, name: String },
}
