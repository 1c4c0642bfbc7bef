//! Crate-wide error type.

use thiserror::Error;

use crate::config::ConfigError;

#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("WAV error: {0}")]
    Wav(#[from] hound::Error),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("knob position {0} outside 1..=11")]
    InvalidKnobPosition(u8),
    #[error("response buffer holds {actual} bins, analyzer needs {expected}")]
    AnalysisLength { expected: usize, actual: usize },
    #[error(
        "analysis block length must be a power of two of at least {min}, got {0}",
        min = crate::analysis::MIN_BLOCK_LEN
    )]
    InvalidBlockLength(usize),
    #[error("FFT failed: {0}")]
    Fft(#[from] realfft::FftError),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
