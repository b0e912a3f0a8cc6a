use crate::model_source::ModelSourceError;
use thiserror::Error;

/// Errors produced by the synthesis pipeline.
///
/// Every variant is fatal for the invocation that raised it; nothing in the
/// pipeline retries or degrades.
#[derive(Error, Debug)]
pub enum SynthesisError {
    /// Model or tokenizer could not be resolved or loaded
    #[error(
        "Model load failed: {0}\nSuggestion: Check the model identifier, network access and HF_TOKEN for gated repositories"
    )]
    Load(String),

    /// Token tensor or waveform has an unusable shape (e.g. empty text)
    #[error("Invalid tensor shape: {0}")]
    Shape(String),

    /// Forward pass failed inside the inference runtime
    #[error("Model inference failed: {0}")]
    Inference(String),

    /// Output file could not be written or read
    #[error("IO error: {0}\nSuggestion: Check that the output directory exists and is writable")]
    Io(#[from] std::io::Error),

    /// WAV encoding or decoding failed
    #[error("WAV error: {0}")]
    Wav(String),
}

impl From<ModelSourceError> for SynthesisError {
    fn from(err: ModelSourceError) -> Self {
        SynthesisError::Load(err.to_string())
    }
}

impl From<hound::Error> for SynthesisError {
    fn from(err: hound::Error) -> Self {
        match err {
            hound::Error::IoError(io) => SynthesisError::Io(io),
            other => SynthesisError::Wav(other.to_string()),
        }
    }
}

/// Result type for synthesis operations
pub type SynthesisResult<T> = Result<T, SynthesisError>;
