use crate::error::{SynthesisError, SynthesisResult};
use ndarray::{Array2, Axis};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Model information
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelInfo {
    /// Model identifier as given on the command line
    pub id: String,
    /// Sampling rate of the produced waveform in Hz
    pub sampling_rate: u32,
    /// Path of the inference graph, if the model is file backed
    pub graph_path: Option<PathBuf>,
}

/// Encoded text ready for a forward pass, shape `[1, sequence_length]`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TokenTensor {
    ids: Array2<i64>,
    attention_mask: Array2<i64>,
}

impl TokenTensor {
    /// Build a single-row tensor from token ids.
    ///
    /// An empty id list has no valid shape for the model and is rejected.
    pub fn from_ids(ids: Vec<i64>) -> SynthesisResult<Self> {
        if ids.is_empty() {
            return Err(SynthesisError::Shape(
                "token tensor must contain at least one token".to_string(),
            ));
        }
        let len = ids.len();
        let ids = Array2::from_shape_vec((1, len), ids)
            .map_err(|err| SynthesisError::Shape(err.to_string()))?;
        let attention_mask = Array2::from_elem((1, len), 1_i64);
        Ok(Self {
            ids,
            attention_mask,
        })
    }

    pub fn ids(&self) -> &Array2<i64> {
        &self.ids
    }

    pub fn attention_mask(&self) -> &Array2<i64> {
        &self.attention_mask
    }

    pub fn len(&self) -> usize {
        self.ids.len_of(Axis(1))
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Token ids of the single row, in order.
    pub fn to_vec(&self) -> Vec<i64> {
        self.ids.iter().copied().collect()
    }
}

/// Raw model output in `[channels, frames]` layout.
#[derive(Clone, Debug, PartialEq)]
pub struct Waveform {
    samples: Array2<f32>,
}

impl Waveform {
    pub fn new(samples: Array2<f32>) -> SynthesisResult<Self> {
        if samples.len_of(Axis(0)) == 0 {
            return Err(SynthesisError::Shape(
                "waveform must have at least one channel".to_string(),
            ));
        }
        if samples.len_of(Axis(1)) == 0 {
            return Err(SynthesisError::Shape(
                "model produced an empty waveform".to_string(),
            ));
        }
        Ok(Self { samples })
    }

    /// Single-channel waveform from a flat sample buffer.
    pub fn mono(samples: Vec<f32>) -> SynthesisResult<Self> {
        let frames = samples.len();
        let samples = Array2::from_shape_vec((1, frames), samples)
            .map_err(|err| SynthesisError::Shape(err.to_string()))?;
        Self::new(samples)
    }

    /// Interpret a model output tensor.
    ///
    /// Accepts `[frames]`, `[batch, frames]` and `[batch, channels, frames]`
    /// with a batch of one.
    pub fn from_model_output(shape: &[i64], data: &[f32]) -> SynthesisResult<Self> {
        let dims = shape
            .iter()
            .map(|&dim| usize::try_from(dim))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_| SynthesisError::Shape(format!("negative dimension in {shape:?}")))?;

        let (channels, frames) = match dims.as_slice() {
            [frames] => (1, *frames),
            [1, frames] => (1, *frames),
            [1, channels, frames] => (*channels, *frames),
            _ => {
                return Err(SynthesisError::Shape(format!(
                    "unsupported waveform shape {shape:?}; expected a batch of one"
                )));
            }
        };

        let samples = Array2::from_shape_vec((channels, frames), data.to_vec())
            .map_err(|err| SynthesisError::Shape(err.to_string()))?;
        Self::new(samples)
    }

    pub fn channels(&self) -> usize {
        self.samples.len_of(Axis(0))
    }

    pub fn frames(&self) -> usize {
        self.samples.len_of(Axis(1))
    }

    pub fn duration_ms(&self, sample_rate: u32) -> u64 {
        if sample_rate == 0 {
            return 0;
        }
        (self.frames() as u64 * 1000) / u64::from(sample_rate)
    }

    /// Samples in frames-by-channels order, as WAV expects them.
    pub fn interleaved(&self) -> Vec<f32> {
        self.samples.t().iter().copied().collect()
    }
}
