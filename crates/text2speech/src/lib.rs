//! # text2speech
//!
//! Single-shot text-to-speech: load a pretrained VITS model, turn one text
//! into a waveform and write it as a WAV file.
//!
//! ## Pipeline
//!
//! 1. [`SynthesisConfig`] names the model, the text and the output path.
//! 2. [`load_model`] resolves the model (local directory or HuggingFace
//!    repo) into an [`OnnxVitsModel`] and its [`VitsTokenizer`].
//! 3. [`Synthesizer::synthesize`] encodes the text and runs one forward pass
//!    inside an [`InferenceScope`].
//! 4. [`write_wav`] stores the waveform as 32-bit float PCM.
//!
//! [`run`] chains the steps and reports each [`Stage`].
//!
//! ## Features
//!
//! - `model-hf` (default): fetch artifacts from the HuggingFace Hub
//!
//! ## Example
//!
//! ```no_run
//! use text2speech::{SynthesisConfig, run};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = SynthesisConfig::new("Xenova/mms-tts-eng", "hello.wav", "Hello there");
//!     let report = run(&config, |stage| println!("{stage}"))?;
//!     println!("wrote {} ms of audio", report.duration_ms);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod model;
pub mod model_source;
pub mod tokenizer;
pub mod types;

mod loader;
mod pipeline;
mod synthesizer;
mod writer;

pub use config::SynthesisConfig;
pub use error::{SynthesisError, SynthesisResult};
pub use loader::load_model;
pub use model::{InferenceScope, InferenceToken, OnnxVitsModel, SpeechModel};
pub use model_source::{ModelSource, ModelSourceError};
pub use pipeline::{Stage, SynthesisReport, run, synthesize_to_file};
pub use synthesizer::Synthesizer;
pub use tokenizer::{TokenizerConfig, VitsTokenizer};
pub use types::{ModelInfo, TokenTensor, Waveform};
pub use writer::{read_wav, write_wav};
