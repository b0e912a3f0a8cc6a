//! Configuration for a single synthesis run

use crate::model_source::ModelSource;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// ONNX export of the MMS VITS English checkpoint
pub const DEFAULT_MODEL: &str = "Xenova/mms-tts-eng";
pub const DEFAULT_OUTPUT: &str = "output.wav";
pub const DEFAULT_TEXT: &str = "This is the default text.";
/// Location of the graph inside a model repository
pub const DEFAULT_ONNX_FILE: &str = "onnx/model.onnx";

/// Configuration for one text-to-speech invocation.
///
/// Built once from the command line and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SynthesisConfig {
    /// HuggingFace repo id or local model directory
    #[serde(default = "default_model")]
    pub model: String,

    /// Path of the WAV file to write
    #[serde(default = "default_output")]
    pub output: PathBuf,

    /// Text to synthesize
    #[serde(default = "default_text")]
    pub text: String,

    /// ONNX graph inside the model repository
    #[serde(default = "default_onnx_file")]
    pub onnx_file: String,

    /// Optional HuggingFace revision (branch, tag, or commit SHA)
    #[serde(default)]
    pub revision: Option<String>,
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_output() -> PathBuf {
    PathBuf::from(DEFAULT_OUTPUT)
}

fn default_text() -> String {
    DEFAULT_TEXT.to_string()
}

fn default_onnx_file() -> String {
    DEFAULT_ONNX_FILE.to_string()
}

impl SynthesisConfig {
    pub fn new(
        model: impl Into<String>,
        output: impl Into<PathBuf>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            model: model.into(),
            output: output.into(),
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn with_onnx_file(mut self, onnx_file: impl Into<String>) -> Self {
        self.onnx_file = onnx_file.into();
        self
    }

    pub fn with_revision(mut self, revision: impl Into<String>) -> Self {
        self.revision = Some(revision.into());
        self
    }

    /// Where the model artifacts come from.
    pub fn model_source(&self) -> ModelSource {
        let source = ModelSource::from_identifier(&self.model);
        match &self.revision {
            Some(revision) => source.with_revision(revision.clone()),
            None => source,
        }
    }
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            output: default_output(),
            text: default_text(),
            onnx_file: default_onnx_file(),
            revision: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SynthesisConfig::default();
        assert_eq!(config.model, "Xenova/mms-tts-eng");
        assert_eq!(config.output, PathBuf::from("output.wav"));
        assert_eq!(config.text, "This is the default text.");
        assert_eq!(config.onnx_file, "onnx/model.onnx");
        assert!(config.revision.is_none());
    }

    #[test]
    fn test_builder_pattern() {
        let config = SynthesisConfig::new("org/model", "out/speech.wav", "hello")
            .with_onnx_file("onnx/model_quantized.onnx")
            .with_revision("v1");

        assert_eq!(config.model, "org/model");
        assert_eq!(config.output, PathBuf::from("out/speech.wav"));
        assert_eq!(config.text, "hello");
        assert_eq!(config.onnx_file, "onnx/model_quantized.onnx");
        assert_eq!(config.revision.as_deref(), Some("v1"));
    }

    #[test]
    fn test_model_source_carries_revision() {
        let source = SynthesisConfig::new("org/model", "out.wav", "hi")
            .with_revision("abc123")
            .model_source();
        assert_eq!(source.repo_id(), Some("org/model"));
        assert_eq!(source.revision(), Some("abc123"));
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let config: SynthesisConfig = serde_json::from_str(r#"{"text":"hej"}"#).unwrap();
        assert_eq!(config.text, "hej");
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.output, PathBuf::from(DEFAULT_OUTPUT));
    }
}
