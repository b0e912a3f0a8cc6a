use super::{InferenceToken, SpeechModel};
use crate::error::{SynthesisError, SynthesisResult};
use crate::model_source::ModelSource;
use crate::types::{ModelInfo, TokenTensor, Waveform};
use ort::session::{RunOptions, Session, builder::GraphOptimizationLevel};
use ort::value::Value;
use serde::Deserialize;
use std::path::Path;

const INPUT_IDS: &str = "input_ids";
const ATTENTION_MASK: &str = "attention_mask";
const WAVEFORM: &str = "waveform";

/// The subset of `config.json` the pipeline relies on.
#[derive(Debug, Clone, Deserialize)]
struct VitsModelConfig {
    #[serde(default)]
    model_type: Option<String>,
    sampling_rate: u32,
}

/// VITS graph exported to ONNX, evaluated with ONNX Runtime.
pub struct OnnxVitsModel {
    session: Session,
    info: ModelInfo,
    has_attention_mask: bool,
    run_options: Option<RunOptions>,
}

impl OnnxVitsModel {
    /// Resolve `config.json` and the graph from `source` and open a session.
    pub fn load(source: &ModelSource, onnx_file: &str) -> SynthesisResult<Self> {
        let config_path = source.resolve_file("config.json")?;
        let config = read_model_config(&config_path)?;
        let graph_path = source.resolve_file(onnx_file)?;

        let session = create_session(&graph_path)?;
        let input_names: Vec<String> = session
            .inputs()
            .iter()
            .map(|input| input.name().to_string())
            .collect();
        log::debug!("graph inputs: {input_names:?}");

        if !input_names.iter().any(|name| name == INPUT_IDS) {
            return Err(SynthesisError::Load(format!(
                "graph {} has no '{INPUT_IDS}' input (found {input_names:?})",
                graph_path.display()
            )));
        }
        let has_attention_mask = input_names.iter().any(|name| name == ATTENTION_MASK);

        Ok(Self {
            session,
            info: ModelInfo {
                id: source.to_string(),
                sampling_rate: config.sampling_rate,
                graph_path: Some(graph_path),
            },
            has_attention_mask,
            run_options: None,
        })
    }
}

impl SpeechModel for OnnxVitsModel {
    fn info(&self) -> &ModelInfo {
        &self.info
    }

    fn enter_inference(&mut self) -> SynthesisResult<()> {
        let options = RunOptions::new().map_err(|err| SynthesisError::Inference(err.to_string()))?;
        self.run_options = Some(options);
        Ok(())
    }

    fn exit_inference(&mut self) {
        self.run_options = None;
    }

    fn forward(
        &mut self,
        tokens: &TokenTensor,
        _token: &InferenceToken,
    ) -> SynthesisResult<Waveform> {
        let run_options = self.run_options.as_ref().ok_or_else(|| {
            SynthesisError::Inference("forward pass requested outside inference mode".to_string())
        })?;

        let ids_value = Value::from_array(tokens.ids().clone())
            .map_err(|err| SynthesisError::Inference(err.to_string()))?;

        let result = if self.has_attention_mask {
            let mask_value = Value::from_array(tokens.attention_mask().clone())
                .map_err(|err| SynthesisError::Inference(err.to_string()))?;
            self.session.run_with_options(
                ort::inputs![
                    INPUT_IDS => ids_value,
                    ATTENTION_MASK => mask_value
                ],
                run_options,
            )
        } else {
            self.session
                .run_with_options(ort::inputs![INPUT_IDS => ids_value], run_options)
        };
        let outputs = result.map_err(|err| SynthesisError::Inference(err.to_string()))?;

        let (shape, data) = outputs
            .get(WAVEFORM)
            .ok_or_else(|| SynthesisError::Inference(format!("missing output '{WAVEFORM}'")))?
            .try_extract_tensor::<f32>()
            .map_err(|err| SynthesisError::Inference(err.to_string()))?;
        let dims: Vec<i64> = shape.iter().copied().collect();
        log::debug!("waveform shape: {dims:?}, length: {}", data.len());

        Waveform::from_model_output(&dims, data)
    }
}

fn read_model_config(path: &Path) -> SynthesisResult<VitsModelConfig> {
    let raw = std::fs::read_to_string(path)
        .map_err(|err| SynthesisError::Load(format!("failed to read {}: {err}", path.display())))?;
    parse_model_config(&raw)
        .map_err(|err| SynthesisError::Load(format!("{}: {err}", path.display())))
}

fn parse_model_config(raw: &str) -> Result<VitsModelConfig, String> {
    let config: VitsModelConfig =
        serde_json::from_str(raw).map_err(|err| format!("invalid model config: {err}"))?;
    if let Some(model_type) = &config.model_type
        && model_type != "vits"
    {
        return Err(format!(
            "unsupported model type '{model_type}', expected 'vits'"
        ));
    }
    if config.sampling_rate == 0 {
        return Err("sampling_rate must be positive".to_string());
    }
    Ok(config)
}

fn create_session(path: &Path) -> SynthesisResult<Session> {
    let session = Session::builder()
        .map_err(|err| SynthesisError::Load(err.to_string()))?
        .with_optimization_level(GraphOptimizationLevel::Level3)
        .map_err(|err| SynthesisError::Load(err.to_string()))?
        .commit_from_file(path)
        .map_err(|err| SynthesisError::Load(format!("{}: {err}", path.display())))?;
    Ok(session)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::InferenceScope;

    #[test]
    fn test_parse_mms_config() {
        let config = parse_model_config(
            r#"{"model_type": "vits", "sampling_rate": 16000, "noise_scale": 0.667}"#,
        )
        .unwrap();
        assert_eq!(config.sampling_rate, 16_000);
    }

    #[test]
    fn test_config_without_model_type_is_accepted() {
        let config = parse_model_config(r#"{"sampling_rate": 22050}"#).unwrap();
        assert_eq!(config.sampling_rate, 22_050);
    }

    #[test]
    fn test_other_architecture_is_rejected() {
        let err = parse_model_config(r#"{"model_type": "bert", "sampling_rate": 16000}"#)
            .unwrap_err();
        assert!(err.contains("bert"));
    }

    #[test]
    fn test_missing_sampling_rate_is_rejected() {
        assert!(parse_model_config(r#"{"model_type": "vits"}"#).is_err());
    }

    #[test]
    fn test_load_from_directory_without_config_fails() {
        let dir = tempfile::tempdir().unwrap();
        let source = ModelSource::from_dir(dir.path());
        match OnnxVitsModel::load(&source, "onnx/model.onnx") {
            Err(SynthesisError::Load(msg)) => assert!(msg.contains("config.json")),
            Err(other) => panic!("unexpected error: {other:?}"),
            Ok(_) => panic!("expected load failure"),
        }
    }

    #[test]
    fn test_load_without_graph_fails() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("config.json"),
            r#"{"model_type": "vits", "sampling_rate": 16000}"#,
        )
        .unwrap();
        let source = ModelSource::from_dir(dir.path());
        match OnnxVitsModel::load(&source, "onnx/model.onnx") {
            Err(SynthesisError::Load(msg)) => assert!(msg.contains("model.onnx")),
            Err(other) => panic!("unexpected error: {other:?}"),
            Ok(_) => panic!("expected load failure"),
        }
    }

    #[test]
    #[ignore = "requires HuggingFace model download"]
    fn test_load_and_run_mms_model() {
        let source = ModelSource::from_hf("Xenova/mms-tts-eng");
        let mut model = OnnxVitsModel::load(&source, "onnx/model.onnx").unwrap();
        assert_eq!(model.sampling_rate(), 16_000);
        assert!(
            model
                .info()
                .graph_path
                .as_ref()
                .is_some_and(|path| path.ends_with("onnx/model.onnx"))
        );

        let tokens = TokenTensor::from_ids(vec![0, 19, 0, 7, 0]).unwrap();
        let mut scope = InferenceScope::enter(&mut model).unwrap();
        let waveform = scope.forward(&tokens).unwrap();
        assert_eq!(waveform.channels(), 1);
        assert!(waveform.frames() > 0);
    }
}
