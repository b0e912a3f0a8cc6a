use crate::config::SynthesisConfig;
use crate::error::SynthesisResult;
use crate::model::{OnnxVitsModel, SpeechModel};
use crate::tokenizer::VitsTokenizer;

/// Resolve the configured model identifier into a model and its tokenizer.
///
/// The first call for a hub model may download and cache its artifacts.
pub fn load_model(config: &SynthesisConfig) -> SynthesisResult<(OnnxVitsModel, VitsTokenizer)> {
    let source = config.model_source();
    log::info!("loading model from {source}");

    let vocab_path = source.resolve_file("vocab.json")?;
    let tokenizer_config_path = source.resolve_optional_file("tokenizer_config.json")?;
    let tokenizer = VitsTokenizer::from_files(&vocab_path, tokenizer_config_path.as_deref())?;

    let model = OnnxVitsModel::load(&source, &config.onnx_file)?;
    if let Some(graph_path) = &model.info().graph_path {
        log::debug!("graph loaded from {}", graph_path.display());
    }
    log::info!(
        "model ready: {} Hz, {} vocabulary entries",
        model.sampling_rate(),
        tokenizer.vocab_size()
    );

    Ok((model, tokenizer))
}
