//! Load → synthesize → write, strictly in that order.

use crate::config::SynthesisConfig;
use crate::error::SynthesisResult;
use crate::loader::load_model;
use crate::model::SpeechModel;
use crate::synthesizer::Synthesizer;
use crate::writer::write_wav;
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

/// Progress points reported while the pipeline runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stage {
    LoadingModel,
    ModelLoaded,
    GeneratingSpeech,
    OutputGenerated,
    SavingFile(PathBuf),
    FileSaved,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::LoadingModel => write!(f, "Loading model"),
            Stage::ModelLoaded => write!(f, "Model loaded"),
            Stage::GeneratingSpeech => write!(f, "Generating speech for provided text"),
            Stage::OutputGenerated => write!(f, "Output generated"),
            Stage::SavingFile(path) => write!(f, "Save output to the file {}", path.display()),
            Stage::FileSaved => write!(f, "File saved"),
        }
    }
}

/// What a finished run produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SynthesisReport {
    pub output: PathBuf,
    pub sample_rate: u32,
    pub channels: usize,
    pub frames: usize,
    pub duration_ms: u64,
}

/// Run the whole pipeline for `config`, loading the model it names.
pub fn run(
    config: &SynthesisConfig,
    mut on_stage: impl FnMut(&Stage),
) -> SynthesisResult<SynthesisReport> {
    on_stage(&Stage::LoadingModel);
    let (model, tokenizer) = load_model(config)?;
    on_stage(&Stage::ModelLoaded);

    let mut synthesizer = Synthesizer::new(model, tokenizer);
    synthesize_to_file(&mut synthesizer, config, on_stage)
}

/// Synthesize `config.text` with an already loaded synthesizer and write it
/// to `config.output`.
pub fn synthesize_to_file<M: SpeechModel>(
    synthesizer: &mut Synthesizer<M>,
    config: &SynthesisConfig,
    mut on_stage: impl FnMut(&Stage),
) -> SynthesisResult<SynthesisReport> {
    on_stage(&Stage::GeneratingSpeech);
    let (waveform, sample_rate) = synthesizer.synthesize(&config.text)?;
    on_stage(&Stage::OutputGenerated);

    on_stage(&Stage::SavingFile(config.output.clone()));
    write_wav(&waveform, sample_rate, &config.output)?;
    on_stage(&Stage::FileSaved);

    Ok(SynthesisReport {
        output: config.output.clone(),
        sample_rate,
        channels: waveform.channels(),
        frames: waveform.frames(),
        duration_ms: waveform.duration_ms(sample_rate),
    })
}
