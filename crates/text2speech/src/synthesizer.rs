use crate::error::SynthesisResult;
use crate::model::{InferenceScope, SpeechModel};
use crate::tokenizer::VitsTokenizer;
use crate::types::{TokenTensor, Waveform};

/// Text in, waveform out.
pub struct Synthesizer<M: SpeechModel> {
    tokenizer: VitsTokenizer,
    model: M,
}

impl<M: SpeechModel> Synthesizer<M> {
    pub fn new(model: M, tokenizer: VitsTokenizer) -> Self {
        Self { tokenizer, model }
    }

    pub fn encode(&self, text: &str) -> SynthesisResult<TokenTensor> {
        self.tokenizer.encode(text)
    }

    /// Encode `text` and run one forward pass inside inference mode.
    ///
    /// Returns the waveform together with the model's sampling rate.
    pub fn synthesize(&mut self, text: &str) -> SynthesisResult<(Waveform, u32)> {
        let tokens = self.encode(text)?;
        let waveform = {
            let mut scope = InferenceScope::enter(&mut self.model)?;
            scope.forward(&tokens)?
        };
        let sampling_rate = self.model.sampling_rate();
        log::debug!(
            "synthesized {} frames x {} channel(s) at {} Hz ({} ms)",
            waveform.frames(),
            waveform.channels(),
            sampling_rate,
            waveform.duration_ms(sampling_rate)
        );
        Ok((waveform, sampling_rate))
    }

    pub fn model(&self) -> &M {
        &self.model
    }
}
