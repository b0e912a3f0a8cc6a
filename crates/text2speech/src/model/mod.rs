//! Inference backends and the scoped inference mode they run under.

mod onnx;

pub use onnx::OnnxVitsModel;

use crate::error::SynthesisResult;
use crate::types::{ModelInfo, TokenTensor, Waveform};

/// Proof that a forward pass happens inside an [`InferenceScope`].
///
/// Only this module can construct one, so [`SpeechModel::forward`] is
/// unreachable outside a scope.
#[derive(Debug)]
pub struct InferenceToken {
    _private: (),
}

/// Trait abstraction for text-to-waveform models.
pub trait SpeechModel {
    fn info(&self) -> &ModelInfo;

    fn sampling_rate(&self) -> u32 {
        self.info().sampling_rate
    }

    /// Acquire whatever the backend needs for read-only evaluation.
    ///
    /// Must either fully succeed or leave the model unchanged.
    fn enter_inference(&mut self) -> SynthesisResult<()>;

    /// Release resources taken by [`SpeechModel::enter_inference`].
    fn exit_inference(&mut self);

    /// Run one forward pass over a token tensor.
    fn forward(&mut self, tokens: &TokenTensor, token: &InferenceToken)
    -> SynthesisResult<Waveform>;
}

/// Read-only inference mode held for the duration of a forward pass.
///
/// Released on drop, so early returns and unwinding both leave the model
/// outside inference mode.
pub struct InferenceScope<'m, M: SpeechModel + ?Sized> {
    model: &'m mut M,
    token: InferenceToken,
}

impl<'m, M: SpeechModel + ?Sized> InferenceScope<'m, M> {
    pub fn enter(model: &'m mut M) -> SynthesisResult<Self> {
        model.enter_inference()?;
        log::debug!("entered inference mode for {}", model.info().id);
        Ok(Self {
            model,
            token: InferenceToken { _private: () },
        })
    }

    pub fn forward(&mut self, tokens: &TokenTensor) -> SynthesisResult<Waveform> {
        self.model.forward(tokens, &self.token)
    }
}

impl<M: SpeechModel + ?Sized> Drop for InferenceScope<'_, M> {
    fn drop(&mut self) {
        self.model.exit_inference();
        log::debug!("released inference mode for {}", self.model.info().id);
    }
}
