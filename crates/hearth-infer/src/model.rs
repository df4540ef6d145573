//! The language-model seam behind the inference session.

use std::path::Path;

use candle_core::{DType, Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::models::llama::{Cache, Config, Llama, LlamaConfig};

use hearth_core::error::{EngineError, Result};

use crate::device::select_device;

/// One autoregressive step: given the token history, produce next-token
/// logits over the whole vocabulary.
///
/// `step` takes the full history each call and must behave as a pure
/// function of it, so the generation loop owns all sequence state.
pub trait LanguageModel: Send {
    fn vocab_size(&self) -> usize;
    fn context_length(&self) -> usize;
    fn step(&mut self, tokens: &[u32]) -> Result<Vec<f32>>;
}

/// Causal LM runtime backed by candle llama-family weights in safetensors
/// format.
pub struct CandleCausalLm {
    model: Llama,
    config: Config,
    device: Device,
    context_length: usize,
}

impl CandleCausalLm {
    /// Load weights + architecture config from a model directory. The
    /// caller has already verified the weight file exists.
    pub fn load(model_dir: &Path, config_json: &str, context_length: usize) -> Result<Self> {
        let device = select_device();

        let llama_config: LlamaConfig = serde_json::from_str(config_json)
            .map_err(|e| EngineError::LoadFailure(format!("config.json: {}", e)))?;
        let config = llama_config.into_config(false);

        let weights_path = model_dir.join("model.safetensors");
        // SAFETY: the safetensors file is mmapped read-only and outlives the builder.
        let vb = unsafe {
            VarBuilder::from_mmaped_safetensors(&[&weights_path], DType::F32, &device)
                .map_err(|e| EngineError::LoadFailure(e.to_string()))?
        };
        let model = Llama::load(vb, &config).map_err(|e| EngineError::LoadFailure(e.to_string()))?;

        tracing::info!(
            vocab = config.vocab_size,
            context_length,
            "model weights loaded from {}",
            model_dir.display()
        );
        Ok(Self { model, config, device, context_length })
    }
}

impl LanguageModel for CandleCausalLm {
    fn vocab_size(&self) -> usize {
        self.config.vocab_size
    }

    fn context_length(&self) -> usize {
        self.context_length
    }

    fn step(&mut self, tokens: &[u32]) -> Result<Vec<f32>> {
        if tokens.is_empty() {
            return Err(EngineError::Generation("empty token history".to_string()));
        }
        // Fresh cache per step: the whole history is re-attended, keeping
        // each step a pure function of its input.
        let mut cache = Cache::new(false, DType::F32, &self.config, &self.device)
            .map_err(|e| EngineError::Generation(e.to_string()))?;
        let input = Tensor::new(tokens, &self.device)
            .and_then(|t| t.unsqueeze(0))
            .map_err(|e| EngineError::Generation(e.to_string()))?;
        let logits = self
            .model
            .forward(&input, 0, &mut cache)
            .and_then(|t| t.squeeze(0))
            .and_then(|t| t.to_dtype(DType::F32))
            .and_then(|t| t.to_vec1::<f32>())
            .map_err(|e| EngineError::Generation(e.to_string()))?;
        Ok(logits)
    }
}

/// Deterministic stand-in model for tests and weight-free development
/// (`HEARTH_USE_FAKE_MODEL=1`).
///
/// Scripted mode emits a fixed token sequence then end-of-sequence;
/// unscripted mode derives the favored token from the history.
pub struct FakeLanguageModel {
    vocab_size: usize,
    context_length: usize,
    eos_id: u32,
    script: Option<Vec<u32>>,
    steps: usize,
}

impl FakeLanguageModel {
    pub fn new(vocab_size: usize, context_length: usize, eos_id: u32) -> Self {
        Self { vocab_size, context_length, eos_id, script: None, steps: 0 }
    }

    pub fn scripted(script: Vec<u32>, vocab_size: usize, context_length: usize, eos_id: u32) -> Self {
        Self { vocab_size, context_length, eos_id, script: Some(script), steps: 0 }
    }
}

impl LanguageModel for FakeLanguageModel {
    fn vocab_size(&self) -> usize {
        self.vocab_size
    }

    fn context_length(&self) -> usize {
        self.context_length
    }

    fn step(&mut self, tokens: &[u32]) -> Result<Vec<f32>> {
        if tokens.is_empty() {
            return Err(EngineError::Generation("empty token history".to_string()));
        }
        let favored = match &self.script {
            Some(script) => script.get(self.steps).copied().unwrap_or(self.eos_id),
            None => {
                let last = *tokens.last().unwrap_or(&0);
                let mut id = (last.wrapping_mul(31).wrapping_add(tokens.len() as u32 * 7))
                    % self.vocab_size as u32;
                if id == self.eos_id {
                    id = (id + 1) % self.vocab_size as u32;
                }
                id
            }
        };
        self.steps += 1;

        let mut logits = vec![0.0f32; self.vocab_size];
        if let Some(slot) = logits.get_mut(favored as usize) {
            *slot = 12.0;
        }
        Ok(logits)
    }
}
