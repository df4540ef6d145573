//! Inference session: owns the loaded model bundle and its lifecycle.

use std::path::Path;

use serde::Deserialize;
use tokenizers::Tokenizer;

use hearth_core::error::{EngineError, Result};
use hearth_core::types::GenerationParams;

use crate::codec::TextCodec;
use crate::model::{CandleCausalLm, FakeLanguageModel, LanguageModel};

/// The engine-relevant slice of a model directory's `config.json`:
/// special-token layout, context window and persisted generation defaults.
/// Architecture fields are parsed separately by the model runtime.
#[derive(Debug, Deserialize)]
struct ModelFileConfig {
    #[serde(default = "default_bos")]
    bos_token_id: u32,
    #[serde(default = "default_eos")]
    eos_token_id: u32,
    #[serde(default, alias = "max_position_embeddings")]
    context_length: Option<usize>,
    /// Token ids at or below this value are control tokens and never
    /// decode to text. Defaults to the larger of BOS/EOS.
    #[serde(default)]
    control_token_threshold: Option<u32>,
    #[serde(default)]
    generation: Option<GenerationParams>,
}

fn default_bos() -> u32 {
    1
}

fn default_eos() -> u32 {
    2
}

const DEFAULT_CONTEXT_LENGTH: usize = 4096;

/// Everything owned by a loaded model: runtime weights handle, vocabulary
/// codec, generation defaults and the end-of-sequence id. Immutable after
/// load; dropped wholesale on unload.
pub struct ModelBundle {
    pub model: Box<dyn LanguageModel>,
    pub codec: TextCodec,
    pub defaults: GenerationParams,
    pub eos_id: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Unloaded,
    Loading,
    Ready,
}

/// Exclusive owner of at most one loaded model.
///
/// `load` is a full replace; `step` is only valid in `Ready`; `unload` is
/// idempotent. Callers must not unload while a generation is in flight —
/// the engine context serializes those behind one lock.
pub struct InferenceSession {
    state: SessionState,
    bundle: Option<ModelBundle>,
}

impl Default for InferenceSession {
    fn default() -> Self {
        Self::new()
    }
}

impl InferenceSession {
    pub fn new() -> Self {
        Self { state: SessionState::Unloaded, bundle: None }
    }

    /// Build a session around an already-constructed bundle. Used by tests
    /// and embedded callers that assemble their own runtime.
    pub fn from_bundle(bundle: ModelBundle) -> Self {
        Self { state: SessionState::Ready, bundle: Some(bundle) }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_ready(&self) -> bool {
        self.state == SessionState::Ready
    }

    /// Load a model directory (`model.safetensors`, `tokenizer.json`,
    /// `config.json`). Replaces any previously loaded bundle. On failure
    /// the session returns to `Unloaded` with nothing loaded.
    ///
    /// `HEARTH_USE_FAKE_MODEL=1` substitutes the deterministic fake model
    /// for the candle runtime; tokenizer and config are still read.
    pub fn load(&mut self, model_dir: &Path) -> Result<()> {
        self.bundle = None;
        self.state = SessionState::Loading;
        match Self::load_bundle(model_dir) {
            Ok(bundle) => {
                self.bundle = Some(bundle);
                self.state = SessionState::Ready;
                tracing::info!("model ready: {}", model_dir.display());
                Ok(())
            }
            Err(e) => {
                self.state = SessionState::Unloaded;
                Err(e)
            }
        }
    }

    fn load_bundle(model_dir: &Path) -> Result<ModelBundle> {
        let use_fake = std::env::var("HEARTH_USE_FAKE_MODEL")
            .ok()
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(false);

        let weights_path = model_dir.join("model.safetensors");
        if !use_fake && !weights_path.exists() {
            return Err(EngineError::ModelNotFound(weights_path.display().to_string()));
        }

        let tokenizer_path = model_dir.join("tokenizer.json");
        let tokenizer = Tokenizer::from_file(&tokenizer_path).map_err(|e| {
            EngineError::LoadFailure(format!("tokenizer {}: {}", tokenizer_path.display(), e))
        })?;

        let config_path = model_dir.join("config.json");
        let config_text = std::fs::read_to_string(&config_path)
            .map_err(|e| EngineError::LoadFailure(format!("{}: {}", config_path.display(), e)))?;
        let file_config: ModelFileConfig = serde_json::from_str(&config_text)
            .map_err(|e| EngineError::LoadFailure(format!("{}: {}", config_path.display(), e)))?;

        let context_length = file_config.context_length.unwrap_or(DEFAULT_CONTEXT_LENGTH);
        let control_threshold = file_config
            .control_token_threshold
            .unwrap_or(file_config.bos_token_id.max(file_config.eos_token_id));
        let codec = TextCodec::new(
            tokenizer,
            file_config.bos_token_id,
            file_config.eos_token_id,
            control_threshold,
            context_length,
        );

        let model: Box<dyn LanguageModel> = if use_fake {
            tracing::info!("using fake language model");
            Box::new(FakeLanguageModel::new(
                codec.vocab_size(),
                context_length,
                file_config.eos_token_id,
            ))
        } else {
            Box::new(CandleCausalLm::load(model_dir, &config_text, context_length)?)
        };

        Ok(ModelBundle {
            model,
            codec,
            defaults: file_config.generation.unwrap_or_default(),
            eos_id: file_config.eos_token_id,
        })
    }

    /// Next-token logits for the given history. Only valid in `Ready`.
    pub fn step(&mut self, tokens: &[u32]) -> Result<Vec<f32>> {
        match (&self.state, self.bundle.as_mut()) {
            (SessionState::Ready, Some(bundle)) => bundle.model.step(tokens),
            _ => Err(EngineError::NotLoaded),
        }
    }

    pub fn bundle(&self) -> Result<&ModelBundle> {
        self.bundle.as_ref().ok_or(EngineError::NotLoaded)
    }

    pub fn bundle_mut(&mut self) -> Result<&mut ModelBundle> {
        self.bundle.as_mut().ok_or(EngineError::NotLoaded)
    }

    /// Release the runtime handle. Safe to call repeatedly.
    pub fn unload(&mut self) {
        if self.bundle.take().is_some() {
            tracing::info!("model unloaded");
        }
        self.state = SessionState::Unloaded;
    }
}
