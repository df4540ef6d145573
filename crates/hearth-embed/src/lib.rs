//! Local embedding encoder.
//!
//! Runs a MiniLM-class BERT encoder through candle to map text chunks to
//! fixed-dimension unit vectors. `HEARTH_USE_FAKE_EMBEDDINGS=1` switches to
//! a deterministic hash embedder for fast tests and development without
//! model weights.

#![deny(warnings)]
#![deny(dead_code)]
#![deny(unused_variables)]
#![deny(unused_imports)]

pub mod device;
pub mod pooling;
pub mod tokenize;

use std::path::Path;

use candle_core::{DType, Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::models::bert::{BertModel, Config as BertConfig, DTYPE};
use tokenizers::Tokenizer;

use hearth_core::error::{EngineError, Result};
use hearth_core::traits::TextEmbedder;

use crate::device::select_device;
use crate::pooling::masked_mean_l2;
use crate::tokenize::tokenize_on_device;

/// The one architecture field the encoder needs beyond what the candle
/// model reads for itself.
#[derive(serde::Deserialize)]
struct EncoderDims {
    hidden_size: usize,
}

/// Sentence encoder backed by a BERT-family model in safetensors format.
pub struct BertEmbedder {
    model: BertModel,
    tokenizer: Tokenizer,
    device: Device,
    dim: usize,
    max_len: usize,
    pad_id: u32,
}

impl BertEmbedder {
    /// Load the encoder from a model directory containing
    /// `model.safetensors`, `tokenizer.json` and `config.json`.
    pub fn load(model_dir: &Path) -> Result<Self> {
        let device = select_device();

        let weights_path = model_dir.join("model.safetensors");
        if !weights_path.exists() {
            return Err(EngineError::ModelNotFound(weights_path.display().to_string()));
        }

        let tokenizer_path = model_dir.join("tokenizer.json");
        let tokenizer = Tokenizer::from_file(&tokenizer_path).map_err(|e| {
            EngineError::LoadFailure(format!(
                "tokenizer {}: {}",
                tokenizer_path.display(),
                e
            ))
        })?;

        let config_path = model_dir.join("config.json");
        let config_text = std::fs::read_to_string(&config_path)
            .map_err(|e| EngineError::LoadFailure(format!("{}: {}", config_path.display(), e)))?;
        let config: BertConfig = serde_json::from_str(&config_text)
            .map_err(|e| EngineError::LoadFailure(format!("{}: {}", config_path.display(), e)))?;
        let dims: EncoderDims = serde_json::from_str(&config_text)
            .map_err(|e| EngineError::LoadFailure(format!("{}: {}", config_path.display(), e)))?;

        // SAFETY: the safetensors file is mmapped read-only and outlives the builder.
        let vb = unsafe {
            VarBuilder::from_mmaped_safetensors(&[&weights_path], DTYPE, &device)
                .map_err(|e| EngineError::LoadFailure(e.to_string()))?
        };
        let dim = dims.hidden_size;
        let model =
            BertModel::load(vb, &config).map_err(|e| EngineError::LoadFailure(e.to_string()))?;
        let pad_id = tokenizer.token_to_id("[PAD]").unwrap_or(0);

        tracing::info!(dim, "embedding encoder loaded from {}", model_dir.display());
        Ok(Self { model, tokenizer, device, dim, max_len: 256, pad_id })
    }
}

impl TextEmbedder for BertEmbedder {
    fn dim(&self) -> usize {
        self.dim
    }

    fn max_len(&self) -> usize {
        self.max_len
    }

    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let (input_ids, attention_mask) =
            tokenize_on_device(&self.tokenizer, text, self.max_len, self.pad_id, &self.device)?;
        let token_type_ids = Tensor::zeros((1, self.max_len), DType::U32, &self.device)
            .map_err(|e| EngineError::Embedding(e.to_string()))?;

        let hidden = self
            .model
            .forward(&input_ids, &token_type_ids, Some(&attention_mask))
            .map_err(|e| EngineError::Embedding(e.to_string()))?;
        let pooled = masked_mean_l2(&hidden, &attention_mask)
            .map_err(|e| EngineError::Embedding(e.to_string()))?;

        let out: Vec<f32> = pooled
            .to_device(&Device::Cpu)
            .and_then(|t| t.squeeze(0))
            .and_then(|t| t.to_vec1())
            .map_err(|e| EngineError::Embedding(e.to_string()))?;
        debug_assert_eq!(out.len(), self.dim);
        Ok(out)
    }
}

/// Deterministic bag-of-words hash embedder.
///
/// Unit-normalized like the real encoder; same text always maps to the same
/// vector, which makes retrieval tests exact.
pub struct FakeEmbedder {
    dim: usize,
}

impl FakeEmbedder {
    pub fn new(dim: usize) -> Self {
        Self { dim }
    }
}

impl TextEmbedder for FakeEmbedder {
    fn dim(&self) -> usize {
        self.dim
    }

    fn max_len(&self) -> usize {
        256
    }

    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        use std::hash::{Hash, Hasher};
        use twox_hash::XxHash64;

        let mut v = vec![0f32; self.dim];
        for (i, token) in text.split_whitespace().enumerate() {
            let mut hasher = XxHash64::with_seed(0);
            token.hash(&mut hasher);
            let h = hasher.finish();
            let idx = (h as usize) % self.dim;
            let val = (((h >> 32) as u32) as f32) / (u32::MAX as f32);
            v[idx] += val + (i as f32 % 3.0) * 0.01;
        }
        let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt().max(1e-6);
        for x in &mut v {
            *x /= norm;
        }
        Ok(v)
    }
}

/// Embedding dimension of the fake encoder and the default MiniLM models.
pub const DEFAULT_EMBEDDING_DIM: usize = 384;

/// Build the configured embedder: the fake hash embedder when
/// `HEARTH_USE_FAKE_EMBEDDINGS=1`, otherwise the BERT encoder loaded from
/// `model_dir`.
pub fn default_embedder(model_dir: &Path) -> Result<Box<dyn TextEmbedder>> {
    let use_fake = std::env::var("HEARTH_USE_FAKE_EMBEDDINGS")
        .ok()
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false);
    if use_fake {
        tracing::info!("using fake embeddings");
        return Ok(Box::new(FakeEmbedder::new(DEFAULT_EMBEDDING_DIM)));
    }
    Ok(Box::new(BertEmbedder::load(model_dir)?))
}
