//! Domain types shared by the inference and retrieval engines.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub type DocId = String;
pub type Meta = HashMap<String, String>;

/// Sampling and length parameters for one generation request.
///
/// Defaults mirror the persisted settings surface; every field can be
/// overridden per request.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationParams {
    pub temperature: f32,
    pub top_k: usize,
    pub top_p: f32,
    pub max_tokens: usize,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self { temperature: 0.7, top_k: 40, top_p: 0.9, max_tokens: 512 }
    }
}

/// Per-request overrides of the persisted generation defaults. `None`
/// fields fall through to the defaults.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationOverrides {
    pub temperature: Option<f32>,
    pub top_k: Option<usize>,
    pub top_p: Option<f32>,
    pub max_tokens: Option<usize>,
}

impl GenerationParams {
    pub fn with_overrides(self, overrides: &GenerationOverrides) -> Self {
        Self {
            temperature: overrides.temperature.unwrap_or(self.temperature),
            top_k: overrides.top_k.unwrap_or(self.top_k),
            top_p: overrides.top_p.unwrap_or(self.top_p),
            max_tokens: overrides.max_tokens.unwrap_or(self.max_tokens),
        }
    }
}

/// Why a generation loop stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FinishReason {
    /// The model produced its end-of-sequence token.
    Completed,
    /// The `max_tokens` budget was exhausted.
    MaxTokensReached,
    /// The caller requested cancellation.
    Cancelled,
    /// The loop aborted; the message describes the failure.
    Error(String),
}

/// Final outcome of one generation request.
#[derive(Debug, Clone)]
pub struct GenerationResult {
    pub text: String,
    pub finish: FinishReason,
}

/// One ranked chunk returned by a similarity query.
///
/// Ephemeral: produced fresh per query, never persisted. `similarity` is a
/// cosine score in `[-1, 1]`, higher is better.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    pub doc_id: DocId,
    pub chunk_index: usize,
    pub chunk_text: String,
    pub similarity: f32,
    pub metadata: Meta,
}

/// Per-document listing entry from the vector store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentSummary {
    pub id: DocId,
    pub chunk_count: usize,
    pub metadata: Meta,
}
