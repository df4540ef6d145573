//! Text <-> token-id codec around a `tokenizers` vocabulary.

use hearth_core::error::{EngineError, Result};
use tokenizers::Tokenizer;

/// Wraps the vocabulary/merge table with the model's special-token layout.
///
/// Encoding prepends the beginning-of-sequence marker and appends nothing;
/// decoding skips control tokens and stops at the end-of-sequence token.
pub struct TextCodec {
    tokenizer: Tokenizer,
    bos_id: u32,
    eos_id: u32,
    control_threshold: u32,
    context_length: usize,
}

impl TextCodec {
    pub fn new(
        tokenizer: Tokenizer,
        bos_id: u32,
        eos_id: u32,
        control_threshold: u32,
        context_length: usize,
    ) -> Self {
        Self { tokenizer, bos_id, eos_id, control_threshold, context_length }
    }

    pub fn bos_id(&self) -> u32 {
        self.bos_id
    }

    pub fn eos_id(&self) -> u32 {
        self.eos_id
    }

    pub fn context_length(&self) -> usize {
        self.context_length
    }

    pub fn vocab_size(&self) -> usize {
        self.tokenizer.get_vocab_size(true)
    }

    /// Encode `text`, prepending BOS. Sequences longer than the context
    /// window are truncated oldest-first: the BOS marker and the most
    /// recent tokens survive, so the latest user turn is never dropped.
    pub fn encode(&self, text: &str) -> Result<Vec<u32>> {
        let enc = self
            .tokenizer
            .encode(text, false)
            .map_err(|e| EngineError::Tokenization(e.to_string()))?;
        let body = enc.get_ids();

        let mut ids = Vec::with_capacity(body.len() + 1);
        ids.push(self.bos_id);
        ids.extend_from_slice(body);
        Ok(self.clamp_window(ids))
    }

    /// Oldest-first truncation of a token history to the context window.
    pub fn clamp_window(&self, mut ids: Vec<u32>) -> Vec<u32> {
        if ids.len() <= self.context_length {
            return ids;
        }
        let keep = self.context_length - 1;
        let tail: Vec<u32> = ids.split_off(ids.len() - keep);
        let mut clamped = Vec::with_capacity(self.context_length);
        clamped.push(self.bos_id);
        clamped.extend(tail);
        clamped
    }

    /// Decode a token sequence to text, skipping control tokens and
    /// stopping at (and excluding) the first end-of-sequence token.
    pub fn decode(&self, ids: &[u32]) -> Result<String> {
        let kept: Vec<u32> = ids
            .iter()
            .copied()
            .take_while(|&id| id != self.eos_id)
            .filter(|&id| id > self.control_threshold)
            .collect();
        self.tokenizer
            .decode(&kept, true)
            .map_err(|e| EngineError::Tokenization(e.to_string()))
    }

    /// Decode one freshly generated token for streaming. Control tokens
    /// decode to the empty string.
    pub fn decode_token(&self, id: u32) -> Result<String> {
        if id <= self.control_threshold {
            return Ok(String::new());
        }
        self.tokenizer
            .decode(&[id], true)
            .map_err(|e| EngineError::Tokenization(e.to_string()))
    }
}
