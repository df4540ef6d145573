//! Word-boundary sliding-window chunking for document ingestion.

use crate::error::{EngineError, Result};

/// Window size and overlap, counted in whitespace-delimited words.
#[derive(Debug, Clone, Copy)]
pub struct ChunkingConfig {
    pub chunk_size: usize,
    pub overlap: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self { chunk_size: 512, overlap: 50 }
    }
}

impl ChunkingConfig {
    pub fn chunk(&self, text: &str) -> Result<Vec<String>> {
        chunk(text, self.chunk_size, self.overlap)
    }
}

/// Split `text` into overlapping word windows of `chunk_size` words with
/// stride `chunk_size - overlap`.
///
/// Text with at most `chunk_size` words comes back as a single chunk equal
/// to the input. The final chunk may be shorter than `chunk_size`; it is
/// kept when non-empty. Concatenating chunks with the overlap removed
/// reconstructs the original word sequence.
pub fn chunk(text: &str, chunk_size: usize, overlap: usize) -> Result<Vec<String>> {
    if chunk_size == 0 || overlap >= chunk_size {
        return Err(EngineError::InvalidChunking { chunk_size, overlap });
    }

    let words: Vec<&str> = text.split_whitespace().collect();
    if words.is_empty() {
        return Ok(vec![]);
    }
    if words.len() <= chunk_size {
        return Ok(vec![text.to_string()]);
    }

    let stride = chunk_size - overlap;
    let mut chunks = Vec::new();
    let mut start = 0;
    while start < words.len() {
        let end = (start + chunk_size).min(words.len());
        chunks.push(words[start..end].join(" "));
        if end >= words.len() {
            break;
        }
        start += stride;
    }
    Ok(chunks)
}
