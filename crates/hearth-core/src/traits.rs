use crate::error::Result;

/// A text embedding encoder with a fixed output dimension.
///
/// Returned vectors are L2-normalized so downstream cosine similarity
/// reduces to a dot product. `embed_batch` preserves input order and index
/// alignment: one vector per input, or the whole batch fails with a typed
/// error.
pub trait TextEmbedder: Send + Sync {
    fn dim(&self) -> usize;
    fn max_len(&self) -> usize;
    fn embed(&self, text: &str) -> Result<Vec<f32>>;
    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        texts.iter().map(|t| self.embed(t)).collect()
    }
}
