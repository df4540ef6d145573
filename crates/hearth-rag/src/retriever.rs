use hearth_core::chunker::ChunkingConfig;
use hearth_core::error::Result;
use hearth_core::traits::TextEmbedder;
use hearth_core::types::{DocumentSummary, Meta, SearchResult};
use hearth_store::VectorStore;

/// Composition of chunker, embedding encoder and vector store. Holds no
/// state of its own beyond its components.
pub struct Retriever {
    chunking: ChunkingConfig,
    embedder: Box<dyn TextEmbedder>,
    store: VectorStore,
}

impl Retriever {
    pub fn new(chunking: ChunkingConfig, embedder: Box<dyn TextEmbedder>, store: VectorStore) -> Self {
        Self { chunking, embedder, store }
    }

    /// Chunk, embed and persist one document. Re-ingesting an id replaces
    /// the stored document wholesale. Returns the number of chunks
    /// indexed; empty text indexes nothing and returns 0.
    pub fn ingest(&mut self, doc_id: &str, raw_text: &str, mut metadata: Meta) -> Result<usize> {
        let chunks = self.chunking.chunk(raw_text)?;
        if chunks.is_empty() {
            tracing::debug!(doc_id, "no chunks produced, skipping");
            return Ok(0);
        }
        let embeddings = self.embedder.embed_batch(&chunks)?;
        metadata.insert("content_hash".to_string(), content_hash(raw_text));
        self.store.add(doc_id, &chunks, &embeddings, metadata)?;
        tracing::info!(doc_id, chunks = chunks.len(), "document ingested");
        Ok(chunks.len())
    }

    /// Embed the query and rank stored chunks by cosine similarity.
    pub fn retrieve(&self, query_text: &str, top_k: usize) -> Result<Vec<SearchResult>> {
        let query = self.embedder.embed(query_text)?;
        self.store.search(&query, top_k)
    }

    /// True when `doc_id` is not yet indexed or its stored content hash
    /// differs from `raw_text` — i.e. ingestion would change the store.
    pub fn needs_ingest(&self, doc_id: &str, raw_text: &str) -> bool {
        match self.store.metadata(doc_id) {
            Some(meta) => meta.get("content_hash") != Some(&content_hash(raw_text)),
            None => true,
        }
    }

    pub fn delete_document(&mut self, doc_id: &str) -> Result<bool> {
        self.store.delete(doc_id)
    }

    pub fn documents(&self) -> Vec<DocumentSummary> {
        self.store.list()
    }

    pub fn embedding_dim(&self) -> usize {
        self.embedder.dim()
    }
}

fn content_hash(text: &str) -> String {
    blake3::hash(text.as_bytes()).to_hex().to_string()
}
