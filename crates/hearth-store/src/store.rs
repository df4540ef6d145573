use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::{Deserialize, Serialize};

use hearth_core::error::{EngineError, Result};
use hearth_core::types::{DocumentSummary, Meta, SearchResult};

use crate::blob::{cosine_scores, read_matrix, write_matrix};

/// Per-document pointer held in `index.json`, keyed by document id.
///
/// Paths are relative to the store root so the whole directory can be moved.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexEntry {
    pub embeddings_file: String,
    pub metadata_file: String,
    pub chunk_count: usize,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreIndex {
    documents: BTreeMap<String, IndexEntry>,
}

/// Chunks + metadata persisted alongside a document's embedding matrix.
#[derive(Debug, Serialize, Deserialize)]
struct DocumentRecord {
    id: String,
    chunks: Vec<String>,
    metadata: Meta,
    embedding_dim: usize,
    chunk_count: usize,
    ingested_at: String,
}

/// Persistent similarity-search store: one `index.json` plus per-document
/// blob pairs under `documents/`, so deleting one document never rewrites
/// the others.
///
/// Write operations take `&mut self`; callers serialize writers (the index
/// file is not safe for concurrent writers across processes).
pub struct VectorStore {
    root: PathBuf,
    #[allow(dead_code)]
    documents_dir: PathBuf,
    index_file: PathBuf,
    index: StoreIndex,
}

impl VectorStore {
    /// Open (or create) a store rooted at `root`.
    pub fn open(root: &Path) -> Result<Self> {
        let documents_dir = root.join("documents");
        fs::create_dir_all(&documents_dir)?;
        let index_file = root.join("index.json");
        let index = Self::load_index(&index_file);
        Ok(Self { root: root.to_path_buf(), documents_dir, index_file, index })
    }

    fn load_index(index_file: &Path) -> StoreIndex {
        if !index_file.exists() {
            return StoreIndex::default();
        }
        match fs::read_to_string(index_file)
            .map_err(EngineError::from)
            .and_then(|s| serde_json::from_str(&s).map_err(EngineError::from))
        {
            Ok(index) => index,
            Err(e) => {
                tracing::warn!("unreadable index {}: {}; starting empty", index_file.display(), e);
                StoreIndex::default()
            }
        }
    }

    fn save_index(&self) -> Result<()> {
        let json = serde_json::to_string_pretty(&self.index)?;
        fs::write(&self.index_file, json)?;
        Ok(())
    }

    /// Filesystem-safe stem for a document id. Ids that need rewriting get a
    /// short content hash suffix so distinct ids never collide on disk.
    fn file_stem(doc_id: &str) -> String {
        let sanitized: String = doc_id
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.' { c } else { '_' })
            .collect();
        if sanitized == doc_id {
            sanitized
        } else {
            let tag = blake3::hash(doc_id.as_bytes()).to_hex();
            format!("{}-{}", sanitized, &tag.as_str()[..8])
        }
    }

    /// Persist a document's chunks, metadata and embedding matrix, then
    /// record it in the index. An existing entry for `doc_id` is replaced
    /// wholesale.
    pub fn add(
        &mut self,
        doc_id: &str,
        chunks: &[String],
        embeddings: &[Vec<f32>],
        metadata: Meta,
    ) -> Result<()> {
        if chunks.len() != embeddings.len() {
            return Err(EngineError::DimensionMismatch {
                expected: chunks.len(),
                got: embeddings.len(),
            });
        }
        let dim = embeddings.first().map_or(0, Vec::len);
        for row in embeddings {
            if row.len() != dim {
                return Err(EngineError::DimensionMismatch { expected: dim, got: row.len() });
            }
        }

        let stem = Self::file_stem(doc_id);
        let embeddings_rel = format!("documents/{}_embeddings.bin", stem);
        let metadata_rel = format!("documents/{}_metadata.json", stem);

        write_matrix(&self.root.join(&embeddings_rel), embeddings)?;

        let record = DocumentRecord {
            id: doc_id.to_string(),
            chunks: chunks.to_vec(),
            metadata,
            embedding_dim: dim,
            chunk_count: chunks.len(),
            ingested_at: Utc::now().to_rfc3339(),
        };
        let json = serde_json::to_string_pretty(&record)?;
        fs::write(self.root.join(&metadata_rel), json)?;

        self.index.documents.insert(
            doc_id.to_string(),
            IndexEntry {
                embeddings_file: embeddings_rel,
                metadata_file: metadata_rel,
                chunk_count: chunks.len(),
            },
        );
        self.save_index()?;
        tracing::debug!(doc_id, chunks = chunks.len(), dim, "document indexed");
        Ok(())
    }

    /// Rank every stored chunk against `query` by cosine similarity and
    /// return the global top `top_k`.
    ///
    /// Documents whose backing files are missing or corrupt are skipped for
    /// this query, never fatal.
    pub fn search(&self, query: &[f32], top_k: usize) -> Result<Vec<SearchResult>> {
        let mut results: Vec<SearchResult> = Vec::new();
        for (doc_id, entry) in &self.index.documents {
            match self.score_document(doc_id, entry, query) {
                Ok(mut hits) => results.append(&mut hits),
                Err(e) => {
                    tracing::warn!("skipping document {} during search: {}", doc_id, e);
                }
            }
        }
        results.sort_by(|a, b| {
            b.similarity.partial_cmp(&a.similarity).unwrap_or(std::cmp::Ordering::Equal)
        });
        results.truncate(top_k);
        Ok(results)
    }

    fn score_document(
        &self,
        doc_id: &str,
        entry: &IndexEntry,
        query: &[f32],
    ) -> Result<Vec<SearchResult>> {
        let record = self.read_record(entry)?;
        if record.chunks.len() != record.chunk_count {
            return Err(EngineError::VectorStoreIo(format!(
                "{}: chunk list length {} disagrees with chunk_count {}",
                entry.metadata_file,
                record.chunks.len(),
                record.chunk_count
            )));
        }
        let matrix = read_matrix(
            &self.root.join(&entry.embeddings_file),
            record.chunk_count,
            record.embedding_dim,
        )?;
        let scores = cosine_scores(query, &matrix);
        Ok(scores
            .into_iter()
            .enumerate()
            .map(|(i, similarity)| SearchResult {
                doc_id: doc_id.to_string(),
                chunk_index: i,
                chunk_text: record.chunks[i].clone(),
                similarity,
                metadata: record.metadata.clone(),
            })
            .collect())
    }

    fn read_record(&self, entry: &IndexEntry) -> Result<DocumentRecord> {
        let path = self.root.join(&entry.metadata_file);
        let text = fs::read_to_string(&path)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Remove a document's backing files and index entry. Returns `false`
    /// when the id was never indexed; the index is left unchanged.
    pub fn delete(&mut self, doc_id: &str) -> Result<bool> {
        let Some(entry) = self.index.documents.remove(doc_id) else {
            return Ok(false);
        };
        for rel in [&entry.embeddings_file, &entry.metadata_file] {
            let path = self.root.join(rel);
            if path.exists() {
                if let Err(e) = fs::remove_file(&path) {
                    tracing::warn!("could not remove {}: {}", path.display(), e);
                }
            }
        }
        self.save_index()?;
        Ok(true)
    }

    /// Summaries of all indexed documents, in stable id order. Documents
    /// with unreadable metadata are skipped.
    pub fn list(&self) -> Vec<DocumentSummary> {
        let mut docs = Vec::new();
        for (doc_id, entry) in &self.index.documents {
            match self.read_record(entry) {
                Ok(record) => docs.push(DocumentSummary {
                    id: doc_id.clone(),
                    chunk_count: record.chunk_count,
                    metadata: record.metadata,
                }),
                Err(e) => tracing::warn!("skipping document {} in listing: {}", doc_id, e),
            }
        }
        docs
    }

    pub fn contains(&self, doc_id: &str) -> bool {
        self.index.documents.contains_key(doc_id)
    }

    pub fn len(&self) -> usize {
        self.index.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.documents.is_empty()
    }

    /// Stored metadata mapping for one document, if indexed and readable.
    pub fn metadata(&self, doc_id: &str) -> Option<Meta> {
        let entry = self.index.documents.get(doc_id)?;
        self.read_record(entry).ok().map(|r| r.metadata)
    }
}
