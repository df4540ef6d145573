//! The engine context: one inference session + one retriever, constructed
//! at startup and threaded through calls instead of living in globals.

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, RwLock, RwLockReadGuard, RwLockWriteGuard};

use hearth_core::error::{EngineError, Result};
use hearth_core::types::{DocumentSummary, GenerationOverrides, GenerationParams, Meta, SearchResult};
use hearth_infer::{stream, GenerationRequest, InferenceSession, StreamingGeneration};

use crate::prompt::build_prompt;
use crate::retriever::Retriever;

/// Number of retrieved chunks prepended to a prompt by default.
pub const DEFAULT_RETRIEVAL_K: usize = 3;

/// Owns the loaded model and the vector store for one engine instance.
///
/// The session mutex makes load/unload and generation mutually exclusive;
/// the retriever lock serializes ingestion and deletion (single writer)
/// while searches share read access. All CPU-bound work runs on blocking
/// workers so the caller's execution context stays responsive.
pub struct EngineContext {
    session: Arc<Mutex<InferenceSession>>,
    retriever: Arc<RwLock<Retriever>>,
    defaults: GenerationParams,
}

impl EngineContext {
    pub fn new(retriever: Retriever, defaults: GenerationParams) -> Self {
        Self {
            session: Arc::new(Mutex::new(InferenceSession::new())),
            retriever: Arc::new(RwLock::new(retriever)),
            defaults,
        }
    }

    pub fn defaults(&self) -> GenerationParams {
        self.defaults
    }

    fn lock_session(&self) -> MutexGuard<'_, InferenceSession> {
        match self.session.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn read_retriever(&self) -> RwLockReadGuard<'_, Retriever> {
        match self.retriever.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn write_retriever(&self) -> RwLockWriteGuard<'_, Retriever> {
        match self.retriever.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Load a model directory into the session off the caller's context.
    /// Waits for any in-flight generation to finish first (the session
    /// lock serializes them).
    pub async fn load_model(&self, model_dir: &Path) -> Result<()> {
        let session = Arc::clone(&self.session);
        let dir = model_dir.to_path_buf();
        tokio::task::spawn_blocking(move || {
            let mut guard = match session.lock() {
                Ok(g) => g,
                Err(p) => p.into_inner(),
            };
            guard.load(&dir)
        })
        .await
        .map_err(|e| EngineError::LoadFailure(format!("load worker failed: {}", e)))?
    }

    pub fn unload_model(&self) {
        self.lock_session().unload();
    }

    pub fn model_ready(&self) -> bool {
        self.lock_session().is_ready()
    }

    /// Ingest one document through chunker -> encoder -> store on a
    /// blocking worker. Writers are serialized by the retriever lock.
    pub async fn ingest_document(&self, doc_id: &str, raw_text: &str, metadata: Meta) -> Result<usize> {
        let retriever = Arc::clone(&self.retriever);
        let doc_id = doc_id.to_string();
        let raw_text = raw_text.to_string();
        tokio::task::spawn_blocking(move || {
            let mut guard = match retriever.write() {
                Ok(g) => g,
                Err(p) => p.into_inner(),
            };
            guard.ingest(&doc_id, &raw_text, metadata)
        })
        .await
        .map_err(|e| EngineError::VectorStoreIo(format!("ingest worker failed: {}", e)))?
    }

    /// Rank stored chunks against a query off the caller's context.
    pub async fn retrieve(&self, query: &str, top_k: usize) -> Result<Vec<SearchResult>> {
        let retriever = Arc::clone(&self.retriever);
        let query = query.to_string();
        tokio::task::spawn_blocking(move || {
            let guard = match retriever.read() {
                Ok(g) => g,
                Err(p) => p.into_inner(),
            };
            guard.retrieve(&query, top_k)
        })
        .await
        .map_err(|e| EngineError::VectorStoreIo(format!("search worker failed: {}", e)))?
    }

    pub fn delete_document(&self, doc_id: &str) -> Result<bool> {
        self.write_retriever().delete_document(doc_id)
    }

    pub fn documents(&self) -> Vec<DocumentSummary> {
        self.read_retriever().documents()
    }

    /// Answer a question with retrieval-augmented generation: retrieve the
    /// most relevant chunks, prepend them to the prompt, and stream tokens
    /// from the generation worker.
    pub async fn answer(
        &self,
        question: &str,
        overrides: GenerationOverrides,
        retrieval_k: usize,
    ) -> Result<StreamingGeneration> {
        let context = if retrieval_k == 0 {
            Vec::new()
        } else {
            let hits = self.retrieve(question, retrieval_k).await?;
            tracing::debug!(hits = hits.len(), "retrieved context for question");
            hits
        };
        let prompt = build_prompt(question, &context);
        let params = self.defaults.with_overrides(&overrides);
        Ok(stream(Arc::clone(&self.session), GenerationRequest::new(prompt, params)))
    }
}
