//! Batch document ingestion into the vector store.

use std::collections::HashMap;
use std::env;
use std::path::PathBuf;

use indicatif::{ProgressBar, ProgressStyle};

use hearth_cli::docs::{doc_id_for, read_document, walk_documents};
use hearth_core::chunker::ChunkingConfig;
use hearth_core::config::{expand_path, Config};
use hearth_embed::default_embedder;
use hearth_rag::Retriever;
use hearth_store::VectorStore;

fn main() -> anyhow::Result<()> {
    hearth_cli::init_tracing();
    let config = Config::load()?;

    let docs_dir = env::args().nth(1).map(PathBuf::from).unwrap_or_else(|| {
        let dir: String = config.get("data.docs_dir").unwrap_or_else(|_| "docs".to_string());
        expand_path(dir)
    });
    let store_dir: String = config.get("data.store_dir").unwrap_or_else(|_| "rag".to_string());
    let embed_dir: String = config
        .get("models.embed_dir")
        .unwrap_or_else(|_| "embeddings/minilm-l6-v2".to_string());

    let chunking = ChunkingConfig {
        chunk_size: config.get("chunking.chunk_size").unwrap_or(512),
        overlap: config.get("chunking.overlap").unwrap_or(50),
    };

    let embedder = default_embedder(&expand_path(embed_dir))?;
    let store = VectorStore::open(&expand_path(store_dir))?;
    let mut retriever = Retriever::new(chunking, embedder, store);

    let files = walk_documents(&docs_dir);
    if files.is_empty() {
        println!("No .txt/.md documents found under {}.", docs_dir.display());
        return Ok(());
    }

    println!("Ingesting {} documents from {}", files.len(), docs_dir.display());
    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} docs {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
    );

    let mut indexed = 0usize;
    let mut skipped = 0usize;
    let mut failed = 0usize;
    let mut total_chunks = 0usize;
    for file in &files {
        pb.set_message(file.display().to_string());
        let doc_id = doc_id_for(file);
        match read_document(file) {
            Ok(text) => {
                if retriever.needs_ingest(&doc_id, &text) {
                    let mut metadata = HashMap::new();
                    metadata.insert(
                        "filename".to_string(),
                        file.file_name().map(|f| f.to_string_lossy().to_string()).unwrap_or_default(),
                    );
                    metadata.insert("file_path".to_string(), file.display().to_string());
                    match retriever.ingest(&doc_id, &text, metadata) {
                        Ok(chunks) => {
                            indexed += 1;
                            total_chunks += chunks;
                        }
                        Err(e) => {
                            failed += 1;
                            eprintln!("failed to ingest {}: {}", file.display(), e);
                        }
                    }
                } else {
                    skipped += 1;
                }
            }
            Err(e) => {
                failed += 1;
                eprintln!("failed to read {}: {}", file.display(), e);
            }
        }
        pb.inc(1);
    }
    pb.finish_with_message("done");

    println!(
        "Indexed {} documents ({} chunks), {} unchanged, {} failed",
        indexed, total_chunks, skipped, failed
    );
    Ok(())
}
