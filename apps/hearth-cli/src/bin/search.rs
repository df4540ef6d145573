//! One-shot vector query against the document store.

use std::env;

use hearth_core::chunker::ChunkingConfig;
use hearth_core::config::{expand_path, Config};
use hearth_embed::default_embedder;
use hearth_rag::Retriever;
use hearth_store::VectorStore;

fn main() -> anyhow::Result<()> {
    hearth_cli::init_tracing();
    let config = Config::load()?;

    let mut args = env::args().skip(1);
    let Some(query) = args.next() else {
        eprintln!("Usage: hearth-search \"<query>\" [top_k]");
        std::process::exit(1);
    };
    let top_k: usize = args.next().and_then(|s| s.parse().ok()).unwrap_or(5);

    let store_dir: String = config.get("data.store_dir").unwrap_or_else(|_| "rag".to_string());
    let embed_dir: String = config
        .get("models.embed_dir")
        .unwrap_or_else(|_| "embeddings/minilm-l6-v2".to_string());

    let embedder = default_embedder(&expand_path(embed_dir))?;
    let store = VectorStore::open(&expand_path(store_dir))?;
    let retriever = Retriever::new(ChunkingConfig::default(), embedder, store);

    let results = retriever.retrieve(&query, top_k)?;
    if results.is_empty() {
        println!("No matches.");
        return Ok(());
    }
    for (rank, hit) in results.iter().enumerate() {
        let excerpt: String = hit.chunk_text.chars().take(120).collect();
        println!(
            "{:>2}. {:.4}  {}#{}  {}",
            rank + 1,
            hit.similarity,
            hit.doc_id,
            hit.chunk_index,
            excerpt
        );
    }
    Ok(())
}
