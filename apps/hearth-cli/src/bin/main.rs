//! The hearth assistant: retrieval-augmented chat against local models.

use std::env;
use std::io::{BufRead, Write};
use std::path::PathBuf;

use anyhow::{anyhow, Context as _};

use hearth_cli::catalog::ModelCatalog;
use hearth_core::chunker::ChunkingConfig;
use hearth_core::config::{expand_path, Config};
use hearth_core::types::{FinishReason, GenerationOverrides};
use hearth_embed::default_embedder;
use hearth_rag::{EngineContext, Retriever, DEFAULT_RETRIEVAL_K};
use hearth_store::VectorStore;

fn parse_args() -> (String, Vec<String>) {
    let mut args: Vec<String> = env::args().collect();
    let prog = args.remove(0);
    if args.is_empty() {
        eprintln!("Usage: {} <chat|ask|models|docs|delete> [args...]", prog);
        std::process::exit(1);
    }
    let cmd = args.remove(0);
    (cmd, args)
}

fn build_context(config: &Config) -> anyhow::Result<EngineContext> {
    let store_dir: String = config.get("data.store_dir").unwrap_or_else(|_| "rag".to_string());
    let embed_dir: String = config
        .get("models.embed_dir")
        .unwrap_or_else(|_| "embeddings/minilm-l6-v2".to_string());
    let chunking = ChunkingConfig {
        chunk_size: config.get("chunking.chunk_size").unwrap_or(512),
        overlap: config.get("chunking.overlap").unwrap_or(50),
    };

    let embedder = default_embedder(&expand_path(embed_dir)).context("loading embedding model")?;
    let store = VectorStore::open(&expand_path(store_dir)).context("opening vector store")?;
    let retriever = Retriever::new(chunking, embedder, store);
    Ok(EngineContext::new(retriever, config.generation_defaults()))
}

fn resolve_model_dir(config: &Config) -> anyhow::Result<PathBuf> {
    let models_dir: String = config.get("models.dir").unwrap_or_else(|_| "models".to_string());
    let selected: Option<String> = config.get("models.selected").ok();
    let catalog = ModelCatalog::new(&expand_path(models_dir));
    catalog
        .resolve(selected.as_deref())
        .ok_or_else(|| anyhow!("no installed model found; download one first"))
}

async fn answer_once(ctx: &EngineContext, question: &str, top_k: usize) -> anyhow::Result<()> {
    let mut streaming = ctx
        .answer(question, GenerationOverrides::default(), top_k)
        .await
        .context("starting generation")?;
    let cancel = streaming.cancel.clone();

    loop {
        tokio::select! {
            piece = streaming.tokens.recv() => match piece {
                Some(p) => {
                    print!("{}", p);
                    let _ = std::io::stdout().flush();
                }
                None => break,
            },
            _ = tokio::signal::ctrl_c() => {
                cancel.cancel();
            }
        }
    }

    match streaming.finish().await.finish {
        FinishReason::Completed | FinishReason::MaxTokensReached => println!(),
        FinishReason::Cancelled => println!("\n[cancelled]"),
        FinishReason::Error(msg) => eprintln!("\ngeneration failed: {}", msg),
    }
    Ok(())
}

async fn chat(config: &Config) -> anyhow::Result<()> {
    let ctx = build_context(config)?;
    let model_dir = resolve_model_dir(config)?;
    println!("Loading model from {}...", model_dir.display());
    ctx.load_model(&model_dir).await?;

    let top_k: usize = config.get("retrieval.top_k").unwrap_or(DEFAULT_RETRIEVAL_K);
    println!("Ready. Ask away (Ctrl-D to quit, Ctrl-C to stop a response).");

    let stdin = std::io::stdin();
    loop {
        print!("> ");
        let _ = std::io::stdout().flush();
        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let question = line.trim();
        if question.is_empty() {
            continue;
        }
        answer_once(&ctx, question, top_k).await?;
    }

    ctx.unload_model();
    Ok(())
}

async fn ask(config: &Config, args: &[String]) -> anyhow::Result<()> {
    let question = args.first().ok_or_else(|| anyhow!("Usage: hearth ask \"<question>\""))?;
    let ctx = build_context(config)?;
    let model_dir = resolve_model_dir(config)?;
    ctx.load_model(&model_dir).await?;
    let top_k: usize = config.get("retrieval.top_k").unwrap_or(DEFAULT_RETRIEVAL_K);
    answer_once(&ctx, question, top_k).await?;
    ctx.unload_model();
    Ok(())
}

fn models(config: &Config) -> anyhow::Result<()> {
    let models_dir: String = config.get("models.dir").unwrap_or_else(|_| "models".to_string());
    let catalog = ModelCatalog::new(&expand_path(models_dir));
    let installed = catalog.list_installed();
    if installed.is_empty() {
        println!("No installed models.");
        return Ok(());
    }
    for model in installed {
        let state = if catalog.is_complete(&model.id) { "ready" } else { "incomplete" };
        println!("{:<24} {:<10} {}", model.id, state, model.name);
    }
    Ok(())
}

fn docs(config: &Config) -> anyhow::Result<()> {
    let ctx = build_context(config)?;
    let documents = ctx.documents();
    if documents.is_empty() {
        println!("No indexed documents.");
        return Ok(());
    }
    for doc in documents {
        let filename = doc.metadata.get("filename").cloned().unwrap_or_default();
        println!("{:<32} {:>5} chunks  {}", doc.id, doc.chunk_count, filename);
    }
    Ok(())
}

fn delete(config: &Config, args: &[String]) -> anyhow::Result<()> {
    let doc_id = args.first().ok_or_else(|| anyhow!("Usage: hearth delete <doc_id>"))?;
    let ctx = build_context(config)?;
    if ctx.delete_document(doc_id)? {
        println!("Deleted {}", doc_id);
    } else {
        println!("No document with id {}", doc_id);
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    hearth_cli::init_tracing();
    let config = Config::load().map_err(|e| {
        eprintln!("Error loading config: {}", e);
        e
    })?;
    let (cmd, args) = parse_args();
    match cmd.as_str() {
        "chat" => chat(&config).await,
        "ask" => ask(&config, &args).await,
        "models" => models(&config),
        "docs" => docs(&config),
        "delete" => delete(&config, &args),
        _ => {
            eprintln!("Unknown command: {}", cmd);
            std::process::exit(1);
        }
    }
}
