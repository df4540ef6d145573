//! Session lifecycle against a model directory, using the fake runtime so
//! no weights are required.

use std::collections::HashMap;

use hearth_core::error::EngineError;
use hearth_core::types::{FinishReason, GenerationParams};
use hearth_infer::{run, CancelToken, GenerationRequest, InferenceSession, SessionState};
use tempfile::TempDir;
use tokenizers::models::wordlevel::WordLevel;
use tokenizers::pre_tokenizers::whitespace::Whitespace;
use tokenizers::Tokenizer;

fn write_model_dir(dir: &std::path::Path) {
    let mut vocab: HashMap<String, u32> = HashMap::new();
    vocab.insert("<unk>".to_string(), 0);
    vocab.insert("<s>".to_string(), 1);
    vocab.insert("</s>".to_string(), 2);
    for i in 0..20u32 {
        vocab.insert(format!("word{}", i), 3 + i);
    }
    let model = WordLevel::builder()
        .vocab(vocab)
        .unk_token("<unk>".to_string())
        .build()
        .expect("word-level model");
    let mut tokenizer = Tokenizer::new(model);
    tokenizer.with_pre_tokenizer(Whitespace {});
    tokenizer.save(dir.join("tokenizer.json"), false).expect("save tokenizer");

    let config = serde_json::json!({
        "bos_token_id": 1,
        "eos_token_id": 2,
        "context_length": 64,
        "generation": { "temperature": 0.6, "max_tokens": 8 }
    });
    std::fs::write(dir.join("config.json"), config.to_string()).expect("write config");
}

#[test]
fn load_generate_unload_roundtrip() {
    std::env::set_var("HEARTH_USE_FAKE_MODEL", "1");
    let tmp = TempDir::new().expect("tmp");
    write_model_dir(tmp.path());

    let mut session = InferenceSession::new();
    session.load(tmp.path()).expect("load");
    assert_eq!(session.state(), SessionState::Ready);

    // Persisted defaults come from config.json.
    let defaults = session.bundle().expect("bundle").defaults;
    assert_eq!(defaults.max_tokens, 8);
    assert!((defaults.temperature - 0.6).abs() < 1e-6);
    assert_eq!(defaults.top_k, 40, "unspecified fields keep built-in defaults");

    let params = GenerationParams { temperature: 0.0, top_k: 1, top_p: 1.0, max_tokens: 4 };
    let mut count = 0usize;
    let result =
        run(&mut session, &GenerationRequest::new("word0 word1", params), &CancelToken::new(), |_| {
            count += 1;
        });
    assert_eq!(result.finish, FinishReason::MaxTokensReached);
    assert_eq!(count, 4);

    session.unload();
    assert!(matches!(session.step(&[1]), Err(EngineError::NotLoaded)));
    session.unload();
    assert_eq!(session.state(), SessionState::Unloaded);
}

#[test]
fn missing_tokenizer_is_a_load_failure() {
    std::env::set_var("HEARTH_USE_FAKE_MODEL", "1");
    let tmp = TempDir::new().expect("tmp");
    // No tokenizer.json / config.json in the directory.

    let mut session = InferenceSession::new();
    let err = session.load(tmp.path()).expect_err("load must fail");
    assert!(matches!(err, EngineError::LoadFailure(_)), "got: {:?}", err);
    assert_eq!(session.state(), SessionState::Unloaded);
}
