use std::collections::HashMap;

use hearth_core::error::EngineError;
use hearth_core::types::Meta;
use hearth_store::VectorStore;
use tempfile::TempDir;

fn meta(kv: &[(&str, &str)]) -> Meta {
    kv.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
}

fn unit(dim: usize, hot: usize) -> Vec<f32> {
    let mut v = vec![0.0; dim];
    v[hot] = 1.0;
    v
}

#[test]
fn add_then_search_returns_exact_match_first() {
    let tmp = TempDir::new().expect("tmp");
    let mut store = VectorStore::open(tmp.path()).expect("open");

    let chunks = vec!["first chunk".to_string(), "second chunk".to_string()];
    let embeddings = vec![unit(8, 0), unit(8, 3)];
    store
        .add("guide", &chunks, &embeddings, meta(&[("filename", "guide.txt")]))
        .expect("add");

    let results = store.search(&unit(8, 3), 1).expect("search");
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].doc_id, "guide");
    assert_eq!(results[0].chunk_index, 1);
    assert_eq!(results[0].chunk_text, "second chunk");
    assert!((results[0].similarity - 1.0).abs() < 1e-5, "identical vector scores ~1.0");
    assert_eq!(results[0].metadata.get("filename").map(String::as_str), Some("guide.txt"));
}

#[test]
fn search_ranks_across_documents() {
    let tmp = TempDir::new().expect("tmp");
    let mut store = VectorStore::open(tmp.path()).expect("open");

    store
        .add("a", &["a0".to_string()], &[vec![1.0, 0.0, 0.0]], HashMap::new())
        .expect("add a");
    store
        .add("b", &["b0".to_string(), "b1".to_string()], &[vec![0.0, 1.0, 0.0], vec![0.6, 0.8, 0.0]], HashMap::new())
        .expect("add b");

    let results = store.search(&[1.0, 0.0, 0.0], 10).expect("search");
    assert_eq!(results.len(), 3, "all chunks of all documents are scored");
    assert_eq!((results[0].doc_id.as_str(), results[0].chunk_index), ("a", 0));
    // Scores are descending
    for pair in results.windows(2) {
        assert!(pair[0].similarity >= pair[1].similarity);
    }
}

#[test]
fn add_rejects_length_mismatch() {
    let tmp = TempDir::new().expect("tmp");
    let mut store = VectorStore::open(tmp.path()).expect("open");

    let err = store
        .add("bad", &["only one chunk".to_string()], &[], HashMap::new())
        .expect_err("mismatch must fail");
    assert!(matches!(err, EngineError::DimensionMismatch { expected: 1, got: 0 }));
    assert!(!store.contains("bad"), "failed add leaves no index entry");
}

#[test]
fn add_rejects_ragged_rows() {
    let tmp = TempDir::new().expect("tmp");
    let mut store = VectorStore::open(tmp.path()).expect("open");

    let err = store
        .add(
            "ragged",
            &["x".to_string(), "y".to_string()],
            &[vec![1.0, 0.0], vec![1.0, 0.0, 0.0]],
            HashMap::new(),
        )
        .expect_err("ragged rows must fail");
    assert!(matches!(err, EngineError::DimensionMismatch { expected: 2, got: 3 }));
}

#[test]
fn reingest_replaces_document_wholesale() {
    let tmp = TempDir::new().expect("tmp");
    let mut store = VectorStore::open(tmp.path()).expect("open");

    store
        .add("doc", &["old a".to_string(), "old b".to_string()], &[unit(4, 0), unit(4, 1)], HashMap::new())
        .expect("add v1");
    store
        .add("doc", &["new".to_string()], &[unit(4, 2)], meta(&[("rev", "2")]))
        .expect("add v2");

    let results = store.search(&unit(4, 2), 10).expect("search");
    assert_eq!(results.len(), 1, "old chunks are gone");
    assert_eq!(results[0].chunk_text, "new");

    let docs = store.list();
    assert_eq!(docs.len(), 1);
    assert_eq!(docs[0].chunk_count, 1);
    assert_eq!(docs[0].metadata.get("rev").map(String::as_str), Some("2"));
}

#[test]
fn delete_removes_document_and_unknown_id_is_false() {
    let tmp = TempDir::new().expect("tmp");
    let mut store = VectorStore::open(tmp.path()).expect("open");

    store.add("keep", &["k".to_string()], &[unit(4, 0)], HashMap::new()).expect("add");
    store.add("drop", &["d".to_string()], &[unit(4, 1)], HashMap::new()).expect("add");

    assert!(store.delete("drop").expect("delete"));
    assert!(!store.delete("drop").expect("second delete"), "already gone");
    assert!(!store.delete("never-indexed").expect("unknown delete"));

    let results = store.search(&unit(4, 1), 10).expect("search");
    assert!(results.iter().all(|r| r.doc_id != "drop"), "deleted doc never surfaces");
    assert_eq!(store.len(), 1);
}

#[test]
fn store_persists_across_reopen() {
    let tmp = TempDir::new().expect("tmp");
    {
        let mut store = VectorStore::open(tmp.path()).expect("open");
        store
            .add("persisted", &["body".to_string()], &[unit(6, 5)], meta(&[("filename", "b.txt")]))
            .expect("add");
    }
    let store = VectorStore::open(tmp.path()).expect("reopen");
    assert!(store.contains("persisted"));
    let results = store.search(&unit(6, 5), 1).expect("search");
    assert_eq!(results[0].doc_id, "persisted");
    assert!((results[0].similarity - 1.0).abs() < 1e-5);
}

#[test]
fn corrupt_document_is_skipped_not_fatal() {
    let tmp = TempDir::new().expect("tmp");
    let mut store = VectorStore::open(tmp.path()).expect("open");

    store.add("good", &["g".to_string()], &[unit(4, 0)], HashMap::new()).expect("add");
    store.add("bad", &["b".to_string()], &[unit(4, 1)], HashMap::new()).expect("add");

    // Truncate bad's embedding blob behind the store's back.
    std::fs::write(tmp.path().join("documents/bad_embeddings.bin"), [0u8; 3]).expect("corrupt");

    let store = VectorStore::open(tmp.path()).expect("reopen");
    let results = store.search(&unit(4, 0), 10).expect("search");
    assert!(results.iter().any(|r| r.doc_id == "good"));
    assert!(results.iter().all(|r| r.doc_id != "bad"), "corrupt doc skipped for the query");
}

#[test]
fn hostile_doc_ids_stay_inside_the_store() {
    let tmp = TempDir::new().expect("tmp");
    let mut store = VectorStore::open(tmp.path()).expect("open");

    store
        .add("../escape attempt", &["c".to_string()], &[unit(4, 0)], HashMap::new())
        .expect("add");
    assert!(store.contains("../escape attempt"));
    let results = store.search(&unit(4, 0), 1).expect("search");
    assert_eq!(results[0].doc_id, "../escape attempt");
    assert!(!tmp.path().parent().expect("parent").join("escape attempt_metadata.json").exists());
}
