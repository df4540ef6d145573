use hearth_core::error::EngineError;
use hearth_infer::{InferenceSession, SessionState};
use tempfile::TempDir;

#[test]
fn step_before_load_is_not_loaded() {
    let mut session = InferenceSession::new();
    assert_eq!(session.state(), SessionState::Unloaded);
    assert!(matches!(session.step(&[1, 2, 3]), Err(EngineError::NotLoaded)));
    assert!(matches!(session.bundle(), Err(EngineError::NotLoaded)));
}

#[test]
fn unload_is_idempotent() {
    let mut session = InferenceSession::new();
    session.unload();
    session.unload();
    assert_eq!(session.state(), SessionState::Unloaded);
}

#[test]
fn missing_weight_file_is_model_not_found() {
    std::env::remove_var("HEARTH_USE_FAKE_MODEL");
    let tmp = TempDir::new().expect("tmp");

    let mut session = InferenceSession::new();
    let err = session.load(tmp.path()).expect_err("empty dir cannot load");
    assert!(matches!(err, EngineError::ModelNotFound(_)), "got: {:?}", err);

    // A failed load leaves the session cleanly unloaded.
    assert_eq!(session.state(), SessionState::Unloaded);
    assert!(matches!(session.step(&[1]), Err(EngineError::NotLoaded)));
}
