//! Plain-text document input for the indexer.
//!
//! Rich formats (PDF, DOCX) are extracted by external tooling before they
//! reach the engine; only already-plain text is read here.

use std::fs;
use std::path::{Path, PathBuf};

use hearth_core::error::{EngineError, Result};

const TEXT_EXTENSIONS: [&str; 2] = ["txt", "md"];

/// Read one document as UTF-8 text. Unknown extensions are a typed
/// `UnsupportedFormat` error, not a silent skip.
pub fn read_document(path: &Path) -> Result<String> {
    let ext = path.extension().and_then(|s| s.to_str()).unwrap_or("").to_ascii_lowercase();
    if !TEXT_EXTENSIONS.contains(&ext.as_str()) {
        return Err(EngineError::UnsupportedFormat(format!(
            "{} ({})",
            path.display(),
            if ext.is_empty() { "no extension" } else { &ext }
        )));
    }
    match fs::read_to_string(path) {
        Ok(content) => Ok(content),
        Err(_) => Ok(String::from_utf8_lossy(&fs::read(path)?).to_string()),
    }
}

/// All ingestable files under `root`, sorted for stable runs.
pub fn walk_documents(root: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for entry in walkdir::WalkDir::new(root)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
    {
        let path = entry.path();
        let ext = path.extension().and_then(|s| s.to_str()).unwrap_or("").to_ascii_lowercase();
        if TEXT_EXTENSIONS.contains(&ext.as_str()) {
            files.push(path.to_path_buf());
        }
    }
    files.sort();
    files
}

/// Stable document id for a file: its stem.
pub fn doc_id_for(path: &Path) -> String {
    path.file_stem().map(|s| s.to_string_lossy().to_string()).unwrap_or_else(|| {
        path.to_string_lossy().to_string()
    })
}
