//! Installed-model catalog.
//!
//! Model download and verification happen elsewhere; this only lists what
//! is already on disk and resolves the selected model's directory for the
//! inference session.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

/// `manifest.json` written into each installed model directory.
#[derive(Debug, Deserialize)]
pub struct Manifest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug)]
pub struct InstalledModel {
    pub id: String,
    pub name: String,
    pub path: PathBuf,
}

pub struct ModelCatalog {
    models_dir: PathBuf,
}

impl ModelCatalog {
    pub fn new(models_dir: &Path) -> Self {
        Self { models_dir: models_dir.to_path_buf() }
    }

    /// Every subdirectory carrying a readable manifest, in name order.
    pub fn list_installed(&self) -> Vec<InstalledModel> {
        let mut models = Vec::new();
        let Ok(entries) = fs::read_dir(&self.models_dir) else {
            return models;
        };
        for entry in entries.flatten() {
            let path = entry.path();
            if !path.is_dir() {
                continue;
            }
            let manifest_path = path.join("manifest.json");
            let Ok(text) = fs::read_to_string(&manifest_path) else {
                continue;
            };
            match serde_json::from_str::<Manifest>(&text) {
                Ok(manifest) => models.push(InstalledModel {
                    id: entry.file_name().to_string_lossy().to_string(),
                    name: manifest.name,
                    path,
                }),
                Err(e) => {
                    tracing::warn!("bad manifest {}: {}", manifest_path.display(), e);
                }
            }
        }
        models.sort_by(|a, b| a.id.cmp(&b.id));
        models
    }

    /// True when the directory holds everything the session needs to load.
    pub fn is_complete(&self, model_id: &str) -> bool {
        let dir = self.models_dir.join(model_id);
        ["model.safetensors", "tokenizer.json", "config.json"]
            .iter()
            .all(|f| dir.join(f).exists())
    }

    /// Directory for `model_id`, or the first installed model when no id
    /// is given.
    pub fn resolve(&self, model_id: Option<&str>) -> Option<PathBuf> {
        match model_id {
            Some(id) => {
                let dir = self.models_dir.join(id);
                dir.join("manifest.json").exists().then_some(dir)
            }
            None => self.list_installed().into_iter().next().map(|m| m.path),
        }
    }
}
