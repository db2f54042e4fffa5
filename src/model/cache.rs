//! In-process cache of loaded model artifacts
//!
//! Entries are keyed by model path and fingerprinted by the modification time
//! and length of both the classifier and vectorizer files. A lookup whose
//! fingerprint differs reloads from disk, so a cached model never outlives a
//! change to either file.

use rustc_hash::FxHashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::SystemTime;
use tracing::debug;

use super::{vectorizer_path_for, ModelArtifacts, ModelError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct FileStamp {
    modified: Option<SystemTime>,
    len: u64,
}

impl FileStamp {
    fn of(path: &Path) -> Result<Self, ModelError> {
        let meta = std::fs::metadata(path).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                ModelError::Missing {
                    path: path.to_path_buf(),
                }
            } else {
                ModelError::Io {
                    path: path.to_path_buf(),
                    source,
                }
            }
        })?;
        Ok(Self {
            modified: meta.modified().ok(),
            len: meta.len(),
        })
    }
}

type Fingerprint = (FileStamp, FileStamp);

fn fingerprint(model_path: &Path) -> Result<Fingerprint, ModelError> {
    Ok((
        FileStamp::of(model_path)?,
        FileStamp::of(&vectorizer_path_for(model_path))?,
    ))
}

/// Thread-safe artifact cache
#[derive(Default)]
pub struct ModelCache {
    entries: Mutex<FxHashMap<PathBuf, (Fingerprint, Arc<ModelArtifacts>)>>,
}

impl ModelCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached artifacts for `model_path`, loading them when absent or stale
    pub fn get_or_load(&self, model_path: &Path) -> Result<Arc<ModelArtifacts>, ModelError> {
        let current = fingerprint(model_path)?;

        if let Ok(entries) = self.entries.lock() {
            if let Some((stamp, artifacts)) = entries.get(model_path) {
                if *stamp == current {
                    debug!("Model cache hit for {}", model_path.display());
                    return Ok(Arc::clone(artifacts));
                }
                debug!("Model files changed, reloading {}", model_path.display());
            }
        }

        let artifacts = Arc::new(ModelArtifacts::load(model_path)?);
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(model_path.to_path_buf(), (current, Arc::clone(&artifacts)));
        }
        Ok(artifacts)
    }

    /// Number of cached models
    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every cached model
    pub fn clear(&self) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.clear();
        }
    }
}
