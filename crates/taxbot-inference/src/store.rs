//! Persistence boundary for fitted models.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::debug;

use crate::error::InferenceError;
use crate::Result;

/// Storage for an opaque serialized model under a stable identity.
///
/// Loading must fail with an error, never panic, when the model is absent
/// or unreadable.
pub trait ModelStore: Send + Sync {
    /// Read the stored model bytes.
    fn load(&self) -> Result<Vec<u8>>;

    /// Replace the stored model bytes.
    fn save(&self, bytes: &[u8]) -> Result<()>;

    /// Human readable location, used in logs.
    fn location(&self) -> String;
}

/// Model stored as a single file on disk.
#[derive(Debug, Clone)]
pub struct FileModelStore {
    path: PathBuf,
}

impl FileModelStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Check whether a model file is present.
    pub fn exists(&self) -> bool {
        self.path.is_file()
    }
}

impl ModelStore for FileModelStore {
    fn load(&self) -> Result<Vec<u8>> {
        fs::read(&self.path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => {
                InferenceError::ModelLoad(format!("no model at {}", self.path.display()))
            }
            _ => InferenceError::Io(e),
        })
    }

    fn save(&self, bytes: &[u8]) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        // Write beside the target and rename so readers never see a partial file.
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        fs::write(&tmp, bytes)?;
        fs::rename(&tmp, &self.path)?;

        debug!("Wrote {} bytes to {}", bytes.len(), self.path.display());
        Ok(())
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}

/// In-process model store.
#[derive(Debug, Default)]
pub struct MemoryModelStore {
    bytes: Mutex<Option<Vec<u8>>>,
}

impl MemoryModelStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store that already holds the given bytes.
    pub fn with_bytes(bytes: Vec<u8>) -> Self {
        Self {
            bytes: Mutex::new(Some(bytes)),
        }
    }
}

impl ModelStore for MemoryModelStore {
    fn load(&self) -> Result<Vec<u8>> {
        let guard = self
            .bytes
            .lock()
            .map_err(|e| InferenceError::ModelLoad(format!("failed to lock store: {}", e)))?;
        guard
            .clone()
            .ok_or_else(|| InferenceError::ModelLoad("no model in memory store".to_string()))
    }

    fn save(&self, bytes: &[u8]) -> Result<()> {
        let mut guard = self
            .bytes
            .lock()
            .map_err(|e| InferenceError::ModelLoad(format!("failed to lock store: {}", e)))?;
        *guard = Some(bytes.to_vec());
        Ok(())
    }

    fn location(&self) -> String {
        "memory".to_string()
    }
}
