//! In-memory file system implementation

use crate::error::{VfsError, VfsResult};
use crate::VirtualFileSystem;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::{Arc, RwLock};

/// An in-memory file system.
///
/// Clones share the same storage, so a test can hand one clone to the
/// driver and inspect written artifacts through another.
#[derive(Debug, Clone, Default)]
pub struct MemoryFileSystem {
    files: Arc<RwLock<BTreeMap<String, Vec<u8>>>>,
}

impl MemoryFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a file system pre-populated with text files.
    pub fn with_files<I, P, C>(files: I) -> Self
    where
        I: IntoIterator<Item = (P, C)>,
        P: AsRef<Path>,
        C: AsRef<[u8]>,
    {
        let fs = Self::new();
        if let Ok(mut map) = fs.files.write() {
            for (path, content) in files {
                map.insert(normalize(path.as_ref()), content.as_ref().to_vec());
            }
        }
        fs
    }

    /// Paths of all stored files, sorted.
    pub fn paths(&self) -> Vec<String> {
        match self.files.read() {
            Ok(map) => map.keys().cloned().collect(),
            Err(_) => Vec::new(),
        }
    }
}

// Forward slashes everywhere so keys match across platforms.
fn normalize(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

fn poisoned(path: &str) -> VfsError {
    VfsError::Io {
        path: path.to_string(),
        message: "lock poisoned".to_string(),
    }
}

impl VirtualFileSystem for MemoryFileSystem {
    fn read_file(&self, path: &Path) -> VfsResult<Vec<u8>> {
        let key = normalize(path);
        let files = self.files.read().map_err(|_| poisoned(&key))?;
        files
            .get(&key)
            .cloned()
            .ok_or(VfsError::NotFound { path: key })
    }

    fn write_file(&self, path: &Path, content: &[u8]) -> VfsResult<()> {
        let key = normalize(path);
        let mut files = self.files.write().map_err(|_| poisoned(&key))?;
        files.insert(key, content.to_vec());
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        let key = normalize(path);
        self.files
            .read()
            .map(|files| files.contains_key(&key))
            .unwrap_or(false)
    }
}
