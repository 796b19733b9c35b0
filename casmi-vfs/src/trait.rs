//! VirtualFileSystem trait definition

use crate::error::{VfsError, VfsResult};
use std::path::Path;

/// Virtual File System trait
///
/// # Implementations
/// - `MemoryFileSystem`: in-memory files, used by tests
/// - `NativeFileSystem`: the OS file system
pub trait VirtualFileSystem {
    /// Read file contents as bytes.
    fn read_file(&self, path: &Path) -> VfsResult<Vec<u8>>;

    /// Write file contents, creating or truncating the file.
    fn write_file(&self, path: &Path, content: &[u8]) -> VfsResult<()>;

    /// Check if path exists as a file.
    fn exists(&self, path: &Path) -> bool;

    /// Read a UTF-8 text file.
    fn read_to_string(&self, path: &Path) -> VfsResult<String> {
        let bytes = self.read_file(path)?;
        String::from_utf8(bytes).map_err(|_| VfsError::InvalidUtf8 {
            path: path.display().to_string(),
        })
    }
}
