//! casmi virtual file system
//!
//! The `LoadFile` capability of the driver. Passes and module loaders read
//! and write through [`VirtualFileSystem`] so tests can swap the native file
//! system for an in-memory one.
//!
//! ```
//! use casmi_vfs::{MemoryFileSystem, VirtualFileSystem};
//! use std::path::Path;
//!
//! let fs = MemoryFileSystem::with_files([("spec.casm", "init main")]);
//! assert_eq!(fs.read_to_string(Path::new("spec.casm")).unwrap(), "init main");
//! ```

mod error;
mod memory;
mod native;
mod r#trait;

pub use error::{VfsError, VfsResult};
pub use memory::MemoryFileSystem;
pub use native::NativeFileSystem;
pub use r#trait::VirtualFileSystem;
