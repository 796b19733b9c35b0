//! Module loaders
//!
//! `import <name>` is resolved by asking a [`ModuleLoader`] for the module's
//! source text. Loaders compose: [`ChainLoader`] asks each loader in turn
//! and only moves on when a loader does not know the module.

use crate::error::LoaderError;
use casmi_vfs::VirtualFileSystem;
use std::collections::HashMap;
use std::path::PathBuf;

/// File extension of CASM modules
pub const MODULE_EXTENSION: &str = "casm";

/// Source text of one module
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleSource {
    pub name: String,
    /// Where the text came from (a path, or `memory:<name>`)
    pub origin: String,
    pub text: String,
}

pub trait ModuleLoader {
    fn load(&self, name: &str) -> Result<ModuleSource, LoaderError>;
}

/// Resolves `<dir>/<name>.casm` in each search directory
pub struct FileModuleLoader<'a> {
    fs: &'a dyn VirtualFileSystem,
    search_path: Vec<PathBuf>,
}

impl<'a> FileModuleLoader<'a> {
    pub fn new(fs: &'a dyn VirtualFileSystem, search_path: Vec<PathBuf>) -> Self {
        Self { fs, search_path }
    }
}

impl ModuleLoader for FileModuleLoader<'_> {
    fn load(&self, name: &str) -> Result<ModuleSource, LoaderError> {
        let file = format!("{name}.{MODULE_EXTENSION}");
        for dir in &self.search_path {
            let path = dir.join(&file);
            if !self.fs.exists(&path) {
                continue;
            }
            let text = self
                .fs
                .read_to_string(&path)
                .map_err(|source| LoaderError::Vfs {
                    module: name.to_string(),
                    source,
                })?;
            return Ok(ModuleSource {
                name: name.to_string(),
                origin: path.display().to_string(),
                text,
            });
        }
        Err(LoaderError::NotFound {
            module: name.to_string(),
        })
    }
}

/// Serves modules registered up front
#[derive(Debug, Default)]
pub struct MemoryModuleLoader {
    modules: HashMap<String, String>,
}

impl MemoryModuleLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_module(mut self, name: impl Into<String>, text: impl Into<String>) -> Self {
        self.modules.insert(name.into(), text.into());
        self
    }
}

impl ModuleLoader for MemoryModuleLoader {
    fn load(&self, name: &str) -> Result<ModuleSource, LoaderError> {
        self.modules
            .get(name)
            .map(|text| ModuleSource {
                name: name.to_string(),
                origin: format!("memory:{name}"),
                text: text.clone(),
            })
            .ok_or_else(|| LoaderError::NotFound {
                module: name.to_string(),
            })
    }
}

/// Tries loaders in order; falls through on `NotFound` only
#[derive(Default)]
pub struct ChainLoader<'a> {
    loaders: Vec<Box<dyn ModuleLoader + 'a>>,
}

impl<'a> ChainLoader<'a> {
    pub fn new() -> Self {
        Self {
            loaders: Vec::new(),
        }
    }

    pub fn with(mut self, loader: impl ModuleLoader + 'a) -> Self {
        self.loaders.push(Box::new(loader));
        self
    }
}

impl ModuleLoader for ChainLoader<'_> {
    fn load(&self, name: &str) -> Result<ModuleSource, LoaderError> {
        for loader in &self.loaders {
            match loader.load(name) {
                Err(err) if err.is_not_found() => continue,
                other => return other,
            }
        }
        Err(LoaderError::NotFound {
            module: name.to_string(),
        })
    }
}
