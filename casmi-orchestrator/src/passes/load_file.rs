//! load-file: read the input file through the VFS

use super::LOAD_FILE;
use crate::error::PassError;
use crate::pass::{Pass, PassContext, PassOutcome};
use crate::store::ResultStore;
use std::path::PathBuf;

/// The input file as read from disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub path: PathBuf,
    /// Module name: the file stem
    pub module: String,
    pub text: String,
}

pub struct LoadFilePass;

impl Pass for LoadFilePass {
    fn run(&mut self, store: &mut ResultStore, ctx: &PassContext<'_>) -> Result<PassOutcome, PassError> {
        let path = ctx
            .config
            .input
            .clone()
            .ok_or_else(|| PassError::Failed("no input file provided".to_string()))?;
        let text = ctx.fs.read_to_string(&path)?;
        let module = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| "main".to_string());

        tracing::debug!(path = %path.display(), bytes = text.len(), "loaded input");
        store.set(LOAD_FILE, SourceFile { path, module, text })?;
        Ok(PassOutcome::Continue)
    }
}
