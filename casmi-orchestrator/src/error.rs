//! Error types for the orchestrator

use crate::pass::PassId;
use casmi_core::{RuntimeError, SyntaxError};
use casmi_vfs::VfsError;
use thiserror::Error;

/// Main orchestrator error type
#[derive(Error, Debug)]
pub enum OrchestratorError {
    #[error("pass '{pass}' failed: {source}")]
    PassFailed {
        pass: PassId,
        #[source]
        source: PassError,
    },

    #[error("pass '{pass}' panicked: {message}")]
    PassPanicked { pass: PassId, message: String },

    #[error("unknown pass '{pass}'")]
    UnknownPass { pass: String },

    #[error("dependency cycle between passes: {}", format_cycle(.passes))]
    DependencyCycle { passes: Vec<PassId> },
}

impl OrchestratorError {
    /// Failures that point at a broken pipeline rather than at the user's input.
    pub fn is_internal(&self) -> bool {
        match self {
            OrchestratorError::PassFailed { source, .. } => {
                matches!(source, PassError::Store(_))
            }
            OrchestratorError::PassPanicked { .. } => false,
            OrchestratorError::UnknownPass { .. }
            | OrchestratorError::DependencyCycle { .. } => true,
        }
    }

    /// The pass the failure is attributed to, if any
    pub fn pass(&self) -> Option<PassId> {
        match self {
            OrchestratorError::PassFailed { pass, .. }
            | OrchestratorError::PassPanicked { pass, .. } => Some(*pass),
            _ => None,
        }
    }
}

fn format_cycle(passes: &[PassId]) -> String {
    passes
        .iter()
        .map(|pass| pass.as_str())
        .collect::<Vec<_>>()
        .join(" -> ")
}

/// Error type for the result store
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("result of pass '{pass}' is already set")]
    Conflict { pass: PassId },

    #[error("missing input: pass '{pass}' has not produced a result")]
    MissingInput { pass: PassId },

    #[error("result of pass '{pass}' is not a {expected}")]
    TypeMismatch { pass: PassId, expected: &'static str },
}

/// Error type for pass registration and lookup
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("pass '{pass}' is already registered")]
    Duplicate { pass: PassId },

    #[error("flag '{flag}' of pass '{pass}' is already used by pass '{owner}'")]
    FlagTaken {
        flag: String,
        pass: PassId,
        owner: PassId,
    },

    #[error("pass '{pass}' not found")]
    NotFound { pass: String },

    #[error("pass '{pass}' requires unregistered pass '{input}'")]
    DanglingInput { pass: PassId, input: PassId },
}

/// Error type for module loaders
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LoaderError {
    #[error("module '{module}' not found")]
    NotFound { module: String },

    #[error("cannot load module '{module}': {source}")]
    Vfs {
        module: String,
        #[source]
        source: VfsError,
    },
}

impl LoaderError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, LoaderError::NotFound { .. })
    }
}

/// Error type for pass components
#[derive(Error, Debug)]
pub enum PassError {
    #[error("{0}")]
    Failed(String),

    #[error("{module}:{error}")]
    Syntax { module: String, error: SyntaxError },

    #[error("import cycle: {chain}")]
    ImportCycle { chain: String },

    #[error(transparent)]
    Loader(#[from] LoaderError),

    #[error(transparent)]
    Runtime(#[from] RuntimeError),

    #[error(transparent)]
    Vfs(#[from] VfsError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("internal error: {0}")]
    Store(#[from] StoreError),
}

impl From<serde_json::Error> for PassError {
    fn from(err: serde_json::Error) -> Self {
        PassError::Serialization(err.to_string())
    }
}
