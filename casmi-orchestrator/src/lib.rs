//! casmi Orchestrator
//!
//! Pass pipeline engine: passes register a descriptor (identity, optional
//! flag, declared inputs, factory), the orchestrator resolves a selection
//! into an execution order and threads one [`ResultStore`] through it.
//!
//! ```
//! use casmi_config::RunConfig;
//! use casmi_log::Logger;
//! use casmi_orchestrator::{passes, Orchestrator, ResultStore};
//! use casmi_vfs::MemoryFileSystem;
//!
//! let registry = passes::builtin_registry().unwrap();
//! let fs = MemoryFileSystem::with_files([(
//!     "main.casm",
//!     "init main\nrule main = { print \"hello\" }",
//! )]);
//! let config = RunConfig {
//!     input: Some("main.casm".into()),
//!     ..RunConfig::default()
//! };
//! let log = Logger::new("casmi");
//!
//! let mut store = ResultStore::new();
//! Orchestrator::new(&registry, &config, &fs, &log)
//!     .with_default_pipeline(passes::DEFAULT_PIPELINE)
//!     .run(&[], &mut store)
//!     .unwrap();
//! assert_eq!(log.records()[0].message, "hello");
//! ```

pub mod error;
pub mod loader;
pub mod pass;
pub mod passes;
pub mod pipeline;
pub mod registry;
pub mod store;

pub use error::{LoaderError, OrchestratorError, PassError, RegistryError, StoreError};
pub use loader::{ChainLoader, FileModuleLoader, MemoryModuleLoader, ModuleLoader, ModuleSource};
pub use pass::{Pass, PassContext, PassDescriptor, PassId, PassOutcome};
pub use pipeline::{Orchestrator, PipelineReport};
pub use registry::PassRegistry;
pub use store::ResultStore;
