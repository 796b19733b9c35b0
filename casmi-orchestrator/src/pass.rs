//! Pass trait and types
//!
//! A pass is one pipeline stage. It reads the results of the passes it
//! declared as inputs from the [`ResultStore`] and may store one result of
//! its own under its identity.

use crate::error::PassError;
use crate::store::ResultStore;
use casmi_config::RunConfig;
use casmi_log::Logger;
use casmi_vfs::VirtualFileSystem;
use std::fmt;

/// Stable identity of a pass; key of the registry and of the result store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PassId(&'static str);

impl PassId {
    pub const fn new(name: &'static str) -> Self {
        Self(name)
    }

    pub const fn as_str(&self) -> &'static str {
        self.0
    }
}

impl fmt::Display for PassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// What a successful pass tells the orchestrator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassOutcome {
    /// Go on with the next pass
    Continue,
    /// The pipeline is complete; skip the remaining passes
    Finish,
}

/// Context for pass execution
pub struct PassContext<'a> {
    /// The run configuration
    pub config: &'a RunConfig,
    /// File access
    pub fs: &'a dyn VirtualFileSystem,
    /// Diagnostics; the current source is the running pass
    pub log: &'a Logger,
}

impl fmt::Debug for PassContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PassContext")
            .field("config", &self.config)
            .field("source", &self.log.source())
            .finish_non_exhaustive()
    }
}

/// The Pass trait for pipeline stages
pub trait Pass {
    /// Execute the pass
    ///
    /// # Arguments
    /// * `store` - results of earlier passes; the pass adds its own
    /// * `ctx` - configuration, file access and diagnostics
    fn run(&mut self, store: &mut ResultStore, ctx: &PassContext<'_>)
        -> Result<PassOutcome, PassError>;
}

/// Builds a fresh pass instance for one run
pub type PassFactory = Box<dyn Fn(&RunConfig) -> Box<dyn Pass>>;

/// Registration metadata of a pass. A descriptor without any flag is
/// internal: it only runs as a dependency of other passes.
pub struct PassDescriptor {
    pub id: PassId,
    pub short: Option<char>,
    pub long: Option<&'static str>,
    pub description: &'static str,
    /// Passes whose results this pass reads
    pub requires: Vec<PassId>,
    pub factory: PassFactory,
}

impl PassDescriptor {
    pub fn new(
        id: PassId,
        description: &'static str,
        factory: impl Fn(&RunConfig) -> Box<dyn Pass> + 'static,
    ) -> Self {
        Self {
            id,
            short: None,
            long: None,
            description,
            requires: Vec::new(),
            factory: Box::new(factory),
        }
    }

    /// Expose the pass as `-<short>, --<long>`
    pub fn with_flag(mut self, short: Option<char>, long: &'static str) -> Self {
        self.short = short;
        self.long = Some(long);
        self
    }

    pub fn requires(mut self, inputs: &[PassId]) -> Self {
        self.requires.extend_from_slice(inputs);
        self
    }

    pub fn is_internal(&self) -> bool {
        self.short.is_none() && self.long.is_none()
    }
}

impl fmt::Debug for PassDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PassDescriptor")
            .field("id", &self.id)
            .field("short", &self.short)
            .field("long", &self.long)
            .field("requires", &self.requires)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Noop;

    impl Pass for Noop {
        fn run(
            &mut self,
            _store: &mut ResultStore,
            _ctx: &PassContext<'_>,
        ) -> Result<PassOutcome, PassError> {
            Ok(PassOutcome::Continue)
        }
    }

    fn noop(_: &RunConfig) -> Box<dyn Pass> {
        Box::new(Noop)
    }

    #[test]
    fn test_descriptor_builder() {
        let descriptor = PassDescriptor::new(PassId::new("ast-dump-dot"), "dump", noop)
            .with_flag(Some('a'), "ast-dump")
            .requires(&[PassId::new("source-to-ast")]);

        assert!(!descriptor.is_internal());
        assert_eq!(descriptor.short, Some('a'));
        assert_eq!(descriptor.requires, vec![PassId::new("source-to-ast")]);
        assert_eq!(descriptor.id.to_string(), "ast-dump-dot");
    }

    #[test]
    fn test_internal_descriptor() {
        let descriptor = PassDescriptor::new(PassId::new("load-file"), "load", noop);
        assert!(descriptor.is_internal());
    }
}
