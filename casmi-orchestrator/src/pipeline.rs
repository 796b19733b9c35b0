//! Pipeline orchestrator
//!
//! Turns a selection of passes into an execution order and runs it:
//!
//! 1. an empty selection is replaced by the default pipeline
//! 2. every selected pass pulls in its declared inputs, transitively,
//!    unless the store already holds their result
//! 3. the closure is ordered topologically; registration order breaks ties
//! 4. passes run one after another until one fails or finishes the pipeline

use crate::error::OrchestratorError;
use crate::pass::{PassContext, PassDescriptor, PassId, PassOutcome};
use crate::registry::PassRegistry;
use crate::store::ResultStore;
use casmi_config::RunConfig;
use casmi_log::Logger;
use casmi_vfs::VirtualFileSystem;
use std::collections::BTreeSet;
use std::panic::{self, AssertUnwindSafe};

/// What a successful run did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PipelineReport {
    /// Passes that ran, in order
    pub executed: Vec<PassId>,
    /// Resolved passes that did not run because the pipeline finished early
    pub skipped: Vec<PassId>,
    /// The pass that declared the pipeline complete
    pub finished_by: Option<PassId>,
}

pub struct Orchestrator<'a> {
    registry: &'a PassRegistry,
    default_pipeline: Vec<PassId>,
    config: &'a RunConfig,
    fs: &'a dyn VirtualFileSystem,
    log: &'a Logger,
}

impl<'a> Orchestrator<'a> {
    pub fn new(
        registry: &'a PassRegistry,
        config: &'a RunConfig,
        fs: &'a dyn VirtualFileSystem,
        log: &'a Logger,
    ) -> Self {
        Self {
            registry,
            default_pipeline: Vec::new(),
            config,
            fs,
            log,
        }
    }

    /// Passes to run when the selection is empty
    pub fn with_default_pipeline(mut self, passes: impl Into<Vec<PassId>>) -> Self {
        self.default_pipeline = passes.into();
        self
    }

    /// Compute the execution order for `selection` against `store`.
    pub fn resolve(
        &self,
        selection: &[PassId],
        store: &ResultStore,
    ) -> Result<Vec<PassId>, OrchestratorError> {
        let roots = if selection.is_empty() {
            self.default_pipeline.as_slice()
        } else {
            selection
        };

        // Transitive closure over declared inputs
        let mut needed: BTreeSet<PassId> = BTreeSet::new();
        let mut pending: Vec<PassId> = roots.to_vec();
        while let Some(id) = pending.pop() {
            if store.has(id) || !needed.insert(id) {
                continue;
            }
            let descriptor = self.lookup(id)?;
            pending.extend(descriptor.requires.iter().copied());
        }

        // Kahn's algorithm; the ready pass registered first goes next
        let mut indegree: Vec<(PassId, usize)> = needed
            .iter()
            .map(|&id| {
                let inputs = self
                    .registry
                    .lookup(id)
                    .map(|d| d.requires.iter().filter(|r| needed.contains(*r)).count())
                    .unwrap_or(0);
                (id, inputs)
            })
            .collect();
        indegree.sort_by_key(|(id, _)| self.registry.position(*id));

        let mut order = Vec::with_capacity(indegree.len());
        while let Some(index) = indegree.iter().position(|(_, count)| *count == 0) {
            let (id, _) = indegree.remove(index);
            order.push(id);
            for (other, count) in indegree.iter_mut() {
                let requires = self
                    .registry
                    .lookup(*other)
                    .map(|d| d.requires.iter().filter(|&&r| r == id).count())
                    .unwrap_or(0);
                *count -= requires;
            }
        }

        if !indegree.is_empty() {
            return Err(OrchestratorError::DependencyCycle {
                passes: indegree.into_iter().map(|(id, _)| id).collect(),
            });
        }
        Ok(order)
    }

    /// Resolve `selection` and run the passes against `store`.
    pub fn run(
        &self,
        selection: &[PassId],
        store: &mut ResultStore,
    ) -> Result<PipelineReport, OrchestratorError> {
        let order = self.resolve(selection, store)?;
        tracing::debug!(
            passes = ?order.iter().map(PassId::as_str).collect::<Vec<_>>(),
            "resolved pipeline"
        );

        let mut report = PipelineReport::default();
        for (index, &id) in order.iter().enumerate() {
            let span = tracing::info_span!("pass", pass = %id);
            let _entered = span.enter();
            let _source = self.log.enter_source(id.as_str());

            let mut pass = self
                .registry
                .instantiate(id, self.config)
                .map_err(|_| OrchestratorError::UnknownPass {
                    pass: id.to_string(),
                })?;
            let ctx = PassContext {
                config: self.config,
                fs: self.fs,
                log: self.log,
            };

            let result = catch_quietly(|| pass.run(store, &ctx));
            match result {
                Ok(Ok(outcome)) => {
                    tracing::debug!(?outcome, "pass succeeded");
                    report.executed.push(id);
                    if outcome == PassOutcome::Finish {
                        report.finished_by = Some(id);
                        report.skipped = order[index + 1..].to_vec();
                        break;
                    }
                }
                Ok(Err(source)) => {
                    tracing::debug!(error = %source, "pass failed");
                    return Err(OrchestratorError::PassFailed { pass: id, source });
                }
                Err(payload) => {
                    return Err(OrchestratorError::PassPanicked {
                        pass: id,
                        message: panic_message(&*payload),
                    });
                }
            }
        }
        Ok(report)
    }

    fn lookup(&self, id: PassId) -> Result<&'a PassDescriptor, OrchestratorError> {
        let registry: &'a PassRegistry = self.registry;
        registry
            .lookup(id)
            .map_err(|_| OrchestratorError::UnknownPass {
                pass: id.to_string(),
            })
    }
}

/// `catch_unwind` with the panic report routed to tracing instead of stderr.
///
/// The hook is process wide; the previous one is restored before returning.
fn catch_quietly<R>(f: impl FnOnce() -> R) -> std::thread::Result<R> {
    let previous = panic::take_hook();
    panic::set_hook(Box::new(|info| {
        tracing::debug!(%info, "pass panicked");
    }));
    let result = panic::catch_unwind(AssertUnwindSafe(f));
    panic::set_hook(previous);
    result
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
