//! source-to-ast: parse the input file and every module it imports
//!
//! Imported definitions are merged in front of the importing module's own
//! definitions, dependencies first. A module imported twice is parsed once.

use super::{SourceFile, LOAD_FILE, SOURCE_TO_AST};
use crate::error::PassError;
use crate::loader::{ChainLoader, FileModuleLoader, ModuleLoader};
use crate::pass::{Pass, PassContext, PassOutcome};
use crate::store::ResultStore;
use casmi_core::ast::{Definition, Specification};
use casmi_core::lexer::tokenize;
use casmi_core::parser::{Parser, DEFAULT_MAX_EXPR_DEPTH};
use casmi_log::Logger;
use std::collections::BTreeSet;

pub struct SourceToAstPass {
    trace: bool,
    max_depth: usize,
}

impl SourceToAstPass {
    pub fn new(trace: bool) -> Self {
        Self {
            trace,
            max_depth: DEFAULT_MAX_EXPR_DEPTH,
        }
    }

    /// Bound on expression depth in every parsed module
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

impl Pass for SourceToAstPass {
    fn run(
        &mut self,
        store: &mut ResultStore,
        ctx: &PassContext<'_>,
    ) -> Result<PassOutcome, PassError> {
        let source = store.get::<SourceFile>(LOAD_FILE)?;
        let main = parse_module(&source.module, &source.text, self.trace, self.max_depth, ctx.log)?;

        let loader = ChainLoader::new().with(FileModuleLoader::new(
            ctx.fs,
            ctx.config.module_search_path(),
        ));
        let mut resolver =
            ImportResolver::new(&loader, self.trace, ctx.log).with_max_depth(self.max_depth);
        let name = main.name.clone();
        resolver.include(main)?;

        let modules = resolver.loaded.len();
        let specification = Specification {
            name,
            definitions: resolver.into_definitions(),
        };
        tracing::debug!(
            modules,
            definitions = specification.definitions.len(),
            "parsed specification"
        );
        store.set(SOURCE_TO_AST, specification)?;
        Ok(PassOutcome::Continue)
    }
}

/// Depth-first import resolution with cycle detection
pub struct ImportResolver<'a> {
    loader: &'a dyn ModuleLoader,
    trace: bool,
    max_depth: usize,
    log: &'a Logger,
    /// Modules already merged
    loaded: BTreeSet<String>,
    /// Modules being resolved, outermost first
    stack: Vec<String>,
    merged: Vec<Definition>,
}

impl<'a> ImportResolver<'a> {
    pub fn new(loader: &'a dyn ModuleLoader, trace: bool, log: &'a Logger) -> Self {
        Self {
            loader,
            trace,
            max_depth: DEFAULT_MAX_EXPR_DEPTH,
            log,
            loaded: BTreeSet::new(),
            stack: Vec::new(),
            merged: Vec::new(),
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Merge `module` after everything it imports
    pub fn include(&mut self, module: Specification) -> Result<(), PassError> {
        self.stack.push(module.name.clone());

        let imports: Vec<String> = module.imports().map(str::to_string).collect();
        for import in imports {
            if self.stack.contains(&import) {
                let chain = self
                    .stack
                    .iter()
                    .chain(std::iter::once(&import))
                    .map(String::as_str)
                    .collect::<Vec<_>>()
                    .join(" -> ");
                return Err(PassError::ImportCycle { chain });
            }
            if self.loaded.contains(&import) {
                continue;
            }
            let source = self.loader.load(&import)?;
            tracing::debug!(module = %import, origin = %source.origin, "loaded module");
            let parsed =
                parse_module(&import, &source.text, self.trace, self.max_depth, self.log)?;
            self.include(parsed)?;
        }

        self.stack.pop();
        self.loaded.insert(module.name);
        self.merged.extend(module.definitions);
        Ok(())
    }

    /// The merged definitions, dependencies first
    pub fn into_definitions(self) -> Vec<Definition> {
        self.merged
    }
}

fn parse_module(
    module: &str,
    text: &str,
    trace: bool,
    max_depth: usize,
    log: &Logger,
) -> Result<Specification, PassError> {
    let syntax = |error| PassError::Syntax {
        module: module.to_string(),
        error,
    };
    let tokens = tokenize(text).map_err(syntax)?;
    let mut parser = Parser::new(module, tokens).with_max_depth(max_depth);
    if trace {
        parser = parser.with_trace();
    }
    let result = parser.parse();
    for line in parser.take_trace() {
        casmi_log::debug!(log, "{module}: {line}");
    }
    result.map_err(syntax)
}
