//! Built-in passes
//!
//! | identity            | flag                      | reads             |
//! |---------------------|---------------------------|-------------------|
//! | `load-file`         |                           |                   |
//! | `source-to-ast`     |                           | load-file         |
//! | `type-check`        |                           | source-to-ast     |
//! | `ast-dump-dot`      | `-a, --ast-dump`          | source-to-ast     |
//! | `ast-to-ir`         |                           | type-check        |
//! | `ir-dump`           | `--ir-dump`               | ast-to-ir         |
//! | `numeric-execution` | `-n, --numeric-execution` | ast-to-ir         |

pub mod ast_dump;
pub mod check;
pub mod execute;
pub mod ir_dump;
pub mod load_file;
pub mod lower;
pub mod parse;

use crate::error::{PassError, RegistryError};
use crate::pass::{PassContext, PassDescriptor, PassId};
use crate::registry::PassRegistry;

pub use load_file::SourceFile;

pub const LOAD_FILE: PassId = PassId::new("load-file");
pub const SOURCE_TO_AST: PassId = PassId::new("source-to-ast");
pub const TYPE_CHECK: PassId = PassId::new("type-check");
pub const AST_DUMP_DOT: PassId = PassId::new("ast-dump-dot");
pub const AST_TO_IR: PassId = PassId::new("ast-to-ir");
pub const IR_DUMP: PassId = PassId::new("ir-dump");
pub const NUMERIC_EXECUTION: PassId = PassId::new("numeric-execution");

/// Runs when no pass flag is given
pub const DEFAULT_PIPELINE: &[PassId] = &[NUMERIC_EXECUTION];

/// Register every built-in pass, in `--help` order.
pub fn register_builtin(registry: &mut PassRegistry) -> Result<(), RegistryError> {
    registry.register(PassDescriptor::new(
        LOAD_FILE,
        "read the input file",
        |_| Box::new(load_file::LoadFilePass),
    ))?;
    registry.register(
        PassDescriptor::new(SOURCE_TO_AST, "parse the input and its imports", |config| {
            Box::new(
                parse::SourceToAstPass::new(config.ast_parse_debug)
                    .with_max_depth(config.limits.max_expr_depth),
            )
        })
        .requires(&[LOAD_FILE]),
    )?;
    registry.register(
        PassDescriptor::new(TYPE_CHECK, "resolve names and check types", |_| {
            Box::new(check::TypeCheckPass)
        })
        .requires(&[SOURCE_TO_AST]),
    )?;
    registry.register(
        PassDescriptor::new(AST_DUMP_DOT, "dump the AST as Graphviz dot", |_| {
            Box::new(ast_dump::AstDumpDotPass)
        })
        .with_flag(Some('a'), "ast-dump")
        .requires(&[SOURCE_TO_AST]),
    )?;
    registry.register(
        PassDescriptor::new(AST_TO_IR, "lower the checked AST to IR", |_| {
            Box::new(lower::AstToIrPass)
        })
        .requires(&[TYPE_CHECK]),
    )?;
    registry.register(
        PassDescriptor::new(IR_DUMP, "dump the IR as JSON", |_| Box::new(ir_dump::IrDumpPass))
            .with_flag(None, "ir-dump")
            .requires(&[AST_TO_IR]),
    )?;
    registry.register(
        PassDescriptor::new(NUMERIC_EXECUTION, "execute the specification", |_| {
            Box::new(execute::NumericExecutionPass)
        })
        .with_flag(Some('n'), "numeric-execution")
        .requires(&[AST_TO_IR]),
    )?;
    Ok(())
}

/// A registry holding all built-in passes
pub fn builtin_registry() -> Result<PassRegistry, RegistryError> {
    let mut registry = PassRegistry::new();
    register_builtin(&mut registry)?;
    registry.validate()?;
    Ok(registry)
}

/// Write `text` to `-o` when given, otherwise to the output channel.
pub(crate) fn emit(ctx: &PassContext<'_>, text: &str) -> Result<(), PassError> {
    match &ctx.config.output {
        Some(path) => {
            ctx.fs.write_file(path, text.as_bytes())?;
            tracing::debug!(path = %path.display(), bytes = text.len(), "wrote output");
        }
        None => ctx.log.output(text),
    }
    Ok(())
}


#[cfg(test)]
mod tests {
    use super::testing::Harness;
    use super::*;

    const COUNTER: &str = "init main\nfunction n = 41\nrule main = { n := n + 1 print n }";

    #[test]
    fn test_builtin_registry_order() {
        let registry = builtin_registry().unwrap();
        let ids: Vec<_> = registry.all().map(|d| d.id).collect();
        assert_eq!(
            ids,
            vec![
                LOAD_FILE,
                SOURCE_TO_AST,
                TYPE_CHECK,
                AST_DUMP_DOT,
                AST_TO_IR,
                IR_DUMP,
                NUMERIC_EXECUTION
            ]
        );
        let flagged: Vec<_> = registry
            .all()
            .filter(|d| !d.is_internal())
            .map(|d| d.long.unwrap_or_default())
            .collect();
        assert_eq!(flagged, vec!["ast-dump", "ir-dump", "numeric-execution"]);
    }

    #[test]
    fn test_default_pipeline_executes() {
        let mut harness = Harness::new(COUNTER);
        let report = harness.run(&[]).unwrap();
        assert_eq!(
            report.executed,
            vec![LOAD_FILE, SOURCE_TO_AST, TYPE_CHECK, AST_TO_IR, NUMERIC_EXECUTION]
        );
        assert_eq!(harness.output(), vec!["42"]);
    }

    #[test]
    fn test_ast_dump_skips_checking() {
        // an unknown location is a type error, but the dump only needs the AST
        let mut harness = Harness::new("init main\nrule main = { print nowhere }");
        let report = harness.run(&[AST_DUMP_DOT]).unwrap();
        assert_eq!(report.executed, vec![LOAD_FILE, SOURCE_TO_AST, AST_DUMP_DOT]);
        assert_eq!(report.finished_by, Some(AST_DUMP_DOT));
        assert!(harness.output()[0].starts_with("digraph \"main\""));
        assert!(!harness.store.has(TYPE_CHECK));
    }

    #[test]
    fn test_dump_to_output_file() {
        let mut harness = Harness::new(COUNTER);
        harness.config.output = Some("out/main.dot".into());
        harness.run(&[AST_DUMP_DOT]).unwrap();
        assert!(harness.output().is_empty());
        let dot = casmi_vfs::VirtualFileSystem::read_to_string(
            &harness.fs,
            std::path::Path::new("out/main.dot"),
        )
        .unwrap();
        assert!(dot.contains("rule main"));
    }

    #[test]
    fn test_first_terminal_pass_finishes() {
        let mut harness = Harness::new(COUNTER);
        let report = harness.run(&[AST_DUMP_DOT, NUMERIC_EXECUTION]).unwrap();
        assert_eq!(report.finished_by, Some(AST_DUMP_DOT));
        assert!(report.skipped.contains(&NUMERIC_EXECUTION));
        assert_eq!(harness.output().len(), 1);
    }
}
