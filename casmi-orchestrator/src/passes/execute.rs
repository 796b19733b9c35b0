//! numeric-execution: run the init rule of the lowered program
//!
//! `--in` bindings override initial values before the run; `<keyboard>`
//! reads one line from standard input. After the run every `--out`
//! binding writes `name = value` to the output channel or to a file.

use super::{AST_TO_IR, NUMERIC_EXECUTION};
use crate::error::PassError;
use crate::pass::{Pass, PassContext, PassOutcome};
use crate::store::ResultStore;
use casmi_config::{Binding, KEYBOARD, STDOUT};
use casmi_core::{Machine, Program, RuntimeError, Value};
use std::collections::{BTreeMap, BTreeSet};
use std::io::BufRead;
use std::path::PathBuf;

/// Final values of the locations named by `--out`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutionResult {
    pub outputs: Vec<(String, Value)>,
}

pub struct NumericExecutionPass;

impl Pass for NumericExecutionPass {
    fn run(
        &mut self,
        store: &mut ResultStore,
        ctx: &PassContext<'_>,
    ) -> Result<PassOutcome, PassError> {
        let program = store.get::<Program>(AST_TO_IR)?;
        let mut machine = Machine::new(program, ctx.config.limits.max_call_depth);

        let mut bound = BTreeSet::new();
        for binding in &ctx.config.inputs {
            if !bound.insert(binding.location.as_str()) {
                casmi_log::warning!(
                    ctx.log,
                    "location '{}' bound more than once, the last binding wins",
                    binding.location
                );
            }
            let value = input_value(binding)?;
            machine.set_from_str(&binding.location, &value)?;
        }

        let span = tracing::debug_span!("execute", init = %program.init);
        span.in_scope(|| machine.run(&mut |value| ctx.log.output(value.to_string())))?;

        let mut result = ExecutionResult::default();
        let mut files: BTreeMap<PathBuf, String> = BTreeMap::new();
        for binding in &ctx.config.outputs {
            let value = machine
                .get(&binding.location)
                .cloned()
                .ok_or_else(|| RuntimeError::UnknownLocation(binding.location.clone()))?;
            if binding.value == STDOUT {
                casmi_log::output!(ctx.log, "{} = {}", binding.location, value);
            } else {
                let line = format!("{} = {}", binding.location, value);
                let text = files.entry(PathBuf::from(&binding.value)).or_default();
                text.push_str(&line);
                text.push('\n');
            }
            result.outputs.push((binding.location.clone(), value));
        }
        for (path, text) in &files {
            ctx.fs.write_file(path, text.as_bytes())?;
        }

        store.set(NUMERIC_EXECUTION, result)?;
        Ok(PassOutcome::Continue)
    }
}

fn input_value(binding: &Binding) -> Result<String, PassError> {
    if binding.value != KEYBOARD {
        return Ok(binding.value.clone());
    }
    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::passes::testing::Harness;
    use crate::OrchestratorError;
    use casmi_vfs::VirtualFileSystem;
    use std::path::Path;

    const SPEC: &str = "init main\nfunction n = 1\nfunction s = \"x\"\nrule main = { n := n + 1 print n }";

    #[test]
    fn test_in_and_out_bindings() {
        let mut harness = Harness::new(SPEC);
        harness.config.inputs = vec![Binding::new("n", "10"), Binding::new("s", "hello")];
        harness.config.outputs = vec![
            Binding::new("n", STDOUT),
            Binding::new("s", "state.txt"),
            Binding::new("n", "state.txt"),
        ];
        harness.run(&[NUMERIC_EXECUTION]).unwrap();

        assert_eq!(harness.output(), vec!["11", "n = 11"]);
        assert_eq!(
            harness.fs.read_to_string(Path::new("state.txt")).unwrap(),
            "s = hello\nn = 11\n"
        );
        let result = harness
            .store
            .get::<ExecutionResult>(NUMERIC_EXECUTION)
            .unwrap();
        assert_eq!(result.outputs[0], ("n".to_string(), Value::Integer(11)));
    }

    #[test]
    fn test_rebinding_warns_and_last_wins() {
        let mut harness = Harness::new(SPEC);
        harness.config.inputs = vec![Binding::new("n", "10"), Binding::new("n", "20")];
        harness.run(&[NUMERIC_EXECUTION]).unwrap();

        assert_eq!(harness.output(), vec!["21"]);
        let warnings: Vec<_> = harness
            .log
            .records()
            .into_iter()
            .filter(|r| r.level == casmi_log::Level::Warning)
            .map(|r| (r.source, r.message))
            .collect();
        assert_eq!(
            warnings,
            vec![(
                "numeric-execution".to_string(),
                "location 'n' bound more than once, the last binding wins".to_string()
            )]
        );
    }

    #[test]
    fn test_bad_input_value() {
        let mut harness = Harness::new(SPEC);
        harness.config.inputs = vec![Binding::new("n", "ten")];
        let err = harness.run(&[]).unwrap_err();
        assert!(matches!(
            err,
            OrchestratorError::PassFailed {
                pass: NUMERIC_EXECUTION,
                source: PassError::Runtime(RuntimeError::Type { .. })
            }
        ));
        assert!(harness.output().is_empty());
    }

    #[test]
    fn test_unknown_output_location() {
        let mut harness = Harness::new(SPEC);
        harness.config.outputs = vec![Binding::new("ghost", STDOUT)];
        let err = harness.run(&[]).unwrap_err();
        assert!(err.to_string().contains("unknown location 'ghost'"));
    }

    #[test]
    fn test_call_depth_limit_from_config() {
        let mut harness = Harness::new("init main\nrule main = { call main }");
        harness.config.limits.max_call_depth = 4;
        let err = harness.run(&[]).unwrap_err();
        assert!(err
            .to_string()
            .contains("call depth exceeds 4 in rule 'main'"));
    }
}
