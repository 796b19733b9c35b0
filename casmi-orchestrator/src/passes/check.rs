//! type-check: name resolution and type checking

use super::{SOURCE_TO_AST, TYPE_CHECK};
use crate::error::PassError;
use crate::pass::{Pass, PassContext, PassOutcome};
use crate::store::ResultStore;
use casmi_core::ast::Specification;

pub struct TypeCheckPass;

impl Pass for TypeCheckPass {
    fn run(
        &mut self,
        store: &mut ResultStore,
        ctx: &PassContext<'_>,
    ) -> Result<PassOutcome, PassError> {
        let specification = store.get::<Specification>(SOURCE_TO_AST)?;
        match casmi_core::check(specification) {
            Ok(checked) => {
                store.set(TYPE_CHECK, checked)?;
                Ok(PassOutcome::Continue)
            }
            Err(errors) => {
                // every problem becomes its own diagnostic
                for error in &errors {
                    casmi_log::error!(ctx.log, "{error}");
                }
                Err(PassError::Failed(match errors.len() {
                    1 => "found 1 error".to_string(),
                    n => format!("found {n} errors"),
                }))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::passes::testing::Harness;
    use casmi_core::CheckedSpecification;

    #[test]
    fn test_reports_every_error() {
        let mut harness =
            Harness::new("init main\nrule main = {\n x := 1\n call other\n}");
        let err = harness.run(&[TYPE_CHECK]).unwrap_err();
        assert_eq!(
            err.to_string(),
            "pass 'type-check' failed: found 2 errors"
        );
        assert_eq!(
            harness.errors(),
            vec![
                "line 3: unknown location 'x'".to_string(),
                "line 4: unknown rule 'other'".to_string(),
            ]
        );
        assert!(!harness.store.has(TYPE_CHECK));
    }

    #[test]
    fn test_stores_checked_specification() {
        let mut harness = Harness::new("init main\nfunction n = 0\nrule main = { n := 1 }");
        harness.run(&[TYPE_CHECK]).unwrap();
        let checked = harness
            .store
            .get::<CheckedSpecification>(TYPE_CHECK)
            .unwrap();
        assert_eq!(checked.init, "main");
    }
}
