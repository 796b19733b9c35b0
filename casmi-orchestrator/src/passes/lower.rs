//! ast-to-ir: lower the checked specification

use super::{AST_TO_IR, TYPE_CHECK};
use crate::error::PassError;
use crate::pass::{Pass, PassContext, PassOutcome};
use crate::store::ResultStore;
use casmi_core::{ir, CheckedSpecification};

pub struct AstToIrPass;

impl Pass for AstToIrPass {
    fn run(
        &mut self,
        store: &mut ResultStore,
        _ctx: &PassContext<'_>,
    ) -> Result<PassOutcome, PassError> {
        let checked = store.get::<CheckedSpecification>(TYPE_CHECK)?;
        let program = ir::lower(checked);
        tracing::debug!(
            rules = program.rules.len(),
            instructions = program.instruction_count(),
            "lowered program"
        );
        store.set(AST_TO_IR, program)?;
        Ok(PassOutcome::Continue)
    }
}
