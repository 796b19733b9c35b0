//! ir-dump: the lowered program as pretty-printed JSON

use super::{emit, AST_TO_IR};
use crate::error::PassError;
use crate::pass::{Pass, PassContext, PassOutcome};
use crate::store::ResultStore;
use casmi_core::Program;

pub struct IrDumpPass;

impl Pass for IrDumpPass {
    fn run(
        &mut self,
        store: &mut ResultStore,
        ctx: &PassContext<'_>,
    ) -> Result<PassOutcome, PassError> {
        let program = store.get::<Program>(AST_TO_IR)?;
        let json = serde_json::to_string_pretty(program)?;
        emit(ctx, &json)?;
        Ok(PassOutcome::Finish)
    }
}
