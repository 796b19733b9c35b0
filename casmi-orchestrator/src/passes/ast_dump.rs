//! ast-dump-dot: Graphviz view of the parsed specification

use super::{emit, AST_DUMP_DOT, SOURCE_TO_AST};
use crate::error::PassError;
use crate::pass::{Pass, PassContext, PassOutcome};
use crate::store::ResultStore;
use casmi_core::{dot, Specification};

pub struct AstDumpDotPass;

impl Pass for AstDumpDotPass {
    fn run(
        &mut self,
        store: &mut ResultStore,
        ctx: &PassContext<'_>,
    ) -> Result<PassOutcome, PassError> {
        let specification = store.get::<Specification>(SOURCE_TO_AST)?;
        let graph = dot::to_dot(specification);
        emit(ctx, &graph)?;
        store.set(AST_DUMP_DOT, graph)?;
        Ok(PassOutcome::Finish)
    }
}
