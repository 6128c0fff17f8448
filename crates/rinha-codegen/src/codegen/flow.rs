//! Tail-position `if` lowering.
//!
//! An `if` expression compiles to a conditional branch into two arm blocks,
//! each of which is lowered with the statement-chain algorithm and so ends
//! in a `ret`. Both arms terminate the function; an `if` is therefore only
//! valid in tail position of a function body.

use inkwell::IntPredicate;

use rinha_ast::Term;

use super::env::TypeTag;
use super::{CodeGen, Cursor};
use crate::error::CodegenError;

impl<'ctx> CodeGen<'ctx> {
    pub(crate) fn lower_if(
        &mut self,
        cur: &Cursor<'ctx>,
        condition: &Term,
        then: &Term,
        otherwise: &Term,
    ) -> Result<(), CodegenError> {
        let (cond, tag) = self.lower_value(cur, condition)?;
        if tag != TypeTag::Int {
            return Err(CodegenError::UnsupportedConstruct(
                "`if` condition is a string value".into(),
            ));
        }
        // br wants an i1; values are i32, so truth is `!= 0`.
        let zero = self.context.i32_type().const_zero();
        let truth =
            cur.builder
                .build_int_compare(IntPredicate::NE, cond.into_int_value(), zero, "cond")?;

        let then_bb = self.context.append_basic_block(cur.function, "then");
        let else_bb = self.context.append_basic_block(cur.function, "else");
        let join_bb = self.context.append_basic_block(cur.function, "join");

        cur.builder
            .build_conditional_branch(truth, then_bb, else_bb)?;

        // Locals declared inside one arm must not leak into the other, so
        // each arm lowers against a rolled-back copy of the current scope.
        let saved = self.env.snapshot_locals();
        cur.builder.position_at_end(then_bb);
        let lowered = self.lower_chain(cur, then);
        self.env.restore_locals(saved.clone());
        lowered?;

        cur.builder.position_at_end(else_bb);
        let lowered = self.lower_chain(cur, otherwise);
        self.env.restore_locals(saved);
        lowered?;

        // Structural rule: every block ends in a terminator. The join block
        // is unreachable once both arms return, but it still gets one.
        cur.builder.position_at_end(join_bb);
        self.return_zero(cur)
    }
}
