//! Expression-to-value lowering.
//!
//! Implements `lower_value`, the central operation turning an AST node into
//! an LLVM value plus its static type tag. Operands are lowered left to
//! right, each to a value, before the operator is applied.

use inkwell::values::{BasicMetadataValueEnum, BasicValueEnum, IntValue};
use inkwell::IntPredicate;

use rinha_ast::{BinaryOp, Term};

use super::env::{Storage, TypeTag};
use super::{CodeGen, Cursor};
use crate::error::CodegenError;

impl<'ctx> CodeGen<'ctx> {
    /// Lower a value-producing term, yielding `(value, tag)`.
    pub(crate) fn lower_value(
        &mut self,
        cur: &Cursor<'ctx>,
        term: &Term,
    ) -> Result<(BasicValueEnum<'ctx>, TypeTag), CodegenError> {
        match term {
            Term::Int { value } => Ok((
                self.context
                    .i32_type()
                    .const_int(*value as u64, true)
                    .into(),
                TypeTag::Int,
            )),
            Term::Str { value } => self.lower_str_literal(cur, value),
            Term::Var { text } => self.lower_var(cur, text),
            Term::Binary { op, lhs, rhs } => self.lower_binary(cur, *op, lhs, rhs),
            Term::Call { callee, arguments } => self.lower_call(cur, &callee.text, arguments),
            other => Err(CodegenError::UnsupportedConstruct(format!(
                "{} cannot be lowered in value position",
                other.kind_name()
            ))),
        }
    }

    /// A string literal gets its own nul-terminated stack buffer per
    /// occurrence; literal text is never interned (unlike format templates).
    fn lower_str_literal(
        &mut self,
        cur: &Cursor<'ctx>,
        text: &str,
    ) -> Result<(BasicValueEnum<'ctx>, TypeTag), CodegenError> {
        let data = self.context.const_string(text.as_bytes(), true);
        let buffer = cur.builder.build_alloca(data.get_type(), "str")?;
        cur.builder.build_store(buffer, data)?;
        Ok((buffer.into(), TypeTag::Str))
    }

    /// Resolve a variable reference to its value.
    ///
    /// Loads through stack slots using the binding's *recorded* tag, never
    /// re-inferring: an `Int` slot holds the i32, a `Str` slot is itself
    /// the character buffer.
    fn lower_var(
        &mut self,
        cur: &Cursor<'ctx>,
        name: &str,
    ) -> Result<(BasicValueEnum<'ctx>, TypeTag), CodegenError> {
        let binding = self.env.resolve(name)?;
        let value = match binding.storage {
            Storage::Register(value) => value,
            Storage::StackSlot(slot) => match binding.tag {
                TypeTag::Int => cur.builder.build_load(self.context.i32_type(), slot, name)?,
                TypeTag::Str => slot.into(),
            },
            Storage::Constant(ptr) => ptr.into(),
            Storage::FunctionRef(_) => {
                return Err(CodegenError::UnsupportedConstruct(format!(
                    "function `{name}` used as a value"
                )))
            }
        };
        Ok((value, binding.tag))
    }

    /// Dispatch a binary operator over its lowered operands.
    ///
    /// Arithmetic uses the signed integer instructions; comparisons produce
    /// a boolean-width flag widened straight back to i32 so the result
    /// flows through arithmetic, conditions, and `%d` formatting as an
    /// ordinary integer. `And`/`Or` are bitwise, not short-circuiting.
    fn lower_binary(
        &mut self,
        cur: &Cursor<'ctx>,
        op: BinaryOp,
        lhs: &Term,
        rhs: &Term,
    ) -> Result<(BasicValueEnum<'ctx>, TypeTag), CodegenError> {
        let (lhs, lhs_tag) = self.lower_value(cur, lhs)?;
        let (rhs, rhs_tag) = self.lower_value(cur, rhs)?;
        if lhs_tag != TypeTag::Int || rhs_tag != TypeTag::Int {
            return Err(CodegenError::UnsupportedConstruct(format!(
                "`{op:?}` applied to a string value"
            )));
        }
        let l = lhs.into_int_value();
        let r = rhs.into_int_value();
        let b = &cur.builder;

        let value = match op {
            BinaryOp::Add => b.build_int_add(l, r, "add")?,
            BinaryOp::Sub => b.build_int_sub(l, r, "sub")?,
            BinaryOp::Mul => b.build_int_mul(l, r, "mul")?,
            BinaryOp::Div => b.build_int_signed_div(l, r, "div")?,
            BinaryOp::Rem => b.build_int_signed_rem(l, r, "rem")?,
            BinaryOp::And => b.build_and(l, r, "and")?,
            BinaryOp::Or => b.build_or(l, r, "or")?,
            BinaryOp::Lt => self.lower_comparison(cur, IntPredicate::SLT, l, r, "lt")?,
            BinaryOp::Gt => self.lower_comparison(cur, IntPredicate::SGT, l, r, "gt")?,
            BinaryOp::Lte => self.lower_comparison(cur, IntPredicate::SLE, l, r, "le")?,
            BinaryOp::Gte => self.lower_comparison(cur, IntPredicate::SGE, l, r, "ge")?,
            BinaryOp::Eq => self.lower_comparison(cur, IntPredicate::EQ, l, r, "eq")?,
            BinaryOp::Neq => self.lower_comparison(cur, IntPredicate::NE, l, r, "ne")?,
        };
        Ok((value.into(), TypeTag::Int))
    }

    fn lower_comparison(
        &self,
        cur: &Cursor<'ctx>,
        predicate: IntPredicate,
        l: IntValue<'ctx>,
        r: IntValue<'ctx>,
        name: &str,
    ) -> Result<IntValue<'ctx>, CodegenError> {
        let flag = cur.builder.build_int_compare(predicate, l, r, name)?;
        Ok(cur
            .builder
            .build_int_z_extend(flag, self.context.i32_type(), "cast")?)
    }

    /// Lower a call: arguments left to right, then the callee resolved
    /// against the function table. Result tag is the callee's declared
    /// return tag (`Int` for every user function).
    fn lower_call(
        &mut self,
        cur: &Cursor<'ctx>,
        callee: &str,
        arguments: &[Term],
    ) -> Result<(BasicValueEnum<'ctx>, TypeTag), CodegenError> {
        let mut args: Vec<BasicMetadataValueEnum<'ctx>> = Vec::with_capacity(arguments.len());
        for argument in arguments {
            let (value, _) = self.lower_value(cur, argument)?;
            args.push(value.into());
        }

        let binding = self.env.resolve(callee)?;
        let Storage::FunctionRef(fn_val) = binding.storage else {
            return Err(CodegenError::UnsupportedConstruct(format!(
                "`{callee}` is not callable"
            )));
        };

        let site = cur.builder.build_call(fn_val, &args, "call")?;
        let value = site
            .try_as_basic_value()
            .basic()
            .ok_or_else(|| CodegenError::Llvm(format!("call to `{callee}` produced no value")))?;
        Ok((value, TypeTag::Int))
    }
}
