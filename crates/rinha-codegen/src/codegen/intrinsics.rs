//! External runtime declarations.

use inkwell::context::Context;
use inkwell::module::{Linkage, Module};
use inkwell::values::FunctionValue;
use inkwell::AddressSpace;

/// Declare the variadic C formatting primitive used by print dispatch:
/// `declare i32 @printf(ptr, ...)`.
///
/// Called once during module initialization, before any lowering that
/// might emit a print.
pub fn declare_printf<'ctx>(context: &'ctx Context, module: &Module<'ctx>) -> FunctionValue<'ctx> {
    let i32_type = context.i32_type();
    let ptr_type = context.ptr_type(AddressSpace::default());
    let printf_type = i32_type.fn_type(&[ptr_type.into()], true);
    module.add_function("printf", printf_type, Some(Linkage::External))
}
