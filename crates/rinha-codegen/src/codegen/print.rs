//! Print dispatch.
//!
//! Selects the runtime formatting template from a value's static type tag
//! (`Int` prints decimal, `Str` prints text) and emits the `printf` call.
//! Emitting a print never terminates the current block.

use inkwell::module::Linkage;
use inkwell::values::{BasicMetadataValueEnum, BasicValueEnum, PointerValue};

use rinha_ast::Term;

use super::env::{Binding, Storage, TypeTag};
use super::{CodeGen, Cursor};
use crate::error::CodegenError;

impl<'ctx> CodeGen<'ctx> {
    /// Lower `print(value)`, returning the printed value and its tag so a
    /// `let`-bound print can observe what it printed.
    pub(crate) fn lower_print(
        &mut self,
        cur: &Cursor<'ctx>,
        value: &Term,
    ) -> Result<(BasicValueEnum<'ctx>, TypeTag), CodegenError> {
        // Slot loads already happened inside lower_value, governed by the
        // binding's recorded tag, so the pointee's tag drives formatting.
        let (value, tag) = self.lower_value(cur, value)?;
        let template = self.intern_format_constant(tag);

        let printf = self.env.resolve_global("printf")?;
        let Storage::FunctionRef(printf) = printf.storage else {
            return Err(CodegenError::Llvm("printf is not a function".into()));
        };

        let args: [BasicMetadataValueEnum<'ctx>; 2] = [template.into(), value.into()];
        cur.builder.build_call(printf, &args, "print")?;
        Ok((value, tag))
    }

    /// The interned formatting-template constant for `tag`.
    ///
    /// Created and cached in the global scope on first request; at most one
    /// template global exists per tag per module, under a fixed name, so
    /// repeated compilations of the same input stay byte-identical.
    pub(crate) fn intern_format_constant(&mut self, tag: TypeTag) -> PointerValue<'ctx> {
        if let Some(ptr) = self.env.cached_format_constant(tag) {
            return ptr;
        }

        let data = self.context.const_string(tag.template().as_bytes(), true);
        let global = self.module.add_global(data.get_type(), None, tag.template_name());
        global.set_initializer(&data);
        global.set_constant(true);
        global.set_linkage(Linkage::Internal);

        let ptr = global.as_pointer_value();
        self.env
            .declare_global(tag.template_name(), Binding::constant(ptr, tag));
        ptr
    }
}
