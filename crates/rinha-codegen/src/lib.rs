//! LLVM IR lowering for pre-parsed Rinha ASTs.
//!
//! The core is a single-pass recursive-descent walk over a [`rinha_ast::Term`]
//! tree: [`codegen::CodeGen`] owns the LLVM module under construction, a
//! two-tier symbol [`codegen::env::Environment`], and lowers each node into
//! instructions through a per-function [`codegen::Cursor`]. The result is one
//! textual `.ll` artifact per input document; [`toolchain`] drives the
//! external `llc`/`clang` steps and runs the produced binary.

pub mod codegen;
pub mod error;
pub mod toolchain;

pub use codegen::CodeGen;
pub use error::CodegenError;

use inkwell::context::Context;
use rinha_ast::Program;

/// Lower a program and return the textual IR.
///
/// Convenience wrapper that owns the LLVM context for the duration of one
/// compilation; nothing is shared across invocations. On any error no IR is
/// produced for the module.
pub fn compile_to_ir(program: &Program) -> Result<String, CodegenError> {
    let context = Context::create();
    let mut codegen = CodeGen::new(&context, program.name.as_deref().unwrap_or("module"));
    codegen.compile(program)?;
    Ok(codegen.ir_to_string())
}
