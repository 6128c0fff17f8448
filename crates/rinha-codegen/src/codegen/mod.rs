//! LLVM IR generation from the Rinha AST.
//!
//! ## Architecture
//!
//! - [`CodeGen`]: owns the LLVM context handle, the module under
//!   construction, and the symbol [`env::Environment`]
//! - [`Cursor`]: the per-function insertion point, created fresh for each
//!   function assembly and passed by reference through the recursion
//! - [`env`]: two-tier symbol table and format-constant interning
//! - [`expr`]: value lowering (literals, variables, binary ops, calls)
//! - [`flow`]: tail-position `if` lowering
//! - [`print`]: print dispatch over the value's type tag
//! - [`intrinsics`]: external runtime declarations

pub mod env;
pub mod expr;
pub mod flow;
pub mod intrinsics;
pub mod print;

use std::path::Path;

use inkwell::builder::Builder;
use inkwell::context::Context;
use inkwell::module::Module;
use inkwell::targets::TargetMachine;
use inkwell::types::BasicMetadataTypeEnum;
use inkwell::values::FunctionValue;

use rinha_ast::{Ident, Program, Term};

use self::env::{Binding, Environment, TypeTag};
use crate::error::CodegenError;

/// The active insertion point within one function's instruction stream.
///
/// Exactly one cursor is live per function being lowered. Assembling a
/// nested function creates a new cursor; the caller's is restored by the
/// call stack, never shared across functions.
pub struct Cursor<'ctx> {
    pub(crate) function: FunctionValue<'ctx>,
    pub(crate) builder: Builder<'ctx>,
}

/// The main lowering context.
///
/// Created empty, populated by one top-level pass over the statement chain,
/// then serialized. Holds no state across compilations.
pub struct CodeGen<'ctx> {
    pub(crate) context: &'ctx Context,
    pub(crate) module: Module<'ctx>,
    pub(crate) env: Environment<'ctx>,
}

impl<'ctx> CodeGen<'ctx> {
    /// Create an empty module targeting the host triple.
    pub fn new(context: &'ctx Context, module_name: &str) -> Self {
        let module = context.create_module(module_name);
        module.set_triple(&TargetMachine::get_default_triple());
        CodeGen {
            context,
            module,
            env: Environment::new(),
        }
    }

    /// Lower a whole program into the module.
    ///
    /// Declares the runtime formatting primitive, assembles the implicit
    /// `main` entry function from the top-level statement chain, and
    /// verifies the module. The first failure aborts the compilation; no
    /// partial module survives to emission.
    pub fn compile(&mut self, program: &Program) -> Result<(), CodegenError> {
        let printf = intrinsics::declare_printf(self.context, &self.module);
        self.env.declare_global("printf", Binding::function(printf));

        let i32_type = self.context.i32_type();
        let main_fn = self
            .module
            .add_function("main", i32_type.fn_type(&[], false), None);
        self.env.declare_global("main", Binding::function(main_fn));

        let entry = self.context.append_basic_block(main_fn, "entry");
        let builder = self.context.create_builder();
        builder.position_at_end(entry);
        // The entry function owns the outermost cursor.
        let cur = Cursor {
            function: main_fn,
            builder,
        };
        self.lower_chain(&cur, &program.expression)?;

        self.module
            .verify()
            .map_err(|e| CodegenError::Llvm(e.to_string()))
    }

    /// Write the module as textual LLVM IR.
    pub fn emit_ir(&self, path: &Path) -> Result<(), CodegenError> {
        self.module
            .print_to_file(path)
            .map_err(|e| CodegenError::Llvm(e.to_string()))
    }

    /// The textual LLVM IR as a string.
    pub fn ir_to_string(&self) -> String {
        self.module.print_to_string().to_string()
    }

    // ── Function assembly ────────────────────────────────────────────

    /// Turn a `Function`-valued binding into an IR function.
    ///
    /// The function is declared in the global scope *before* its body is
    /// lowered so recursive calls resolve. Parameters are bound as register
    /// values in a fresh local scope; the caller's scope and cursor are
    /// restored on completion.
    pub(crate) fn assemble_function(
        &mut self,
        name: &str,
        parameters: &[Ident],
        body: &Term,
    ) -> Result<FunctionValue<'ctx>, CodegenError> {
        let i32_type = self.context.i32_type();
        let param_types: Vec<BasicMetadataTypeEnum<'ctx>> =
            vec![i32_type.into(); parameters.len()];
        let fn_val = self
            .module
            .add_function(name, i32_type.fn_type(&param_types, false), None);
        self.env.declare_global(name, Binding::function(fn_val));

        let entry = self.context.append_basic_block(fn_val, "entry");
        let builder = self.context.create_builder();
        builder.position_at_end(entry);
        let cur = Cursor {
            function: fn_val,
            builder,
        };

        let saved = self.env.enter_function();
        for (i, param) in parameters.iter().enumerate() {
            let value = fn_val.get_nth_param(i as u32).ok_or_else(|| {
                CodegenError::Llvm(format!("missing parameter {i} for function `{name}`"))
            })?;
            value.set_name(&param.text);
            self.env
                .declare_local(&param.text, Binding::register(value, TypeTag::Int));
        }
        let lowered = self.lower_chain(&cur, body);
        self.env.exit_function(saved);
        lowered?;

        Ok(fn_val)
    }

    // ── Statement chains ─────────────────────────────────────────────

    /// Lower a `Let` continuation chain, terminating the current block.
    ///
    /// Walks `next` links, materializing each binding; the final node in
    /// the chain decides the function's return value (defaulting to zero).
    /// Every path out of here ends the current block in a `ret`.
    pub(crate) fn lower_chain(
        &mut self,
        cur: &Cursor<'ctx>,
        term: &Term,
    ) -> Result<(), CodegenError> {
        match term {
            Term::Let { name, value, next } => {
                self.lower_binding(cur, name, value)?;
                match next {
                    Some(next) => self.lower_chain(cur, next),
                    None => self.return_zero(cur),
                }
            }
            Term::If {
                condition,
                then,
                otherwise,
            } => self.lower_if(cur, condition, then, otherwise),
            Term::Print { value } => {
                self.lower_print(cur, value)?;
                // Terminal print: nothing follows, the function yields zero.
                self.return_zero(cur)
            }
            value_term => {
                let (value, tag) = self.lower_value(cur, value_term)?;
                match tag {
                    TypeTag::Int => {
                        cur.builder.build_return(Some(&value))?;
                        Ok(())
                    }
                    // A stack string cannot escape an i32-returning function.
                    TypeTag::Str => self.return_zero(cur),
                }
            }
        }
    }

    /// Materialize one `let` binding into the current scope.
    fn lower_binding(
        &mut self,
        cur: &Cursor<'ctx>,
        name: &Ident,
        value: &Term,
    ) -> Result<(), CodegenError> {
        match value {
            Term::Function {
                parameters,
                value: body,
            } => {
                self.assemble_function(&name.text, parameters, body)?;
                Ok(())
            }
            Term::Int { value } => {
                let i32_type = self.context.i32_type();
                let slot = cur.builder.build_alloca(i32_type, &name.text)?;
                cur.builder
                    .build_store(slot, i32_type.const_int(*value as u64, true))?;
                self.env
                    .declare_local(&name.text, Binding::stack_slot(slot, TypeTag::Int));
                Ok(())
            }
            Term::Str { .. } => {
                // The literal's freshly alloca'd buffer is the slot.
                let (value, _) = self.lower_value(cur, value)?;
                self.env.declare_local(
                    &name.text,
                    Binding::stack_slot(value.into_pointer_value(), TypeTag::Str),
                );
                Ok(())
            }
            Term::Print { value } => {
                // An intermediate print in the chain; emits no terminator,
                // and the binding observes the printed value.
                let (value, tag) = self.lower_print(cur, value)?;
                self.env
                    .declare_local(&name.text, Binding::register(value, tag));
                Ok(())
            }
            Term::Binary { .. } | Term::Call { .. } | Term::Var { .. } => {
                let (value, tag) = self.lower_value(cur, value)?;
                self.env
                    .declare_local(&name.text, Binding::register(value, tag));
                Ok(())
            }
            Term::If { .. } => Err(CodegenError::UnsupportedConstruct(format!(
                "`if` bound to `{}`; `if` is only supported in tail position",
                name.text
            ))),
            Term::Let { .. } => Err(CodegenError::UnsupportedConstruct(format!(
                "nested `let` bound to `{}`",
                name.text
            ))),
        }
    }

    pub(crate) fn return_zero(&self, cur: &Cursor<'ctx>) -> Result<(), CodegenError> {
        let zero = self.context.i32_type().const_zero();
        cur.builder.build_return(Some(&zero))?;
        Ok(())
    }
}
