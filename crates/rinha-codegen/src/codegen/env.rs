//! Scoped symbol table tracking bindings and their run-time representation.
//!
//! Two tiers: the *global* scope (function references, interned format
//! constants, external runtime primitives) lives for the whole module; the
//! *local* scope (parameters, `let`-bound variables) belongs to one function
//! body and is swapped out wholesale on function entry and exit. A local
//! binding shadows a global of the same name.

use inkwell::values::{BasicValueEnum, FunctionValue, PointerValue};
use rustc_hash::FxHashMap;

use crate::error::CodegenError;

/// Static type tag propagated at lowering time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeTag {
    Int,
    Str,
}

impl TypeTag {
    /// The printf template text selected for values of this tag.
    pub fn template(self) -> &'static str {
        match self {
            TypeTag::Int => "%d\n",
            TypeTag::Str => "%s\n",
        }
    }

    /// Module-level name of the interned template global for this tag.
    pub fn template_name(self) -> &'static str {
        match self {
            TypeTag::Int => ".fmt_int",
            TypeTag::Str => ".fmt_str",
        }
    }
}

/// Where a bound value lives at run time.
#[derive(Debug, Clone, Copy)]
pub enum Storage<'ctx> {
    /// An interned module-level constant (format templates).
    Constant(PointerValue<'ctx>),
    /// An alloca'd slot. For `Int` the slot holds the i32; for `Str` the
    /// slot is itself the character buffer.
    StackSlot(PointerValue<'ctx>),
    /// An SSA value bound directly, no slot (parameters, expression results).
    Register(BasicValueEnum<'ctx>),
    /// A function in the module's function table.
    FunctionRef(FunctionValue<'ctx>),
}

/// A name's storage location paired with its type tag.
#[derive(Debug, Clone, Copy)]
pub struct Binding<'ctx> {
    pub storage: Storage<'ctx>,
    pub tag: TypeTag,
}

impl<'ctx> Binding<'ctx> {
    pub fn register(value: BasicValueEnum<'ctx>, tag: TypeTag) -> Self {
        Binding {
            storage: Storage::Register(value),
            tag,
        }
    }

    pub fn stack_slot(slot: PointerValue<'ctx>, tag: TypeTag) -> Self {
        Binding {
            storage: Storage::StackSlot(slot),
            tag,
        }
    }

    pub fn constant(ptr: PointerValue<'ctx>, tag: TypeTag) -> Self {
        Binding {
            storage: Storage::Constant(ptr),
            tag,
        }
    }

    /// User functions return an integer-width value, so a function
    /// reference carries the `Int` tag.
    pub fn function(value: FunctionValue<'ctx>) -> Self {
        Binding {
            storage: Storage::FunctionRef(value),
            tag: TypeTag::Int,
        }
    }
}

/// The two-tier symbol table.
pub struct Environment<'ctx> {
    globals: FxHashMap<String, Binding<'ctx>>,
    locals: FxHashMap<String, Binding<'ctx>>,
}

impl<'ctx> Environment<'ctx> {
    pub fn new() -> Self {
        Environment {
            globals: FxHashMap::default(),
            locals: FxHashMap::default(),
        }
    }

    /// Insert or overwrite a local-scope entry.
    pub fn declare_local(&mut self, name: &str, binding: Binding<'ctx>) {
        self.locals.insert(name.to_string(), binding);
    }

    /// Insert into the global scope.
    pub fn declare_global(&mut self, name: &str, binding: Binding<'ctx>) {
        self.globals.insert(name.to_string(), binding);
    }

    /// Look a name up, local scope first, then global.
    pub fn resolve(&self, name: &str) -> Result<Binding<'ctx>, CodegenError> {
        self.locals
            .get(name)
            .or_else(|| self.globals.get(name))
            .copied()
            .ok_or_else(|| CodegenError::UnboundName(name.to_string()))
    }

    /// Look a name up in the global scope only, bypassing local shadowing.
    /// Used for runtime primitives like `printf`.
    pub fn resolve_global(&self, name: &str) -> Result<Binding<'ctx>, CodegenError> {
        self.globals
            .get(name)
            .copied()
            .ok_or_else(|| CodegenError::UnboundName(name.to_string()))
    }

    /// Begin a fresh local scope for a function body, returning the saved
    /// caller scope. Must be paired with [`Environment::exit_function`].
    pub fn enter_function(&mut self) -> FxHashMap<String, Binding<'ctx>> {
        std::mem::take(&mut self.locals)
    }

    /// Discard the current local scope and restore the caller's.
    pub fn exit_function(&mut self, saved: FxHashMap<String, Binding<'ctx>>) {
        self.locals = saved;
    }

    /// Copy the current local scope so a branch arm can be lowered and its
    /// declarations rolled back afterward. Bindings are `Copy`, so this is
    /// a shallow map clone.
    pub fn snapshot_locals(&self) -> FxHashMap<String, Binding<'ctx>> {
        self.locals.clone()
    }

    /// Roll the local scope back to a snapshot.
    pub fn restore_locals(&mut self, saved: FxHashMap<String, Binding<'ctx>>) {
        self.locals = saved;
    }

    /// The cached format-template pointer for `tag`, if already interned.
    pub fn cached_format_constant(&self, tag: TypeTag) -> Option<PointerValue<'ctx>> {
        match self.globals.get(tag.template_name())?.storage {
            Storage::Constant(ptr) => Some(ptr),
            _ => None,
        }
    }
}

impl<'ctx> Default for Environment<'ctx> {
    fn default() -> Self {
        Self::new()
    }
}
