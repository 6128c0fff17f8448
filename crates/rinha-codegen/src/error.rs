use std::fmt;

/// A fatal lowering or backend failure.
///
/// Every variant is terminal for the current compilation unit: the engine
/// stops on the first failure and no partial module is emitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodegenError {
    /// A `Var` or call callee names a symbol absent from both the local and
    /// global scope at the point of use. Signals a malformed AST.
    UnboundName(String),
    /// A node appeared in a position the lowering strategy does not support
    /// (e.g. an `if` outside tail position, a function used as a value).
    UnsupportedConstruct(String),
    /// An LLVM builder or module verification failure.
    Llvm(String),
    /// The external compiler, linker, or produced executable failed.
    BackendToolchain {
        tool: String,
        code: Option<i32>,
        stderr: String,
    },
}

impl fmt::Display for CodegenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnboundName(name) => write!(f, "unbound name: `{name}`"),
            Self::UnsupportedConstruct(msg) => write!(f, "unsupported construct: {msg}"),
            Self::Llvm(msg) => write!(f, "LLVM error: {msg}"),
            Self::BackendToolchain { tool, code, stderr } => {
                match code {
                    Some(code) => write!(f, "`{tool}` exited with status {code}")?,
                    None => write!(f, "`{tool}` was terminated before exiting")?,
                }
                if !stderr.is_empty() {
                    write!(f, ": {}", stderr.trim_end())?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for CodegenError {}

impl From<inkwell::builder::BuilderError> for CodegenError {
    fn from(err: inkwell::builder::BuilderError) -> Self {
        Self::Llvm(err.to_string())
    }
}
