//! AST model and JSON decoding for the Rinha compiler.
//!
//! Programs arrive pre-parsed as JSON documents (`.rinha.json`): a top-level
//! wrapper with an `expression` field holding the root term, where every
//! term carries a `kind` discriminator. This crate decodes that wire format
//! into the closed [`Term`] type consumed by `rinha-codegen`.

pub mod error;

use serde::Deserialize;

pub use error::InputError;

/// An identifier object on the wire: `{"text": "name", ...}`.
///
/// Used for `Let` names, function parameters, and call callees. Extra
/// fields (the reference parser emits `location` spans) are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Ident {
    pub text: String,
}

/// Binary operator tags.
///
/// Closed set; an unrecognized tag on the wire fails decoding and is
/// reported as [`InputError::UnsupportedConstruct`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Lt,
    Gt,
    Lte,
    Gte,
    Eq,
    Neq,
    And,
    Or,
}

/// A Rinha expression term, discriminated by the `kind` field.
///
/// `Let.next` is the continuation chain: sequential statements inside one
/// function body form a singly linked list through it, and the final node
/// in the chain decides the function's return value.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "kind")]
pub enum Term {
    Int {
        value: i64,
    },
    Str {
        value: String,
    },
    Var {
        text: String,
    },
    Binary {
        op: BinaryOp,
        lhs: Box<Term>,
        rhs: Box<Term>,
    },
    If {
        condition: Box<Term>,
        then: Box<Term>,
        otherwise: Box<Term>,
    },
    Let {
        name: Ident,
        value: Box<Term>,
        next: Option<Box<Term>>,
    },
    // The function body lives in the `value` field on the wire.
    Function {
        parameters: Vec<Ident>,
        value: Box<Term>,
    },
    Call {
        callee: Ident,
        arguments: Vec<Term>,
    },
    Print {
        value: Box<Term>,
    },
}

impl Term {
    /// Short human-readable name of the node kind, for diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Term::Int { .. } => "Int",
            Term::Str { .. } => "Str",
            Term::Var { .. } => "Var",
            Term::Binary { .. } => "Binary",
            Term::If { .. } => "If",
            Term::Let { .. } => "Let",
            Term::Function { .. } => "Function",
            Term::Call { .. } => "Call",
            Term::Print { .. } => "Print",
        }
    }
}

/// A decoded top-level AST document.
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub name: Option<String>,
    pub expression: Term,
}

#[derive(Debug, Deserialize)]
struct RawProgram {
    name: Option<String>,
    expression: Option<Term>,
}

/// Decode a top-level AST document from JSON text.
///
/// A document whose root `expression` field is missing or null fails with
/// [`InputError::MalformedInput`] before any lowering happens. An unknown
/// node `kind` or operator tag fails with
/// [`InputError::UnsupportedConstruct`].
pub fn parse_program(source: &str) -> Result<Program, InputError> {
    let raw: RawProgram = serde_json::from_str(source).map_err(classify_decode_error)?;
    let expression = raw
        .expression
        .ok_or_else(|| InputError::MalformedInput("document has no root expression".into()))?;
    Ok(Program {
        name: raw.name,
        expression,
    })
}

/// Decode a top-level AST document from a file.
pub fn parse_program_file(path: &std::path::Path) -> Result<Program, InputError> {
    let source = std::fs::read_to_string(path)
        .map_err(|e| InputError::MalformedInput(format!("cannot read '{}': {e}", path.display())))?;
    parse_program(&source)
}

/// Split serde's decode failures into the two fatal input categories: an
/// out-of-set `kind`/`op` tag is an unsupported construct, everything else
/// (bad JSON, wrong field shapes) is malformed input.
fn classify_decode_error(err: serde_json::Error) -> InputError {
    let msg = err.to_string();
    if msg.contains("unknown variant") {
        InputError::UnsupportedConstruct(msg)
    } else {
        InputError::MalformedInput(msg)
    }
}
