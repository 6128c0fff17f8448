use std::fmt;

/// A fatal input decoding error.
///
/// Both variants abort the compilation before any lowering starts; there is
/// no recovery or partial decoding of a single document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputError {
    /// The document is not a valid AST document (bad JSON, wrong field
    /// shapes, or a missing root expression).
    MalformedInput(String),
    /// A node `kind` or operator tag outside the supported closed set.
    UnsupportedConstruct(String),
}

impl fmt::Display for InputError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedInput(msg) => write!(f, "malformed input: {msg}"),
            Self::UnsupportedConstruct(msg) => write!(f, "unsupported construct: {msg}"),
        }
    }
}

impl std::error::Error for InputError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_error_display() {
        assert_eq!(
            InputError::MalformedInput("document has no root expression".into()).to_string(),
            "malformed input: document has no root expression"
        );
        assert_eq!(
            InputError::UnsupportedConstruct("unknown variant `Tuple`".into()).to_string(),
            "unsupported construct: unknown variant `Tuple`"
        );
    }
}
