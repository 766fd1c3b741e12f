use thiserror::Error;

#[derive(Clone, Debug, PartialEq, Error)]
pub enum SyntaxError {
    #[error("unexpected ')' at line {line}")]
    UnexpectedClose { line: usize },
    #[error("expected '(' at line {line}, got '{found}'")]
    ExpectedOpen { line: usize, found: String },
    #[error("expected ')' at line {line}, got end of input")]
    UnexpectedEof { line: usize },
    #[error("unexpected '{found}' at line {line} after the top-level form")]
    TrailingInput { line: usize, found: String },
}

#[derive(Clone, Debug, PartialEq, Error)]
pub enum Error {
    #[error("unrecognized input {text:?} at line {line}")]
    Lexical { line: usize, text: String },
    #[error("syntax error: {0}")]
    Syntax(#[from] SyntaxError),
    #[error("blank input")]
    EmptyInput,
    #[error("{name} takes {expected}, got {actual}")]
    MacroArity {
        name: &'static str,
        expected: &'static str,
        actual: usize,
    },
    #[error("invalid {name} macro: {message}")]
    MacroArgument { name: &'static str, message: String },
    #[error("static data takes {needed} bytes but memory holds {capacity}")]
    DataOverflow { needed: u64, capacity: u64 },
    #[error("malformed {form} form: {message}")]
    Malformed { form: String, message: String },
    #[error("cannot emit {0}")]
    UnsupportedNode(String),
}

impl Error {
    /// True when more input could complete the form that failed to read.
    pub fn is_incomplete(&self) -> bool {
        match self {
            Error::Syntax(SyntaxError::UnexpectedEof { .. }) => true,
            _ => false,
        }
    }
}
