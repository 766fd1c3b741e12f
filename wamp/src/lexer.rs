use lazy_static::lazy_static;
use regex::Regex;

use crate::ast::{Kind, Node};
use crate::error::Error;

lazy_static! {
    static ref TOKEN_RE: Regex = Regex::new(concat!(
        r"[\s]+",
        r"|(?s:\(;.*?;\))",
        r"|[\[\]{}()`~^@]",
        r#"|'(?:(?s:\\.)|[^\\'])*'?"#,
        r#"|"(?:(?s:\\.)|[^\\"])*"?"#,
        r"|;;.*",
        r#"|[^\s\[\]{}()'"`@,;]+"#,
    ))
    .unwrap();
    static ref SPACE_RE: Regex = Regex::new(r"^(?:[\s]+|;;.*|(?s:\(;.*))$").unwrap();
    static ref INT_RE: Regex = Regex::new(r"^[-+]?(?:0x[0-9a-fA-F]+|[0-9]+)$").unwrap();
    static ref FLOAT_RE: Regex = Regex::new(r"^[-+]?[0-9][0-9.]*$").unwrap();
}

/// Splits `input` into raw tokens whose concatenation is exactly `input`.
pub fn tokenize(input: &str) -> Result<Vec<&str>, Error> {
    let mut tokens = Vec::new();
    let mut position = 0;

    for found in TOKEN_RE.find_iter(input) {
        if found.start() != position {
            return Err(unmatched(input, position, found.start()));
        }

        tokens.push(found.as_str());
        position = found.end();
    }

    if position != input.len() {
        return Err(unmatched(input, position, input.len()));
    }

    Ok(tokens)
}

fn unmatched(input: &str, from: usize, to: usize) -> Error {
    Error::Lexical {
        line: line_at(input, from),
        text: input[from..to].to_string(),
    }
}

fn line_at(input: &str, offset: usize) -> usize {
    input[..offset].matches('\n').count() + 1
}

/// Whitespace runs and both comment forms.
pub fn is_whitespace(token: &str) -> bool {
    SPACE_RE.is_match(token)
}

/// Classifies a single non-bracket token.
pub fn classify(token: &str) -> Node {
    let kind = if token.starts_with('$') {
        Kind::Name(token.to_string())
    } else if token.starts_with('"') {
        Kind::String(token.to_string())
    } else if INT_RE.is_match(token) {
        Kind::Integer(token.to_string())
    } else if FLOAT_RE.is_match(token) {
        Kind::Float(token.to_string())
    } else if is_whitespace(token) {
        Kind::Whitespace(token.to_string())
    } else {
        Kind::Literal(token.to_string())
    };

    kind.into()
}


#[cfg(test)]
mod properties {
    use super::*;

    #[quickcheck]
    fn tokens_reassemble_the_input(text: String) -> bool {
        match tokenize(&text) {
            Ok(tokens) => tokens.concat() == text && tokens.iter().all(|t| !t.is_empty()),
            Err(Error::Lexical { text: unmatched, .. }) => !unmatched.is_empty(),
            Err(_) => false,
        }
    }

    #[quickcheck]
    fn whitespace_runs_are_single_tokens(spaces: Vec<bool>) -> bool {
        let text: String = spaces
            .iter()
            .map(|&tab| if tab { '\t' } else { ' ' })
            .collect();

        match tokenize(&text) {
            Ok(tokens) if text.is_empty() => tokens.is_empty(),
            Ok(tokens) => tokens == vec![text.as_str()],
            Err(_) => false,
        }
    }
}
