use crate::ast::Node;
use crate::error::{Error, SyntaxError};
use crate::lexer::{classify, is_whitespace, tokenize};

struct Reader<'a> {
    tokens: Vec<&'a str>,
    position: usize,
    line: usize,
}

impl<'a> Reader<'a> {
    fn new(tokens: Vec<&'a str>) -> Self {
        Reader {
            tokens,
            position: 0,
            line: 1,
        }
    }

    fn peek(&self) -> Option<&'a str> {
        self.tokens.get(self.position).copied()
    }

    fn next(&mut self) -> Option<&'a str> {
        let token = self.peek()?;
        self.position += 1;
        self.line += token.matches('\n').count();

        Some(token)
    }

    fn whitespace(&mut self) -> Vec<Node> {
        let mut nodes = Vec::new();

        while let Some(token) = self.peek().filter(|token| is_whitespace(token)) {
            self.next();
            nodes.push(Node::whitespace(token));
        }

        nodes
    }

    fn form(&mut self) -> Result<Node, Error> {
        match self.peek() {
            Some(token) if token.starts_with(";;") || token.starts_with("(;") => {
                self.next();
                Ok(Node::whitespace(token))
            }
            Some(")") => Err(SyntaxError::UnexpectedClose { line: self.line }.into()),
            Some("(") => self.list(),
            Some(token) => {
                self.next();
                Ok(classify(token))
            }
            None => Err(SyntaxError::UnexpectedEof { line: self.line }.into()),
        }
    }

    fn list(&mut self) -> Result<Node, Error> {
        let start = self.whitespace();

        match self.next() {
            Some("(") => (),
            Some(")") => return Err(SyntaxError::UnexpectedClose { line: self.line }.into()),
            Some(found) => {
                return Err(SyntaxError::ExpectedOpen {
                    line: self.line,
                    found: found.to_string(),
                }
                .into())
            }
            None => return Err(SyntaxError::UnexpectedEof { line: self.line }.into()),
        }

        let mut children = Vec::new();

        loop {
            match self.peek() {
                Some(")") => break,
                Some(_) => {
                    children.push(self.form()?);
                    children.extend(self.whitespace());
                }
                None => return Err(SyntaxError::UnexpectedEof { line: self.line }.into()),
            }
        }

        self.next();
        let end = self.whitespace();

        Ok(Node::list(children).surround(start, end))
    }
}

/// Reads one top-level form, keeping every whitespace and comment token.
pub fn read_str(input: &str) -> Result<Node, Error> {
    let tokens = tokenize(input)?;

    if tokens.iter().all(|token| is_whitespace(token)) {
        return Err(Error::EmptyInput);
    }

    let mut reader = Reader::new(tokens);
    let root = reader.list()?;

    match reader.peek() {
        None => Ok(root),
        Some(found) => Err(SyntaxError::TrailingInput {
            line: reader.line,
            found: found.to_string(),
        }
        .into()),
    }
}
