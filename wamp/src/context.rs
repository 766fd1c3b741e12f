use std::collections::HashMap;

use crate::ast::Node;

#[derive(Clone, Debug, PartialEq)]
pub enum LiteralData {
    Text(String),
    Zeroed(usize),
}

impl LiteralData {
    /// Byte length without the NUL terminator.
    pub fn len(&self) -> usize {
        match self {
            LiteralData::Text(text) => text.len(),
            LiteralData::Zeroed(len) => *len,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Literal {
    pub name: String,
    pub data: LiteralData,
}

/// State accumulated over one preprocessing run.
#[derive(Clone, Debug, Default)]
pub struct Context {
    hoisted: Vec<Node>,
    literals: Vec<Literal>,
    interned: HashMap<String, String>,
    modules: Vec<String>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn hoist(&mut self, declaration: Node) {
        self.hoisted.push(declaration);
    }

    /// Symbol for `text`, allocating a table entry the first time it is seen.
    pub fn intern_string(&mut self, text: String) -> String {
        if let Some(name) = self.interned.get(&text) {
            return name.clone();
        }

        let name = format!("$S_STRING_{}", self.literals.len());
        self.interned.insert(text.clone(), name.clone());
        self.literals.push(Literal {
            name: name.clone(),
            data: LiteralData::Text(text),
        });

        name
    }

    pub fn allocate_array(&mut self, len: usize) -> String {
        let name = format!("$S_STATIC_ARRAY_{}", self.literals.len());
        self.literals.push(Literal {
            name: name.clone(),
            data: LiteralData::Zeroed(len),
        });

        name
    }

    pub fn add_module(&mut self, name: String) {
        self.modules.push(name);
    }

    pub fn hoisted(&self) -> &[Node] {
        &self.hoisted
    }

    pub fn literals(&self) -> &[Literal] {
        &self.literals
    }

    pub fn modules(&self) -> &[String] {
        &self.modules
    }

    /// Bytes taken by the data section, one NUL after each entry.
    pub fn data_len(&self) -> u64 {
        self.literals.iter().fold(0, |total: u64, literal| {
            total
                .saturating_add(literal.data.len() as u64)
                .saturating_add(1)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strings_are_interned_once() {
        let mut ctx = Context::new();

        let hi = ctx.intern_string("hi".to_string());
        let bye = ctx.intern_string("bye".to_string());
        let again = ctx.intern_string("hi".to_string());

        assert_eq!(hi, "$S_STRING_0");
        assert_eq!(bye, "$S_STRING_1");
        assert_eq!(again, hi);
        assert_eq!(ctx.literals().len(), 2);
    }

    #[test]
    fn arrays_share_the_literal_counter() {
        let mut ctx = Context::new();

        ctx.intern_string("a".to_string());
        assert_eq!(ctx.allocate_array(4), "$S_STATIC_ARRAY_1");
        assert_eq!(ctx.allocate_array(4), "$S_STATIC_ARRAY_2");
        assert_eq!(ctx.intern_string("b".to_string()), "$S_STRING_3");
        assert_eq!(ctx.data_len(), 2 + 5 + 5 + 2);
    }

    #[test]
    fn data_len_saturates() {
        let mut ctx = Context::new();

        ctx.allocate_array(usize::MAX);
        ctx.allocate_array(usize::MAX);
        assert_eq!(ctx.data_len(), u64::MAX);
    }
}
