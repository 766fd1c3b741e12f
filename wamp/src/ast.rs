#[derive(Clone, Debug, PartialEq)]
pub enum Kind {
    Whitespace(String),
    Name(String),
    Literal(String),
    Integer(String),
    Float(String),
    String(String),
    List(Vec<Node>),
    /// Macro output whose items are inserted into the parent list.
    Splice(Vec<Node>),
}

/// A syntax tree node plus the whitespace/comment nodes attached around it.
///
/// Atoms read from source never carry attachments; the reader places
/// whitespace between list items as sibling `Kind::Whitespace` nodes and
/// gives each list the whitespace that follows its closing paren. Macro
/// expansion copies attachments from the form it replaces.
#[derive(Clone, Debug, PartialEq)]
pub struct Node {
    pub kind: Kind,
    pub start: Vec<Node>,
    pub end: Vec<Node>,
}

impl From<Kind> for Node {
    fn from(kind: Kind) -> Self {
        Node {
            kind,
            start: Vec::new(),
            end: Vec::new(),
        }
    }
}

impl Node {
    pub fn whitespace<S: Into<String>>(text: S) -> Self {
        Kind::Whitespace(text.into()).into()
    }

    pub fn name<S: Into<String>>(text: S) -> Self {
        Kind::Name(text.into()).into()
    }

    pub fn literal<S: Into<String>>(text: S) -> Self {
        Kind::Literal(text.into()).into()
    }

    pub fn integer<S: Into<String>>(text: S) -> Self {
        Kind::Integer(text.into()).into()
    }

    pub fn list(children: Vec<Node>) -> Self {
        Kind::List(children).into()
    }

    pub fn splice(children: Vec<Node>) -> Self {
        Kind::Splice(children).into()
    }

    pub fn surround(mut self, start: Vec<Node>, end: Vec<Node>) -> Self {
        self.start = start;
        self.end = end;
        self
    }

    pub fn is_whitespace(&self) -> bool {
        match &self.kind {
            Kind::Whitespace(_) => true,
            _ => false,
        }
    }

    pub fn is_name(&self) -> bool {
        match &self.kind {
            Kind::Name(_) => true,
            _ => false,
        }
    }

    /// Source text of an atom; `None` for lists and splices.
    pub fn text(&self) -> Option<&str> {
        match &self.kind {
            Kind::Whitespace(text)
            | Kind::Name(text)
            | Kind::Literal(text)
            | Kind::Integer(text)
            | Kind::Float(text)
            | Kind::String(text) => Some(text),
            Kind::List(_) | Kind::Splice(_) => None,
        }
    }

    pub fn children(&self) -> &[Node] {
        match &self.kind {
            Kind::List(children) | Kind::Splice(children) => children,
            _ => &[],
        }
    }

    /// The significant words of a list: every child that is not whitespace.
    pub fn words(&self) -> impl Iterator<Item = &Node> {
        words(self.children())
    }
}

pub fn words(children: &[Node]) -> impl Iterator<Item = &Node> {
    children.iter().filter(|child| !child.is_whitespace())
}

/// Child index and node of the `nth` significant word.
pub fn nth_word(children: &[Node], nth: usize) -> Option<(usize, &Node)> {
    children
        .iter()
        .enumerate()
        .filter(|(_, child)| !child.is_whitespace())
        .nth(nth)
}

pub fn last_word(children: &[Node]) -> Option<(usize, &Node)> {
    children
        .iter()
        .enumerate()
        .rev()
        .find(|(_, child)| !child.is_whitespace())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<Node> {
        vec![
            Node::literal("call"),
            Node::whitespace(" "),
            Node::name("$f"),
            Node::whitespace(" ;; note"),
            Node::whitespace("\n"),
            Node::integer("1"),
        ]
    }

    #[test]
    fn nth_word_skips_whitespace() {
        let children = sample();

        assert_eq!(nth_word(&children, 0).map(|(idx, _)| idx), Some(0));
        assert_eq!(nth_word(&children, 1).map(|(idx, _)| idx), Some(2));
        assert_eq!(nth_word(&children, 2).map(|(idx, _)| idx), Some(5));
        assert_eq!(nth_word(&children, 3), None);
    }

    #[test]
    fn last_word_ignores_trailing_whitespace() {
        let mut children = sample();
        children.push(Node::whitespace("  "));

        assert_eq!(
            last_word(&children).and_then(|(_, word)| word.text()),
            Some("1")
        );
    }

    #[test]
    fn words_view_tracks_children() {
        let node = Node::list(sample());

        let texts: Vec<_> = node.words().filter_map(Node::text).collect();
        assert_eq!(texts, vec!["call", "$f", "1"]);
    }
}
