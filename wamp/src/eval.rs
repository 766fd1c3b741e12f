use crate::ast::{last_word, nth_word, Kind, Node};
use crate::context::Context;
use crate::emit::emit;
use crate::error::Error;
use crate::macros;

/// How the arguments of a form are treated, keyed by its head symbol.
#[derive(Clone, Copy, Debug, PartialEq)]
enum Policy {
    /// Move the declaration to the top of the module.
    Hoist { eval_last: bool },
    /// Arguments are syntax, never expressions.
    Verbatim,
    /// Keep a leading `$name`, evaluate everything after it.
    SkipLeading,
    /// Evaluate only the last significant word.
    LastOnly,
    Full,
}

fn policy(head: &str) -> Policy {
    match head {
        "global" => Policy::Hoist { eval_last: true },
        "table" => Policy::Hoist { eval_last: false },
        "memory" | "import" | "export" | "type" | "get_global" | "local" | "get_local"
        | "param" | "br" | "i32.const" | "i64.const" | "f32.const" | "f64.const" => {
            Policy::Verbatim
        }
        "module" | "func" | "call" | "set_local" | "set_global" | "block" | "loop"
        | "br_if" => Policy::SkipLeading,
        "br_table" => Policy::LastOnly,
        _ => Policy::Full,
    }
}

enum Head {
    Name(usize),
    Symbol(usize, String),
    Other,
}

fn head(children: &[Node]) -> Head {
    match nth_word(children, 0) {
        Some((idx, word)) => match &word.kind {
            Kind::Name(_) => Head::Name(idx),
            Kind::Literal(symbol) => Head::Symbol(idx, symbol.clone()),
            _ => Head::Other,
        },
        None => Head::Other,
    }
}

/// Rewrites one node, expanding macros and recording hoisted declarations
/// and literals in `ctx`.
pub fn eval(node: Node, ctx: &mut Context) -> Result<Node, Error> {
    let Node { kind, start, end } = node;

    let res = match kind {
        Kind::List(children) => return eval_list(children, start, end, ctx),
        Kind::String(text) => macros::intern(Node::from(Kind::String(text)), ctx)?,
        Kind::Integer(text) => Node::list(vec![
            Node::literal("i32.const"),
            Kind::Integer(text).into(),
        ]),
        Kind::Float(text) => Node::list(vec![
            Node::literal("f32.const"),
            Kind::Float(text).into(),
        ]),
        Kind::Name(text) => Node::list(vec![Node::literal("get_local"), Node::name(text)]),
        other => other.into(),
    };

    Ok(res.surround(start, end))
}

fn eval_list(
    mut children: Vec<Node>,
    start: Vec<Node>,
    end: Vec<Node>,
    ctx: &mut Context,
) -> Result<Node, Error> {
    let mut res = Vec::with_capacity(children.len());

    match head(&children) {
        Head::Name(idx) => {
            let rest = children.split_off(idx + 1);
            let name = children.pop();

            res.push(Node::literal("call"));
            res.extend(name);
            eval_into(&mut res, rest, ctx)?;
        }
        Head::Symbol(idx, symbol) => {
            if let Some(expand) = macros::lookup(&symbol) {
                let args = children
                    .into_iter()
                    .skip(idx + 1)
                    .filter(|child| !child.is_whitespace())
                    .collect();

                return Ok(match expand(args, ctx)?.kind {
                    Kind::Splice(items) => Node::splice(
                        items
                            .into_iter()
                            .map(|item| item.surround(start.clone(), end.clone()))
                            .collect(),
                    ),
                    kind => Node::from(kind).surround(start, end),
                });
            }

            match policy(&symbol) {
                Policy::Hoist { eval_last } => {
                    return hoist(&symbol, children, start, end, eval_last, ctx)
                }
                Policy::Verbatim => return Ok(Node::list(children).surround(start, end)),
                Policy::SkipLeading => {
                    let from = match nth_word(&children, 1) {
                        Some((_, word)) if word.is_name() => {
                            if symbol == "module" {
                                ctx.add_module(module_name(word));
                            }
                            nth_word(&children, 2).map_or(children.len(), |(idx, _)| idx)
                        }
                        Some((idx, _)) => idx,
                        None => children.len(),
                    };

                    let rest = children.split_off(from);
                    res.extend(children);
                    eval_into(&mut res, rest, ctx)?;
                }
                Policy::LastOnly => {
                    eval_last_word(&mut children, ctx)?;
                    return Ok(Node::list(children).surround(start, end));
                }
                Policy::Full => eval_into(&mut res, children, ctx)?,
            }
        }
        Head::Other => eval_into(&mut res, children, ctx)?,
    }

    Ok(Node::list(res).surround(start, end))
}

/// Evaluates `nodes` onto `out`, flattening any splices.
fn eval_into(out: &mut Vec<Node>, nodes: Vec<Node>, ctx: &mut Context) -> Result<(), Error> {
    for node in nodes {
        splice_into(out, eval(node, ctx)?);
    }

    Ok(())
}

fn splice_into(out: &mut Vec<Node>, node: Node) {
    match node.kind {
        Kind::Splice(items) => out.extend(items),
        _ => out.push(node),
    }
}

fn eval_last_word(children: &mut Vec<Node>, ctx: &mut Context) -> Result<(), Error> {
    if let Some((idx, _)) = last_word(children) {
        let word = children.remove(idx);
        let mut evaluated = Vec::new();
        splice_into(&mut evaluated, eval(word, ctx)?);

        for (offset, node) in evaluated.into_iter().enumerate() {
            children.insert(idx + offset, node);
        }
    }

    Ok(())
}

fn hoist(
    symbol: &str,
    mut children: Vec<Node>,
    start: Vec<Node>,
    end: Vec<Node>,
    eval_last: bool,
    ctx: &mut Context,
) -> Result<Node, Error> {
    if eval_last {
        eval_last_word(&mut children, ctx)?;
    }

    let label = match nth_word(&children, 1) {
        Some((_, word)) => match word.text() {
            Some(text) => text.to_string(),
            None => emit(&word.clone().surround(Vec::new(), Vec::new()))?,
        },
        None => {
            return Err(Error::Malformed {
                form: symbol.to_string(),
                message: "declaration has no arguments".to_string(),
            })
        }
    };

    ctx.hoist(
        Node::list(children).surround(vec![Node::whitespace("  ")], vec![Node::whitespace("\n")]),
    );

    Ok(Node::whitespace(format!("(; {} {} hoisted to top ;)", symbol, label)).surround(start, end))
}

fn module_name(word: &Node) -> String {
    let text = word.text().unwrap_or_default();
    text.strip_prefix('$').unwrap_or(text).to_string()
}
