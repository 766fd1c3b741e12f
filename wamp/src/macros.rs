use std::convert::TryFrom;

use crate::ast::{Kind, Node};
use crate::context::Context;
use crate::error::Error;
use crate::eval::eval;
use crate::reader::read_str;
use crate::strings::decode;

/// A built-in macro: receives the unevaluated significant words after the
/// macro name.
pub type Macro = fn(Vec<Node>, &mut Context) -> Result<Node, Error>;

pub fn lookup(name: &str) -> Option<Macro> {
    match name {
        "AND" => Some(and),
        "OR" => Some(or),
        "CHR" => Some(chr),
        "STRING" => Some(string),
        "STATIC_ARRAY" => Some(static_array),
        "LET" => Some(let_),
        _ => None,
    }
}

fn i32_const(value: &str) -> Node {
    Node::list(vec![Node::literal("i32.const"), Node::integer(value)])
}

fn conditional(test: Node, then: Node, otherwise: Node) -> Node {
    Node::list(vec![
        Node::literal("if"),
        Node::literal("i32"),
        test,
        then,
        otherwise,
    ])
}

fn at_least_one(name: &'static str, args: &[Node]) -> Result<(), Error> {
    if args.is_empty() {
        Err(Error::MacroArity {
            name,
            expected: "at least 1 argument",
            actual: 0,
        })
    } else {
        Ok(())
    }
}

fn exactly_one(name: &'static str, args: Vec<Node>) -> Result<Node, Error> {
    let actual = args.len();
    let mut args = args.into_iter();

    match (args.next(), args.next()) {
        (Some(arg), None) => Ok(arg),
        _ => Err(Error::MacroArity {
            name,
            expected: "1 argument",
            actual,
        }),
    }
}

fn decoded(name: &'static str, arg: &Node) -> Result<String, Error> {
    arg.text()
        .and_then(decode)
        .ok_or_else(|| Error::MacroArgument {
            name,
            message: format!("expected a string literal, got {}", describe(arg)),
        })
}

fn describe(arg: &Node) -> String {
    match arg.text() {
        Some(text) => format!("'{}'", text),
        None => "a list".to_string(),
    }
}

fn address_of(symbol: &str) -> Result<Node, Error> {
    read_str(&format!(
        "(i32.add (get_global $memoryBase) (get_global {}))",
        symbol
    ))
}

/// Short-circuit conjunction; evaluates to 1 or 0.
fn and(args: Vec<Node>, ctx: &mut Context) -> Result<Node, Error> {
    at_least_one("AND", &args)?;

    let mut res = i32_const("1");
    for arg in args.into_iter().rev() {
        let test = eval(arg, ctx)?;
        res = conditional(test, res, i32_const("0"));
    }

    Ok(res)
}

/// Short-circuit disjunction; evaluates to 1 or 0.
fn or(args: Vec<Node>, ctx: &mut Context) -> Result<Node, Error> {
    at_least_one("OR", &args)?;

    let mut res = i32_const("0");
    for arg in args.into_iter().rev() {
        let test = eval(arg, ctx)?;
        res = conditional(test, i32_const("1"), res);
    }

    Ok(res)
}

fn chr(args: Vec<Node>, _ctx: &mut Context) -> Result<Node, Error> {
    let arg = exactly_one("CHR", args)?;
    let text = decoded("CHR", &arg)?;

    let mut chars = text.chars();
    let ch = match (chars.next(), chars.next()) {
        (Some(ch), None) => ch,
        _ => {
            return Err(Error::MacroArgument {
                name: "CHR",
                message: format!(
                    "must be a 1 character string, got {}",
                    describe(&arg)
                ),
            })
        }
    };

    Ok(Node::list(vec![
        Node::literal("i32.const"),
        Node::whitespace(" "),
        Node::integer(format!("0x{:x}", ch as u32)),
        Node::whitespace(" "),
        Node::whitespace(format!("(; {} ;)", arg.text().unwrap_or_default())),
    ]))
}

fn string(args: Vec<Node>, ctx: &mut Context) -> Result<Node, Error> {
    let arg = exactly_one("STRING", args)?;
    let symbol = ctx.intern_string(decoded("STRING", &arg)?);

    address_of(&symbol)
}

/// Evaluates a raw string literal found outside an explicit macro call.
pub(crate) fn intern(literal: Node, ctx: &mut Context) -> Result<Node, Error> {
    string(vec![literal], ctx)
}

fn static_array(args: Vec<Node>, ctx: &mut Context) -> Result<Node, Error> {
    let arg = exactly_one("STATIC_ARRAY", args)?;

    let len = match &arg.kind {
        Kind::Integer(text) => parse_len(text),
        _ => None,
    }
    .ok_or_else(|| Error::MacroArgument {
        name: "STATIC_ARRAY",
        message: format!("expected a byte length, got {}", describe(&arg)),
    })?;

    // Offsets are i32 constants, so all static data has to fit in 4GiB.
    let needed = ctx.data_len().saturating_add(len).saturating_add(1);
    let len = match usize::try_from(len) {
        Ok(len) if needed <= ADDRESS_SPACE => len,
        _ => {
            return Err(Error::MacroArgument {
                name: "STATIC_ARRAY",
                message: format!("{} bytes do not fit in 32-bit memory", len),
            })
        }
    };

    let symbol = ctx.allocate_array(len);
    address_of(&symbol)
}

const ADDRESS_SPACE: u64 = 1 << 32;

fn parse_len(text: &str) -> Option<u64> {
    let text = text.strip_prefix('+').unwrap_or(text);

    match text.strip_prefix("0x") {
        Some(hex) => u64::from_str_radix(hex, 16).ok(),
        None => text.parse().ok(),
    }
}

/// Declares i32 locals and assigns them in order. The result is spliced
/// into the enclosing form.
fn let_(args: Vec<Node>, ctx: &mut Context) -> Result<Node, Error> {
    if args.len() < 2 {
        return Err(Error::MacroArity {
            name: "LET",
            expected: "at least 2 arguments",
            actual: args.len(),
        });
    }
    if args.len() % 2 != 0 {
        return Err(Error::MacroArity {
            name: "LET",
            expected: "an even number of arguments",
            actual: args.len(),
        });
    }

    let mut locals = vec![Node::literal("local")];
    let mut sets = Vec::new();

    let mut args = args.into_iter();
    while let (Some(name), Some(value)) = (args.next(), args.next()) {
        if !name.is_name() {
            return Err(Error::MacroArgument {
                name: "LET",
                message: format!("binding names must be $names, got {}", describe(&name)),
            });
        }

        let value = eval(value, ctx)?.surround(Vec::new(), Vec::new());

        locals.push(name.clone());
        locals.push(Node::literal("i32"));
        sets.push(Node::list(vec![Node::literal("set_local"), name, value]));
    }

    let mut items = vec![Node::list(locals)];
    items.extend(sets);

    Ok(Node::splice(items))
}
