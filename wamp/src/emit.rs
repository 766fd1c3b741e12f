use crate::ast::{nth_word, Kind, Node};
use crate::context::{Context, LiteralData};
use crate::error::Error;
use crate::lexer::is_whitespace;
use crate::strings::escape_data;

fn is_module(children: &[Node]) -> bool {
    match (nth_word(children, 0), nth_word(children, 1)) {
        (Some((_, head)), Some(_)) => head.text() == Some("module"),
        _ => false,
    }
}

fn emit_tokens(node: &Node, toks: &mut Vec<String>) -> Result<(), Error> {
    for ws in &node.start {
        emit_tokens(ws, toks)?;
    }

    match &node.kind {
        Kind::List(children) if is_module(children) => emit_module_body(children, toks)?,
        Kind::List(children) => {
            toks.push("(".to_string());

            for child in children {
                let mut rendered = Vec::new();
                emit_tokens(child, &mut rendered)?;

                let spaced = match (toks.last(), rendered.first()) {
                    (Some(last), Some(first)) => {
                        last != "(" && !is_whitespace(last) && !is_whitespace(first)
                    }
                    _ => false,
                };
                if spaced {
                    toks.push(" ".to_string());
                }
                toks.extend(rendered);
            }

            toks.push(")".to_string());
        }
        Kind::Splice(_) => {
            return Err(Error::UnsupportedNode(
                "a splice outside of an enclosing form".to_string(),
            ))
        }
        Kind::Whitespace(text)
        | Kind::Name(text)
        | Kind::Literal(text)
        | Kind::Integer(text)
        | Kind::Float(text)
        | Kind::String(text) => toks.push(text.clone()),
    }

    for ws in &node.end {
        emit_tokens(ws, toks)?;
    }

    Ok(())
}

/// Renders a `module` form without its own parens; the wrapper module is
/// written by `emit_module`.
fn emit_module_body(children: &[Node], toks: &mut Vec<String>) -> Result<(), Error> {
    match nth_word(children, 1) {
        Some((_, word)) if word.is_name() => {
            toks.push(format!(";; module {}\n", word.text().unwrap_or_default()))
        }
        _ => toks.push(";; module\n".to_string()),
    }

    let mut skipping = true;
    for child in children {
        if skipping {
            match &child.kind {
                Kind::List(_) => skipping = false,
                Kind::Literal(text) if text == "module" => continue,
                Kind::Name(_) => continue,
                _ => (),
            }
        }

        emit_tokens(child, toks)?;
    }

    Ok(())
}

/// Renders one node back to source text.
pub fn emit(node: &Node) -> Result<String, Error> {
    let mut toks = Vec::new();
    emit_tokens(node, &mut toks)?;

    Ok(toks.concat())
}

const PAGE_SIZE: u64 = 64 * 1024;

fn emit_literals(ctx: &Context, out: &mut String) {
    let mut offset = 0;
    for literal in ctx.literals() {
        out.push_str(&format!(
            "  (global {}  i32 (i32.const {}))\n",
            literal.name, offset
        ));
        offset += literal.data.len() as u64 + 1;
    }

    // Marks how much memory the static data takes.
    out.push_str(&format!(
        "  (global $S_STRING_END  i32 (i32.const {}))\n\n",
        ctx.data_len()
    ));

    if ctx.literals().is_empty() {
        return;
    }

    out.push_str("  (data\n    (get_global $memoryBase)\n");
    let mut offset = 0;
    for literal in ctx.literals() {
        let bytes = match &literal.data {
            LiteralData::Text(text) => escape_data(text),
            LiteralData::Zeroed(len) => "\\00".repeat(*len),
        };

        out.push_str(&format!(
            "    {:<30} ;; {}\n",
            format!("\"{}\\00\"", bytes),
            offset
        ));
        offset += literal.data.len() as u64 + 1;
    }
    out.push_str("  )\n\n");
}

/// Assembles the final module: imports, hoisted declarations, the static
/// data section and then every evaluated tree.
pub fn emit_module(asts: &[Node], ctx: Context, memory_pages: u32) -> Result<String, Error> {
    let capacity = u64::from(memory_pages) * PAGE_SIZE;
    if ctx.data_len() > capacity {
        return Err(Error::DataOverflow {
            needed: ctx.data_len(),
            capacity,
        });
    }

    let mut body = Vec::new();
    for ast in asts {
        emit_tokens(ast, &mut body)?;
    }

    let mut out = String::new();
    if ctx.modules().is_empty() {
        out.push_str("(module\n\n");
    } else {
        out.push_str(&format!("(module ${}\n\n", ctx.modules().join("__")));
    }
    out.push_str(&format!(
        "  (import \"env\" \"memory\" (memory {}))\n",
        memory_pages
    ));
    out.push_str("  (import \"env\" \"memoryBase\" (global $memoryBase i32))\n\n");

    for declaration in ctx.hoisted() {
        out.push_str(&emit(declaration)?);
    }
    out.push('\n');

    emit_literals(&ctx, &mut out);
    out.push('\n');

    out.push_str(&body.concat());
    out.push_str("\n)");

    Ok(out)
}
