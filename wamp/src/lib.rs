#[cfg(test)]
extern crate quickcheck;

#[cfg(test)]
#[macro_use(quickcheck)]
extern crate quickcheck_macros;

mod ast;
mod context;
mod emit;
mod error;
mod eval;
mod lexer;
mod macros;
mod reader;
mod strings;

pub use ast::{Kind, Node};
pub use context::{Context, Literal, LiteralData};
pub use emit::{emit, emit_module};
pub use error::{Error, SyntaxError};
pub use eval::eval;
pub use lexer::tokenize;
pub use reader::read_str;

pub const DEFAULT_MEMORY_PAGES: u32 = 256;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Options {
    /// Size of the imported memory, in 64KiB pages.
    pub memory_pages: u32,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            memory_pages: DEFAULT_MEMORY_PAGES,
        }
    }
}

/// Reads and evaluates one input unit, appending its top-level nodes.
pub fn expand_into(source: &str, ctx: &mut Context, asts: &mut Vec<Node>) -> Result<(), Error> {
    let ast = eval(read_str(source)?, ctx)?;

    match ast.kind {
        Kind::Splice(items) => asts.extend(items),
        _ => asts.push(ast),
    }

    Ok(())
}

/// Expands every input unit into one module.
pub fn preprocess<S: AsRef<str>>(sources: &[S], options: &Options) -> Result<String, Error> {
    let mut ctx = Context::new();
    let mut asts = Vec::new();

    for source in sources {
        expand_into(source.as_ref(), &mut ctx, &mut asts)?;
    }

    emit_module(&asts, ctx, options.memory_pages)
}

/// Expands a single form and renders it on its own, without the module
/// wrapper. Hoisted declarations and literals stay in `ctx`, which is left
/// untouched when expansion fails.
pub fn expand_str(source: &str, ctx: &mut Context) -> Result<String, Error> {
    let mut scratch = ctx.clone();
    let mut asts = Vec::new();
    expand_into(source, &mut scratch, &mut asts)?;

    let rendered = asts
        .iter()
        .map(emit)
        .collect::<Result<Vec<_>, _>>()?
        .concat();

    *ctx = scratch;
    Ok(rendered)
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joins_module_names_across_units() {
        let text = preprocess(
            &["(module $a (func $f))", "(module $b (func $g))"],
            &Options::default(),
        )
        .unwrap();

        assert!(text.starts_with("(module $a__b\n\n"));
        assert!(text.contains(";; module $a\n"));
        assert!(text.contains(";; module $b\n"));
        assert!(text.ends_with("\n)"));
    }

    #[test]
    fn literals_are_shared_across_units() {
        let text = preprocess(
            &[
                r#"(module $a (func $f (drop "hi")))"#,
                r#"(module $b (func $g (drop "hi")))"#,
            ],
            &Options { memory_pages: 1 },
        )
        .unwrap();

        assert_eq!(text.matches("(get_global $S_STRING_0)").count(), 2);
        assert!(!text.contains("$S_STRING_1"));
        assert!(text.contains("(memory 1)"));
    }

    #[test]
    fn failures_produce_no_output() {
        assert_eq!(
            preprocess(&["(module $a (func (CHR \"xy\")))"], &Options::default()).map(|_| ()),
            Err(Error::MacroArgument {
                name: "CHR",
                message: "must be a 1 character string, got '\"xy\"'".to_string()
            })
        );
        assert_eq!(
            preprocess(&["  "], &Options::default()),
            Err(Error::EmptyInput)
        );
    }

    #[test]
    fn top_level_let_is_flattened() {
        let mut ctx = Context::new();

        assert_eq!(
            expand_str("(LET $a 1)", &mut ctx).unwrap(),
            "(local $a i32)(set_local $a (i32.const 1))"
        );
    }

    #[test]
    fn failed_expansion_leaves_context_alone() {
        let mut ctx = Context::new();

        assert!(expand_str(r#"(drop "a" (CHR "xy"))"#, &mut ctx).is_err());
        assert!(expand_str("(func $f (global $g i32 (i32.const 0)) (CHR))", &mut ctx).is_err());
        assert!(ctx.literals().is_empty());
        assert!(ctx.hoisted().is_empty());

        assert_eq!(
            expand_str(r#"(drop "b")"#, &mut ctx).unwrap(),
            "(drop (i32.add (get_global $memoryBase) (get_global $S_STRING_0)))"
        );
    }

    #[test]
    fn expand_str_keeps_context_between_calls() {
        let mut ctx = Context::new();

        expand_str(r#"(drop "a")"#, &mut ctx).unwrap();
        assert_eq!(
            expand_str(r#"(drop "b")"#, &mut ctx).unwrap(),
            "(drop (i32.add (get_global $memoryBase) (get_global $S_STRING_1)))"
        );
    }
}
