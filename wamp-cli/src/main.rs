use std::fs;
use std::path::PathBuf;
use std::process;

use clap::Parser;
use rustyline::{error::ReadlineError, Editor};

use wamp::{emit_module, expand_into, expand_str, Context, Error, Options};

const HISTORY_FILE: &str = ".wamp_history";

/// Expands wamp macros and writes a single WebAssembly text module.
#[derive(Debug, Parser)]
#[command(name = "wamp", version)]
struct Args {
    /// Input files, each holding one top-level form.
    #[arg(required_unless_present = "interactive")]
    files: Vec<PathBuf>,

    /// Write the module here instead of stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Pages of imported memory.
    #[arg(short, long, default_value_t = wamp::DEFAULT_MEMORY_PAGES)]
    memory_size: u32,

    /// Expand forms typed at a prompt.
    #[arg(short, long)]
    interactive: bool,

    /// Print a summary of the run to stderr.
    #[arg(short, long)]
    verbose: bool,
}

fn fail(message: String) -> ! {
    eprintln!("wamp: {}", message);
    process::exit(1)
}

fn run(args: &Args) {
    let options = Options {
        memory_pages: args.memory_size,
    };

    let mut ctx = Context::new();
    let mut asts = Vec::new();

    for path in &args.files {
        let source = fs::read_to_string(path)
            .unwrap_or_else(|err| fail(format!("{}: {}", path.display(), err)));

        expand_into(&source, &mut ctx, &mut asts)
            .unwrap_or_else(|err| fail(format!("{}: {}", path.display(), err)));
    }

    if args.verbose {
        eprintln!(
            "wamp: {} input(s), {} hoisted, {} literal(s), {} data byte(s)",
            args.files.len(),
            ctx.hoisted().len(),
            ctx.literals().len(),
            ctx.data_len()
        );
    }

    let module = emit_module(&asts, ctx, options.memory_pages)
        .unwrap_or_else(|err| fail(err.to_string()));

    match &args.output {
        Some(path) => fs::write(path, module)
            .unwrap_or_else(|err| fail(format!("{}: {}", path.display(), err))),
        None => println!("{}", module),
    }
}

#[derive(Clone, Debug, Default)]
struct ReplState {
    line_number: usize,
    lines: Vec<String>,
}

enum ReplError {
    Incomplete,
    Expand(Error),
}

fn read_eval(state: &mut ReplState, ctx: &mut Context, text: String) -> Result<String, ReplError> {
    state.lines.push(text);

    let current_lines = state.lines.join("\n");

    match expand_str(&current_lines, ctx) {
        Ok(expanded) => {
            state.lines.clear();

            Ok(expanded)
        }
        Err(Error::EmptyInput) => {
            state.lines.clear();

            Ok(String::new())
        }
        Err(err) if err.is_incomplete() => Err(ReplError::Incomplete),
        Err(err) => {
            state.lines.clear();

            Err(ReplError::Expand(err))
        }
    }
}

fn repl() {
    let mut rl = Editor::<()>::new();
    let version = env!("CARGO_PKG_VERSION");

    println!("wamp v{} - macro expansion", version);

    if rl.load_history(HISTORY_FILE).is_err() {
        println!("No previous history.");
    }

    let mut state = ReplState::default();
    let mut ctx = Context::new();

    loop {
        let prefix = if state.lines.is_empty() {
            state.line_number += 1;
            format!("wamp({})> ", state.line_number)
        } else {
            format!("....({})> ", state.line_number)
        };

        match rl.readline(&prefix) {
            Ok(line) => {
                if !line.is_empty() {
                    rl.add_history_entry(line.as_str());
                }

                let next_line = line.trim_end().to_string();

                match read_eval(&mut state, &mut ctx, next_line) {
                    Ok(expanded) => {
                        if !expanded.is_empty() {
                            println!("{}", expanded);
                        }
                    }
                    Err(ReplError::Incomplete) => (),
                    Err(ReplError::Expand(err)) => println!("Error: {}", err),
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("CTRL-C");
                break;
            }
            Err(ReadlineError::Eof) => {
                println!("CTRL-D");
                break;
            }
            Err(err) => {
                println!("Error: {:?}", err);
                break;
            }
        }
    }

    if let Err(err) = rl.save_history(HISTORY_FILE) {
        eprintln!("wamp: could not save history: {}", err);
    }
}

fn main() {
    let args = Args::parse();

    if args.interactive {
        repl();
    } else {
        run(&args);
    }
}
