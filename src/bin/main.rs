use std::{
    fs,
    io::{self, Write},
    path::PathBuf,
    process::ExitCode,
};

use clap::Parser;
use ncc::{
    lexer, parser,
    transpiler::{Transpiler, TranspilerOptions},
    util::fmt::tree,
    Error,
};
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Compiles an nc source file into C, printed to stdout.
#[derive(Parser)]
#[command(name = "ncc", version)]
struct Args {
    /// Print the token list before compiling
    #[arg(long)]
    tokens: bool,

    /// Print the syntax tree before compiling
    #[arg(long)]
    tree: bool,

    /// Source file to compile
    path: PathBuf,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) if error.is_internal() => {
            eprintln!("error: {error}");
            eprintln!("note: this is a compiler bug");
            ExitCode::FAILURE
        }
        Err(error) => {
            eprintln!("error: {error}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<(), Error> {
    let src = fs::read_to_string(&args.path)?;
    let path = args.path.to_string_lossy();
    debug!(%path, bytes = src.len(), "read source");

    let tokens = lexer::lex(&src, &path)?;
    let stdout = io::stdout();
    let mut out = stdout.lock();
    if args.tokens {
        for token in &tokens {
            writeln!(out, "{token:?}")?;
        }
    }

    let root = parser::parse(&tokens)?;
    if args.tree {
        tree::print_tree(&mut out, &root)?;
    }

    let out = Transpiler::with_io_writer(out, TranspilerOptions::default()).compile_to(&root)?;
    drop(out);
    Ok(())
}
