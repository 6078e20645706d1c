use std::io;

/// The lexer takes the source input, mapping it into a sequence of tokens.
pub mod lexer;

/// The parser takes a sequence of tokens, mapping it into an AST.
pub mod parser;

/// The transpiler takes the AST of a whole program and lowers it into C.
pub mod transpiler;

pub mod ast;
pub mod error;
pub mod token;
pub mod types;

pub mod util {
    pub mod fmt {
        pub mod tree;
    }
    #[cfg(test)]
    pub(crate) mod test_utils;
}

pub use error::Error;

use crate::transpiler::{Transpiler, TranspilerOptions};

/// Runs the whole pipeline over the given text, returning the C source.
///
/// `path` is only used in diagnostics.
pub fn compile(src: &str, path: &str) -> Result<String, Error> {
    let tokens = lexer::lex(src, path)?;
    let root = parser::parse(&tokens)?;
    Transpiler::new(TranspilerOptions::default()).compile(&root)
}

/// Like [`compile`], but streams the C source into `writer`, returning it
/// once done.
pub fn compile_to<W: io::Write>(src: &str, path: &str, writer: W) -> Result<W, Error> {
    let tokens = lexer::lex(src, path)?;
    let root = parser::parse(&tokens)?;
    Transpiler::with_io_writer(writer, TranspilerOptions::default()).compile_to(&root)
}
