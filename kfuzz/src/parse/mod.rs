//! Parser for the region description language.
mod ast;
mod parser;
mod token_stream;

pub use self::{
    ast::{Array, Field, Pointer, Primitive, Program, Region, Width},
    parser::Parse,
    token_stream::TokenStream,
};

use crate::{
    error::{KfuzzResult, ParseError},
    lex::{tokenize, Token},
};

/// Build the syntax tree from a token sequence.
///
/// The identifiers are copied out of `source_code`, so the tree
/// outlives both the tokens and the source.
pub fn parse(source_code: &str, tokens: &[Token]) -> Result<Program, ParseError> {
    let mut stream = TokenStream::new(source_code, tokens);
    let program = Program::parse(&mut stream)?;

    log::debug!(
        "parsed {} regions with {} pointers",
        program.regions.len(),
        program.pointer_count()
    );

    Ok(program)
}

/// Tokenize and parse source text.
pub fn parse_str(source_code: &str) -> KfuzzResult<Program> {
    let tokens = tokenize(source_code)?;
    Ok(parse(source_code, &tokens)?)
}
