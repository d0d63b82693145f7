//! Lexer for the region description language.
mod lexer;
mod tokens;

pub use self::{
    lexer::{tokenize, Lexer, LexerIter},
    tokens::{Keyword, Span, Token, TokenKind},
};
