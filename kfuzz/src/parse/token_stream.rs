//! Cursor over a lexed token sequence.
use crate::{
    error::ParseError,
    lex::{Span, Token, TokenKind},
};

/// Stream of tokens with one token of look ahead.
///
/// Keeps the source text so identifiers can be sliced out of it.
pub struct TokenStream<'a> {
    tokens: &'a [Token],
    /// Index of the next token to consume.
    position: usize,
    original: &'a str,
}

impl<'a> TokenStream<'a> {
    pub fn new(source_code: &'a str, tokens: &'a [Token]) -> Self {
        Self {
            tokens,
            position: 0,
            original: source_code,
        }
    }

    pub fn source_code(&self) -> &'a str {
        self.original
    }

    /// Index of the next token.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Source text covered by the span, or empty if the span
    /// does not belong to this source.
    #[inline]
    pub fn span_fragment(&self, span: &Span) -> &'a str {
        self.original
            .get(span.index as usize..span.end() as usize)
            .unwrap_or_default()
    }

    /// Return the current token without advancing the cursor.
    ///
    /// Returns `None` when the sequence ran out without an EOF token.
    #[inline]
    pub fn peek(&self) -> Option<&'a Token> {
        self.tokens.get(self.position)
    }

    /// Return the current token kind without advancing the cursor.
    ///
    /// A sequence that is exhausted reads as EOF.
    #[inline]
    pub fn peek_kind(&self) -> TokenKind {
        self.peek().map(|token| token.kind).unwrap_or(TokenKind::EOF)
    }

    /// Consumes the current token regardless of kind.
    #[inline]
    pub fn next_token(&mut self) -> Option<&'a Token> {
        let token = self.tokens.get(self.position)?;
        self.position += 1;
        Some(token)
    }

    /// Consumes the current token if it matches the given token kind.
    ///
    /// Does not consume the token if the kinds do not match.
    pub fn match_token(&mut self, token_kind: TokenKind) -> bool {
        let is_match = self.peek().map(|token| token.kind) == Some(token_kind);
        if is_match {
            self.position += 1;
        }
        is_match
    }

    /// Return the current token and advance the cursor.
    ///
    /// # Errors
    ///
    /// Returns a [`ParseError`] if the token kind doesn't match.
    /// The cursor is not advanced in that case.
    pub fn consume(&mut self, token_kind: TokenKind) -> Result<&'a Token, ParseError> {
        match self.peek() {
            Some(token) if token.kind == token_kind => {
                self.position += 1;
                Ok(token)
            }
            _ => Err(self.unexpected(expected_one(token_kind))),
        }
    }

    /// Build an error for the current token.
    #[inline(never)]
    #[cold]
    pub fn unexpected(&self, expected: &'static [TokenKind]) -> ParseError {
        match self.peek() {
            Some(token) => ParseError {
                expected,
                encountered: token.kind,
                span: token.span,
                position: self.position,
            },
            None => ParseError {
                expected,
                encountered: TokenKind::EOF,
                span: self.end_span(),
                position: self.position,
            },
        }
    }

    /// Zero sized span just past the last token.
    fn end_span(&self) -> Span {
        self.tokens
            .last()
            .map(|token| Span::new(token.span.end(), 0))
            .unwrap_or_default()
    }
}

/// Static single element slices so errors can borrow their expectation.
fn expected_one(kind: TokenKind) -> &'static [TokenKind] {
    use crate::lex::Keyword as K;
    use TokenKind as TK;

    match kind {
        TK::LeftBrace => &[TK::LeftBrace],
        TK::RightBrace => &[TK::RightBrace],
        TK::LeftBracket => &[TK::LeftBracket],
        TK::RightBracket => &[TK::RightBracket],
        TK::Comma => &[TK::Comma],
        TK::Ident => &[TK::Ident],
        TK::Keyword(K::Ptr) => &[TK::Keyword(K::Ptr)],
        TK::Keyword(K::Arr) => &[TK::Keyword(K::Arr)],
        TK::Keyword(K::U8) => &[TK::Keyword(K::U8)],
        TK::Keyword(K::U16) => &[TK::Keyword(K::U16)],
        TK::Keyword(K::U32) => &[TK::Keyword(K::U32)],
        TK::Keyword(K::U64) => &[TK::Keyword(K::U64)],
        TK::Integer => &[TK::Integer],
        TK::Unknown => &[TK::Unknown],
        TK::EOF => &[TK::EOF],
    }
}
