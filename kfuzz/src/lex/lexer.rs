//! Lexical analysis
use std::str::CharIndices;

use super::tokens::{Keyword, Span, Token, TokenKind};
use crate::error::{LexError, LexErrorKind};

/// Null character returned by the cursor when the source is exhausted.
const EOF_CHAR: char = '\0';

/// Scan the whole source into tokens.
///
/// The returned sequence always ends in exactly one [`TokenKind::EOF`].
/// The first unknown character aborts the scan, and no tokens are returned.
pub fn tokenize(source_code: &str) -> Result<Vec<Token>, LexError> {
    let mut lexer = Lexer::new(source_code);
    let mut tokens = vec![];

    loop {
        let token = lexer.next_token();

        match token.kind {
            TokenKind::Unknown => return Err(lexer.unknown_error(&token)),
            TokenKind::Integer if token.value.is_none() => {
                return Err(LexError {
                    span: token.span,
                    kind: LexErrorKind::IntegerOverflow,
                })
            }
            TokenKind::EOF => {
                tokens.push(token);
                break;
            }
            _ => tokens.push(token),
        }
    }

    log::trace!("tokenized {} tokens", tokens.len());

    Ok(tokens)
}

pub struct Lexer<'a> {
    /// Character scanner
    cursor: Cursor<'a>,
    /// Keep reference to the source so the parser can
    /// slice fragments from it.
    original: &'a str,
    /// Start absolute byte position of the current token
    /// in the source.
    start_pos: u32,
}

impl<'a> Lexer<'a> {
    pub fn new(source_code: &'a str) -> Self {
        Self {
            cursor: Cursor::new(source_code),
            original: source_code,
            start_pos: 0,
        }
    }

    /// Original source code that was passed in during construction.
    pub fn source_code(&self) -> &'a str {
        self.original
    }

    /// Scan the source characters and construct the next token.
    ///
    /// Each call starts with the cursor pointing at the start of the
    /// remaining source, and leaves it at the character after the token.
    /// Once the source is exhausted every call returns an EOF token.
    pub fn next_token(&mut self) -> Token {
        use TokenKind as TK;

        // Erase leading whitespace.
        while is_whitespace(self.cursor.current()) {
            self.cursor.next_char();
        }

        self.start_token();

        match self.cursor.current() {
            '{' => self.make_single(TK::LeftBrace),
            '}' => self.make_single(TK::RightBrace),
            '[' => self.make_single(TK::LeftBracket),
            ']' => self.make_single(TK::RightBracket),
            ',' => self.make_single(TK::Comma),
            '_' | 'a'..='z' | 'A'..='Z' => self.consume_ident(),
            '0'..='9' => self.consume_number(),
            EOF_CHAR if self.cursor.at_end() => self.make_token(TK::EOF),
            _ => self.make_single(TK::Unknown),
        }
    }

    /// Indicates whether the lexer is at the end of the source.
    pub fn at_end(&self) -> bool {
        self.cursor.at_end()
    }

    /// Span from the start of the current token up to the cursor.
    fn make_span(&self) -> Span {
        let start = self.start_pos;
        let end = self.cursor.offset();

        // start and end can be equal, and a token can have 0 size.
        debug_assert!(end >= start);

        Span {
            index: start,
            size: end - start,
        }
    }

    fn fragment(&self) -> &'a str {
        self.make_span().fragment(self.original)
    }

    /// Primes the lexer to consume the next token.
    fn start_token(&mut self) {
        self.start_pos = self.cursor.offset();
    }

    /// Consume the current character and build a token from it.
    fn make_single(&mut self, kind: TokenKind) -> Token {
        self.cursor.next_char();
        self.make_token(kind)
    }

    /// Build a token from the position stored by [`Lexer::start_token`]
    /// up to the current cursor position.
    fn make_token(&mut self, kind: TokenKind) -> Token {
        Token::new(kind, self.make_span())
    }

    #[cold]
    fn unknown_error(&self, token: &Token) -> LexError {
        let c = token.fragment(self.original).chars().next().unwrap_or(EOF_CHAR);
        LexError {
            span: token.span,
            kind: LexErrorKind::UnknownCharacter(c),
        }
    }
}

/// Specialised tokens.
impl<'a> Lexer<'a> {
    /// Make an identifier token, or a keyword on an exact match.
    fn consume_ident(&mut self) -> Token {
        debug_assert!(is_letter(self.cursor.current()));

        while is_letter_or_digit(self.cursor.current()) {
            self.cursor.next_char();
        }

        let token_kind = match Keyword::parse(self.fragment()) {
            Some(keyword) => TokenKind::Keyword(keyword),
            None => TokenKind::Ident,
        };

        self.make_token(token_kind)
    }

    /// Make a decimal number literal token.
    ///
    /// A literal that overflows 64 bits is returned without a value.
    fn consume_number(&mut self) -> Token {
        debug_assert!(is_digit(self.cursor.current()));

        while is_digit(self.cursor.current()) {
            self.cursor.next_char();
        }

        let value = self.fragment().parse::<u64>().ok();

        Token {
            value,
            ..self.make_token(TokenKind::Integer)
        }
    }
}

/// Character cursor over the source text.
///
/// The current character has not been consumed yet, and
/// [`Cursor::offset`] is its byte position.
struct Cursor<'a> {
    chars: CharIndices<'a>,
    current: (usize, char),
    len: usize,
}

impl<'a> Cursor<'a> {
    fn new(text: &'a str) -> Self {
        let mut chars = text.char_indices();
        let current = chars.next().unwrap_or((text.len(), EOF_CHAR));

        Self {
            chars,
            current,
            len: text.len(),
        }
    }

    #[inline]
    fn current(&self) -> char {
        self.current.1
    }

    /// Byte offset of the current character.
    #[inline]
    fn offset(&self) -> u32 {
        self.current.0 as u32
    }

    /// Advance to the next character.
    fn next_char(&mut self) -> char {
        self.current = self.chars.next().unwrap_or((self.len, EOF_CHAR));
        self.current.1
    }

    /// Source can contain '\0' characters without being at the end,
    /// so EOF is decided by position.
    fn at_end(&self) -> bool {
        self.current.0 >= self.len
    }
}

fn is_whitespace(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\r' | '\n')
}

#[allow(clippy::manual_is_ascii_check)] // consistency with other functions
fn is_digit(c: char) -> bool {
    matches!(c, '0'..='9')
}

fn is_letter(c: char) -> bool {
    matches!(c, 'a'..='z' | 'A'..='Z' | '_')
}

fn is_letter_or_digit(c: char) -> bool {
    is_letter(c) || is_digit(c)
}

impl<'a> IntoIterator for Lexer<'a> {
    type Item = Token;
    type IntoIter = LexerIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        LexerIter {
            lexer: self,
            done: false,
        }
    }
}

/// Convenience iterator that wraps the lexer.
///
/// Yields tokens up to and including the first EOF or unknown token.
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct LexerIter<'a> {
    // Track end so an EOF token is emitted once.
    done: bool,
    lexer: Lexer<'a>,
}

impl<'a> Iterator for LexerIter<'a> {
    type Item = Token;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let token = self.lexer.next_token();
        if matches!(token.kind, TokenKind::EOF | TokenKind::Unknown) {
            self.done = true;
        }

        Some(token)
    }
}
