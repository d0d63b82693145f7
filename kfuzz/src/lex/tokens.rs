//! Tokens

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub span: Span,
    pub kind: TokenKind,
    /// Parsed value of an integer literal.
    ///
    /// Only set for [`TokenKind::Integer`].
    pub value: Option<u64>,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span) -> Self {
        Self {
            span,
            kind,
            value: None,
        }
    }

    /// Source text of the token, used for identifiers.
    #[inline]
    pub fn fragment<'a>(&self, text: &'a str) -> &'a str {
        self.span.fragment(text)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
#[rustfmt::skip]
pub enum TokenKind {
    // Simple
    LeftBrace,    // {
    RightBrace,   // }
    LeftBracket,  // [
    RightBracket, // ]
    Comma,        // ,

    // ------------------------------------------------------------------------
    // Complex
    Ident,
    /// Reserved identifiers
    Keyword(Keyword),
    /// Unsigned decimal literal
    Integer,

    // ------------------------------------------------------------------------
    // Special
    /// Unsupported character, which aborts tokenizing
    Unknown,
    /// End-of-input
    EOF,
}

impl TokenKind {
    #[inline]
    pub fn is_primitive(&self) -> bool {
        matches!(self, TokenKind::Keyword(keyword) if keyword.byte_width().is_some())
    }
}

impl fmt::Display for TokenKind {
    #[rustfmt::skip]
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::LeftBrace    => write!(f, "'{{'"),
            Self::RightBrace   => write!(f, "'}}'"),
            Self::LeftBracket  => write!(f, "'['"),
            Self::RightBracket => write!(f, "']'"),
            Self::Comma        => write!(f, "','"),
            Self::Ident        => write!(f, "identifier"),
            Self::Keyword(k)   => write!(f, "'{k}'"),
            Self::Integer      => write!(f, "integer"),
            Self::Unknown      => write!(f, "unknown character"),
            Self::EOF          => write!(f, "end-of-input"),
        }
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Default)]
pub struct Span {
    pub index: u32,
    pub size: u32,
}

impl Span {
    pub fn new(index: u32, size: u32) -> Self {
        Self { index, size }
    }

    #[inline]
    pub fn fragment<'a>(&self, text: &'a str) -> &'a str {
        &text[(self.index as usize)..(self.end() as usize)]
    }

    /// Ending index of the span, exclusive.
    #[inline]
    pub fn end(&self) -> u32 {
        self.index + self.size
    }

    /// The full line of source text that contains the start of the span.
    ///
    /// The returned line excludes its trailing line break.
    pub fn surrounding_line<'a>(&self, text: &'a str) -> (&'a str, Span) {
        let index = (self.index as usize).min(text.len());

        let start = text[..index].rfind('\n').map(|i| i + 1).unwrap_or(0);
        let end = text[index..]
            .find(|c: char| matches!(c, '\n' | '\r'))
            .map(|i| index + i)
            .unwrap_or(text.len());

        let line_span = Span {
            index: start as u32,
            size: (end - start) as u32,
        };

        (&text[start..end], line_span)
    }

    /// One based line and column of the start of the span.
    pub fn line_column(&self, text: &str) -> (usize, usize) {
        let index = (self.index as usize).min(text.len());
        let before = &text[..index];
        let line = before.matches('\n').count() + 1;
        let column = index - before.rfind('\n').map(|i| i + 1).unwrap_or(0) + 1;
        (line, column)
    }
}

/// Reserved keywords.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Keyword {
    Ptr,
    Arr,
    U8,
    U16,
    U32,
    U64,
}

impl Keyword {
    /// Exact, case-sensitive match of a whole lexeme.
    #[rustfmt::skip]
    pub fn parse(text: impl AsRef<str>) -> Option<Self> {
        match text.as_ref() {
            "ptr" => Some(Self::Ptr),
            "arr" => Some(Self::Arr),
            "u8"  => Some(Self::U8),
            "u16" => Some(Self::U16),
            "u32" => Some(Self::U32),
            "u64" => Some(Self::U64),
            _ => None,
        }
    }

    /// Byte width of the primitive type keywords.
    #[rustfmt::skip]
    pub fn byte_width(&self) -> Option<u8> {
        match self {
            Self::U8  => Some(1),
            Self::U16 => Some(2),
            Self::U32 => Some(4),
            Self::U64 => Some(8),
            Self::Ptr | Self::Arr => None,
        }
    }
}

impl fmt::Display for Keyword {
    #[rustfmt::skip]
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Ptr => write!(f, "ptr"),
            Self::Arr => write!(f, "arr"),
            Self::U8  => write!(f, "u8"),
            Self::U16 => write!(f, "u16"),
            Self::U32 => write!(f, "u32"),
            Self::U64 => write!(f, "u64"),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_span_fragment() {
        const CODE: &str = "foo { ptr[bar] }";

        let spans = &[
            Span::new(0, 3),  // foo
            Span::new(4, 1),  // {
            Span::new(6, 3),  // ptr
            Span::new(10, 3), // bar
        ];

        assert_eq!(spans[0].fragment(CODE), "foo");
        assert_eq!(spans[1].fragment(CODE), "{");
        assert_eq!(spans[2].fragment(CODE), "ptr");
        assert_eq!(spans[3].fragment(CODE), "bar");
    }

    #[test]
    fn test_line_of_span() {
        const CODE: &str = "a { u8 }\nb { ptr[c] }\nc { }";

        let span = Span::new(17, 1);
        assert_eq!(span.fragment(CODE), "c");

        let (line, line_span) = span.surrounding_line(CODE);
        assert_eq!(line, "b { ptr[c] }");
        assert_eq!(line_span, Span::new(9, 12));
        assert_eq!(span.line_column(CODE), (2, 9));
    }

    #[test]
    fn test_line_of_span_crlf() {
        const CODE: &str = "a { u8 }\r\nb { ptr[c] }\r\n";

        let (line, line_span) = Span::new(18, 1).surrounding_line(CODE);
        assert_eq!(line, "b { ptr[c] }");
        assert_eq!(line_span, Span::new(10, 12));
    }

    #[test]
    fn test_line_of_span_at_end() {
        const CODE: &str = "a { u8";

        // Zero sized span of the end token.
        let span = Span::new(6, 0);
        let (line, line_span) = span.surrounding_line(CODE);
        assert_eq!(line, "a { u8");
        assert_eq!(line_span, Span::new(0, 6));
        assert_eq!(span.line_column(CODE), (1, 7));
    }

    #[test]
    fn test_keyword_whole_lexeme() {
        assert_eq!(Keyword::parse("u8"), Some(Keyword::U8));
        assert_eq!(Keyword::parse("u8x"), None);
        assert_eq!(Keyword::parse("PTR"), None);
        assert_eq!(Keyword::parse("pt"), None);
    }
}
