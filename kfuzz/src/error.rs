//! Result and errors.
use std::{
    collections::TryReserveError,
    fmt::{self, Display, Formatter, Write},
    io,
};

use itertools::Itertools;
use smol_str::SmolStr;

use crate::lex::{Span, TokenKind};

pub type KfuzzResult<T> = std::result::Result<T, KfuzzError>;

#[derive(Debug)]
pub enum KfuzzError {
    /// Unrecognised input while tokenizing.
    Lex(LexError),
    /// Grammar violation.
    Parse(ParseError),
    /// Well formed program that refers to regions incorrectly.
    Semantic(SemanticError),
    /// Failure while emitting the blob.
    Encode(EncodeError),
    /// Filler byte source could not deliver.
    Source(SourceError),
    /// Malformed blob handed to the inspector.
    Blob(BlobError),
}

impl KfuzzError {
    /// Location in the DSL source the error refers to, if any.
    pub fn span(&self) -> Option<Span> {
        match self {
            Self::Lex(err) => Some(err.span),
            Self::Parse(err) => Some(err.span),
            Self::Semantic(SemanticError::DuplicateRegion { span, .. }) => Some(*span),
            Self::Semantic(SemanticError::UnresolvedRegion { span, .. }) => Some(*span),
            Self::Encode(_) | Self::Source(_) | Self::Blob(_) => None,
        }
    }

    /// Render the error with the offending line of source code
    /// and a marker under the span.
    ///
    /// ```text
    /// error: expected ']', found ','
    ///  --> 1:14
    ///   |
    /// 1 | foo { ptr[bar, u8] }
    ///   |              ^
    /// ```
    pub fn render(&self, source: &str) -> String {
        let mut out = format!("error: {self}");

        if let Some(span) = self.span() {
            let (line, line_span) = span.surrounding_line(source);
            let (line_no, column) = span.line_column(source);
            let gutter = line_no.to_string().len();

            // Markers stay on the line even when the span runs past it.
            let width = (span.size as usize)
                .min((line_span.end() as usize).saturating_sub(span.index as usize))
                .max(1);

            // Writing into a String can't fail.
            let _ = write!(
                out,
                "\n{:gutter$}--> {line_no}:{column}\n{:gutter$} |\n{line_no} | {line}\n{:gutter$} | {:pad$}{}",
                "",
                "",
                "",
                "",
                "^".repeat(width),
                pad = column - 1,
            );
        }

        out
    }
}

impl Display for KfuzzError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lex(err) => write!(f, "{err}"),
            Self::Parse(err) => write!(f, "{err}"),
            Self::Semantic(err) => write!(f, "{err}"),
            Self::Encode(err) => write!(f, "{err}"),
            Self::Source(err) => write!(f, "{err}"),
            Self::Blob(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for KfuzzError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Encode(EncodeError::OutOfMemory(err)) => Some(err),
            Self::Source(SourceError::Io(err)) => Some(err),
            _ => None,
        }
    }
}

// ----------------------------------------------------------------------------
// Lexer

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexError {
    pub span: Span,
    pub kind: LexErrorKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LexErrorKind {
    UnknownCharacter(char),
    /// Integer literal does not fit in 64 bits.
    IntegerOverflow,
}

impl Display for LexError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self.kind {
            LexErrorKind::UnknownCharacter(c) => {
                write!(f, "unknown character {c:?} at offset {}", self.span.index)
            }
            LexErrorKind::IntegerOverflow => write!(
                f,
                "integer literal at offset {} does not fit in 64 bits",
                self.span.index
            ),
        }
    }
}

impl From<LexError> for KfuzzError {
    fn from(err: LexError) -> Self {
        KfuzzError::Lex(err)
    }
}

// ----------------------------------------------------------------------------
// Parser

/// Error returned when an unexpected token kind is encountered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    /// Any one of these would have been accepted.
    pub expected: &'static [TokenKind],
    pub encountered: TokenKind,
    pub span: Span,
    /// Index of the encountered token in the token sequence.
    pub position: usize,
}

impl Display for ParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "expected ")?;
        match self.expected {
            [] => write!(f, "nothing")?,
            [kind] => write!(f, "{kind}")?,
            [init @ .., last] => write!(f, "one of {} or {last}", init.iter().format(", "))?,
        }
        write!(
            f,
            ", found {} at offset {}",
            self.encountered, self.span.index
        )
    }
}

impl From<ParseError> for KfuzzError {
    fn from(err: ParseError) -> Self {
        KfuzzError::Parse(err)
    }
}

// ----------------------------------------------------------------------------
// Semantic

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SemanticError {
    /// Two regions declared with the same name.
    DuplicateRegion { name: SmolStr, span: Span },
    /// Pointer to a region that was never declared.
    UnresolvedRegion {
        region: SmolStr,
        target: SmolStr,
        span: Span,
    },
}

impl Display for SemanticError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateRegion { name, .. } => {
                write!(f, "region '{name}' is declared more than once")
            }
            Self::UnresolvedRegion { region, target, .. } => write!(
                f,
                "pointer in region '{region}' refers to undeclared region '{target}'"
            ),
        }
    }
}

impl From<SemanticError> for KfuzzError {
    fn from(err: SemanticError) -> Self {
        KfuzzError::Semantic(err)
    }
}

// ----------------------------------------------------------------------------
// Encoder

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EncodeError {
    /// Growing a buffer failed.
    OutOfMemory(TryReserveError),
    /// Value does not fit the 32-bit field of the wire format.
    Overflow(&'static str),
}

impl Display for EncodeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfMemory(err) => write!(f, "out of memory: {err}"),
            Self::Overflow(what) => write!(f, "{what} exceeds the 32-bit range of the blob format"),
        }
    }
}

impl From<EncodeError> for KfuzzError {
    fn from(err: EncodeError) -> Self {
        KfuzzError::Encode(err)
    }
}

impl From<TryReserveError> for KfuzzError {
    fn from(err: TryReserveError) -> Self {
        KfuzzError::Encode(EncodeError::OutOfMemory(err))
    }
}

// ----------------------------------------------------------------------------
// Byte source

#[derive(Debug)]
pub enum SourceError {
    /// Backing data has no bytes to cycle through.
    Empty,
    /// Cache window must hold at least one byte.
    CacheSize,
    Io(io::Error),
}

impl Display for SourceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "random byte source is empty"),
            Self::CacheSize => write!(f, "seed cache size must be greater than zero"),
            Self::Io(err) => write!(f, "random byte source is unreadable: {err}"),
        }
    }
}

impl From<SourceError> for KfuzzError {
    fn from(err: SourceError) -> Self {
        KfuzzError::Source(err)
    }
}

impl From<io::Error> for SourceError {
    fn from(err: io::Error) -> Self {
        SourceError::Io(err)
    }
}

// ----------------------------------------------------------------------------
// Inspector

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlobError {
    /// Blob ended before the named section was complete.
    Truncated { section: &'static str, len: usize },
    BadMagic(u32),
    BadVersion(u32),
    /// Padding before the payload is shorter than the poison gap.
    Misaligned { payload_start: usize },
    /// Region extends past the end of the payload.
    BadRegion { index: usize },
    /// Relocation names a region that does not exist, or points outside its region.
    BadRelocation { index: usize },
}

impl Display for BlobError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Truncated { section, len } => {
                write!(f, "blob of {len} bytes is truncated in the {section}")
            }
            Self::BadMagic(magic) => write!(f, "bad blob magic 0x{magic:08X}"),
            Self::BadVersion(version) => write!(f, "unsupported blob version {version}"),
            Self::Misaligned { payload_start } => {
                write!(f, "payload start {payload_start} breaks the padding rule")
            }
            Self::BadRegion { index } => write!(f, "region {index} lies outside the payload"),
            Self::BadRelocation { index } => write!(f, "relocation {index} is out of range"),
        }
    }
}

impl From<BlobError> for KfuzzError {
    fn from(err: BlobError) -> Self {
        KfuzzError::Blob(err)
    }
}
