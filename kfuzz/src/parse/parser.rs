//! Recursive descent over the token stream.
//!
//! ```text
//! program   := region* EOF
//! region    := IDENTIFIER '{' [ field (',' field)* ] '}'
//! field     := primitive | pointer | array
//! primitive := 'u8' | 'u16' | 'u32' | 'u64'
//! pointer   := 'ptr' '[' IDENTIFIER ']'
//! array     := 'arr' '[' primitive ',' INTEGER ']'
//! ```
use smol_str::SmolStr;

use super::{
    ast::{Array, Field, Pointer, Primitive, Program, Region, Width},
    token_stream::TokenStream,
};
use crate::{
    error::ParseError,
    lex::{Keyword as K, TokenKind as TK},
};

/// Tokens that may start a field.
const FIELD_START: &[TK] = &[
    TK::Keyword(K::U8),
    TK::Keyword(K::U16),
    TK::Keyword(K::U32),
    TK::Keyword(K::U64),
    TK::Keyword(K::Ptr),
    TK::Keyword(K::Arr),
];

const PRIMITIVE: &[TK] = &[
    TK::Keyword(K::U8),
    TK::Keyword(K::U16),
    TK::Keyword(K::U32),
    TK::Keyword(K::U64),
];

/// Tokens that may follow a field.
const FIELD_END: &[TK] = &[TK::Comma, TK::RightBrace];

/// Tokens that may start a region, or end the program.
const REGION_START: &[TK] = &[TK::Ident, TK::EOF];

/// Tokens that may follow a region's opening brace.
const BODY_START: &[TK] = &[
    TK::Keyword(K::U8),
    TK::Keyword(K::U16),
    TK::Keyword(K::U32),
    TK::Keyword(K::U64),
    TK::Keyword(K::Ptr),
    TK::Keyword(K::Arr),
    TK::RightBrace,
];

pub trait Parse: Sized {
    /// Consume exactly the tokens of one production.
    fn parse(input: &mut TokenStream) -> Result<Self, ParseError>;
}

impl Parse for Program {
    fn parse(input: &mut TokenStream) -> Result<Self, ParseError> {
        let mut regions = vec![];

        loop {
            match input.peek_kind() {
                TK::EOF => break,
                TK::Ident => regions.push(Region::parse(input)?),
                _ => return Err(input.unexpected(REGION_START)),
            }
        }

        input.consume(TK::EOF)?;

        Ok(Program { regions })
    }
}

impl Parse for Region {
    fn parse(input: &mut TokenStream) -> Result<Self, ParseError> {
        let ident = input.consume(TK::Ident)?;
        let name = SmolStr::new(input.span_fragment(&ident.span));
        input.consume(TK::LeftBrace)?;

        let mut fields = vec![];

        if !input.match_token(TK::RightBrace) {
            if !FIELD_START.contains(&input.peek_kind()) {
                return Err(input.unexpected(BODY_START));
            }

            loop {
                fields.push(Field::parse(input)?);

                if input.match_token(TK::Comma) {
                    continue;
                }
                if input.match_token(TK::RightBrace) {
                    break;
                }
                return Err(input.unexpected(FIELD_END));
            }
        }

        Ok(Region {
            name,
            span: ident.span,
            fields,
        })
    }
}

impl Parse for Field {
    fn parse(input: &mut TokenStream) -> Result<Self, ParseError> {
        match input.peek_kind() {
            kind if kind.is_primitive() => Primitive::parse(input).map(Field::Primitive),
            TK::Keyword(K::Ptr) => Pointer::parse(input).map(Field::Pointer),
            TK::Keyword(K::Arr) => Array::parse(input).map(Field::Array),
            _ => Err(input.unexpected(FIELD_START)),
        }
    }
}

impl Parse for Primitive {
    fn parse(input: &mut TokenStream) -> Result<Self, ParseError> {
        let width = match input.peek_kind() {
            TK::Keyword(keyword) => Width::from_keyword(keyword),
            _ => None,
        }
        .ok_or_else(|| input.unexpected(PRIMITIVE))?;

        input.next_token();

        Ok(Primitive { width })
    }
}

impl Parse for Pointer {
    fn parse(input: &mut TokenStream) -> Result<Self, ParseError> {
        input.consume(TK::Keyword(K::Ptr))?;
        input.consume(TK::LeftBracket)?;
        let ident = input.consume(TK::Ident)?;
        input.consume(TK::RightBracket)?;

        Ok(Pointer {
            target: SmolStr::new(input.span_fragment(&ident.span)),
            span: ident.span,
        })
    }
}

impl Parse for Array {
    fn parse(input: &mut TokenStream) -> Result<Self, ParseError> {
        input.consume(TK::Keyword(K::Arr))?;
        input.consume(TK::LeftBracket)?;
        let elem = Primitive::parse(input)?.width;
        input.consume(TK::Comma)?;

        // A literal token always carries its value when it comes out of the lexer.
        let count = match input.peek() {
            Some(token) if token.kind == TK::Integer => token.value,
            _ => None,
        }
        .ok_or_else(|| input.unexpected(&[TK::Integer]))?;
        input.next_token();

        input.consume(TK::RightBracket)?;

        Ok(Array { elem, count })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::lex::{tokenize, Span};

    fn parse_src<T: Parse>(source: &str) -> Result<T, ParseError> {
        let tokens = tokenize(source).unwrap();
        let mut stream = TokenStream::new(source, &tokens);
        T::parse(&mut stream)
    }

    #[test]
    fn test_parse_fields() {
        let region = parse_src::<Region>("foo { u8, u16, u32, u64, ptr[bar], arr[u16, 3] }").unwrap();
        assert_eq!(region.name, "foo");
        assert_eq!(region.span, Span::new(0, 3));
        assert_eq!(
            region.fields,
            vec![
                Field::Primitive(Primitive { width: Width::U8 }),
                Field::Primitive(Primitive { width: Width::U16 }),
                Field::Primitive(Primitive { width: Width::U32 }),
                Field::Primitive(Primitive { width: Width::U64 }),
                Field::Pointer(Pointer {
                    target: "bar".into(),
                    span: Span::new(29, 3),
                }),
                Field::Array(Array {
                    elem: Width::U16,
                    count: 3
                }),
            ]
        );
    }

    #[test]
    fn test_empty_region() {
        let region = parse_src::<Region>("x { }").unwrap();
        assert!(region.fields.is_empty());
    }

    #[test]
    fn test_trailing_comma_rejected() {
        let err = parse_src::<Region>("x { u8, }").unwrap_err();
        assert_eq!(err.expected, FIELD_START);
        assert_eq!(err.encountered, TK::RightBrace);
        assert_eq!(err.position, 4);
    }

    #[test]
    fn test_missing_separator() {
        let err = parse_src::<Region>("x { u8 u16 }").unwrap_err();
        assert_eq!(err.expected, FIELD_END);
        assert_eq!(err.encountered, TK::Keyword(K::U16));
    }

    #[test]
    fn test_array_needs_primitive() {
        let err = parse_src::<Array>("arr[ptr, 4]").unwrap_err();
        assert_eq!(err.expected, PRIMITIVE);
        assert_eq!(err.encountered, TK::Keyword(K::Ptr));
    }

    #[test]
    fn test_array_needs_count() {
        let err = parse_src::<Array>("arr[u8, x]").unwrap_err();
        assert_eq!(err.expected, &[TK::Integer]);
        assert_eq!(err.encountered, TK::Ident);
    }

    #[test]
    fn test_pointer_to_keyword() {
        let err = parse_src::<Pointer>("ptr[u8]").unwrap_err();
        assert_eq!(err.expected, &[TK::Ident]);
    }

    #[test]
    fn test_program_stray_token() {
        let err = parse_src::<Program>("a { u8 } }").unwrap_err();
        assert_eq!(err.expected, REGION_START);
        assert_eq!(err.encountered, TK::RightBrace);
        assert_eq!(err.span, Span::new(9, 1));
    }

    #[test]
    fn test_program_without_eof() {
        let source = "a { u8 }";
        let mut tokens = tokenize(source).unwrap();
        tokens.pop();

        let err = crate::parse::parse(source, &tokens).unwrap_err();
        assert_eq!(err.expected, &[TK::EOF]);
        assert_eq!(err.span, Span::new(8, 0));
        assert_eq!(err.position, 4);
    }
}
