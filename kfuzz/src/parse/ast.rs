//! Syntax tree of a region description.
//!
//! The tree is strictly hierarchical. A [`Program`] owns its regions,
//! and each [`Region`] owns its fields, so the whole tree is released
//! by dropping the root.
use std::fmt;

use smol_str::SmolStr;

use crate::lex::{Keyword, Span};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Program {
    /// Regions in declaration order.
    pub regions: Vec<Region>,
}

impl Program {
    /// Total number of pointer fields across all regions.
    pub fn pointer_count(&self) -> usize {
        self.regions.iter().map(Region::pointer_count).sum()
    }
}

/// Named, independently addressable block of the payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Region {
    pub name: SmolStr,
    /// Location of the name in the source.
    pub span: Span,
    /// Fields in declaration order.
    pub fields: Vec<Field>,
}

impl Region {
    pub fn pointer_count(&self) -> usize {
        self.fields
            .iter()
            .filter(|field| matches!(field, Field::Pointer(_)))
            .count()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Field {
    Primitive(Primitive),
    Array(Array),
    Pointer(Pointer),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Primitive {
    pub width: Width,
}

/// Fixed size array of primitives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Array {
    pub elem: Width,
    pub count: u64,
}

/// Pointer to the start of another region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pointer {
    /// Name of the region pointed to.
    pub target: SmolStr,
    /// Location of the target name in the source.
    pub span: Span,
}

/// Byte width of a primitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum Width {
    U8 = 1,
    U16 = 2,
    U32 = 4,
    U64 = 8,
}

impl Width {
    #[inline]
    pub fn bytes(self) -> u64 {
        self as u64
    }

    pub fn from_keyword(keyword: Keyword) -> Option<Self> {
        match keyword {
            Keyword::U8 => Some(Self::U8),
            Keyword::U16 => Some(Self::U16),
            Keyword::U32 => Some(Self::U32),
            Keyword::U64 => Some(Self::U64),
            Keyword::Ptr | Keyword::Arr => None,
        }
    }
}

impl fmt::Display for Width {
    #[rustfmt::skip]
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::U8  => write!(f, "u8"),
            Self::U16 => write!(f, "u16"),
            Self::U32 => write!(f, "u32"),
            Self::U64 => write!(f, "u64"),
        }
    }
}

/// Prints the tree back as source text in the fixed grammar.
impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (i, region) in self.regions.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{region}")?;
        }
        Ok(())
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} {{", self.name)?;
        for (i, field) in self.fields.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, " {field}")?;
        }
        write!(f, " }}")
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Primitive(primitive) => write!(f, "{}", primitive.width),
            Self::Array(array) => write!(f, "arr[{}, {}]", array.elem, array.count),
            Self::Pointer(pointer) => write!(f, "ptr[{}]", pointer.target),
        }
    }
}
