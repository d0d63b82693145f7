//! Size and alignment of syntax tree nodes.
//!
//! Values are recomputed on every call. Sizes never include alignment
//! padding, that is decided by the encoder.
use crate::{
    constants::POINTER_WIDTH,
    parse::{Array, Field, Pointer, Primitive, Program, Region},
};

pub trait Layout {
    /// Bytes of content, excluding padding.
    fn size(&self) -> u64;

    /// Required alignment in bytes, at least 1.
    fn alignment(&self) -> u64;
}

impl Layout for Primitive {
    #[inline]
    fn size(&self) -> u64 {
        self.width.bytes()
    }

    #[inline]
    fn alignment(&self) -> u64 {
        self.width.bytes()
    }
}

impl Layout for Array {
    #[inline]
    fn size(&self) -> u64 {
        self.elem.bytes().saturating_mul(self.count)
    }

    #[inline]
    fn alignment(&self) -> u64 {
        self.elem.bytes()
    }
}

impl Layout for Pointer {
    #[inline]
    fn size(&self) -> u64 {
        POINTER_WIDTH
    }

    #[inline]
    fn alignment(&self) -> u64 {
        POINTER_WIDTH
    }
}

impl Layout for Field {
    fn size(&self) -> u64 {
        match self {
            Field::Primitive(primitive) => primitive.size(),
            Field::Array(array) => array.size(),
            Field::Pointer(pointer) => pointer.size(),
        }
    }

    fn alignment(&self) -> u64 {
        match self {
            Field::Primitive(primitive) => primitive.alignment(),
            Field::Array(array) => array.alignment(),
            Field::Pointer(pointer) => pointer.alignment(),
        }
    }
}

impl Layout for Region {
    fn size(&self) -> u64 {
        sum_sizes(&self.fields)
    }

    fn alignment(&self) -> u64 {
        max_alignment(&self.fields)
    }
}

impl Layout for Program {
    fn size(&self) -> u64 {
        sum_sizes(&self.regions)
    }

    fn alignment(&self) -> u64 {
        max_alignment(&self.regions)
    }
}

fn sum_sizes<T: Layout>(children: &[T]) -> u64 {
    children
        .iter()
        .fold(0, |acc, child| acc.saturating_add(child.size()))
}

fn max_alignment<T: Layout>(children: &[T]) -> u64 {
    children.iter().map(Layout::alignment).fold(1, u64::max)
}

/// Smallest multiple of `n` that is not less than `x`.
///
/// A zero `n` leaves `x` unchanged.
#[inline]
pub fn round_up(x: u64, n: u64) -> u64 {
    if n == 0 {
        x
    } else {
        x.div_ceil(n) * n
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::parse::parse_str;

    #[test]
    fn test_region_layout() {
        let program = parse_str("a { u8, u32, ptr[a], arr[u16, 5] } b { } c { arr[u64, 0] }").unwrap();
        let [a, b, c] = &program.regions[..] else {
            panic!("expected three regions");
        };

        // No padding between the u8 and the u32.
        assert_eq!(a.size(), 1 + 4 + 8 + 10);
        assert_eq!(a.alignment(), 8);

        assert_eq!(b.size(), 0);
        assert_eq!(b.alignment(), 1);

        assert_eq!(c.size(), 0);
        assert_eq!(c.alignment(), 8);

        assert_eq!(program.size(), 23);
        assert_eq!(program.alignment(), 8);
    }

    #[test]
    fn test_empty_program() {
        let program = Program::default();
        assert_eq!(program.size(), 0);
        assert_eq!(program.alignment(), 1);
    }

    #[test]
    fn test_array_size_saturates() {
        let program = parse_str("a { arr[u64, 18446744073709551615] }").unwrap();
        assert_eq!(program.size(), u64::MAX);
    }

    #[test]
    fn test_round_up() {
        assert_eq!(round_up(0, 8), 0);
        assert_eq!(round_up(1, 8), 8);
        assert_eq!(round_up(8, 8), 8);
        assert_eq!(round_up(9, 4), 12);
        assert_eq!(round_up(7, 1), 7);
        assert_eq!(round_up(7, 0), 7);
    }
}
