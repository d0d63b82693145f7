//! Blob encoder.
mod buffer;
mod encoder;
mod symbol;

pub use self::{
    buffer::ByteBuffer,
    encoder::{header_size, trailing_padding, Encoder, RegionInfo, RelocInfo},
    symbol::{Symbol, SymbolTable},
};

use crate::{error::KfuzzResult, parse::Program, source::ByteSource};

/// Encode the program, filling field contents from `source`.
pub fn encode(program: &Program, source: impl ByteSource) -> KfuzzResult<Vec<u8>> {
    Encoder::new(source).encode(program)
}
