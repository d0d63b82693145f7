//! Compiler for KFuzzTest structured inputs.
//!
//! A program describes a set of named memory regions. Compiling it yields a
//! self-describing blob: the region table, a relocation table of pointer
//! fields the kernel side patches, and the payload filled from a byte source.
//!
//! ```
//! use kfuzz::{blob::BlobView, compile, source::SeedSlice};
//!
//! let seed = [0x41];
//! let blob = compile("data { u32 } args { ptr[data], u8 }", SeedSlice::new(&seed)?)?;
//!
//! let view = BlobView::decode(&blob)?;
//! assert_eq!(view.regions.len(), 2);
//! assert_eq!(view.relocations.len(), 1);
//! # Ok::<(), kfuzz::KfuzzError>(())
//! ```
pub mod blob;
pub mod constants;
pub mod encode;
mod error;
pub mod layout;
pub mod lex;
pub mod parse;
pub mod source;

use std::path::Path;

pub use self::error::{
    BlobError, EncodeError, KfuzzError, KfuzzResult, LexError, LexErrorKind, ParseError,
    SemanticError, SourceError,
};
use self::{constants::DEFAULT_CACHE_SIZE, source::ByteSource, source::SeedFile};

/// Version of this implementation.
pub const IMPL_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library configuration.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct KfuzzConf {
    /// Bytes of the seed file held in memory at once.
    pub seed_cache_size: usize,
}

impl Default for KfuzzConf {
    fn default() -> Self {
        Self {
            seed_cache_size: DEFAULT_CACHE_SIZE,
        }
    }
}

/// Compile source text into a blob, filling field contents from `bytes`.
pub fn compile(source_code: &str, bytes: impl ByteSource) -> KfuzzResult<Vec<u8>> {
    let program = parse::parse_str(source_code)?;
    encode::encode(&program, bytes)
}

/// Compile source text using the seed file at `seed_path` as the byte source.
pub fn compile_with_seed(
    source_code: &str,
    seed_path: impl AsRef<Path>,
    conf: &KfuzzConf,
) -> KfuzzResult<Vec<u8>> {
    let seed = SeedFile::open(seed_path, conf.seed_cache_size)?;
    compile(source_code, seed)
}

pub mod prelude {
    pub use super::{
        blob::BlobView,
        compile, compile_with_seed,
        error::{KfuzzError, KfuzzResult},
        parse::Program,
        source::{ByteSource, SeedFile, SeedSlice},
        KfuzzConf,
    };
}
