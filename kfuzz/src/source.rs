//! Suppliers of filler bytes for field contents.
use std::{
    fs::File,
    io::{ErrorKind, Read, Seek, SeekFrom},
    path::Path,
};

use crate::error::SourceError;

/// Endless, cyclic supply of bytes.
pub trait ByteSource {
    fn next_byte(&mut self) -> Result<u8, SourceError>;

    /// Fill the whole buffer, in delivery order.
    fn fill(&mut self, buf: &mut [u8]) -> Result<(), SourceError> {
        for byte in buf.iter_mut() {
            *byte = self.next_byte()?;
        }
        Ok(())
    }
}

impl<S: ByteSource + ?Sized> ByteSource for &mut S {
    #[inline]
    fn next_byte(&mut self) -> Result<u8, SourceError> {
        (**self).next_byte()
    }

    #[inline]
    fn fill(&mut self, buf: &mut [u8]) -> Result<(), SourceError> {
        (**self).fill(buf)
    }
}

/// Seed file read through a fixed size cache window.
///
/// When the file is exhausted the reader is rewound to the start,
/// so a small seed can fill an arbitrarily large payload.
pub struct SeedFile<R> {
    reader: R,
    cache: Box<[u8]>,
    /// Number of valid bytes in the cache.
    len: usize,
    /// Next byte to deliver from the cache.
    cursor: usize,
}

impl SeedFile<File> {
    /// Open the seed file at the given path.
    pub fn open(path: impl AsRef<Path>, cache_size: usize) -> Result<Self, SourceError> {
        let path = path.as_ref();
        log::debug!("opening seed file {}", path.display());
        Self::new(File::open(path)?, cache_size)
    }
}

impl<R: Read + Seek> SeedFile<R> {
    /// Wrap a reader and load the first cache window.
    ///
    /// # Errors
    ///
    /// Fails when the cache size is zero, or the reader is empty or unreadable.
    pub fn new(reader: R, cache_size: usize) -> Result<Self, SourceError> {
        if cache_size == 0 {
            return Err(SourceError::CacheSize);
        }

        let mut source = Self {
            reader,
            cache: vec![0; cache_size].into_boxed_slice(),
            len: 0,
            cursor: 0,
        };
        source.refill()?;

        Ok(source)
    }

    pub fn cache_size(&self) -> usize {
        self.cache.len()
    }

    /// Load the next window, wrapping to the start of the file at most once.
    fn refill(&mut self) -> Result<(), SourceError> {
        let mut rewound = false;

        loop {
            let count = match self.reader.read(&mut self.cache) {
                Ok(count) => count,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(err.into()),
            };

            if count > 0 {
                log::trace!("seed cache refilled with {count} bytes");
                self.len = count;
                self.cursor = 0;
                return Ok(());
            }

            // A read of zero right after rewinding means there is nothing to cycle.
            if rewound {
                return Err(SourceError::Empty);
            }

            log::trace!("seed file exhausted, rewinding");
            self.reader.seek(SeekFrom::Start(0))?;
            rewound = true;
        }
    }
}

impl<R: Read + Seek> ByteSource for SeedFile<R> {
    fn next_byte(&mut self) -> Result<u8, SourceError> {
        if self.cursor >= self.len {
            self.refill()?;
        }

        let byte = self.cache[self.cursor];
        self.cursor += 1;
        Ok(byte)
    }

    fn fill(&mut self, buf: &mut [u8]) -> Result<(), SourceError> {
        let mut filled = 0;

        while filled < buf.len() {
            if self.cursor >= self.len {
                self.refill()?;
            }

            let count = (self.len - self.cursor).min(buf.len() - filled);
            buf[filled..filled + count].copy_from_slice(&self.cache[self.cursor..self.cursor + count]);
            self.cursor += count;
            filled += count;
        }

        Ok(())
    }
}

/// Cyclic source over bytes already in memory.
pub struct SeedSlice<'a> {
    data: &'a [u8],
    cursor: usize,
}

impl<'a> SeedSlice<'a> {
    pub fn new(data: &'a [u8]) -> Result<Self, SourceError> {
        if data.is_empty() {
            return Err(SourceError::Empty);
        }
        Ok(Self { data, cursor: 0 })
    }
}

impl<'a> ByteSource for SeedSlice<'a> {
    #[inline]
    fn next_byte(&mut self) -> Result<u8, SourceError> {
        let byte = self.data[self.cursor];
        self.cursor = (self.cursor + 1) % self.data.len();
        Ok(byte)
    }
}
