//! Blob inspector.
//!
//! Reads a finished blob back into its tables, for dumping and checking.
use std::fmt::{self, Display, Formatter};

use crate::{
    constants::*,
    encode::RelocInfo,
    error::{BlobError, KfuzzResult},
};

/// Entry of the region table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegionEntry {
    pub offset: u32,
    pub size: u32,
}

/// Decoded view over a blob.
#[derive(Debug)]
pub struct BlobView<'a> {
    pub version: u32,
    pub regions: Vec<RegionEntry>,
    pub relocations: Vec<RelocInfo>,
    /// Zero bytes between the relocation table and the payload.
    pub padding: u32,
    /// Offset of the payload from the start of the blob.
    pub payload_start: usize,
    pub payload: &'a [u8],
}

impl<'a> BlobView<'a> {
    pub fn decode(blob: &'a [u8]) -> KfuzzResult<Self> {
        let mut reader = Reader { blob, cursor: 0 };

        let magic = reader.u32("prefix")?;
        if magic != MAGIC {
            return Err(BlobError::BadMagic(magic).into());
        }

        let version = reader.u32("prefix")?;
        if version != VERSION {
            return Err(BlobError::BadVersion(version).into());
        }

        let region_count = reader.u32("region table")? as usize;
        let mut regions = vec![];
        for _ in 0..region_count {
            regions.push(RegionEntry {
                offset: reader.u32("region table")?,
                size: reader.u32("region table")?,
            });
        }

        let reloc_count = reader.u32("relocation table")? as usize;
        let padding = reader.u32("relocation table")?;
        let mut relocations = vec![];
        for _ in 0..reloc_count {
            relocations.push(RelocInfo {
                src_region: reader.u32("relocation table")?,
                offset: reader.u32("relocation table")?,
                dst_region: reader.u32("relocation table")?,
            });
        }

        if (padding as usize) < POISON_GAP {
            return Err(BlobError::Misaligned {
                payload_start: reader.cursor + padding as usize,
            }
            .into());
        }
        reader.take(padding as usize, "padding")?;

        let payload_start = reader.cursor;
        let payload = &blob[payload_start..];

        let view = Self {
            version,
            regions,
            relocations,
            padding,
            payload_start,
            payload,
        };
        view.validate()?;

        Ok(view)
    }

    fn validate(&self) -> Result<(), BlobError> {
        for (index, region) in self.regions.iter().enumerate() {
            let end = region.offset as usize + region.size as usize;
            if end > self.payload.len() {
                return Err(BlobError::BadRegion { index });
            }
        }

        for (index, reloc) in self.relocations.iter().enumerate() {
            let in_range = match (
                self.regions.get(reloc.src_region as usize),
                self.regions.get(reloc.dst_region as usize),
            ) {
                (Some(src), Some(_)) => {
                    reloc.offset as u64 + POINTER_WIDTH <= src.size as u64
                }
                _ => false,
            };

            if !in_range {
                return Err(BlobError::BadRelocation { index });
            }
        }

        Ok(())
    }

    /// Content bytes of a region, excluding the poison gap.
    pub fn region_bytes(&self, index: usize) -> Option<&'a [u8]> {
        let region = self.regions.get(index)?;
        let start = region.offset as usize;
        self.payload.get(start..start + region.size as usize)
    }

    /// Current value of the pointer slot a relocation refers to.
    pub fn pointer_value(&self, reloc: &RelocInfo) -> Option<u64> {
        let region = self.region_bytes(reloc.src_region as usize)?;
        let start = reloc.offset as usize;
        let bytes = region.get(start..start + POINTER_WIDTH as usize)?;
        Some(u64::from_le_bytes(bytes.try_into().ok()?))
    }
}

impl<'a> Display for BlobView<'a> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(f, "magic 0x{MAGIC:08X} version {}", self.version)?;

        writeln!(f, "regions: {}", self.regions.len())?;
        for (i, region) in self.regions.iter().enumerate() {
            writeln!(
                f,
                "  #{i:<3} offset 0x{:06X} size {}",
                region.offset, region.size
            )?;
        }

        writeln!(
            f,
            "relocations: {} (padding {})",
            self.relocations.len(),
            self.padding
        )?;
        for (i, reloc) in self.relocations.iter().enumerate() {
            writeln!(
                f,
                "  #{i:<3} region {} + 0x{:04X} -> region {}",
                reloc.src_region, reloc.offset, reloc.dst_region
            )?;
        }

        write!(
            f,
            "payload: {} bytes at 0x{:X}",
            self.payload.len(),
            self.payload_start
        )
    }
}

/// Little-endian reader over the blob.
struct Reader<'a> {
    blob: &'a [u8],
    cursor: usize,
}

impl<'a> Reader<'a> {
    fn take(&mut self, count: usize, section: &'static str) -> Result<&'a [u8], BlobError> {
        let blob = self.blob;
        let start = self.cursor;
        let bytes = start
            .checked_add(count)
            .and_then(|end| blob.get(start..end))
            .ok_or(BlobError::Truncated {
                section,
                len: blob.len(),
            })?;
        self.cursor += count;
        Ok(bytes)
    }

    fn u32(&mut self, section: &'static str) -> Result<u32, BlobError> {
        let bytes = self.take(4, section)?;
        let mut word = [0; 4];
        word.copy_from_slice(bytes);
        Ok(u32::from_le_bytes(word))
    }
}
