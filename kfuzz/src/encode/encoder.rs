//! Two pass blob encoder.
use smol_str::SmolStr;

use super::{
    buffer::ByteBuffer,
    symbol::{Symbol, SymbolTable},
};
use crate::{
    constants::*,
    error::{EncodeError, KfuzzResult, SemanticError},
    layout::{round_up, Layout},
    parse::{Field, Pointer, Program, Region},
    source::ByteSource,
};

/// Placement of one region in the payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionInfo {
    pub name: SmolStr,
    /// Byte offset from the start of the payload.
    pub offset: u32,
    /// Bytes emitted for the region, excluding the poison gap.
    pub size: u32,
}

/// Pointer field the harness must patch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelocInfo {
    /// Region that holds the pointer.
    pub src_region: u32,
    /// Byte offset of the pointer within its region.
    pub offset: u32,
    /// Region pointed to.
    pub dst_region: u32,
}

/// Blob encoder.
///
/// All state is owned by the encoder and consumed by [`Encoder::encode`],
/// so nothing survives a failed encode.
pub struct Encoder<S> {
    /// Filler bytes for primitive and array contents.
    source: S,
    symbols: SymbolTable,
    regions: Vec<RegionInfo>,
    relocations: Vec<RelocInfo>,
    payload: ByteBuffer,
    /// Index of the region being emitted.
    current: u32,
    /// Byte offset from the start of the region being emitted.
    cursor: u64,
}

impl<S: ByteSource> Encoder<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            symbols: SymbolTable::default(),
            regions: vec![],
            relocations: vec![],
            payload: ByteBuffer::new(),
            current: 0,
            cursor: 0,
        }
    }

    /// Encode the program into a complete blob.
    pub fn encode(mut self, program: &Program) -> KfuzzResult<Vec<u8>> {
        self.collect_symbols(program)?;
        self.emit_payload(program)?;
        self.assemble(program)
    }
}

/// First pass
impl<S: ByteSource> Encoder<S> {
    /// Build the region table in declaration order.
    ///
    /// Offsets are unknown until the payload is emitted.
    fn collect_symbols(&mut self, program: &Program) -> KfuzzResult<()> {
        self.regions.try_reserve_exact(program.regions.len())?;

        for (i, region) in program.regions.iter().enumerate() {
            let provisional_size = region.size();

            let symbol = Symbol {
                name: region.name.clone(),
                index: to_u32(i, "region count")?,
                provisional_size,
            };

            if let Err(symbol) = self.symbols.add_symbol(symbol) {
                return Err(SemanticError::DuplicateRegion {
                    name: symbol.name,
                    span: region.span,
                }
                .into());
            }

            self.regions.push(RegionInfo {
                name: region.name.clone(),
                offset: 0,
                size: u32::try_from(provisional_size).unwrap_or(u32::MAX),
            });
        }

        log::debug!("collected {} region symbols", self.symbols.len());

        Ok(())
    }
}

/// Second pass
impl<S: ByteSource> Encoder<S> {
    fn emit_payload(&mut self, program: &Program) -> KfuzzResult<()> {
        self.relocations.try_reserve_exact(program.pointer_count())?;

        for (i, region) in program.regions.iter().enumerate() {
            self.current = to_u32(i, "region count")?;
            self.emit_region(i, region)?;
        }

        log::debug!(
            "emitted {} payload bytes with {} relocations",
            self.payload.len(),
            self.relocations.len()
        );

        Ok(())
    }

    fn emit_region(&mut self, index: usize, region: &Region) -> KfuzzResult<()> {
        self.payload.align_to(region.alignment())?;

        let start = self.payload.len();
        self.regions[index].offset = to_u32(start, "region offset")?;
        self.cursor = 0;

        for field in &region.fields {
            self.emit_field(region, field)?;
        }

        let size = self.payload.len() - start;
        self.regions[index].size = to_u32(size, "region size")?;

        log::debug!(
            "region '{}' placed at offset {} with size {}",
            region.name,
            start,
            size
        );

        // Poison gap, not part of the region.
        self.payload.push_zeros(POISON_GAP)?;

        Ok(())
    }

    fn emit_field(&mut self, region: &Region, field: &Field) -> KfuzzResult<()> {
        let padding = self.payload.align_to(field.alignment())?;
        self.cursor += padding as u64;

        let size = field.size();
        check_payload_end(self.payload.len(), size)?;

        match field {
            Field::Primitive(_) | Field::Array(_) => {
                self.payload.push_from(&mut self.source, size as usize)?;
            }
            Field::Pointer(pointer) => self.emit_pointer(region, pointer)?,
        }

        self.cursor += size;

        Ok(())
    }

    fn emit_pointer(&mut self, region: &Region, pointer: &Pointer) -> KfuzzResult<()> {
        let dst_region = self
            .symbols
            .get_symbol(pointer.target.as_str())
            .map(|symbol| symbol.index)
            .ok_or_else(|| SemanticError::UnresolvedRegion {
                region: region.name.clone(),
                target: pointer.target.clone(),
                span: pointer.span,
            })?;

        let reloc = RelocInfo {
            src_region: self.current,
            offset: to_u32(self.cursor, "pointer offset")?,
            dst_region,
        };

        self.payload.push_u64_le(POINTER_PLACEHOLDER)?;
        self.relocations.push(reloc);

        log::trace!(
            "added relocation {} -> {} at offset {}",
            reloc.src_region,
            reloc.dst_region,
            reloc.offset
        );

        Ok(())
    }
}

/// Assembly
impl<S: ByteSource> Encoder<S> {
    /// Concatenate the header, the tables and the payload.
    fn assemble(self, program: &Program) -> KfuzzResult<Vec<u8>> {
        let header_size = header_size(self.regions.len(), self.relocations.len());
        let trailing_pad = trailing_padding(header_size, program.alignment());

        let total = header_size + trailing_pad + self.payload.len();
        let mut out = ByteBuffer::with_capacity(total)?;

        out.push_u32_le(MAGIC)?;
        out.push_u32_le(VERSION)?;

        out.push_u32_le(to_u32(self.regions.len(), "region count")?)?;
        for info in &self.regions {
            out.push_u32_le(info.offset)?;
            out.push_u32_le(info.size)?;
        }

        out.push_u32_le(to_u32(self.relocations.len(), "relocation count")?)?;
        out.push_u32_le(to_u32(trailing_pad, "padding amount")?)?;
        for reloc in &self.relocations {
            out.push_u32_le(reloc.src_region)?;
            out.push_u32_le(reloc.offset)?;
            out.push_u32_le(reloc.dst_region)?;
        }
        out.push_zeros(trailing_pad)?;

        debug_assert_eq!(out.len(), header_size + trailing_pad);
        out.push_bytes(self.payload.as_slice())?;

        log::debug!(
            "assembled blob of {} bytes, payload starts at {}",
            out.len(),
            header_size + trailing_pad
        );

        Ok(out.into_inner())
    }
}

/// Bytes before the trailing padding: prefix, region table and relocation table.
pub fn header_size(region_count: usize, reloc_count: usize) -> usize {
    PREFIX_SIZE + 4 + region_count * REGION_ENTRY_SIZE + 8 + reloc_count * RELOC_ENTRY_SIZE
}

/// Zero bytes between the relocation table and the payload,
/// so the payload starts aligned for the whole program.
pub fn trailing_padding(header_size: usize, alignment: u64) -> usize {
    let header = header_size as u64;
    (round_up(header + 8, alignment) - header) as usize
}

fn to_u32<T: TryInto<u32>>(value: T, what: &'static str) -> Result<u32, EncodeError> {
    value.try_into().map_err(|_| EncodeError::Overflow(what))
}

/// Offsets in the blob are 32 bit, so the payload can't grow past that.
fn check_payload_end(len: usize, size: u64) -> Result<(), EncodeError> {
    match (len as u64).checked_add(size) {
        Some(end) if end <= u32::MAX as u64 => Ok(()),
        _ => Err(EncodeError::Overflow("payload size")),
    }
}
