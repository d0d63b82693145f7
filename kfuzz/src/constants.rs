//! Constant values of the blob wire format.

/// Magic number at the start of every blob.
///
/// Written little-endian, so the blob begins with `CE FA 0B 00`.
pub const MAGIC: u32 = 0x000B_FACE;

/// Wire format version.
pub const VERSION: u32 = 0;

/// Byte size of an address on the supported platform.
pub const POINTER_WIDTH: u64 = 8;

/// Value written in place of every pointer field.
///
/// The harness patches pointers through the relocation table,
/// so this is never a real address.
pub const POINTER_PLACEHOLDER: u64 = u64::MAX;

/// Zero bytes appended after each region.
///
/// One KASAN granule, so an access running off the end of a region
/// lands in poisoned memory.
pub const POISON_GAP: usize = 8;

/// Size of the magic and version prefix.
pub const PREFIX_SIZE: usize = 8;

/// Size of one `{ offset, size }` entry in the region table.
pub const REGION_ENTRY_SIZE: usize = 8;

/// Size of one `{ src_region, offset, dst_region }` entry in the relocation table.
pub const RELOC_ENTRY_SIZE: usize = 12;

/// Default capacity of the seed file cache window, in bytes.
pub const DEFAULT_CACHE_SIZE: usize = 0x1000; // 4096

/// Smallest capacity a growable byte buffer starts with.
pub const MIN_BUFFER_CAPACITY: usize = 8;
