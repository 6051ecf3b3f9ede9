//! Payload relocation and patching.
//!
//! A secondary payload is loaded somewhere convenient but must run
//! somewhere else. The hand-off works by assembling, in a staging
//! region, a copy of the loader's own early-entry copy loop (the
//! relocation stub) with a metadata block patched in at a fixed offset;
//! once jumped to, the stub moves the payload to its destination and
//! enters it. The stub ships as a versioned build artifact and is
//! CRC-checked before every use, since code that is about to execute
//! blind has no second chance.

use crate::{error::Error, memory_map, utilities::memory::align_up};
use crc::crc32;
use static_assertions::{const_assert, const_assert_eq};

/// Size in bytes of the relocation stub.
pub const STUB_SIZE: usize = 0x94;
/// Byte offset of the metadata block inside the stub.
pub const STUB_META_OFFSET: usize = 0x7C;
/// Stack top handed to the secondary stage: a reserved low-memory range
/// no payload loads over.
pub const STUB_STACK_ADDRESS: u32 = 0x4000_7000;

/// Payload size that marks a full platform-firmware hand-off.
pub const FIRMWARE_BLOB_SIZE: usize = 0x7000;
/// Marker written through the DRAM-ready control word when the firmware
/// blob is handed over in memory.
pub const DRAM_READY_MAGIC: u32 = 0x4452_414D; // "DRAM"

/// The relocation stub, byte-identical to the running loader's own
/// early-entry code.
pub static BOOT_STUB: &[u8; STUB_SIZE] = include_bytes!("../../assets/boot_stub.bin");
const BOOT_STUB_CRC: u32 = 0xD871_4EE9;

const_assert_eq!(core::mem::size_of::<RelocationMetadata>(), 16);
const_assert!(STUB_META_OFFSET + core::mem::size_of::<RelocationMetadata>() <= STUB_SIZE);
const_assert_eq!(memory_map::FIRMWARE_SOURCE.size, FIRMWARE_BLOB_SIZE);

/// Addresses the relocation stub needs to move a payload and enter it.
/// Lives at [`STUB_META_OFFSET`] inside the staged stub.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, defmt::Format)]
pub struct RelocationMetadata {
    /// Computed load start: destination minus the 16-aligned stub size.
    pub start: u32,
    /// Stack top for the secondary stage.
    pub stack: u32,
    /// First address past the relocated payload.
    pub end: u32,
    /// Payload entry point.
    pub entry: u32,
}

impl RelocationMetadata {
    pub fn compute(destination: u32, payload_size: u32) -> Self {
        Self {
            start: destination - align_up(STUB_SIZE as u32, 16),
            stack: STUB_STACK_ADDRESS,
            end: destination + payload_size,
            entry: destination,
        }
    }

    /// The four addresses are internally consistent.
    pub fn is_ordered(&self) -> bool { self.start <= self.entry && self.entry <= self.end }

    fn write_to(&self, buffer: &mut [u8]) {
        buffer[0..4].copy_from_slice(&self.start.to_le_bytes());
        buffer[4..8].copy_from_slice(&self.stack.to_le_bytes());
        buffer[8..12].copy_from_slice(&self.end.to_le_bytes());
        buffer[12..16].copy_from_slice(&self.entry.to_le_bytes());
    }

    pub fn read_from(buffer: &[u8]) -> Self {
        let word = |index: usize| {
            u32::from_le_bytes([
                buffer[index * 4],
                buffer[index * 4 + 1],
                buffer[index * 4 + 2],
                buffer[index * 4 + 3],
            ])
        };
        Self { start: word(0), stack: word(1), end: word(2), entry: word(3) }
    }
}

/// Checks the embedded stub against its pinned CRC.
pub fn stub_is_intact() -> bool { crc32::checksum_ieee(BOOT_STUB) == BOOT_STUB_CRC }

#[derive(Debug, Copy, Clone, PartialEq, Eq, defmt::Format)]
pub struct PatchRequest {
    /// Address the payload will execute from.
    pub destination: u32,
    pub payload_size: u32,
}

/// Assembles a self-contained relocation stub for `request` in
/// `staging`, returning the metadata written into it.
///
/// When `payload_size` equals [`FIRMWARE_BLOB_SIZE`], the full platform
/// firmware is being handed off: the blob is copied to the 16-aligned
/// offset behind the stub and the DRAM-ready marker is raised through
/// `dram_ready`. For any other size the control word is left untouched.
///
/// The caller must pick a destination that does not overlap the region
/// the loader is currently executing from; that precondition is not
/// checked here. The firmware blob contents are trusted as handed in;
/// only its length is verified against the sentinel layout.
pub fn patch(
    request: PatchRequest,
    staging: &mut [u8],
    firmware_blob: &[u8],
    dram_ready: &mut u32,
) -> Result<RelocationMetadata, Error> {
    if !stub_is_intact() {
        return Err(Error::StubDamaged);
    }
    if staging.len() < STUB_SIZE {
        return Err(Error::RegionOverflow);
    }

    staging[..STUB_SIZE].copy_from_slice(BOOT_STUB);

    let metadata = RelocationMetadata::compute(request.destination, request.payload_size);
    metadata.write_to(&mut staging[STUB_META_OFFSET..STUB_META_OFFSET + 16]);

    if request.payload_size as usize == FIRMWARE_BLOB_SIZE {
        let blob_offset = align_up(STUB_SIZE as u32, 16) as usize;
        if firmware_blob.len() != FIRMWARE_BLOB_SIZE
            || staging.len() < blob_offset + FIRMWARE_BLOB_SIZE
        {
            return Err(Error::RegionOverflow);
        }
        staging[blob_offset..blob_offset + FIRMWARE_BLOB_SIZE].copy_from_slice(firmware_blob);
        *dram_ready = DRAM_READY_MAGIC;
    }

    Ok(metadata)
}
