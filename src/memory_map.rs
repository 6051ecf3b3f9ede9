//! Fixed physical layout of the platform.
//!
//! Every region here is a platform constant chosen at design time; the
//! relocation machinery and the persisted configuration record take
//! region handles from this module rather than doing raw pointer
//! arithmetic of their own. The static assertions pin the one property
//! nothing downstream may break: no staging or payload region overlaps
//! the running loader image.

use crate::utilities::memory::MemoryRegion;
use static_assertions::const_assert;

/// Region occupied by the running loader image itself.
pub const LOADER: MemoryRegion = MemoryRegion::new(0x4001_0000, kb!(64));

/// Top of the loader's own stack.
pub const STACK_TOP: u32 = 0x9001_0000;

/// Heap backing the loader's allocator.
pub const HEAP: MemoryRegion = MemoryRegion::new(0x9002_0000, mb!(1));

/// Staging region where the relocation stub and the optional firmware
/// blob are assembled before the final copy-and-jump.
pub const STAGING: MemoryRegion = MemoryRegion::new(0x4000_8000, kb!(32));

/// DRAM region reserved for relocated payloads. Guaranteed unused by any
/// boot-time payload.
pub const PAYLOAD: MemoryRegion = MemoryRegion::new(0xC000_0000, mb!(16));

/// Well-known source of the full platform firmware blob.
pub const FIRMWARE_SOURCE: MemoryRegion = MemoryRegion::new(0xCFF0_0000, 0x7000);

/// Hardware-adjacent control word signalling that the firmware blob was
/// handed over in memory rather than on removable storage.
pub const DRAM_READY_ADDRESS: u32 = 0x4003_E000;

/// Warm-restart-persisted region holding the boot configuration record.
pub const CONFIG: MemoryRegion = MemoryRegion::new(0x4003_F800, 16);

const_assert!(!STAGING.overlaps(&LOADER));
const_assert!(!PAYLOAD.overlaps(&LOADER));
const_assert!(!CONFIG.overlaps(&LOADER));
const_assert!(!HEAP.contains(STACK_TOP - 1));
