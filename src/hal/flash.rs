//! Uniform block-level interface over the NAND backends.
//!
//! The physical onboard flash and the emulated flash (backed by files on
//! removable storage) expose the same session shape. That symmetry is
//! what lets the package inspector and the dump dispatch treat the two
//! backends interchangeably.

use core::fmt;

/// Size in bytes of a single device block.
pub const BLOCK_SIZE: usize = 512;

#[derive(Debug, Copy, Clone, PartialEq, Eq, defmt::Format)]
pub enum BusWidth {
    One,
    Four,
    Eight,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, defmt::Format)]
pub enum BusSpeed {
    Standard,
    High,
    Ultra,
}

/// Hardware partitions of an eMMC-style device.
#[derive(Debug, Copy, Clone, PartialEq, Eq, defmt::Format)]
pub enum Partition {
    UserData,
    Boot0,
    Boot1,
}

/// A NAND backend. `init` opens a session; `end` must be safe to call
/// whether or not the session ever became usable.
pub trait BlockDevice {
    type Error: Copy + Clone + fmt::Debug;

    fn init(&mut self, width: BusWidth, speed: BusSpeed) -> Result<(), Self::Error>;
    fn select_partition(&mut self, partition: Partition) -> Result<(), Self::Error>;
    /// Reads whole blocks starting at `lba`. The buffer length defines
    /// the block count.
    fn read_blocks(&mut self, lba: u32, buffer: &mut [u8]) -> nb::Result<(), Self::Error>;
    fn end(&mut self);
}
