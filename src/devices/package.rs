//! Firmware-package inspection.
//!
//! The first-stage firmware package sits at a fixed offset of the boot
//! partition and opens with a build timestamp that identifies its
//! key generation. Classification is a pure function over one device
//! block; the session against the backend is transient and torn down on
//! every path.

use crate::{
    error::Error,
    hal::flash::{BlockDevice, BusSpeed, BusWidth, Partition, BLOCK_SIZE},
};
use alloc::{format, string::String};
use defmt::info;
use nb::block;

/// Byte offset of the firmware package inside the boot partition.
pub const PACKAGE_OFFSET: u32 = 0x10_0000;
/// Device block holding the package header.
pub const PACKAGE_BLOCK: u32 = PACKAGE_OFFSET / BLOCK_SIZE as u32;

/// Offset and length of the build timestamp inside the package header.
const TIMESTAMP_OFFSET: usize = 0x10;
const TIMESTAMP_LEN: usize = 14;

/// A known firmware-package signature and the key generation it ships.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct PackageId {
    pub timestamp: &'static [u8; TIMESTAMP_LEN],
    pub generation: u8,
}

/// Every firmware package generation seen in the wild, oldest first.
pub const KNOWN_PACKAGES: &[PackageId] = &[
    PackageId { timestamp: b"20161121183008", generation: 0 },
    PackageId { timestamp: b"20170210155124", generation: 1 },
    PackageId { timestamp: b"20170519101410", generation: 2 },
    PackageId { timestamp: b"20170710161758", generation: 3 },
    PackageId { timestamp: b"20180220163747", generation: 4 },
    PackageId { timestamp: b"20180802162753", generation: 5 },
    PackageId { timestamp: b"20181107105733", generation: 6 },
    PackageId { timestamp: b"20181218175730", generation: 7 },
    PackageId { timestamp: b"20190314172056", generation: 8 },
    PackageId { timestamp: b"20190531152432", generation: 9 },
    PackageId { timestamp: b"20190809135709", generation: 10 },
];

/// Classifies a package header block. `None` is the valid "unrecognised"
/// result, not an error.
pub fn identify(block: &[u8]) -> Option<&'static PackageId> {
    let stamp = block.get(TIMESTAMP_OFFSET..TIMESTAMP_OFFSET + TIMESTAMP_LEN)?;
    KNOWN_PACKAGES.iter().find(|id| id.timestamp[..] == *stamp)
}

/// Opens a transient read-only session against `nand`, reads the package
/// header block and classifies it. The session is ended on every path.
///
/// `Ok(None)` means the block carried no known signature; only a session
/// that produced no classifiable block at all reports
/// [`Error::BackendInitFailure`].
pub fn generation_label<B: BlockDevice>(nand: &mut B) -> Result<Option<u8>, Error> {
    nand.init(BusWidth::Eight, BusSpeed::High).map_err(|_| Error::BackendInitFailure)?;

    let mut header = [0u8; BLOCK_SIZE];
    let outcome = match nand.select_partition(Partition::Boot0) {
        Ok(()) => match block!(nand.read_blocks(PACKAGE_BLOCK, &mut header)) {
            Ok(()) => Ok(identify(&header).map(|id| id.generation)),
            Err(_) => Err(Error::BackendInitFailure),
        },
        Err(_) => Err(Error::BackendInitFailure),
    };
    nand.end();

    if let Ok(Some(generation)) = outcome {
        info!("firmware package generation {=u8}", generation);
    }
    outcome
}

/// Character offset of the generation label inside a menu caption, kept
/// fixed so the menu columns stay aligned.
pub const LABEL_OFFSET: usize = 36;
const LABEL_WIDTH: usize = 3;

/// Splices a right-aligned generation number into a caption at the fixed
/// label offset. Captions too short for the label are left untouched.
pub fn embed_generation(caption: &mut String, generation: u8) {
    let end = LABEL_OFFSET + LABEL_WIDTH;
    if caption.len() < end || !caption.is_char_boundary(LABEL_OFFSET) {
        return;
    }
    caption.replace_range(LABEL_OFFSET..end, &format!("{:>width$}", generation, width = LABEL_WIDTH));
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::hal::doubles::flash::FakeBlockDevice;

    fn device_with_package(timestamp: &[u8; TIMESTAMP_LEN]) -> FakeBlockDevice {
        let mut device = FakeBlockDevice::default();
        device.put(PACKAGE_OFFSET as usize + TIMESTAMP_OFFSET, timestamp);
        device
    }

    #[test]
    fn known_headers_classify_to_their_generation() {
        // Given
        let mut block = [0u8; BLOCK_SIZE];
        block[TIMESTAMP_OFFSET..TIMESTAMP_OFFSET + TIMESTAMP_LEN]
            .copy_from_slice(b"20190314172056");

        // When
        let id = identify(&block).unwrap();

        // Then
        assert_eq!(8, id.generation);
    }

    #[test]
    fn unknown_headers_classify_to_none() {
        let mut block = [0u8; BLOCK_SIZE];
        block[TIMESTAMP_OFFSET..TIMESTAMP_OFFSET + TIMESTAMP_LEN]
            .copy_from_slice(b"20990101000000");
        assert_eq!(None, identify(&block));
        assert_eq!(None, identify(&[]));
    }

    #[test]
    fn inspection_reads_the_boot_partition_and_ends_the_session() {
        // Given
        let mut device = device_with_package(b"20180802162753");

        // When
        let generation = generation_label(&mut device).unwrap();

        // Then
        assert_eq!(Some(5), generation);
        assert_eq!(Some(Partition::Boot0), device.partition);
        assert_eq!(1, device.sessions_ended);
        assert!(!device.initialised);
    }

    #[test]
    fn an_unrecognised_package_is_a_valid_absent_classification() {
        // Given a blank device
        let mut device = FakeBlockDevice::default();

        // When
        let generation = generation_label(&mut device).unwrap();

        // Then
        assert_eq!(None, generation);
        assert_eq!(1, device.sessions_ended);
    }

    #[test]
    fn a_backend_that_fails_to_initialise_cannot_determine_a_label() {
        // Given
        let mut device = FakeBlockDevice { fail_init: true, ..Default::default() };

        // When
        let result = generation_label(&mut device);

        // Then
        assert_eq!(Err(Error::BackendInitFailure), result);
    }

    #[test]
    fn a_read_failure_still_ends_the_session() {
        // Given
        let mut device = FakeBlockDevice { fail_read: true, ..Default::default() };

        // When
        let result = generation_label(&mut device);

        // Then
        assert_eq!(Err(Error::BackendInitFailure), result);
        assert_eq!(1, device.sessions_ended);
    }

    #[test]
    fn labels_splice_in_place_and_preserve_the_tail() {
        // Given
        let mut caption = "Dump from SysNAND | Key generation: unk".to_string();

        // When
        embed_generation(&mut caption, 8);

        // Then
        assert_eq!("Dump from SysNAND | Key generation:   8", caption);

        // And a two-digit generation stays right-aligned
        embed_generation(&mut caption, 10);
        assert_eq!("Dump from SysNAND | Key generation:  10", caption);
    }

    #[test]
    fn captions_too_short_for_the_label_are_left_untouched() {
        let mut caption = "Reboot (Normal)".to_string();
        embed_generation(&mut caption, 8);
        assert_eq!("Reboot (Normal)", caption);
    }
}
