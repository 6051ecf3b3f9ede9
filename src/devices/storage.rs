//! Storage mount layer.
//!
//! Unifies the removable-card controller and the filesystem driver
//! behind a single mount/read/write surface. The medium is physically
//! removable and possibly absent, and there is no supervising operating
//! system: every operation here degrades to an explicit failure value
//! rather than a fault.

use crate::{
    error::Error,
    hal::{
        flash::{BusSpeed, BusWidth},
        fs::{FileHandle, Filesystem, Mode},
        sdmmc::SdController,
    },
};
use alloc::vec;
use alloc::vec::Vec;
use defmt::info;

pub struct SdCard<C: SdController, F: Filesystem> {
    controller: C,
    filesystem: F,
    mounted: bool,
}

impl<C: SdController, F: Filesystem> SdCard<C, F> {
    pub fn new(controller: C, filesystem: F) -> Self {
        Self { controller, filesystem, mounted: false }
    }

    /// Powers the controller and binds the filesystem namespace.
    /// Idempotent: an already mounted card short-circuits to success. A
    /// filesystem-bind failure leaves the controller powered (nothing
    /// successfully initialised is torn down) and the mount flag unset.
    pub fn mount(&mut self) -> Result<(), Error> {
        if self.mounted {
            return Ok(());
        }
        self.controller
            .power_up(BusWidth::Four, BusSpeed::Ultra)
            .map_err(|_| Error::DeviceAbsent)?;
        self.filesystem.mount().map_err(|error| Error::MountFailure(error.into()))?;
        self.mounted = true;
        info!("removable card mounted");
        Ok(())
    }

    /// Releases the namespace and powers the controller down. Safe to
    /// call when not mounted, repeatedly, and on a partially-initialised
    /// state.
    pub fn unmount(&mut self) {
        if !self.mounted {
            return;
        }
        self.filesystem.unmount();
        self.controller.power_down();
        self.mounted = false;
    }

    pub fn is_mounted(&self) -> bool { self.mounted }

    /// Reads a whole file into an exactly-sized buffer. Any failure at
    /// open or during the read releases the buffer and reports
    /// not-found.
    pub fn read_file(&mut self, path: &str) -> Result<Vec<u8>, Error> {
        if !self.mounted {
            return Err(Error::FileNotFound);
        }
        let mut file = self.filesystem.open(path, Mode::Read).map_err(|_| Error::FileNotFound)?;
        let mut buffer = vec![0u8; file.size()];
        match file.read(&mut buffer) {
            Ok(count) if count == buffer.len() => Ok(buffer),
            _ => Err(Error::FileNotFound),
        }
    }

    /// Creates or truncates `path` and writes the full buffer. The
    /// driver's numeric code is surfaced for diagnostic display.
    pub fn write_file(&mut self, path: &str, bytes: &[u8]) -> Result<(), Error> {
        if !self.mounted {
            return Err(Error::DeviceAbsent);
        }
        let mut file = self
            .filesystem
            .open(path, Mode::CreateAlways)
            .map_err(|error| Error::WriteFailure(error.into()))?;
        match file.write(bytes) {
            Ok(count) if count == bytes.len() => Ok(()),
            Ok(_) => Err(Error::WriteFailure(0)),
            Err(error) => Err(Error::WriteFailure(error.into())),
        }
    }

    pub fn filesystem(&self) -> &F { &self.filesystem }

    pub fn controller(&self) -> &C { &self.controller }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::hal::doubles::{
        fs::{FakeFilesystem, CODE_DISK_ERROR, CODE_NO_FILESYSTEM},
        sdmmc::FakeSdController,
    };

    fn card_with(
        controller: FakeSdController,
        filesystem: FakeFilesystem,
    ) -> SdCard<FakeSdController, FakeFilesystem> {
        SdCard::new(controller, filesystem)
    }

    #[test]
    fn mounting_twice_is_equivalent_to_mounting_once() {
        // Given
        let mut card = card_with(FakeSdController::default(), FakeFilesystem::default());

        // When
        card.mount().unwrap();
        card.mount().unwrap();

        // Then
        assert!(card.is_mounted());
        assert_eq!(1, card.controller().power_ups);
    }

    #[test]
    fn unmounting_is_idempotent_and_safe_before_any_mount() {
        // Given
        let mut card = card_with(FakeSdController::default(), FakeFilesystem::default());

        // When unmounting a never-mounted card
        card.unmount();

        // Then nothing was powered down
        assert_eq!(0, card.controller().power_downs);

        // When a full cycle runs with a double unmount
        card.mount().unwrap();
        card.unmount();
        card.unmount();

        // Then the controller was released exactly once
        assert_eq!(1, card.controller().power_downs);
        assert!(!card.is_mounted());
    }

    #[test]
    fn absent_medium_reports_device_absent_without_side_effects() {
        // Given
        let controller = FakeSdController { fail: true, ..Default::default() };
        let mut card = card_with(controller, FakeFilesystem::default());

        // When
        let result = card.mount();

        // Then
        assert_eq!(Err(Error::DeviceAbsent), result);
        assert!(!card.is_mounted());
        assert!(!card.filesystem().mounted);
    }

    #[test]
    fn filesystem_bind_failure_surfaces_the_driver_code_and_keeps_controller_up() {
        // Given
        let filesystem =
            FakeFilesystem { mount_error: Some(CODE_NO_FILESYSTEM), ..Default::default() };
        let mut card = card_with(FakeSdController::default(), filesystem);

        // When
        let result = card.mount();

        // Then
        assert_eq!(Err(Error::MountFailure(CODE_NO_FILESYSTEM)), result);
        assert!(!card.is_mounted());
        // Nothing successfully initialised is torn down.
        assert!(card.controller().powered);
    }

    #[test]
    fn reading_a_missing_file_reports_not_found() {
        // Given
        let mut card = card_with(FakeSdController::default(), FakeFilesystem::default());
        card.mount().unwrap();

        // When
        let result = card.read_file("no/such/file.bin");

        // Then
        assert_eq!(Err(Error::FileNotFound), result);
    }

    #[test]
    fn reading_a_file_yields_an_exactly_sized_buffer() {
        // Given
        let filesystem = FakeFilesystem::with_file("keys/prod.keys", b"master_key_00 = f00d");
        let mut card = card_with(FakeSdController::default(), filesystem);
        card.mount().unwrap();

        // When
        let contents = card.read_file("keys/prod.keys").unwrap();

        // Then
        assert_eq!(b"master_key_00 = f00d".to_vec(), contents);
    }

    #[test]
    fn a_failed_read_reports_not_found_rather_than_partial_data() {
        // Given
        let mut filesystem = FakeFilesystem::with_file("keys/prod.keys", b"partial");
        filesystem.read_fails = true;
        let mut card = card_with(FakeSdController::default(), filesystem);
        card.mount().unwrap();

        // When
        let result = card.read_file("keys/prod.keys");

        // Then
        assert_eq!(Err(Error::FileNotFound), result);
    }

    #[test]
    fn writes_land_in_the_filesystem() {
        // Given
        let mut card = card_with(FakeSdController::default(), FakeFilesystem::default());
        card.mount().unwrap();

        // When
        card.write_file("dump/keys.bin", b"\xCA\xFE").unwrap();

        // Then
        assert_eq!(Some(b"\xCA\xFE".to_vec()), card.filesystem().contents_of("dump/keys.bin"));
    }

    #[test]
    fn write_failures_surface_the_driver_code() {
        // Given
        let filesystem = FakeFilesystem { write_error: Some(CODE_DISK_ERROR), ..Default::default() };
        let mut card = card_with(FakeSdController::default(), filesystem);
        card.mount().unwrap();

        // When
        let result = card.write_file("dump/keys.bin", b"\xCA\xFE");

        // Then
        assert_eq!(Err(Error::WriteFailure(CODE_DISK_ERROR)), result);
    }

    #[test]
    fn file_operations_recheck_the_mount_state() {
        // Given an unmounted card
        let mut card = card_with(FakeSdController::default(), FakeFilesystem::default());

        // Then no filesystem call goes through
        assert_eq!(Err(Error::FileNotFound), card.read_file("anything"));
        assert_eq!(Err(Error::DeviceAbsent), card.write_file("anything", b""));
    }
}
