//! Error type for the recovery bootloader core as a whole.
//!
//! There is no supervising operating system to unwind to, so every
//! fallible operation returns one of these and the caller degrades
//! rather than faults. An unrecognised firmware-package signature is
//! deliberately *not* represented here; it is a valid classification
//! result, not a failure.

use crate::hal::display::TextDisplay;
use ufmt::uwriteln;

#[derive(Debug, Copy, Clone, PartialEq, Eq, defmt::Format)]
pub enum Error {
    /// No removable medium detected by the storage controller.
    DeviceAbsent,
    /// Medium present, but no filesystem could be bound. Carries the
    /// driver's numeric code for on-screen diagnostics.
    MountFailure(u32),
    FileNotFound,
    /// A write could not be created or completed. Carries the driver's
    /// numeric code; a short write reports code 0.
    WriteFailure(u32),
    /// A NAND backend session could not be brought up or produced no
    /// classifiable data.
    BackendInitFailure,
    /// The embedded relocation stub failed its integrity check.
    StubDamaged,
    /// A staging region or blob was too small for the requested layout.
    RegionOverflow,
    /// Error caused by a low level collaborator driver.
    DriverError(&'static str),
}

impl Error {
    /// Reports the error on an abstract text display.
    pub fn report<D: TextDisplay>(&self, display: &mut D) {
        match self {
            Error::DeviceAbsent => uwriteln!(
                display,
                "Failed to init removable card.\r\nMake sure that it is inserted and seated!"
            ),
            Error::MountFailure(code) => uwriteln!(
                display,
                "Failed to mount card (filesystem error {}).\r\nMake sure that a FAT partition exists.",
                *code
            ),
            Error::FileNotFound => uwriteln!(display, "File not found on card."),
            Error::WriteFailure(code) => {
                uwriteln!(display, "Error ({}) creating file on card.", *code)
            }
            Error::BackendInitFailure => {
                uwriteln!(display, "Failed to init NAND backend.")
            }
            Error::StubDamaged => {
                uwriteln!(display, "Relocation stub is damaged. Refusing to patch.")
            }
            Error::RegionOverflow => {
                uwriteln!(display, "Payload does not fit the staging region.")
            }
            Error::DriverError(text) => uwriteln!(display, "[Driver Error] -> {}", *text),
        }
        .ok()
        .unwrap();
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::hal::doubles::display::FakeDisplay;

    #[test]
    fn mount_failure_report_carries_the_driver_code() {
        // Given
        let mut display = FakeDisplay::default();

        // When
        Error::MountFailure(13).report(&mut display);

        // Then
        assert!(display.text.contains("filesystem error 13"));
    }

    #[test]
    fn write_failure_report_carries_the_driver_code() {
        let mut display = FakeDisplay::default();
        Error::WriteFailure(4).report(&mut display);
        assert!(display.text.contains("(4)"));
    }
}
