//! Removable-storage controller interface.

use super::flash::{BusSpeed, BusWidth};
use core::fmt;

/// Controller for the removable card slot. Failure to power up means no
/// usable medium is present; it never faults the caller.
pub trait SdController {
    type Error: Copy + Clone + fmt::Debug;

    fn power_up(&mut self, width: BusWidth, speed: BusSpeed) -> Result<(), Self::Error>;
    fn power_down(&mut self);
}
