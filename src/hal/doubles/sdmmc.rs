use super::error::FakeError;
use crate::hal::flash::{BusSpeed, BusWidth};
use crate::hal::sdmmc::SdController;

#[derive(Debug, Default)]
pub struct FakeSdController {
    pub fail: bool,
    pub powered: bool,
    pub power_ups: u32,
    pub power_downs: u32,
}

impl SdController for FakeSdController {
    type Error = FakeError;

    fn power_up(&mut self, _width: BusWidth, _speed: BusSpeed) -> Result<(), Self::Error> {
        if self.fail {
            return Err(FakeError);
        }
        self.powered = true;
        self.power_ups += 1;
        Ok(())
    }

    fn power_down(&mut self) {
        self.powered = false;
        self.power_downs += 1;
    }
}
