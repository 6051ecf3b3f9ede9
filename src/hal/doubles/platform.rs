use crate::hal::platform::Platform;

/// Records the bring-up sequence. Terminal operations panic with a
/// recognisable message, since there is nothing to terminate on the
/// host.
#[derive(Debug, Default)]
pub struct FakePlatform {
    pub brought_up: bool,
    pub memory_raised: bool,
    pub bus_boosted: bool,
    pub halts: u32,
}

impl Platform for FakePlatform {
    fn bring_up(&mut self) { self.brought_up = true; }
    fn raise_memory_clock(&mut self) { self.memory_raised = true; }
    fn boost_bus_clock(&mut self) { self.bus_boosted = true; }
    fn halt(&mut self) { self.halts += 1; }

    fn reboot_normal(&mut self) -> ! { panic!("reboot (normal) requested") }
    fn reboot_recovery(&mut self) -> ! { panic!("reboot (recovery) requested") }
    fn power_off(&mut self) -> ! { panic!("power off requested") }
}
