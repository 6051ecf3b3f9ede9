//! Clock, power and reset sequencing interface.
//!
//! These are the operations the orchestrator needs from the SoC bring-up
//! collaborator. The terminal operations never return; there is no
//! operating system to hand control back to.

pub trait Platform {
    /// Core clocks, power rails, display and console. Runs once,
    /// unconditionally, at the top of the boot.
    fn bring_up(&mut self);
    /// Moves the memory-frequency controller to its high-performance
    /// operating point.
    fn raise_memory_clock(&mut self);
    fn boost_bus_clock(&mut self);
    /// Parks the core until the next event. The idle terminal state
    /// calls this in a loop.
    fn halt(&mut self);

    fn reboot_normal(&mut self) -> !;
    fn reboot_recovery(&mut self) -> !;
    fn power_off(&mut self) -> !;
}
