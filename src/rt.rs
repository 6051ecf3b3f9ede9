//! ARM runtime support: heap, idle and the logging/panic transports.
//!
//! The downstream firmware crate owns the entry point and vector table;
//! it is expected to call [`init_heap`] once before constructing the
//! orchestrator.

use alloc_cortex_m::CortexMHeap;

use defmt_rtt as _;
use panic_abort as _;

#[global_allocator]
static ALLOCATOR: CortexMHeap = CortexMHeap::empty();

/// Establishes the heap over the reserved region.
///
/// # Safety
///
/// Must be called exactly once, before any allocation, and the heap
/// region must not be in use by anything else.
pub unsafe fn init_heap() {
    ALLOCATOR.init(crate::memory_map::HEAP.start as usize, crate::memory_map::HEAP.size);
}

/// Parks the core until the next event.
pub fn wait_for_event() { cortex_m::asm::wfe(); }
