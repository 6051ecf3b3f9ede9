//! # Latchkey
//!
//! This crate contains all portable functionality for the
//! key-recovery bootloader project in library form. Hardware
//! collaborators are consumed through the `hal` traits; the
//! domain logic in `devices` is generic over them and owns the
//! orchestration, data flow and relocation machinery.
#![cfg_attr(target_arch = "arm", no_std)]

extern crate alloc;
extern crate static_assertions;

#[macro_use]
pub mod utilities {
    pub mod macros;
    pub mod memory;
}

pub mod hal;
pub mod devices;
pub mod error;
pub mod memory_map;

#[cfg(target_arch = "arm")]
pub mod rt;
