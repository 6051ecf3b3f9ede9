//! Test doubles for the hal interfaces. Host-only.

pub mod display;
pub mod error;
pub mod flash;
pub mod fs;
pub mod platform;
pub mod sdmmc;
