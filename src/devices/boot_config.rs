//! Boot configuration state.
//!
//! [`PersistedBootConfig`] lives in a reserved memory region that a warm
//! restart does not clear; a preceding boot stage writes it before
//! handing control over, and this stage reads it exactly once at
//! startup. The record crosses the restart as plain little-endian words
//! guarded by start and end magic values, so a clobbered region degrades
//! to the default configuration instead of garbage flags.

use crate::devices::nand::EmulatedConfig;
use static_assertions::const_assert_eq;

/// Size in bytes of the serialized record.
pub const CONFIG_SIZE: usize = 16;

/// Bit pattern that must open a valid persisted record.
pub const CONFIG_MAGIC_START: u32 = 0x4643_4B4C; // "LKCF"
/// Bit pattern that must close a valid persisted record.
pub const CONFIG_MAGIC_END: u32 = 0x4B43_4F4C; // "LOCK"

const_assert_eq!(CONFIG_SIZE, 4 * core::mem::size_of::<u32>());
const_assert_eq!(crate::memory_map::CONFIG.size, CONFIG_SIZE);

/// Boot-entry flags written by the preceding stage.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, defmt::Format)]
pub struct BootFlags(u32);

impl BootFlags {
    /// This restart was staged specifically to run the secure firmware
    /// patch and then dump keys.
    pub const SECURE_PATCH_RAN: BootFlags = BootFlags(1 << 2);

    pub const fn from_bits(bits: u32) -> Self { Self(bits) }
    pub const fn bits(self) -> u32 { self.0 }
    pub const fn contains(self, flag: BootFlags) -> bool { self.0 & flag.0 == flag.0 }
    pub fn insert(&mut self, flag: BootFlags) { self.0 |= flag.0; }
    pub fn remove(&mut self, flag: BootFlags) { self.0 &= !flag.0; }
}

/// Extra configuration flags, mutated by menu actions before a restart.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, defmt::Format)]
pub struct ExtraFlags(u32);

impl ExtraFlags {
    /// Target the emulated NAND rather than the physical one when
    /// dumping.
    pub const DUMP_EMULATED: ExtraFlags = ExtraFlags(1 << 0);

    pub const fn from_bits(bits: u32) -> Self { Self(bits) }
    pub const fn bits(self) -> u32 { self.0 }
    pub const fn contains(self, flag: ExtraFlags) -> bool { self.0 & flag.0 == flag.0 }
    pub fn insert(&mut self, flag: ExtraFlags) { self.0 |= flag.0; }
    pub fn remove(&mut self, flag: ExtraFlags) { self.0 &= !flag.0; }
}

/// Configuration record passed across warm restarts.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, defmt::Format)]
pub struct PersistedBootConfig {
    pub boot_cfg: BootFlags,
    pub extra_cfg: ExtraFlags,
}

impl PersistedBootConfig {
    /// Deserializes the record from the reserved region. An invalid
    /// magic pair yields the default (all-clear) configuration.
    pub fn load(region: &[u8; CONFIG_SIZE]) -> Self {
        let word = |index: usize| {
            u32::from_le_bytes([
                region[index * 4],
                region[index * 4 + 1],
                region[index * 4 + 2],
                region[index * 4 + 3],
            ])
        };
        if word(0) != CONFIG_MAGIC_START || word(3) != CONFIG_MAGIC_END {
            return Self::default();
        }
        Self { boot_cfg: BootFlags::from_bits(word(1)), extra_cfg: ExtraFlags::from_bits(word(2)) }
    }

    /// Serializes the record back into the reserved region.
    pub fn store(&self, region: &mut [u8; CONFIG_SIZE]) {
        region[0..4].copy_from_slice(&CONFIG_MAGIC_START.to_le_bytes());
        region[4..8].copy_from_slice(&self.boot_cfg.bits().to_le_bytes());
        region[8..12].copy_from_slice(&self.extra_cfg.bits().to_le_bytes());
        region[12..16].copy_from_slice(&CONFIG_MAGIC_END.to_le_bytes());
    }
}

/// Session-wide derived state, rebuilt on every boot and never persisted
/// back automatically.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct RuntimeConfig {
    /// Emulated-NAND access is administratively disabled for this
    /// session.
    pub emunand_disabled: bool,
    /// Parsed on-card emulated-NAND configuration, when one exists.
    pub emunand: Option<EmulatedConfig>,
}
