//! Flash selector: resolves which backend serves logical NAND.
//!
//! The physical flash and the emulated overlay present the same
//! [`BlockDevice`](crate::hal::flash::BlockDevice) session shape; this
//! module owns the glue that decides between them: the on-card
//! emulated-NAND configuration and the explicit target handed to the
//! key-dump collaborator.

use crate::{
    devices::storage::SdCard,
    error::Error,
    hal::{fs::Filesystem, sdmmc::SdController},
};
use defmt::info;

/// Which backend a dump operation should read.
#[derive(Debug, Copy, Clone, PartialEq, Eq, defmt::Format)]
pub enum NandTarget {
    Physical,
    Emulated,
}

/// The opaque key-derivation collaborator. Dumping may warm-restart the
/// device to run the secure firmware patch; the persisted configuration
/// must therefore be stored before calling this.
pub trait KeyDumper {
    fn dump(&mut self, target: NandTarget) -> Result<(), Error>;
}

/// On-card configuration file consumed by the selector.
pub const EMULATED_CONFIG_PATH: &str = "emunand/emunand.cfg";

/// Parsed emulated-NAND parameters. The file format belongs to the tool
/// that writes it; only these keys are consumed here.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, defmt::Format)]
pub struct EmulatedConfig {
    pub enabled: bool,
    /// First sector of the raw emulated image on the card.
    pub sector: u32,
}

/// Parses the configuration file contents. `None` means the file does
/// not describe an emulated NAND at all.
pub fn parse_emulated_cfg(raw: &[u8]) -> Option<EmulatedConfig> {
    let text = core::str::from_utf8(raw).ok()?;
    let mut config = EmulatedConfig::default();
    let mut described = false;
    for line in text.lines() {
        let mut halves = line.trim().splitn(2, '=');
        match (halves.next(), halves.next()) {
            (Some("enabled"), Some(value)) => {
                config.enabled = value.trim() == "1";
                described = true;
            }
            (Some("sector"), Some(value)) => config.sector = parse_u32(value.trim())?,
            // Remaining keys belong to the tool that writes the file.
            _ => (),
        }
    }
    described.then(|| config)
}

fn parse_u32(text: &str) -> Option<u32> {
    match text.strip_prefix("0x") {
        Some(hex) => u32::from_str_radix(hex, 16).ok(),
        None => text.parse().ok(),
    }
}

/// Loads the emulated-NAND configuration from the card. Absence,
/// unreadability or a malformed file all resolve to `None`, which the
/// orchestrator treats as "emulated NAND disabled for this session".
pub fn load_emulated_cfg<C: SdController, F: Filesystem>(
    sd: &mut SdCard<C, F>,
) -> Option<EmulatedConfig> {
    let raw = sd.read_file(EMULATED_CONFIG_PATH).ok()?;
    let config = parse_emulated_cfg(&raw);
    if let Some(config) = config {
        info!("emulated NAND configured at sector {=u32:x}", config.sector);
    }
    config
}

#[cfg(not(target_arch = "arm"))]
#[doc(hidden)]
pub mod doubles {
    use super::*;

    #[derive(Debug, Default)]
    pub struct FakeKeyDumper {
        pub dumps: Vec<NandTarget>,
        pub error: Option<Error>,
    }

    impl KeyDumper for FakeKeyDumper {
        fn dump(&mut self, target: NandTarget) -> Result<(), Error> {
            self.dumps.push(target);
            match self.error {
                Some(error) => Err(error),
                None => Ok(()),
            }
        }
    }
}
