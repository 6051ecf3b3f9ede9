//! Top-level boot orchestration.
//!
//! Owns the whole flow from hardware bring-up to the interactive menu.
//! Every subsystem failure degrades to an on-screen message or a
//! grayed-out menu entry; the dispatch loop itself never exits because
//! of one.

use crate::{
    devices::{
        boot_config::{BootFlags, ExtraFlags, PersistedBootConfig, RuntimeConfig, CONFIG_SIZE},
        menu::{Menu, MenuDriver, MenuItem},
        nand::{self, KeyDumper, NandTarget},
        package,
        storage::SdCard,
    },
    error::Error,
    hal::{
        display::{Color, TextDisplay},
        flash::BlockDevice,
        fs::Filesystem,
        platform::Platform,
        sdmmc::SdController,
    },
};
use defmt::{info, warn};

/// Menu actions, dispatched through a match rather than stored function
/// pointers.
#[derive(Debug, Copy, Clone, PartialEq, Eq, defmt::Format)]
pub enum Action {
    DumpSysnand,
    DumpEmunand,
    RebootNormal,
    RebootRecovery,
    PowerOff,
}

/// Requests that end this process. All of them are final; the platform
/// never returns control here.
#[derive(Debug, Copy, Clone, PartialEq, Eq, defmt::Format)]
pub enum Terminal {
    RebootNormal,
    RebootRecovery,
    PowerOff,
}

const SYSNAND_ITEM: usize = 0;
const EMUNAND_ITEM: usize = 1;

pub struct Orchestrator<'a, C, F, P, E, K, U, H>
where
    C: SdController,
    F: Filesystem,
    P: BlockDevice,
    E: BlockDevice,
    K: KeyDumper,
    U: MenuDriver,
    H: Platform,
{
    sd: SdCard<C, F>,
    sysnand: P,
    emunand: E,
    keys: K,
    ui: U,
    platform: H,
    config_region: &'a mut [u8; CONFIG_SIZE],
    persisted: PersistedBootConfig,
    runtime: RuntimeConfig,
    menu: Menu<Action>,
}

impl<'a, C, F, P, E, K, U, H> Orchestrator<'a, C, F, P, E, K, U, H>
where
    C: SdController,
    F: Filesystem,
    P: BlockDevice,
    E: BlockDevice,
    K: KeyDumper,
    U: MenuDriver,
    H: Platform,
{
    /// Reads the persisted record exactly once; it is only written back
    /// immediately before an operation that can restart or terminate
    /// the process.
    pub fn new(
        sd: SdCard<C, F>,
        sysnand: P,
        emunand: E,
        keys: K,
        ui: U,
        platform: H,
        config_region: &'a mut [u8; CONFIG_SIZE],
    ) -> Self {
        let persisted = PersistedBootConfig::load(config_region);
        Self {
            sd,
            sysnand,
            emunand,
            keys,
            ui,
            platform,
            config_region,
            persisted,
            runtime: RuntimeConfig::default(),
            menu: Self::top_menu(),
        }
    }

    fn top_menu() -> Menu<Action> {
        let mut menu = Menu::new();
        menu.push(MenuItem::action(
            "Dump from SysNAND | Key generation: unk",
            Color::Red,
            Action::DumpSysnand,
        ));
        menu.push(MenuItem::action(
            "Dump from EmuNAND | Key generation: unk",
            Color::Orange,
            Action::DumpEmunand,
        ));
        menu.push(MenuItem::caption("---------------", Color::Yellow));
        menu.push(MenuItem::action("Reboot (Normal)", Color::Green, Action::RebootNormal));
        menu.push(MenuItem::action("Reboot (RCM)", Color::Blue, Action::RebootRecovery));
        menu.push(MenuItem::action("Power off", Color::Violet, Action::PowerOff));
        menu
    }

    /// Main orchestration routine.
    ///
    /// Brings the hardware to its operating point, mounts storage (boot
    /// proceeds whether or not that works), resolves the session
    /// configuration (which may dump keys immediately on a staged
    /// restart) and then serves the menu until a terminal action. If
    /// the menu driver itself gives up, the core is parked: there is
    /// nowhere else to go without a supervising operating system.
    pub fn run(mut self) -> ! {
        self.platform.bring_up();
        self.platform.raise_memory_clock();
        self.platform.boost_bus_clock();

        self.ui.clear();
        self.ui.set_color(Color::White);
        cprintln!(self.ui, "latchkey | NAND key recovery");

        self.mount_storage();
        self.resolve_config();
        self.prepare_menu();

        match self.menu_loop() {
            Some(terminal) => self.finish(terminal),
            None => loop {
                self.platform.halt();
            },
        }
    }

    /// Mounts removable storage, reporting failure on screen. Later
    /// operations tolerate an absent card individually.
    pub fn mount_storage(&mut self) {
        if let Err(error) = self.sd.mount() {
            warn!("removable storage unavailable: {}", error);
            error.report(&mut self.ui);
        }
    }

    /// Builds the session configuration from the persisted record and
    /// the on-card configuration file. A restart staged by the secure
    /// firmware patch dumps keys right here, before any menu exists.
    pub fn resolve_config(&mut self) {
        self.runtime = RuntimeConfig::default();
        self.runtime.emunand = nand::load_emulated_cfg(&mut self.sd);
        self.runtime.emunand_disabled =
            !matches!(self.runtime.emunand, Some(config) if config.enabled);

        if self.persisted.boot_cfg.contains(BootFlags::SECURE_PATCH_RAN) {
            let dump_emulated = self.persisted.extra_cfg.contains(ExtraFlags::DUMP_EMULATED);
            if !dump_emulated {
                self.runtime.emunand_disabled = true;
            }
            info!("staged restart: dumping before the menu");
            let target = if dump_emulated { NandTarget::Emulated } else { NandTarget::Physical };
            self.run_key_dump(target);
        }
    }

    /// Grays out the emulated-NAND entry when the session disables it,
    /// and fills in the generation labels the inspector can determine.
    pub fn prepare_menu(&mut self) {
        if self.runtime.emunand_disabled {
            self.menu.disable(EMUNAND_ITEM);
        }

        match package::generation_label(&mut self.sysnand) {
            Ok(Some(generation)) => {
                if let Some(caption) = self.menu.caption_mut(SYSNAND_ITEM) {
                    package::embed_generation(caption, generation);
                }
            }
            Ok(None) => info!("unrecognised physical firmware package"),
            Err(error) => warn!("physical NAND inspection failed: {}", error),
        }

        if !self.runtime.emunand_disabled {
            match package::generation_label(&mut self.emunand) {
                Ok(Some(generation)) => {
                    if let Some(caption) = self.menu.caption_mut(EMUNAND_ITEM) {
                        package::embed_generation(caption, generation);
                    }
                }
                Ok(None) => info!("unrecognised emulated firmware package"),
                Err(error) => warn!("emulated NAND inspection failed: {}", error),
            }
        }
    }

    /// Serves the menu until a terminal action is selected, or `None`
    /// if the driver exits abnormally.
    pub fn menu_loop(&mut self) -> Option<Terminal> {
        loop {
            match self.ui.present(&self.menu) {
                Some(action) => {
                    if let Some(terminal) = self.dispatch(action) {
                        return Some(terminal);
                    }
                }
                None => return None,
            }
        }
    }

    /// Runs one menu action synchronously. Dump handlers return to the
    /// menu; the rest request termination.
    pub fn dispatch(&mut self, action: Action) -> Option<Terminal> {
        match action {
            Action::DumpSysnand => {
                self.dump_sysnand();
                None
            }
            Action::DumpEmunand => {
                self.dump_emunand();
                None
            }
            Action::RebootNormal => Some(Terminal::RebootNormal),
            Action::RebootRecovery => Some(Terminal::RebootRecovery),
            Action::PowerOff => Some(Terminal::PowerOff),
        }
    }

    fn dump_sysnand(&mut self) {
        self.runtime.emunand_disabled = true;
        self.persisted.extra_cfg.remove(ExtraFlags::DUMP_EMULATED);
        self.persist();
        self.run_key_dump(NandTarget::Physical);
    }

    fn dump_emunand(&mut self) {
        if self.runtime.emunand_disabled {
            return;
        }
        self.persisted.extra_cfg.insert(ExtraFlags::DUMP_EMULATED);
        self.persist();
        self.run_key_dump(NandTarget::Emulated);
    }

    fn run_key_dump(&mut self, target: NandTarget) {
        if let Err(error) = self.keys.dump(target) {
            warn!("key dump failed: {}", error);
            error.report(&mut self.ui);
        }
    }

    // The persisted record is rewritten only right before an operation
    // that can warm-restart or terminate the process.
    fn persist(&mut self) { self.persisted.store(self.config_region); }

    fn finish(mut self, terminal: Terminal) -> ! {
        self.persist();
        self.sd.unmount();
        match terminal {
            Terminal::RebootNormal => self.platform.reboot_normal(),
            Terminal::RebootRecovery => self.platform.reboot_recovery(),
            Terminal::PowerOff => self.platform.power_off(),
        }
    }
}
