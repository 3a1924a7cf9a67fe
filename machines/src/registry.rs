//! Machine registry for automatic front-end discovery.
//!
//! Each machine self-registers via [`inventory::submit!`] with a
//! [`MachineEntry`] holding its CLI name, the file its ROM set is keyed on,
//! and a factory. Hosts enumerate machines at runtime without a central list.

use beamline_core::core::machine::Machine;

use crate::rom_loader::{RomLoadError, RomSet};

/// Factory signature: build a ready-to-run machine from loaded ROM images.
pub type MachineFactory = fn(&RomSet) -> Result<Box<dyn Machine>, RomLoadError>;

pub struct MachineEntry {
    /// CLI name used to select this machine (e.g., "vectrex").
    pub name: &'static str,
    /// File the machine cannot start without (e.g., "bios.bin").
    pub rom_name: &'static str,
    pub create: MachineFactory,
}

impl MachineEntry {
    pub const fn new(name: &'static str, rom_name: &'static str, create: MachineFactory) -> Self {
        Self {
            name,
            rom_name,
            create,
        }
    }
}

inventory::collect!(MachineEntry);

/// All registered machines, sorted by name.
pub fn all() -> Vec<&'static MachineEntry> {
    let mut entries: Vec<_> = inventory::iter::<MachineEntry>.into_iter().collect();
    entries.sort_by_key(|e| e.name);
    entries
}

pub fn find(name: &str) -> Option<&'static MachineEntry> {
    inventory::iter::<MachineEntry>
        .into_iter()
        .find(|e| e.name == name)
}
