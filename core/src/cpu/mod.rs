use crate::core::{bus::BusMaster, component::BusMasterComponent};

/// Generic CPU interface
pub trait Cpu: BusMasterComponent + CpuStateTrait {
    /// Power-on reset: clear internal state and fetch the reset vector.
    fn reset(&mut self, bus: &mut Self::Bus, master: BusMaster);

    /// Query if the CPU is waiting internally (CWAI, SYNC)
    fn is_sleeping(&self) -> bool;
}

// Re-export state types
pub mod state;
pub use state::{CpuStateTrait, M6809State};

pub mod m6809;
pub use m6809::M6809;
