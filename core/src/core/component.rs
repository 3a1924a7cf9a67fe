use crate::core::bus::{Bus, BusMaster};

/// A clocked device with no bus access of its own.
pub trait Component {
    /// Advance one clock cycle. Returns true when the device's interrupt
    /// output is asserted after the cycle.
    fn tick(&mut self) -> bool;
}

/// A device that drives the bus (the CPU).
pub trait BusMasterComponent {
    type Bus: Bus + ?Sized;

    /// Run one bus-master step and return the number of clock cycles it took.
    fn step_with_bus(&mut self, bus: &mut Self::Bus, master: BusMaster) -> u32;
}
