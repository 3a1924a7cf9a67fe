/// Identifies who is accessing the bus.
///
/// The console has a single CPU, but the host-side debugger also peeks
/// memory (call-depth tracking, opcode inspection) and those accesses must
/// not trigger VIA read side effects.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BusMaster {
    Cpu(usize), // CPU 0, CPU 1, etc.
    Debugger,   // Side-effect-free inspection from the debug controller
}

/// Generic bus interface for 8-bit CPUs.
pub trait Bus {
    type Address: Copy + Into<u64>; // u16 for 8-bit
    type Data; // u8

    fn read(&mut self, master: BusMaster, addr: Self::Address) -> Self::Data;
    fn write(&mut self, master: BusMaster, addr: Self::Address, data: Self::Data);

    /// Generic interrupt query. CPUs pick what they need.
    fn check_interrupts(&self, target: BusMaster) -> InterruptState;
}

#[derive(Default, Clone, Copy, Debug, PartialEq, Eq)]
pub struct InterruptState {
    pub nmi: bool,
    pub irq: bool,
    pub firq: bool, // 6809-specific
}
