#![allow(dead_code)]

use beamline_core::core::{Bus, BusMaster, bus::InterruptState};
use beamline_core::cpu::m6809::M6809;

pub const CPU: BusMaster = BusMaster::Cpu(0);

/// Minimal bus for testing: flat 64KB read/write memory and interrupt lines
/// the test drives by hand.
pub struct TestBus {
    pub memory: [u8; 0x10000],
    pub irq: bool,
    pub firq: bool,
    pub nmi: bool,
}

impl TestBus {
    pub fn new() -> Self {
        Self {
            memory: [0; 0x10000],
            irq: false,
            firq: false,
            nmi: false,
        }
    }

    pub fn load(&mut self, addr: u16, data: &[u8]) {
        let start = addr as usize;
        self.memory[start..start + data.len()].copy_from_slice(data);
    }

    pub fn set_vector(&mut self, vector: u16, target: u16) {
        self.load(vector, &target.to_be_bytes());
    }
}

impl Bus for TestBus {
    type Address = u16;
    type Data = u8;

    fn read(&mut self, _master: BusMaster, addr: u16) -> u8 {
        self.memory[addr as usize]
    }

    fn write(&mut self, _master: BusMaster, addr: u16, data: u8) {
        self.memory[addr as usize] = data;
    }

    fn check_interrupts(&self, _target: BusMaster) -> InterruptState {
        InterruptState {
            nmi: self.nmi,
            irq: self.irq,
            firq: self.firq,
        }
    }
}

/// CPU with PC at 0 and interrupts unmasked, plus a bus holding `program`
/// at 0x0000.
pub fn setup(program: &[u8]) -> (M6809, TestBus) {
    let mut cpu = M6809::new();
    cpu.cc = 0;
    let mut bus = TestBus::new();
    bus.load(0, program);
    (cpu, bus)
}

/// Execute `n` instructions, returning the total cycles.
pub fn run(cpu: &mut M6809, bus: &mut TestBus, n: usize) -> u32 {
    (0..n).map(|_| cpu.step(bus, CPU)).sum()
}
