use beamline_core::core::bus::InterruptState;
use beamline_core::core::{Bus, BusMaster, Component};
use beamline_core::device::ay38910::Ay38910;
use beamline_core::device::dac::Mc1408Dac;
use beamline_core::device::integrator::{BeamSignals, VectorIntegrator};
use beamline_core::device::via6522::Via6522;

use super::cartridge::{BANK_REGISTER, Cartridge};

/// BIOS ROM size (0xE000-0xFFFF).
pub const BIOS_SIZE: usize = 0x2000;
/// System RAM size, mirrored through 0xC800-0xCFFF.
pub const RAM_SIZE: usize = 0x400;

/// Console board hardware: BIOS, RAM, cartridge slot, VIA, the DAC and
/// analog multiplexer, the PSG register file and the beam integrator.
///
/// The CPU lives next to the board in `Vectrex`, so the board can be handed
/// to it as the bus without aliasing.
pub struct VectrexBoard {
    pub(crate) bios: [u8; BIOS_SIZE],
    pub(crate) ram: [u8; RAM_SIZE],
    pub(crate) cart: Cartridge,

    pub(crate) via: Via6522,
    pub(crate) dac: Mc1408Dac,
    pub(crate) psg: Ay38910,
    pub(crate) beam: VectorIntegrator,
}

impl Default for VectrexBoard {
    fn default() -> Self {
        Self::new()
    }
}

impl VectrexBoard {
    pub fn new() -> Self {
        let mut board = Self {
            bios: [0; BIOS_SIZE],
            ram: [0; RAM_SIZE],
            cart: Cartridge::new(),
            via: Via6522::new(),
            dac: Mc1408Dac::new(),
            psg: Ay38910::new(),
            beam: VectorIntegrator::new(),
        };
        board.seed_ram();
        board
    }

    /// Deterministic power-on RAM contents (each byte holds its low address).
    fn seed_ram(&mut self) {
        for (i, byte) in self.ram.iter_mut().enumerate() {
            *byte = i as u8;
        }
    }

    /// Reset every device. ROM images and the loaded cartridge survive.
    pub fn reset(&mut self) {
        self.seed_ram();
        self.cart.reset();
        self.via.reset();
        self.dac = Mc1408Dac::new();
        self.psg.reset();
        self.beam.reset();
    }

    /// Copy a BIOS image in, clamped to 8 KB. Returns the bytes dropped.
    pub fn load_bios(&mut self, data: &[u8]) -> usize {
        let len = data.len().min(BIOS_SIZE);
        self.bios[..len].copy_from_slice(&data[..len]);
        data.len() - len
    }

    pub fn cartridge(&self) -> &Cartridge {
        &self.cart
    }

    pub fn via(&self) -> &Via6522 {
        &self.via
    }

    pub fn beam(&self) -> &VectorIntegrator {
        &self.beam
    }

    pub fn psg(&self) -> &Ay38910 {
        &self.psg
    }

    pub fn dac(&self) -> &Mc1408Dac {
        &self.dac
    }

    /// Latch the pins the VIA samples on a read: port A carries the PSG
    /// register in PSG read mode, else the VIA's own ORA; PB5 is the
    /// joystick comparator.
    fn drive_via_inputs(&mut self) {
        let port_a = if Ay38910::is_reading(self.via.orb()) {
            self.psg.read()
        } else {
            self.via.ora()
        };
        self.via.set_port_a_input(port_a);
        self.via.set_pb5_input(self.dac.compare());
    }

    fn via_write(&mut self, reg: u8, data: u8) {
        self.via.write(reg, data);
        match reg {
            0x0 => {
                self.psg.bus_cycle(self.via.orb(), self.via.ora());
                self.dac.update(self.via.orb());
            }
            0x1 | 0xF => {
                self.psg.bus_cycle(self.via.orb(), self.via.ora());
                self.dac.write(data);
                self.dac.update(self.via.orb());
            }
            _ => {}
        }
    }

    /// One E-clock cycle of everything that is not the CPU.
    pub fn tick(&mut self) {
        self.via.tick();

        let (dx, dy) = self.dac.deltas();
        let signals = BeamSignals {
            blank: self.via.cb2(),
            zero: !self.via.ca2(),
            ramp_off: self.via.pb7(),
            dx,
            dy,
            intensity: self.dac.intensity(),
        };
        self.beam.tick(&signals);

        self.via.release_pulses();
    }

    // --- Input ---

    /// Press or release controller button 0-3.
    pub fn set_button(&mut self, button: u8, pressed: bool) {
        self.psg.set_button(button, pressed);
    }

    /// Set a joystick pot channel (0 = X, 1 = Y).
    pub fn set_pot(&mut self, channel: usize, value: u8) {
        self.dac.set_pot(channel, value);
    }
}

// ---------------------------------------------------------------------------
// Bus implementation: console memory map
// ---------------------------------------------------------------------------

impl Bus for VectrexBoard {
    type Address = u16;
    type Data = u8;

    fn read(&mut self, master: BusMaster, addr: u16) -> u8 {
        if self.cart.is_multi_bank() && addr < 0x8000 {
            return self.cart.read(addr);
        }
        match addr & 0xE000 {
            0xE000 => self.bios[(addr & 0x1FFF) as usize],
            0xC000 => {
                // RAM wins a dual-select read and the VIA never sees it
                if addr & 0x0800 != 0 {
                    return self.ram[(addr & 0x03FF) as usize];
                }
                if addr & 0x1000 == 0 {
                    return 0xFF;
                }
                self.drive_via_inputs();
                let reg = (addr & 0x000F) as u8;
                // Debugger reads must not clear flags or restart timers
                if master == BusMaster::Debugger {
                    self.via.peek(reg)
                } else {
                    self.via.read(reg)
                }
            }
            _ if addr < 0x8000 => self.cart.read(addr),
            _ => 0xFF,
        }
    }

    fn write(&mut self, _master: BusMaster, addr: u16, data: u8) {
        if addr == BANK_REGISTER {
            self.cart.select_bank(data);
            return;
        }
        if addr & 0xE000 == 0xC000 {
            if addr & 0x0800 != 0 {
                self.ram[(addr & 0x03FF) as usize] = data;
            }
            if addr & 0x1000 != 0 {
                self.via_write((addr & 0x000F) as u8, data);
            }
        }
        // BIOS, cartridge and 0x8000-0xBFFF: read-only or unmapped
    }

    fn check_interrupts(&self, _target: BusMaster) -> InterruptState {
        InterruptState {
            irq: self.via.irq(),
            ..InterruptState::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CPU: BusMaster = BusMaster::Cpu(0);

    #[test]
    fn ram_is_mirrored() {
        let mut board = VectrexBoard::new();
        board.write(CPU, 0xC880, 0x42);
        assert_eq!(board.read(CPU, 0xC880), 0x42);
        assert_eq!(board.read(CPU, 0xCC80), 0x42);
    }

    #[test]
    fn ram_power_on_pattern() {
        let mut board = VectrexBoard::new();
        assert_eq!(board.read(CPU, 0xC800), 0x00);
        assert_eq!(board.read(CPU, 0xC9FF), 0xFF);
    }

    #[test]
    fn bios_is_read_only() {
        let mut board = VectrexBoard::new();
        board.load_bios(&[0x12; BIOS_SIZE]);
        board.write(CPU, 0xE000, 0x00);
        assert_eq!(board.read(CPU, 0xE000), 0x12);
        assert_eq!(board.read(CPU, 0xFFFF), 0x12);
    }

    #[test]
    fn unmapped_reads_ff() {
        let mut board = VectrexBoard::new();
        assert_eq!(board.read(CPU, 0x8000), 0xFF);
        assert_eq!(board.read(CPU, 0xBFFF), 0xFF);
    }

    #[test]
    fn via_decoded_at_d000() {
        let mut board = VectrexBoard::new();
        board.write(CPU, 0xD00B, 0x98);
        assert_eq!(board.read(CPU, 0xD00B), 0x98);
        assert_eq!(board.via().acr(), 0x98);
    }

    #[test]
    fn dual_select_write_lands_in_both() {
        let mut board = VectrexBoard::new();
        board.write(CPU, 0xD80B, 0x40);
        assert_eq!(board.via().acr(), 0x40);
        assert_eq!(board.ram[0x00B], 0x40);
        board.ram[0x00C] = 0x77;
        assert_eq!(board.read(CPU, 0xD80C), 0x77);
    }

    #[test]
    fn dual_select_read_leaves_via_untouched() {
        let mut board = VectrexBoard::new();
        board.write(CPU, 0xD00E, 0xC0); // enable T1 interrupt
        board.write(CPU, 0xD004, 0x01);
        board.write(CPU, 0xD005, 0x00);
        for _ in 0..4 {
            board.tick();
        }
        assert_ne!(board.via().ifr() & 0x40, 0);
        board.ram[0x004] = 0x5A;

        // T1C-L through the dual window stays off the VIA
        assert_eq!(board.read(CPU, 0xD804), 0x5A);
        assert_ne!(board.via().ifr() & 0x40, 0);
        assert!(board.via().irq());

        board.read(CPU, 0xD004);
        assert_eq!(board.via().ifr() & 0x40, 0);
    }

    #[test]
    fn psg_register_through_via() {
        let mut board = VectrexBoard::new();
        // Latch register 14, then switch port B to PSG read
        board.write(CPU, 0xD001, 14);
        board.write(CPU, 0xD000, 0x18);
        board.write(CPU, 0xD000, 0x00);
        board.set_button(1, true);
        board.write(CPU, 0xD000, 0x08);
        assert_eq!(board.read(CPU, 0xD001), 0xFD);
    }

    #[test]
    fn port_a_write_feeds_dac() {
        let mut board = VectrexBoard::new();
        board.write(CPU, 0xD000, 0x00); // mux -> Y, enabled
        board.write(CPU, 0xD001, 0x10);
        let (dx, dy) = board.dac().deltas();
        assert_eq!(dx, 0x90 - 0x80);
        assert_eq!(dy, 0x80 - 0x90);
    }

    #[test]
    fn t1_interrupt_raises_irq() {
        let mut board = VectrexBoard::new();
        board.write(CPU, 0xD00E, 0xC0);
        board.write(CPU, 0xD004, 2);
        board.write(CPU, 0xD005, 0);
        assert!(!board.check_interrupts(CPU).irq);
        for _ in 0..3 {
            board.tick();
        }
        assert!(board.check_interrupts(CPU).irq);
        board.read(CPU, 0xD004);
        assert!(!board.check_interrupts(CPU).irq);
    }

    #[test]
    fn debugger_peek_has_no_side_effects() {
        let mut board = VectrexBoard::new();
        board.write(CPU, 0xD00E, 0xC0);
        board.write(CPU, 0xD004, 0);
        board.write(CPU, 0xD005, 0);
        board.tick();
        assert!(board.via().irq());
        board.read(BusMaster::Debugger, 0xD004);
        assert!(board.via().irq());
    }
}
