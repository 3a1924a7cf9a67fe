//! Cartridge slot with the 16 KB bank mapper.
//!
//! Images up to 32 KB map flat into 0x0000-0x7FFF. Larger images switch the
//! slot into multi-bank mode: 0x0000-0x3FFF is a window onto the bank named
//! by the last write to `BANK_REGISTER`, and 0x4000-0x7FFF is fixed to the
//! image's last bank.

/// Size of the flat cartridge window.
pub const CART_WINDOW: usize = 0x8000;
/// Size of one bank.
pub const BANK_SIZE: usize = 0x4000;
/// Largest image accepted (32 banks).
pub const MAX_CART_SIZE: usize = 0x80000;
/// Write-only bank select register.
pub const BANK_REGISTER: u16 = 0xDF00;
/// Fill value for cartridge space the image does not cover.
pub const CART_FILL: u8 = 0x01;

pub struct Cartridge {
    rom: Vec<u8>,
    multi_bank: bool,
    /// Bank count, rounded up to a power of two.
    banks: usize,
    /// Bank mapped at 0x4000-0x7FFF.
    fixed_bank: usize,
    current_bank: usize,
}

impl Default for Cartridge {
    fn default() -> Self {
        Self::new()
    }
}

impl Cartridge {
    /// An empty slot: 32 KB of fill bytes, single-bank.
    pub fn new() -> Self {
        Self {
            rom: vec![CART_FILL; CART_WINDOW],
            multi_bank: false,
            banks: 1,
            fixed_bank: 0,
            current_bank: 0,
        }
    }

    /// Load an image at byte offset `base` of the cartridge space.
    ///
    /// The image is clamped to `MAX_CART_SIZE`. Anything that ends past
    /// 32 KB selects multi-bank mode. Returns the number of bytes dropped.
    pub fn load(&mut self, data: &[u8], base: usize) -> usize {
        let base = base.min(MAX_CART_SIZE);
        let end = (base + data.len()).min(MAX_CART_SIZE);
        let kept = end - base;

        if end > CART_WINDOW {
            let populated = end.div_ceil(BANK_SIZE);
            self.banks = populated.next_power_of_two();
            self.fixed_bank = populated - 1;
            self.multi_bank = true;
            self.rom = vec![CART_FILL; self.banks * BANK_SIZE];
        } else {
            self.banks = 1;
            self.fixed_bank = 0;
            self.multi_bank = false;
            self.rom = vec![CART_FILL; CART_WINDOW];
        }
        self.current_bank = 0;
        self.rom[base..end].copy_from_slice(&data[..kept]);
        data.len() - kept
    }

    /// Read from the cartridge window. `addr` must be below 0x8000.
    pub fn read(&self, addr: u16) -> u8 {
        let addr = addr as usize & (CART_WINDOW - 1);
        if !self.multi_bank {
            return self.rom[addr];
        }
        let offset = if addr < BANK_SIZE {
            self.current_bank * BANK_SIZE + addr
        } else {
            self.fixed_bank * BANK_SIZE + (addr - BANK_SIZE)
        };
        self.rom[offset]
    }

    /// Handle a write to `BANK_REGISTER`. Ignored in single-bank mode.
    pub fn select_bank(&mut self, data: u8) {
        if !self.multi_bank {
            return;
        }
        let bank = data as usize & (self.banks - 1);
        if bank != self.current_bank {
            log::debug!("bank switch {} -> {}", self.current_bank, bank);
        }
        self.current_bank = bank;
    }

    /// Back to bank 0, as after power-on.
    pub fn reset(&mut self) {
        self.current_bank = 0;
    }

    pub fn is_multi_bank(&self) -> bool {
        self.multi_bank
    }

    pub fn bank_count(&self) -> usize {
        self.banks
    }

    pub fn current_bank(&self) -> usize {
        self.current_bank
    }
}
