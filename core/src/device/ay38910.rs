//! AY-3-8910 programmable sound generator, register interface only.
//!
//! The PSG sits on VIA port A with port B bits 4-3 driving BDIR/BC1. The
//! core latches the 16 registers and hands every write on to an optional
//! `SoundSink`, which is where a synthesizer would plug in. Register 14 is
//! the PSG's I/O port A, wired to the four controller buttons (active low).

/// Register holding the button inputs.
pub const REG_IO_A: usize = 14;

/// Receives PSG register writes, in order, as they happen.
pub trait SoundSink {
    fn write(&mut self, reg: u8, data: u8);
}

pub struct Ay38910 {
    regs: [u8; 16],
    selected: u8,
    sink: Option<Box<dyn SoundSink>>,
}

impl Default for Ay38910 {
    fn default() -> Self {
        Self::new()
    }
}

impl Ay38910 {
    pub fn new() -> Self {
        let mut regs = [0; 16];
        regs[REG_IO_A] = 0xFF;
        Self {
            regs,
            selected: 0,
            sink: None,
        }
    }

    /// Clear all registers; the button port reads as nothing pressed.
    pub fn reset(&mut self) {
        self.regs = [0; 16];
        self.regs[REG_IO_A] = 0xFF;
        self.selected = 0;
        if let Some(sink) = self.sink.as_mut() {
            for reg in 0..16u8 {
                sink.write(reg, self.regs[reg as usize]);
            }
        }
    }

    pub fn attach_sink(&mut self, sink: Box<dyn SoundSink>) {
        self.sink = Some(sink);
    }

    /// Bus cycle from the VIA: `control` is port B, `data` is port A.
    ///
    /// | BDIR/BC1 (PB4/PB3) | Cycle          |
    /// |--------------------|----------------|
    /// | 00                 | inactive       |
    /// | 01                 | read (see `read`) |
    /// | 10                 | write selected |
    /// | 11                 | latch address  |
    pub fn bus_cycle(&mut self, control: u8, data: u8) {
        match control & 0x18 {
            0x10 => {
                // The input port is driven by the buttons, not the CPU
                if self.selected as usize != REG_IO_A {
                    self.regs[self.selected as usize] = data;
                    if let Some(sink) = self.sink.as_mut() {
                        sink.write(self.selected, data);
                    }
                }
            }
            0x18 => {
                if data & 0xF0 == 0 {
                    self.selected = data & 0x0F;
                }
            }
            _ => {}
        }
    }

    /// True when port B puts the PSG in read mode, so port A reads the
    /// selected register instead of the VIA's own output register.
    pub fn is_reading(control: u8) -> bool {
        control & 0x18 == 0x08
    }

    pub fn read(&self) -> u8 {
        self.regs[self.selected as usize]
    }

    pub fn selected(&self) -> u8 {
        self.selected
    }

    pub fn register(&self, reg: usize) -> u8 {
        self.regs.get(reg).copied().unwrap_or(0)
    }

    /// Press (`pressed = true`) or release one of the four buttons (0-3).
    pub fn set_button(&mut self, button: u8, pressed: bool) {
        if button > 3 {
            return;
        }
        let mask = 1 << button;
        if pressed {
            self.regs[REG_IO_A] &= !mask;
        } else {
            self.regs[REG_IO_A] |= mask;
        }
    }
}
