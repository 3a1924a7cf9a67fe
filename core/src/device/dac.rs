//! MC1408 DAC and the analog multiplexer behind it.
//!
//! The DAC is driven from VIA port A. Its output goes straight to the X
//! integrator and, through a 4-way multiplexer selected by port B bits 2-1,
//! to one of three sample-and-hold latches (Y, ramp reference, Z intensity)
//! or to the joystick comparator. Port B bit 0 is the multiplexer's inhibit
//! line: the selected latch only follows the DAC while it is low.

/// Centre value of a joystick pot channel.
pub const JOY_CENTER: u8 = 0x80;

pub struct Mc1408Dac {
    /// DAC output, sign-flipped (port A value XOR 0x80).
    xsh: u8,
    /// Y sample-and-hold.
    ysh: u8,
    /// Ramp reference sample-and-hold.
    rsh: u8,
    /// Z (intensity) sample-and-hold.
    zsh: u8,
    /// Joystick pot channels 0-3.
    pots: [u8; 4],
    /// Pot channel currently routed to the comparator.
    jsh: u8,
    compare: bool,
    dx: i32,
    dy: i32,
}

impl Default for Mc1408Dac {
    fn default() -> Self {
        Self {
            xsh: 0x80,
            ysh: 0x80,
            rsh: 0x80,
            zsh: 0,
            pots: [JOY_CENTER; 4],
            jsh: JOY_CENTER,
            compare: false,
            dx: 0,
            dy: 0,
        }
    }
}

impl Mc1408Dac {
    pub fn new() -> Self {
        Self::default()
    }

    /// Called when port A is written.
    pub fn write(&mut self, data: u8) {
        self.xsh = data ^ 0x80;
    }

    /// Re-evaluate the multiplexer after a port A or port B write.
    pub fn update(&mut self, orb: u8) {
        let hold = orb & 0x01 != 0;
        match orb & 0x06 {
            0x00 => {
                self.jsh = self.pots[0];
                if !hold {
                    self.ysh = self.xsh;
                }
            }
            0x02 => {
                self.jsh = self.pots[1];
                if !hold {
                    self.rsh = self.xsh;
                }
            }
            0x04 => {
                self.jsh = self.pots[2];
                if !hold {
                    self.zsh = self.xsh.saturating_sub(0x80);
                }
            }
            _ => self.jsh = self.pots[3],
        }
        self.compare = self.jsh > self.xsh;
        self.dx = self.xsh as i32 - self.rsh as i32;
        self.dy = self.rsh as i32 - self.ysh as i32;
    }

    /// Comparator output, wired to VIA PB5.
    pub fn compare(&self) -> bool {
        self.compare
    }

    /// Per-cycle X and Y integrator deltas.
    pub fn deltas(&self) -> (i32, i32) {
        (self.dx, self.dy)
    }

    /// Beam intensity (0-127).
    pub fn intensity(&self) -> u8 {
        self.zsh
    }

    /// Set a joystick pot channel (0-3). Takes effect at the next update.
    pub fn set_pot(&mut self, channel: usize, value: u8) {
        if let Some(pot) = self.pots.get_mut(channel) {
            *pot = value;
        }
    }

    pub fn pot(&self, channel: usize) -> u8 {
        self.pots.get(channel).copied().unwrap_or(JOY_CENTER)
    }
}
