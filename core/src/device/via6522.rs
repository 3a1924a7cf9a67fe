use crate::core::component::Component;

/// MOS 6522 Versatile Interface Adapter (VIA)
///
/// Two 8-bit ports, two 16-bit timers, an 8-bit shift register and the
/// interrupt flag/enable pair. The port pins themselves belong to the board:
/// port A reads return whatever the board last placed on the pins with
/// `set_port_a_input()`, and port B bit 5 is an input pin set with
/// `set_pb5_input()`. Everything else on port B reads back from ORB.
///
/// Handshake lines are modelled only as far as the outputs go: CA2 and CB2
/// follow the PCR manual and pulse modes, and CB2 also carries the shift
/// register output bit.
pub struct Via6522 {
    ora: u8,
    orb: u8,
    ddra: u8,
    ddrb: u8,
    input_a: u8,
    pb5: bool,

    // Timer 1
    t1_counter: u16,
    t1_latch_lo: u8,
    t1_latch_hi: u8,
    t1_on: bool,
    t1_int: bool,
    t1_pb7: u8,

    // Timer 2
    t2_counter: u16,
    t2_latch_lo: u8,
    t2_on: bool,
    t2_int: bool,

    // Shift register
    sr: u8,
    sr_bits: u8,
    sr_clock_div: u8,
    sr_clock: bool,
    cb2_shift: bool,

    acr: u8,
    pcr: u8,
    ifr: u8,
    ier: u8,

    ca2: bool,
    cb2_hs: bool,
}

/// IFR/IER bit assignments.
pub const IFR_CA2: u8 = 0x01;
pub const IFR_CA1: u8 = 0x02;
pub const IFR_SR: u8 = 0x04;
pub const IFR_CB2: u8 = 0x08;
pub const IFR_CB1: u8 = 0x10;
pub const IFR_T2: u8 = 0x20;
pub const IFR_T1: u8 = 0x40;
pub const IFR_IRQ: u8 = 0x80;

impl Default for Via6522 {
    fn default() -> Self {
        Self::new()
    }
}

impl Via6522 {
    /// A VIA in its reset state.
    pub fn new() -> Self {
        Self {
            ora: 0,
            orb: 0,
            ddra: 0,
            ddrb: 0,
            input_a: 0,
            pb5: false,
            t1_counter: 0,
            t1_latch_lo: 0,
            t1_latch_hi: 0,
            t1_on: false,
            t1_int: false,
            t1_pb7: 0x80,
            t2_counter: 0,
            t2_latch_lo: 0,
            t2_on: false,
            t2_int: false,
            sr: 0,
            sr_bits: 8,
            sr_clock_div: 0,
            sr_clock: false,
            cb2_shift: false,
            acr: 0,
            pcr: 0,
            ifr: 0,
            ier: 0,
            ca2: true,
            cb2_hs: true,
        }
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Recompute IFR bit 7 from the enabled low bits.
    #[inline]
    fn update_irq(&mut self) {
        if self.ifr & self.ier & 0x7F != 0 {
            self.ifr |= IFR_IRQ;
        } else {
            self.ifr &= !IFR_IRQ;
        }
    }

    #[inline]
    fn set_flag(&mut self, mask: u8) {
        self.ifr |= mask;
        self.update_irq();
    }

    #[inline]
    fn clear_flag(&mut self, mask: u8) {
        self.ifr &= !mask;
        self.update_irq();
    }

    /// CA2 handshake output mode (PCR bits 3-1 = 100) pulls CA2 low on a
    /// port A access.
    fn ca2_pulse_on_access(&mut self) {
        if self.pcr & 0x0E == 0x08 {
            self.ca2 = false;
        }
    }

    /// Read a register. `offset` is RS3-RS0 (0-15).
    ///
    /// | Offset | Register                   | Side effect                      |
    /// |--------|----------------------------|----------------------------------|
    /// | 0      | Port B                     |                                  |
    /// | 1      | Port A (handshake)         | CA2 low in pulse mode            |
    /// | 2/3    | DDRB / DDRA                |                                  |
    /// | 4      | T1 counter low             | clear T1 flag, stop, PB7 high    |
    /// | 5      | T1 counter high            |                                  |
    /// | 6/7    | T1 latch low / high        |                                  |
    /// | 8      | T2 counter low             | clear T2 flag, stop              |
    /// | 9      | T2 counter high            |                                  |
    /// | A      | Shift register             | clear SR flag, restart shifting  |
    /// | B      | ACR                        |                                  |
    /// | C      | PCR                        |                                  |
    /// | D      | IFR                        |                                  |
    /// | E      | IER (bit 7 reads as 1)     |                                  |
    /// | F      | Port A (no handshake)      |                                  |
    pub fn read(&mut self, offset: u8) -> u8 {
        let data = self.peek(offset);
        match offset & 0x0F {
            0x1 => self.ca2_pulse_on_access(),
            0x4 => {
                self.t1_on = false;
                self.t1_int = false;
                self.t1_pb7 = 0x80;
                self.clear_flag(IFR_T1);
            }
            0x8 => {
                self.t2_on = false;
                self.t2_int = false;
                self.clear_flag(IFR_T2);
            }
            0xA => self.restart_shift(),
            _ => {}
        }
        data
    }

    /// Register value as `read()` would return it, without side effects.
    pub fn peek(&self, offset: u8) -> u8 {
        match offset & 0x0F {
            0x0 => {
                let pb5 = if self.pb5 { 0x20 } else { 0 };
                if self.acr & 0x80 != 0 {
                    (self.orb & 0x5F) | self.t1_pb7 | pb5
                } else {
                    (self.orb & 0xDF) | pb5
                }
            }
            0x1 | 0xF => self.input_a,
            0x2 => self.ddrb,
            0x3 => self.ddra,
            0x4 => self.t1_counter as u8,
            0x5 => (self.t1_counter >> 8) as u8,
            0x6 => self.t1_latch_lo,
            0x7 => self.t1_latch_hi,
            0x8 => self.t2_counter as u8,
            0x9 => (self.t2_counter >> 8) as u8,
            0xA => self.sr,
            0xB => self.acr,
            0xC => self.pcr,
            0xD => self.ifr,
            0xE => self.ier | 0x80,
            _ => unreachable!(),
        }
    }

    /// Write a register. `offset` is RS3-RS0 (0-15).
    ///
    /// Writing T1 high or T2 high loads the counter from the latch and
    /// starts the timer. Writing IFR clears the flags whose bits are set.
    /// Writing IER sets (bit 7 = 1) or clears (bit 7 = 0) the named enables.
    pub fn write(&mut self, offset: u8, data: u8) {
        match offset & 0x0F {
            0x0 => {
                self.orb = data;
                if self.pcr & 0xE0 == 0x80 {
                    self.cb2_hs = false;
                }
            }
            0x1 => {
                self.ca2_pulse_on_access();
                self.ora = data;
            }
            0xF => self.ora = data,
            0x2 => self.ddrb = data,
            0x3 => self.ddra = data,
            0x4 | 0x6 => self.t1_latch_lo = data,
            0x5 => {
                self.t1_latch_hi = data;
                self.t1_counter = u16::from_be_bytes([self.t1_latch_hi, self.t1_latch_lo]);
                self.t1_on = true;
                self.t1_int = true;
                self.t1_pb7 = 0;
                self.clear_flag(IFR_T1);
            }
            0x7 => self.t1_latch_hi = data,
            0x8 => self.t2_latch_lo = data,
            0x9 => {
                self.t2_counter = u16::from_be_bytes([data, self.t2_latch_lo]);
                self.t2_on = true;
                self.t2_int = true;
                self.clear_flag(IFR_T2);
            }
            0xA => {
                self.sr = data;
                self.restart_shift();
            }
            0xB => self.acr = data,
            0xC => {
                self.pcr = data;
                self.ca2 = self.pcr & 0x0E != 0x0C;
                self.cb2_hs = self.pcr & 0xE0 != 0xC0;
            }
            0xD => self.clear_flag(data & 0x7F),
            0xE => {
                if data & 0x80 != 0 {
                    self.ier |= data & 0x7F;
                } else {
                    self.ier &= !(data & 0x7F);
                }
                self.update_irq();
            }
            _ => unreachable!(),
        }
    }

    fn restart_shift(&mut self) {
        self.sr_bits = 0;
        self.sr_clock = true;
        self.clear_flag(IFR_SR);
    }

    fn tick_timer1(&mut self) {
        if !self.t1_on {
            return;
        }
        self.t1_counter = self.t1_counter.wrapping_sub(1);
        if self.t1_counter != 0xFFFF {
            return;
        }
        if self.acr & 0x40 != 0 {
            // Free-running: reload and toggle PB7 on every underflow
            self.set_flag(IFR_T1);
            self.t1_pb7 ^= 0x80;
            self.t1_counter = u16::from_be_bytes([self.t1_latch_hi, self.t1_latch_lo]);
        } else if self.t1_int {
            self.set_flag(IFR_T1);
            self.t1_pb7 = 0x80;
            self.t1_int = false;
        }
    }

    fn tick_timer2(&mut self) {
        // ACR bit 5 set: T2 counts PB6 pulses, which are never generated here
        if !self.t2_on || self.acr & 0x20 != 0 {
            return;
        }
        self.t2_counter = self.t2_counter.wrapping_sub(1);
        if self.t2_counter == 0xFFFF && self.t2_int {
            self.set_flag(IFR_T2);
            self.t2_int = false;
        }
    }

    /// Shift clock: divided down by the T2 latch low byte, one edge per
    /// two underflows. Returns true on a shift edge.
    fn tick_shift_clock(&mut self) -> bool {
        self.sr_clock_div = self.sr_clock_div.wrapping_sub(1);
        if self.sr_clock_div != 0xFF {
            return false;
        }
        self.sr_clock_div = self.t2_latch_lo;
        let edge = self.sr_clock;
        self.sr_clock = !self.sr_clock;
        edge
    }

    fn shift_out(&mut self) {
        self.cb2_shift = self.sr & 0x80 != 0;
        self.sr = (self.sr << 1) | self.cb2_shift as u8;
    }

    fn tick_shift_register(&mut self, t2_edge: bool) {
        if self.sr_bits >= 8 {
            return;
        }
        match self.acr & 0x1C {
            // Shift in under T2 / system clock
            0x04 if t2_edge => {
                self.sr <<= 1;
                self.sr_bits += 1;
            }
            0x08 => {
                self.sr <<= 1;
                self.sr_bits += 1;
            }
            // Free-running shift out under T2: never completes
            0x10 if t2_edge => self.shift_out(),
            // Shift out under T2 / system clock
            0x14 if t2_edge => {
                self.shift_out();
                self.sr_bits += 1;
            }
            0x18 => {
                self.shift_out();
                self.sr_bits += 1;
            }
            _ => {}
        }
        if self.sr_bits == 8 {
            self.set_flag(IFR_SR);
        }
    }

    /// End-of-cycle handshake release: CA2/CB2 in pulse mode go back high.
    /// Runs after the beam has sampled this cycle's signals.
    pub fn release_pulses(&mut self) {
        if self.pcr & 0x0E == 0x0A {
            self.ca2 = true;
        }
        if self.pcr & 0xE0 == 0xA0 {
            self.cb2_hs = true;
        }
    }

    /// Place a value on the port A pins for the next port A read.
    pub fn set_port_a_input(&mut self, data: u8) {
        self.input_a = data;
    }

    /// Drive the PB5 input pin.
    pub fn set_pb5_input(&mut self, state: bool) {
        self.pb5 = state;
    }

    pub fn ora(&self) -> u8 {
        self.ora
    }

    pub fn orb(&self) -> u8 {
        self.orb
    }

    pub fn acr(&self) -> u8 {
        self.acr
    }

    pub fn pcr(&self) -> u8 {
        self.pcr
    }

    pub fn ifr(&self) -> u8 {
        self.ifr
    }

    pub fn ier(&self) -> u8 {
        self.ier
    }

    pub fn t1_counter(&self) -> u16 {
        self.t1_counter
    }

    pub fn t2_counter(&self) -> u16 {
        self.t2_counter
    }

    /// PB7 as driven by timer 1 (0x00 or 0x80).
    pub fn t1_pb7(&self) -> u8 {
        self.t1_pb7
    }

    pub fn ca2(&self) -> bool {
        self.ca2
    }

    /// CB2 output: the shift-out bit when ACR bit 4 is set, else the
    /// handshake level.
    pub fn cb2(&self) -> bool {
        if self.acr & 0x10 != 0 {
            self.cb2_shift
        } else {
            self.cb2_hs
        }
    }

    /// PB7 as seen on the pin: timer 1 output when ACR bit 7 is set,
    /// else ORB bit 7.
    pub fn pb7(&self) -> bool {
        if self.acr & 0x80 != 0 {
            self.t1_pb7 != 0
        } else {
            self.orb & 0x80 != 0
        }
    }

    /// IRQ output (active high here; the pin itself is active low).
    pub fn irq(&self) -> bool {
        self.ifr & IFR_IRQ != 0
    }
}

impl Component for Via6522 {
    /// One E-clock cycle: timer 1, timer 2, then the shift clock and shift
    /// register. Pulse-mode handshake release is left to `release_pulses()`.
    fn tick(&mut self) -> bool {
        self.tick_timer1();
        self.tick_timer2();
        let edge = self.tick_shift_clock();
        self.tick_shift_register(edge);
        self.irq()
    }
}
