use super::{CcFlag, M6809, WaitState};
use crate::core::{Bus, BusMaster};

impl M6809 {
    #[inline]
    fn push_byte<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        bus: &mut B,
        master: BusMaster,
        use_u: bool,
        val: u8,
    ) {
        let sp = if use_u { &mut self.u } else { &mut self.s };
        *sp = sp.wrapping_sub(1);
        let addr = *sp;
        bus.write(master, addr, val);
    }

    #[inline]
    fn pull_byte<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        bus: &mut B,
        master: BusMaster,
        use_u: bool,
    ) -> u8 {
        let sp = if use_u { &mut self.u } else { &mut self.s };
        let addr = *sp;
        *sp = sp.wrapping_add(1);
        bus.read(master, addr)
    }

    /// 16-bit registers go low byte first so the high byte ends up at the
    /// lower address.
    fn push_word<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        bus: &mut B,
        master: BusMaster,
        use_u: bool,
        val: u16,
    ) {
        let [high, low] = val.to_be_bytes();
        self.push_byte(bus, master, use_u, low);
        self.push_byte(bus, master, use_u, high);
    }

    fn pull_word<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        bus: &mut B,
        master: BusMaster,
        use_u: bool,
    ) -> u16 {
        let high = self.pull_byte(bus, master, use_u);
        let low = self.pull_byte(bus, master, use_u);
        u16::from_be_bytes([high, low])
    }

    pub(crate) fn push_word_s<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        bus: &mut B,
        master: BusMaster,
        val: u16,
    ) {
        self.push_word(bus, master, false, val);
    }

    pub(crate) fn pull_word_s<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        bus: &mut B,
        master: BusMaster,
    ) -> u16 {
        self.pull_word(bus, master, false)
    }

    /// Push the registers named in a PSH postbyte. Returns the byte count.
    ///
    /// Order: PC(0x80), U/S(0x40), Y(0x20), X(0x10), DP(0x08), B(0x04),
    /// A(0x02), CC(0x01). Bit 6 names the *other* stack pointer.
    fn push_registers<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        bus: &mut B,
        master: BusMaster,
        use_u: bool,
        mask: u8,
    ) -> u32 {
        let mut bytes = 0;
        if mask & 0x80 != 0 {
            self.push_word(bus, master, use_u, self.pc);
            bytes += 2;
        }
        if mask & 0x40 != 0 {
            let other = if use_u { self.s } else { self.u };
            self.push_word(bus, master, use_u, other);
            bytes += 2;
        }
        if mask & 0x20 != 0 {
            self.push_word(bus, master, use_u, self.y);
            bytes += 2;
        }
        if mask & 0x10 != 0 {
            self.push_word(bus, master, use_u, self.x);
            bytes += 2;
        }
        if mask & 0x08 != 0 {
            self.push_byte(bus, master, use_u, self.dp);
            bytes += 1;
        }
        if mask & 0x04 != 0 {
            self.push_byte(bus, master, use_u, self.b);
            bytes += 1;
        }
        if mask & 0x02 != 0 {
            self.push_byte(bus, master, use_u, self.a);
            bytes += 1;
        }
        if mask & 0x01 != 0 {
            self.push_byte(bus, master, use_u, self.cc);
            bytes += 1;
        }
        bytes
    }

    /// Pull the registers named in a PUL postbyte, in reverse push order.
    /// Returns the byte count.
    fn pull_registers<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        bus: &mut B,
        master: BusMaster,
        use_u: bool,
        mask: u8,
    ) -> u32 {
        let mut bytes = 0;
        if mask & 0x01 != 0 {
            self.cc = self.pull_byte(bus, master, use_u);
            bytes += 1;
        }
        if mask & 0x02 != 0 {
            self.a = self.pull_byte(bus, master, use_u);
            bytes += 1;
        }
        if mask & 0x04 != 0 {
            self.b = self.pull_byte(bus, master, use_u);
            bytes += 1;
        }
        if mask & 0x08 != 0 {
            self.dp = self.pull_byte(bus, master, use_u);
            bytes += 1;
        }
        if mask & 0x10 != 0 {
            self.x = self.pull_word(bus, master, use_u);
            bytes += 2;
        }
        if mask & 0x20 != 0 {
            self.y = self.pull_word(bus, master, use_u);
            bytes += 2;
        }
        if mask & 0x40 != 0 {
            let other = self.pull_word(bus, master, use_u);
            if use_u {
                self.s = other;
                self.nmi_armed = true;
            } else {
                self.u = other;
            }
            bytes += 2;
        }
        if mask & 0x80 != 0 {
            self.pc = self.pull_word(bus, master, use_u);
            bytes += 2;
        }
        bytes
    }

    /// PSHS (0x34) / PSHU (0x36): one extra cycle per byte pushed.
    pub(crate) fn op_psh<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        bus: &mut B,
        master: BusMaster,
        use_u: bool,
    ) {
        let mask = self.fetch_byte(bus, master);
        self.extra_cycles += self.push_registers(bus, master, use_u, mask);
    }

    /// PULS (0x35) / PULU (0x37): one extra cycle per byte pulled.
    pub(crate) fn op_pul<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        bus: &mut B,
        master: BusMaster,
        use_u: bool,
    ) {
        let mask = self.fetch_byte(bus, master);
        self.extra_cycles += self.pull_registers(bus, master, use_u, mask);
    }

    /// RTI (0x3B): pull CC, then the rest of the machine state if E is set,
    /// otherwise just PC. 6 cycles, 15 with E.
    pub(crate) fn op_rti<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        bus: &mut B,
        master: BusMaster,
    ) {
        self.pull_registers(bus, master, false, 0x01);
        if self.flag(CcFlag::E) {
            self.pull_registers(bus, master, false, 0xFE);
            self.extra_cycles += 9;
        } else {
            self.pull_registers(bus, master, false, 0x80);
        }
    }

    /// SWI (0x3F), SWI2 (0x10 0x3F), SWI3 (0x11 0x3F).
    /// Stacks the entire state; only SWI masks IRQ and FIRQ.
    pub(crate) fn op_swi<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        bus: &mut B,
        master: BusMaster,
        vector: u16,
        mask: bool,
    ) {
        self.set_flag(CcFlag::E, true);
        self.push_registers(bus, master, false, 0xFF);
        if mask {
            self.set_flag(CcFlag::I, true);
            self.set_flag(CcFlag::F, true);
        }
        self.pc = self.read_word(bus, master, vector);
    }

    /// CWAI (0x3C): AND the immediate into CC, stack the entire state and
    /// wait for an interrupt.
    pub(crate) fn op_cwai<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        bus: &mut B,
        master: BusMaster,
    ) {
        let mask = self.fetch_byte(bus, master);
        self.cc &= mask;
        self.set_flag(CcFlag::E, true);
        self.push_registers(bus, master, false, 0xFF);
        self.wait = WaitState::Cwai;
    }

    /// SYNC (0x13): halt until any interrupt line is asserted.
    pub(crate) fn op_sync(&mut self) {
        self.wait = WaitState::Sync;
    }

    /// Hardware interrupt entry. `entire` selects the full-state frame
    /// (IRQ, NMI) over the PC+CC frame (FIRQ). Returns the cycles spent.
    pub(crate) fn enter_interrupt<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        bus: &mut B,
        master: BusMaster,
        vector: u16,
        entire: bool,
        mask_firq: bool,
    ) -> u32 {
        let cycles = if self.wait == WaitState::Cwai {
            // State was stacked by CWAI
            7
        } else if entire {
            self.set_flag(CcFlag::E, true);
            self.push_registers(bus, master, false, 0xFF);
            19
        } else {
            self.set_flag(CcFlag::E, false);
            self.push_registers(bus, master, false, 0x81);
            10
        };

        self.set_flag(CcFlag::I, true);
        if mask_firq {
            self.set_flag(CcFlag::F, true);
        }
        self.pc = self.read_word(bus, master, vector);
        self.wait = WaitState::Running;
        self.interrupts += 1;
        cycles
    }
}
