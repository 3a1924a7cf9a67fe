use crate::core::{Bus, BusMaster};
use crate::cpu::m6809::{CcFlag, M6809};

impl M6809 {
    // --- Internal Unary Helpers ---

    #[inline]
    fn perform_neg(&mut self, val: u8) -> u8 {
        let (result, borrow) = (0u8).overflowing_sub(val);
        let overflow = val == 0x80;
        self.set_flags_arithmetic(result, overflow, borrow);
        result
    }

    #[inline]
    fn perform_com(&mut self, val: u8) -> u8 {
        let result = !val;
        self.set_flags_logical(result);
        self.set_flag(CcFlag::C, true);
        result
    }

    #[inline]
    fn perform_clr(&mut self) -> u8 {
        self.set_flag(CcFlag::N, false);
        self.set_flag(CcFlag::Z, true);
        self.set_flag(CcFlag::V, false);
        self.set_flag(CcFlag::C, false);
        0
    }

    #[inline]
    fn perform_inc(&mut self, val: u8) -> u8 {
        let overflow = val == 0x7F;
        let result = val.wrapping_add(1);
        self.set_flag(CcFlag::N, result & 0x80 != 0);
        self.set_flag(CcFlag::Z, result == 0);
        self.set_flag(CcFlag::V, overflow);
        result
    }

    #[inline]
    fn perform_dec(&mut self, val: u8) -> u8 {
        let overflow = val == 0x80;
        let result = val.wrapping_sub(1);
        self.set_flag(CcFlag::N, result & 0x80 != 0);
        self.set_flag(CcFlag::Z, result == 0);
        self.set_flag(CcFlag::V, overflow);
        result
    }

    /// Unary/shift operation selected by the low nibble shared by the
    /// register (0x40/0x50) and memory (0x00/0x60/0x70) forms.
    /// TST returns its input unchanged.
    fn perform_unary(&mut self, nibble: u8, val: u8) -> u8 {
        match nibble {
            0x0 => self.perform_neg(val),
            0x3 => self.perform_com(val),
            0x4 => self.perform_lsr(val),
            0x6 => self.perform_ror(val),
            0x7 => self.perform_asr(val),
            0x8 => self.perform_asl(val),
            0x9 => self.perform_rol(val),
            0xA => self.perform_dec(val),
            0xC => self.perform_inc(val),
            0xD => {
                self.set_flags_logical(val);
                val
            }
            0xF => self.perform_clr(),
            _ => val,
        }
    }

    /// NEGA..CLRB inherent (0x40-0x5F).
    pub(crate) fn op_register_unary(&mut self, opcode: u8, val: u8) -> u8 {
        self.perform_unary(opcode & 0x0F, val)
    }

    /// Memory unary/shift (0x00-0x0F direct, 0x60-0x6F indexed,
    /// 0x70-0x7F extended), including JMP (nibble E).
    ///
    /// Read-modify-write except TST (read only) and CLR (write only).
    pub(crate) fn op_memory_unary<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        opcode: u8,
        bus: &mut B,
        master: BusMaster,
    ) {
        let ea = match opcode >> 4 {
            0x0 => self.ea_direct(bus, master),
            0x6 => self.ea_indexed(bus, master),
            _ => self.fetch_word(bus, master),
        };

        match opcode & 0x0F {
            0xE => self.pc = ea,
            0xD => {
                let val = bus.read(master, ea);
                self.set_flags_logical(val);
            }
            0xF => {
                let result = self.perform_clr();
                bus.write(master, ea, result);
            }
            nibble => {
                let val = bus.read(master, ea);
                let result = self.perform_unary(nibble, val);
                bus.write(master, ea, result);
            }
        }
    }

    /// SEX inherent (0x1D): sign-extend B into A.
    /// N and Z reflect the resulting D.
    pub(crate) fn op_sex(&mut self) {
        self.a = if self.b & 0x80 != 0 { 0xFF } else { 0x00 };
        let d = self.get_d();
        self.set_flag(CcFlag::N, d & 0x8000 != 0);
        self.set_flag(CcFlag::Z, d == 0);
    }

    /// ABX inherent (0x3A): Add B (unsigned) to X.
    /// X = X + B. No flags affected.
    pub(crate) fn op_abx(&mut self) {
        self.x = self.x.wrapping_add(self.b as u16);
    }

    /// DAA inherent (0x19): Decimal Adjust A after BCD addition.
    /// Adjusts A to produce valid BCD result after ADDA/ADCA.
    /// N set if result bit 7 is set. Z set if result is zero.
    /// C set if BCD carry occurred. V undefined (left unchanged).
    pub(crate) fn op_daa(&mut self) {
        let mut correction: u8 = 0;
        let mut carry = self.flag(CcFlag::C);
        let msn = self.a & 0xF0;
        let lsn = self.a & 0x0F;

        if lsn > 0x09 || self.flag(CcFlag::H) {
            correction |= 0x06;
        }

        if msn > 0x90 || carry || (msn > 0x80 && lsn > 0x09) {
            correction |= 0x60;
            carry = true;
        }

        self.a = self.a.wrapping_add(correction);
        self.set_flag(CcFlag::N, self.a & 0x80 != 0);
        self.set_flag(CcFlag::Z, self.a == 0);
        self.set_flag(CcFlag::C, carry);
    }
}
