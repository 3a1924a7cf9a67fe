use super::{CcFlag, M6809};
use crate::core::{Bus, BusMaster};

mod binary;
mod shift;
mod unary;
mod word;

impl M6809 {
    /// Helper to set N, Z, V (cleared) flags for logical operations
    #[inline]
    pub(crate) fn set_flags_logical(&mut self, result: u8) {
        self.set_flag(CcFlag::N, result & 0x80 != 0);
        self.set_flag(CcFlag::Z, result == 0);
        self.set_flag(CcFlag::V, false);
    }

    /// Helper to set N, Z, V, C flags for arithmetic operations
    #[inline]
    pub(crate) fn set_flags_arithmetic(&mut self, result: u8, overflow: bool, carry: bool) {
        self.set_flag(CcFlag::N, result & 0x80 != 0);
        self.set_flag(CcFlag::Z, result == 0);
        self.set_flag(CcFlag::V, overflow);
        self.set_flag(CcFlag::C, carry);
    }

    /// Helper to set N, Z, V, C flags for 16-bit arithmetic
    #[inline]
    pub(crate) fn set_flags_arithmetic16(&mut self, result: u16, overflow: bool, carry: bool) {
        self.set_flag(CcFlag::N, result & 0x8000 != 0);
        self.set_flag(CcFlag::Z, result == 0);
        self.set_flag(CcFlag::V, overflow);
        self.set_flag(CcFlag::C, carry);
    }

    /// Helper to set N, Z, V (cleared) flags for 16-bit logical operations
    #[inline]
    pub(crate) fn set_flags_logical16(&mut self, result: u16) {
        self.set_flag(CcFlag::N, result & 0x8000 != 0);
        self.set_flag(CcFlag::Z, result == 0);
        self.set_flag(CcFlag::V, false);
    }

    /// Helper to set N, Z, V, C flags for left-shift/rotate operations (ASL, ROL).
    /// V = N XOR C (post-operation) per 6809 datasheet.
    #[inline]
    pub(crate) fn set_flags_shift(&mut self, result: u8, carry: bool) {
        let n = result & 0x80 != 0;
        self.set_flag(CcFlag::N, n);
        self.set_flag(CcFlag::Z, result == 0);
        self.set_flag(CcFlag::V, n ^ carry);
        self.set_flag(CcFlag::C, carry);
    }

    /// Helper to set N, Z, C flags for right-shift/rotate operations (LSR, ASR, ROR).
    /// V is not affected by right-shift operations.
    #[inline]
    pub(crate) fn set_flags_shift_right(&mut self, result: u8, carry: bool) {
        self.set_flag(CcFlag::N, result & 0x80 != 0);
        self.set_flag(CcFlag::Z, result == 0);
        self.set_flag(CcFlag::C, carry);
    }

    /// ORCC immediate (0x1A): OR immediate value into CC register.
    pub(crate) fn op_orcc<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        bus: &mut B,
        master: BusMaster,
    ) {
        self.cc |= self.fetch_byte(bus, master);
    }

    /// ANDCC immediate (0x1C): AND immediate value into CC register.
    /// Used to clear specific CC bits (e.g., ANDCC #$EF enables IRQ).
    pub(crate) fn op_andcc<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        bus: &mut B,
        master: BusMaster,
    ) {
        self.cc &= self.fetch_byte(bus, master);
    }

    /// Accumulator groups 0x80-0xFF (A side 0x80-0xBF, B side 0xC0-0xFF).
    ///
    /// The low nibble selects the operation and bits 5-4 the addressing mode:
    ///
    /// | Nibble | A side     | B side     |
    /// |--------|------------|------------|
    /// | 0      | SUBA       | SUBB       |
    /// | 1      | CMPA       | CMPB       |
    /// | 2      | SBCA       | SBCB       |
    /// | 3      | SUBD       | ADDD       |
    /// | 4      | ANDA       | ANDB       |
    /// | 5      | BITA       | BITB       |
    /// | 6      | LDA        | LDB        |
    /// | 7      | STA        | STB        |
    /// | 8      | EORA       | EORB       |
    /// | 9      | ADCA       | ADCB       |
    /// | A      | ORA        | ORB        |
    /// | B      | ADDA       | ADDB       |
    /// | C      | CMPX       | LDD        |
    /// | D      | JSR        | STD        |
    /// | E      | LDX        | LDU        |
    /// | F      | STX        | STU        |
    pub(crate) fn op_accumulator<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        opcode: u8,
        bus: &mut B,
        master: BusMaster,
    ) {
        let b_side = opcode & 0x40 != 0;
        match (opcode & 0x0F, b_side) {
            (0x3, false) => {
                let m = self.read_operand16(opcode, bus, master);
                let d = self.get_d();
                let r = self.perform_sub16(d, m);
                self.set_d(r);
            }
            (0x3, true) => {
                let m = self.read_operand16(opcode, bus, master);
                let d = self.get_d();
                let r = self.perform_add16(d, m);
                self.set_d(r);
            }
            (0x7, _) => {
                let ea = self.ea_for(opcode, bus, master);
                let val = if b_side { self.b } else { self.a };
                self.set_flags_logical(val);
                bus.write(master, ea, val);
            }
            (0xC, false) => {
                let m = self.read_operand16(opcode, bus, master);
                self.perform_cmp16(self.x, m);
            }
            (0xC, true) => {
                let d = self.read_operand16(opcode, bus, master);
                self.set_d(d);
                self.set_flags_logical16(d);
            }
            (0xD, false) => self.op_jsr(opcode, bus, master),
            (0xD, true) => self.store16(opcode, self.get_d(), bus, master),
            (0xE, false) => {
                self.x = self.read_operand16(opcode, bus, master);
                self.set_flags_logical16(self.x);
            }
            (0xE, true) => {
                self.u = self.read_operand16(opcode, bus, master);
                self.set_flags_logical16(self.u);
            }
            (0xF, false) => self.store16(opcode, self.x, bus, master),
            (0xF, true) => self.store16(opcode, self.u, bus, master),
            (nibble, _) => {
                let m = self.read_operand8(opcode, bus, master);
                let acc = if b_side { self.b } else { self.a };
                if let Some(result) = self.perform_binary8(nibble, acc, m) {
                    if b_side {
                        self.b = result;
                    } else {
                        self.a = result;
                    }
                }
            }
        }
    }
}
