use crate::cpu::m6809::{CcFlag, M6809};

impl M6809 {
    /// 8-bit addition with optional carry-in. Sets H, N, Z, V, C.
    #[inline]
    pub(crate) fn perform_add8(&mut self, acc: u8, m: u8, carry_in: bool) -> u8 {
        let sum = acc as u16 + m as u16 + carry_in as u16;
        let result = sum as u8;
        let overflow = (acc ^ result) & (m ^ result) & 0x80 != 0;
        self.set_flag(CcFlag::H, (acc ^ m ^ result) & 0x10 != 0);
        self.set_flags_arithmetic(result, overflow, sum > 0xFF);
        result
    }

    /// 8-bit subtraction with optional borrow-in. Sets N, Z, V, C; H is
    /// undefined on the 6809 and left unchanged.
    #[inline]
    pub(crate) fn perform_sub8(&mut self, acc: u8, m: u8, borrow_in: bool) -> u8 {
        let diff = (acc as u16)
            .wrapping_sub(m as u16)
            .wrapping_sub(borrow_in as u16);
        let result = diff as u8;
        let overflow = (acc ^ m) & (acc ^ result) & 0x80 != 0;
        self.set_flags_arithmetic(result, overflow, diff & 0x100 != 0);
        result
    }

    /// Run the 8-bit ALU operation selected by an accumulator-group low
    /// nibble. Returns the value to write back, or `None` for compare and
    /// bit-test, which only set flags.
    pub(crate) fn perform_binary8(&mut self, nibble: u8, acc: u8, m: u8) -> Option<u8> {
        match nibble {
            0x0 => Some(self.perform_sub8(acc, m, false)),
            0x1 => {
                self.perform_sub8(acc, m, false);
                None
            }
            0x2 => {
                let borrow = self.flag(CcFlag::C);
                Some(self.perform_sub8(acc, m, borrow))
            }
            0x4 => {
                let result = acc & m;
                self.set_flags_logical(result);
                Some(result)
            }
            0x5 => {
                self.set_flags_logical(acc & m);
                None
            }
            0x6 => {
                self.set_flags_logical(m);
                Some(m)
            }
            0x8 => {
                let result = acc ^ m;
                self.set_flags_logical(result);
                Some(result)
            }
            0x9 => {
                let carry = self.flag(CcFlag::C);
                Some(self.perform_add8(acc, m, carry))
            }
            0xA => {
                let result = acc | m;
                self.set_flags_logical(result);
                Some(result)
            }
            0xB => Some(self.perform_add8(acc, m, false)),
            _ => None,
        }
    }

    /// MUL inherent (0x3D): D = A * B (unsigned).
    /// Z set if the product is zero; C is bit 7 of the low byte so that
    /// ADCA #0 rounds the high byte.
    pub(crate) fn op_mul(&mut self) {
        let product = self.a as u16 * self.b as u16;
        self.set_d(product);
        self.set_flag(CcFlag::Z, product == 0);
        self.set_flag(CcFlag::C, product & 0x80 != 0);
    }
}
