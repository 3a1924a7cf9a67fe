use crate::cpu::m6809::{CcFlag, M6809};

impl M6809 {
    // --- Internal Shift/Rotate Helpers ---

    /// ASL/LSL: bit 7 goes to C, 0 enters bit 0. V = N XOR C.
    #[inline]
    pub(crate) fn perform_asl(&mut self, val: u8) -> u8 {
        let carry = val & 0x80 != 0;
        let result = val << 1;
        self.set_flags_shift(result, carry);
        result
    }

    /// ASR: bit 7 is preserved, bit 0 goes to C.
    #[inline]
    pub(crate) fn perform_asr(&mut self, val: u8) -> u8 {
        let carry = val & 0x01 != 0;
        let result = ((val as i8) >> 1) as u8;
        self.set_flags_shift_right(result, carry);
        result
    }

    /// LSR: 0 enters bit 7 (N always clear), bit 0 goes to C.
    #[inline]
    pub(crate) fn perform_lsr(&mut self, val: u8) -> u8 {
        let carry = val & 0x01 != 0;
        let result = val >> 1;
        self.set_flags_shift_right(result, carry);
        result
    }

    #[inline]
    pub(crate) fn perform_rol(&mut self, val: u8) -> u8 {
        let old_carry = self.flag(CcFlag::C);
        let new_carry = val & 0x80 != 0;
        let result = (val << 1) | (old_carry as u8);
        self.set_flags_shift(result, new_carry);
        result
    }

    #[inline]
    pub(crate) fn perform_ror(&mut self, val: u8) -> u8 {
        let old_carry = self.flag(CcFlag::C);
        let new_carry = val & 0x01 != 0;
        let result = (val >> 1) | ((old_carry as u8) << 7);
        self.set_flags_shift_right(result, new_carry);
        result
    }
}
