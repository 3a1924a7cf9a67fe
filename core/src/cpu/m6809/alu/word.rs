use crate::cpu::m6809::M6809;

impl M6809 {
    #[inline]
    pub(crate) fn perform_add16(&mut self, acc: u16, m: u16) -> u16 {
        let (result, carry) = acc.overflowing_add(m);
        let overflow = (acc ^ result) & (m ^ result) & 0x8000 != 0;
        self.set_flags_arithmetic16(result, overflow, carry);
        result
    }

    #[inline]
    pub(crate) fn perform_sub16(&mut self, acc: u16, m: u16) -> u16 {
        let (result, borrow) = acc.overflowing_sub(m);
        let overflow = (acc ^ m) & (acc ^ result) & 0x8000 != 0;
        self.set_flags_arithmetic16(result, overflow, borrow);
        result
    }

    /// CMPD/CMPX/CMPY/CMPU/CMPS: subtract and discard.
    #[inline]
    pub(crate) fn perform_cmp16(&mut self, acc: u16, m: u16) {
        self.perform_sub16(acc, m);
    }
}
