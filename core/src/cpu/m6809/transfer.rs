use super::M6809;
use crate::core::{Bus, BusMaster};

impl M6809 {
    // Register codes for TFR/EXG
    // 0=D, 1=X, 2=Y, 3=U, 4=S, 5=PC, 8=A, 9=B, 10=CC, 11=DP
    // 6, 7 and 12-15 are undefined: they read as all ones and ignore writes.

    fn get_reg_val(&self, id: u8) -> u16 {
        match id {
            0 => self.get_d(),
            1 => self.x,
            2 => self.y,
            3 => self.u,
            4 => self.s,
            5 => self.pc,
            8 => self.a as u16,
            9 => self.b as u16,
            10 => self.cc as u16,
            11 => self.dp as u16,
            6 | 7 => 0xFFFF,
            _ => 0xFF,
        }
    }

    fn set_reg_val(&mut self, id: u8, val: u16) {
        match id {
            0 => self.set_d(val),
            1 => self.x = val,
            2 => self.y = val,
            3 => self.u = val,
            4 => {
                self.s = val;
                self.nmi_armed = true;
            }
            5 => self.pc = val,
            8 => self.a = val as u8,
            9 => self.b = val as u8,
            10 => self.cc = val as u8,
            11 => self.dp = val as u8,
            _ => {}
        }
    }

    fn is_16bit(id: u8) -> bool {
        id < 8
    }

    /// Value of register `src` as seen by a register of `dst`'s width.
    /// 8-bit sources widen with 0xFF in the high byte; 16-bit sources
    /// narrow to their low byte.
    fn transfer_val(&self, src: u8, dst: u8) -> u16 {
        let val = self.get_reg_val(src);
        match (Self::is_16bit(src), Self::is_16bit(dst)) {
            (false, true) => 0xFF00 | val,
            (true, false) => val & 0x00FF,
            _ => val,
        }
    }

    /// TFR (0x1F): copy the register in the high nibble of the postbyte to
    /// the one in the low nibble.
    pub(crate) fn op_tfr<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        bus: &mut B,
        master: BusMaster,
    ) {
        let operand = self.fetch_byte(bus, master);
        let src = operand >> 4;
        let dst = operand & 0x0F;
        let val = self.transfer_val(src, dst);
        self.set_reg_val(dst, val);
    }

    /// EXG (0x1E): swap the two registers named by the postbyte.
    pub(crate) fn op_exg<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        bus: &mut B,
        master: BusMaster,
    ) {
        let operand = self.fetch_byte(bus, master);
        let r1 = operand >> 4;
        let r2 = operand & 0x0F;
        let to_r2 = self.transfer_val(r1, r2);
        let to_r1 = self.transfer_val(r2, r1);
        self.set_reg_val(r1, to_r1);
        self.set_reg_val(r2, to_r2);
    }
}
