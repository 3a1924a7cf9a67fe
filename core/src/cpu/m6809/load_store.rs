use super::{CcFlag, M6809};
use crate::core::{Bus, BusMaster};

impl M6809 {
    /// ST of a 16-bit register (STD/STX/STU/STY/STS) to a direct, indexed
    /// or extended address. N, Z from the value; V cleared.
    pub(crate) fn store16<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        opcode: u8,
        val: u16,
        bus: &mut B,
        master: BusMaster,
    ) {
        let ea = self.ea_for(opcode, bus, master);
        self.set_flags_logical16(val);
        self.write_word(bus, master, ea, val);
    }

    /// LEAX (0x30), LEAY (0x31), LEAS (0x32), LEAU (0x33).
    /// LEAX/LEAY set Z from the result; LEAS/LEAU affect no flags.
    pub(crate) fn op_lea<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        opcode: u8,
        bus: &mut B,
        master: BusMaster,
    ) {
        let ea = self.ea_indexed(bus, master);
        match opcode {
            0x30 => {
                self.x = ea;
                self.set_flag(CcFlag::Z, ea == 0);
            }
            0x31 => {
                self.y = ea;
                self.set_flag(CcFlag::Z, ea == 0);
            }
            0x32 => {
                self.s = ea;
                self.nmi_armed = true;
            }
            _ => self.u = ea,
        }
    }
}
