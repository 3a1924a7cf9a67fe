use super::{CcFlag, M6809};
use crate::core::{Bus, BusMaster};

impl M6809 {
    /// Evaluate the branch condition encoded in the low nibble of a
    /// relative branch opcode (shared by short and long forms).
    pub(crate) fn branch_condition(&self, opcode: u8) -> bool {
        let c = self.flag(CcFlag::C);
        let z = self.flag(CcFlag::Z);
        let v = self.flag(CcFlag::V);
        let n = self.flag(CcFlag::N);
        match opcode & 0x0F {
            0x0 => true,          // BRA
            0x1 => false,         // BRN
            0x2 => !(c || z),     // BHI
            0x3 => c || z,        // BLS
            0x4 => !c,            // BCC/BHS
            0x5 => c,             // BCS/BLO
            0x6 => !z,            // BNE
            0x7 => z,             // BEQ
            0x8 => !v,            // BVC
            0x9 => v,             // BVS
            0xA => !n,            // BPL
            0xB => n,             // BMI
            0xC => n == v,        // BGE
            0xD => n != v,        // BLT
            0xE => !z && n == v,  // BGT
            _ => z || n != v,     // BLE
        }
    }

    /// Short conditional branches (0x20-0x2F), 8-bit signed offset.
    pub(crate) fn op_branch<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        opcode: u8,
        bus: &mut B,
        master: BusMaster,
    ) {
        let offset = self.fetch_byte(bus, master) as i8;
        if self.branch_condition(opcode) {
            self.pc = self.pc.wrapping_add(offset as i16 as u16);
        }
    }

    /// Long conditional branches (0x10 0x20-0x2F), 16-bit offset.
    /// One extra cycle when taken.
    pub(crate) fn op_long_branch<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        opcode: u8,
        bus: &mut B,
        master: BusMaster,
    ) {
        let offset = self.fetch_word(bus, master);
        if self.branch_condition(opcode) {
            self.pc = self.pc.wrapping_add(offset);
            self.extra_cycles += 1;
        }
    }

    /// LBRA (0x16): always taken, 16-bit offset.
    pub(crate) fn op_lbra<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        bus: &mut B,
        master: BusMaster,
    ) {
        let offset = self.fetch_word(bus, master);
        self.pc = self.pc.wrapping_add(offset);
    }

    /// Push the return address on S and jump.
    fn call<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        bus: &mut B,
        master: BusMaster,
        target: u16,
    ) {
        let ret = self.pc;
        self.push_word_s(bus, master, ret);
        self.pc = target;
    }

    /// BSR (0x8D): 8-bit relative subroutine call.
    pub(crate) fn op_bsr<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        bus: &mut B,
        master: BusMaster,
    ) {
        let offset = self.fetch_byte(bus, master) as i8;
        let target = self.pc.wrapping_add(offset as i16 as u16);
        self.call(bus, master, target);
    }

    /// LBSR (0x17): 16-bit relative subroutine call.
    pub(crate) fn op_lbsr<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        bus: &mut B,
        master: BusMaster,
    ) {
        let offset = self.fetch_word(bus, master);
        let target = self.pc.wrapping_add(offset);
        self.call(bus, master, target);
    }

    /// JSR direct (0x9D), indexed (0xAD), extended (0xBD).
    pub(crate) fn op_jsr<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        opcode: u8,
        bus: &mut B,
        master: BusMaster,
    ) {
        let target = self.ea_for(opcode, bus, master);
        self.call(bus, master, target);
    }

    /// RTS (0x39): pull PC from S.
    pub(crate) fn op_rts<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        bus: &mut B,
        master: BusMaster,
    ) {
        self.pc = self.pull_word_s(bus, master);
    }
}
