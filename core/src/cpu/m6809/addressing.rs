use super::M6809;
use crate::core::{Bus, BusMaster};

impl M6809 {
    #[inline]
    pub(crate) fn fetch_byte<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        bus: &mut B,
        master: BusMaster,
    ) -> u8 {
        let data = bus.read(master, self.pc);
        self.pc = self.pc.wrapping_add(1);
        data
    }

    #[inline]
    pub(crate) fn fetch_word<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        bus: &mut B,
        master: BusMaster,
    ) -> u16 {
        let high = self.fetch_byte(bus, master);
        let low = self.fetch_byte(bus, master);
        u16::from_be_bytes([high, low])
    }

    #[inline]
    pub(crate) fn read_word<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        bus: &mut B,
        master: BusMaster,
        addr: u16,
    ) -> u16 {
        let high = bus.read(master, addr);
        let low = bus.read(master, addr.wrapping_add(1));
        u16::from_be_bytes([high, low])
    }

    #[inline]
    pub(crate) fn write_word<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        bus: &mut B,
        master: BusMaster,
        addr: u16,
        val: u16,
    ) {
        let [high, low] = val.to_be_bytes();
        bus.write(master, addr, high);
        bus.write(master, addr.wrapping_add(1), low);
    }

    /// DP:offset from the next program byte.
    pub(crate) fn ea_direct<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        bus: &mut B,
        master: BusMaster,
    ) -> u16 {
        let offset = self.fetch_byte(bus, master);
        u16::from_be_bytes([self.dp, offset])
    }

    /// Returns the value of the index register selected by 2-bit code.
    /// 0=X, 1=Y, 2=U, 3=S.
    #[inline]
    fn indexed_reg_value(&self, sel: u8) -> u16 {
        match sel & 0x03 {
            0 => self.x,
            1 => self.y,
            2 => self.u,
            _ => self.s,
        }
    }

    /// Sets the index register selected by 2-bit code.
    #[inline]
    fn set_indexed_reg(&mut self, sel: u8, val: u16) {
        match sel & 0x03 {
            0 => self.x = val,
            1 => self.y = val,
            2 => self.u = val,
            _ => self.s = val,
        }
    }

    /// Sign-extends a 5-bit value to 16-bit.
    #[inline]
    fn sign_extend_5(val: u8) -> u16 {
        if val & 0x10 != 0 {
            (val as u16) | 0xFFE0
        } else {
            val as u16
        }
    }

    /// Resolve an indexed-mode effective address from the postbyte at PC.
    ///
    /// | Postbyte   | Mode     | Extra | Indirect |
    /// |------------|----------|-------|----------|
    /// | 0RRnnnnn   | n5,R     | 1     | -        |
    /// | 1RRI0000   | ,R+      | 2     | illegal  |
    /// | 1RRI0001   | ,R++     | 3     | 6        |
    /// | 1RRI0010   | ,-R      | 2     | illegal  |
    /// | 1RRI0011   | ,--R     | 3     | 6        |
    /// | 1RRI0100   | ,R       | 0     | 3        |
    /// | 1RRI0101   | B,R      | 1     | 4        |
    /// | 1RRI0110   | A,R      | 1     | 4        |
    /// | 1RRI1000   | n8,R     | 1     | 4        |
    /// | 1RRI1001   | n16,R    | 4     | 7        |
    /// | 1RRI1011   | D,R      | 4     | 7        |
    /// | 1xxI1100   | n8,PCR   | 1     | 4        |
    /// | 1xxI1101   | n16,PCR  | 5     | 8        |
    /// | 1xx11111   | [n16]    | -     | 5        |
    ///
    /// Extra cycles are added to `extra_cycles`. Undefined postbytes record
    /// a fault and resolve to the selected register's value.
    pub(crate) fn ea_indexed<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        bus: &mut B,
        master: BusMaster,
    ) -> u16 {
        let postbyte = self.fetch_byte(bus, master);
        let reg_sel = (postbyte >> 5) & 0x03;
        let reg = self.indexed_reg_value(reg_sel);

        if postbyte & 0x80 == 0 {
            // 5-bit constant offset: bits 6-5 = register, bits 4-0 = offset
            self.extra_cycles += 1;
            return reg.wrapping_add(Self::sign_extend_5(postbyte & 0x1F));
        }

        let indirect = postbyte & 0x10 != 0;
        let (addr, extra) = match (postbyte & 0x0F, indirect) {
            (0x00, false) => {
                // ,R+
                self.set_indexed_reg(reg_sel, reg.wrapping_add(1));
                (reg, 2)
            }
            (0x01, _) => {
                // ,R++
                self.set_indexed_reg(reg_sel, reg.wrapping_add(2));
                (reg, 3)
            }
            (0x02, false) => {
                // ,-R
                let new_reg = reg.wrapping_sub(1);
                self.set_indexed_reg(reg_sel, new_reg);
                (new_reg, 2)
            }
            (0x03, _) => {
                // ,--R
                let new_reg = reg.wrapping_sub(2);
                self.set_indexed_reg(reg_sel, new_reg);
                (new_reg, 3)
            }
            (0x04, _) => (reg, 0),
            (0x05, _) => (reg.wrapping_add(self.b as i8 as i16 as u16), 1),
            (0x06, _) => (reg.wrapping_add(self.a as i8 as i16 as u16), 1),
            (0x08, _) => {
                let offset = self.fetch_byte(bus, master) as i8;
                (reg.wrapping_add(offset as i16 as u16), 1)
            }
            (0x09, _) => {
                let offset = self.fetch_word(bus, master);
                (reg.wrapping_add(offset), 4)
            }
            (0x0B, _) => (reg.wrapping_add(self.get_d()), 4),
            (0x0C, _) => {
                // PC-relative uses PC after reading the offset byte
                let offset = self.fetch_byte(bus, master) as i8;
                (self.pc.wrapping_add(offset as i16 as u16), 1)
            }
            (0x0D, _) => {
                let offset = self.fetch_word(bus, master);
                (self.pc.wrapping_add(offset), 5)
            }
            (0x0F, true) => {
                // [n16]: the pointer is read below like any other indirect mode
                let addr = self.fetch_word(bus, master);
                (addr, 2)
            }
            _ => {
                self.record_fault(postbyte, 1);
                return reg;
            }
        };

        self.extra_cycles += extra;
        if indirect {
            self.extra_cycles += 3;
            self.read_word(bus, master, addr)
        } else {
            addr
        }
    }

    /// Effective address for the memory operand of an accumulator-group or
    /// page-2/3 opcode: bits 5-4 select immediate (never reaches here),
    /// direct, indexed or extended.
    pub(crate) fn ea_for<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        opcode: u8,
        bus: &mut B,
        master: BusMaster,
    ) -> u16 {
        match (opcode >> 4) & 0x03 {
            1 => self.ea_direct(bus, master),
            2 => self.ea_indexed(bus, master),
            _ => self.fetch_word(bus, master),
        }
    }

    /// True when the opcode's addressing-mode bits select immediate.
    #[inline]
    pub(crate) fn is_immediate(opcode: u8) -> bool {
        (opcode >> 4) & 0x03 == 0
    }

    pub(crate) fn read_operand8<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        opcode: u8,
        bus: &mut B,
        master: BusMaster,
    ) -> u8 {
        if Self::is_immediate(opcode) {
            self.fetch_byte(bus, master)
        } else {
            let ea = self.ea_for(opcode, bus, master);
            bus.read(master, ea)
        }
    }

    pub(crate) fn read_operand16<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        opcode: u8,
        bus: &mut B,
        master: BusMaster,
    ) -> u16 {
        if Self::is_immediate(opcode) {
            self.fetch_word(bus, master)
        } else {
            let ea = self.ea_for(opcode, bus, master);
            self.read_word(bus, master, ea)
        }
    }
}
