mod addressing;
mod alu;
mod branch;
mod cycles;
mod load_store;
mod stack;
mod transfer;

use crate::core::{
    Bus, BusMaster,
    bus::InterruptState,
    component::BusMasterComponent,
};
use crate::cpu::{
    Cpu,
    state::{CpuStateTrait, M6809State},
};

pub use cycles::{page1_cycles, page2_cycles, page3_cycles};

#[repr(u8)]
#[derive(Copy, Clone, Debug)]
pub enum CcFlag {
    C = 0x01, // Carry
    V = 0x02, // Overflow
    Z = 0x04, // Zero
    N = 0x08, // Negative
    I = 0x10, // IRQ mask
    H = 0x20, // Half carry
    F = 0x40, // FIRQ mask
    E = 0x80, // Entire
}

/// Interrupt vectors (big-endian pointers in the top of the address space).
pub const VECTOR_SWI3: u16 = 0xFFF2;
pub const VECTOR_SWI2: u16 = 0xFFF4;
pub const VECTOR_FIRQ: u16 = 0xFFF6;
pub const VECTOR_IRQ: u16 = 0xFFF8;
pub const VECTOR_SWI: u16 = 0xFFFA;
pub const VECTOR_NMI: u16 = 0xFFFC;
pub const VECTOR_RESET: u16 = 0xFFFE;

/// Why the CPU is not fetching instructions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WaitState {
    Running,
    /// CWAI: state already stacked, waiting for an unmasked interrupt.
    Cwai,
    /// SYNC: waiting for any interrupt line, masked or not.
    Sync,
}

/// An opcode or indexed postbyte the CPU could not decode.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Fault {
    /// Address of the first byte of the faulting instruction.
    pub pc: u16,
    /// The undecodable byte (opcode, or postbyte for indexed faults).
    pub opcode: u8,
    /// 1 for unprefixed opcodes, 2 or 3 for 0x10/0x11 prefixed ones.
    pub page: u8,
}

pub struct M6809 {
    // Registers (a,b,x,y,u,s,pc,cc)
    pub a: u8,
    pub b: u8,
    pub dp: u8,
    pub x: u16,
    pub y: u16,
    pub u: u16,
    pub s: u16,
    pub pc: u16,
    pub cc: u8,

    pub(crate) wait: WaitState,
    // Cycles added on top of the table count by indexed modes, stacking and
    // taken long branches. Reset at the start of every instruction.
    pub(crate) extra_cycles: u32,
    // Address of the instruction being executed (for fault records).
    pub(crate) instr_pc: u16,
    pub(crate) nmi_armed: bool,
    nmi_line: bool,

    last_fault: Option<Fault>,
    instructions: u64,
    interrupts: u64,
}

impl Default for M6809 {
    fn default() -> Self {
        Self::new()
    }
}

impl M6809 {
    pub fn new() -> Self {
        Self {
            a: 0,
            b: 0,
            dp: 0,
            x: 0,
            y: 0,
            u: 0,
            s: 0,
            pc: 0,
            cc: CcFlag::I as u8 | CcFlag::F as u8,
            wait: WaitState::Running,
            extra_cycles: 0,
            instr_pc: 0,
            nmi_armed: false,
            nmi_line: false,
            last_fault: None,
            instructions: 0,
            interrupts: 0,
        }
    }

    pub(crate) fn get_d(&self) -> u16 {
        u16::from_be_bytes([self.a, self.b])
    }

    pub(crate) fn set_d(&mut self, val: u16) {
        let bytes = val.to_be_bytes();
        self.a = bytes[0];
        self.b = bytes[1];
    }

    #[inline]
    pub(crate) fn set_flag(&mut self, flag: CcFlag, set: bool) {
        if set {
            self.cc |= flag as u8
        } else {
            self.cc &= !(flag as u8)
        }
    }

    #[inline]
    pub(crate) fn flag(&self, flag: CcFlag) -> bool {
        self.cc & flag as u8 != 0
    }

    /// Most recent undecodable opcode or postbyte, if any.
    pub fn last_fault(&self) -> Option<Fault> {
        self.last_fault
    }

    pub fn clear_fault(&mut self) {
        self.last_fault = None;
    }

    /// Instructions completed since reset.
    pub fn instructions(&self) -> u64 {
        self.instructions
    }

    /// Hardware interrupts (NMI, FIRQ, IRQ) serviced since reset.
    pub fn interrupts_taken(&self) -> u64 {
        self.interrupts
    }

    pub fn wait_state(&self) -> WaitState {
        self.wait
    }

    /// Reset: clear DP, mask interrupts and load PC from the reset vector.
    pub fn reset_with_bus<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        bus: &mut B,
        master: BusMaster,
    ) {
        self.dp = 0;
        self.cc = CcFlag::I as u8 | CcFlag::F as u8;
        self.wait = WaitState::Running;
        self.nmi_armed = false;
        self.nmi_line = false;
        self.last_fault = None;
        self.instructions = 0;
        self.interrupts = 0;
        self.pc = self.read_word(bus, master, VECTOR_RESET);
    }

    /// Execute one instruction (or service one interrupt) and return the
    /// number of E-clock cycles it took.
    pub fn step<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        bus: &mut B,
        master: BusMaster,
    ) -> u32 {
        let ints = bus.check_interrupts(master);
        if let Some(cycles) = self.handle_interrupts(ints, bus, master) {
            return cycles;
        }
        if self.wait != WaitState::Running {
            return 1;
        }

        self.extra_cycles = 0;
        self.instr_pc = self.pc;
        let opcode = self.fetch_byte(bus, master);
        let base = match opcode {
            0x10 => {
                let op = self.fetch_byte(bus, master);
                self.execute_page2(op, bus, master)
            }
            0x11 => {
                let op = self.fetch_byte(bus, master);
                self.execute_page3(op, bus, master)
            }
            _ => self.execute_page1(opcode, bus, master),
        };
        self.instructions += 1;
        base + self.extra_cycles
    }

    /// Record an undecodable byte. The instruction is treated as a no-op;
    /// the caller returns the fault cycle cost.
    pub(crate) fn record_fault(&mut self, opcode: u8, page: u8) {
        let fault = Fault {
            pc: self.instr_pc,
            opcode,
            page,
        };
        if self.last_fault.map(|f| f.pc) != Some(fault.pc) {
            log::warn!(
                "illegal opcode 0x{:02X} (page {}) at 0x{:04X}",
                opcode,
                page,
                fault.pc
            );
        }
        self.last_fault = Some(fault);
    }

    fn execute_page1<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        opcode: u8,
        bus: &mut B,
        master: BusMaster,
    ) -> u32 {
        let cycles = page1_cycles(opcode);
        if cycles == 0 {
            self.record_fault(opcode, 1);
            return 2;
        }

        match opcode {
            // Memory unary/shift and JMP: direct, indexed, extended
            0x00..=0x0F | 0x60..=0x7F => self.op_memory_unary(opcode, bus, master),

            // Misc inherent/immediate
            0x12 => {} // NOP
            0x13 => self.op_sync(),
            0x16 => self.op_lbra(bus, master),
            0x17 => self.op_lbsr(bus, master),
            0x19 => self.op_daa(),
            0x1A => self.op_orcc(bus, master),
            0x1C => self.op_andcc(bus, master),
            0x1D => self.op_sex(),

            // Transfer/Exchange
            0x1E => self.op_exg(bus, master),
            0x1F => self.op_tfr(bus, master),

            // Short branches
            0x20..=0x2F => self.op_branch(opcode, bus, master),

            // LEA
            0x30..=0x33 => self.op_lea(opcode, bus, master),

            // Stack operations
            0x34 => self.op_psh(bus, master, false),
            0x35 => self.op_pul(bus, master, false),
            0x36 => self.op_psh(bus, master, true),
            0x37 => self.op_pul(bus, master, true),

            // Subroutine / Return / Interrupt
            0x39 => self.op_rts(bus, master),
            0x3A => self.op_abx(),
            0x3B => self.op_rti(bus, master),
            0x3C => self.op_cwai(bus, master),
            0x3D => self.op_mul(),
            0x3F => self.op_swi(bus, master, VECTOR_SWI, true),

            // Register unary/shift
            0x40..=0x4F => self.a = self.op_register_unary(opcode, self.a),
            0x50..=0x5F => self.b = self.op_register_unary(opcode, self.b),

            // Accumulator groups
            0x8D => self.op_bsr(bus, master),
            0x80..=0xFF => self.op_accumulator(opcode, bus, master),

            _ => {
                self.record_fault(opcode, 1);
                return 2;
            }
        }
        cycles
    }

    fn execute_page2<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        opcode: u8,
        bus: &mut B,
        master: BusMaster,
    ) -> u32 {
        let cycles = page2_cycles(opcode);
        match opcode {
            // SWI2
            0x3F => self.op_swi(bus, master, VECTOR_SWI2, false),

            // Long branches
            0x20..=0x2F => self.op_long_branch(opcode, bus, master),

            // CMPD
            0x83 | 0x93 | 0xA3 | 0xB3 => {
                let m = self.read_operand16(opcode, bus, master);
                let d = self.get_d();
                self.perform_cmp16(d, m);
            }
            // CMPY
            0x8C | 0x9C | 0xAC | 0xBC => {
                let m = self.read_operand16(opcode, bus, master);
                self.perform_cmp16(self.y, m);
            }
            // LDY / STY
            0x8E | 0x9E | 0xAE | 0xBE => {
                self.y = self.read_operand16(opcode, bus, master);
                self.set_flags_logical16(self.y);
            }
            0x9F | 0xAF | 0xBF => self.store16(opcode, self.y, bus, master),
            // LDS / STS
            0xCE | 0xDE | 0xEE | 0xFE => {
                self.s = self.read_operand16(opcode, bus, master);
                self.set_flags_logical16(self.s);
                self.nmi_armed = true;
            }
            0xDF | 0xEF | 0xFF => self.store16(opcode, self.s, bus, master),

            _ => {
                self.record_fault(opcode, 2);
                return 3;
            }
        }
        cycles
    }

    fn execute_page3<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        opcode: u8,
        bus: &mut B,
        master: BusMaster,
    ) -> u32 {
        let cycles = page3_cycles(opcode);
        match opcode {
            // SWI3
            0x3F => self.op_swi(bus, master, VECTOR_SWI3, false),

            // CMPU
            0x83 | 0x93 | 0xA3 | 0xB3 => {
                let m = self.read_operand16(opcode, bus, master);
                self.perform_cmp16(self.u, m);
            }
            // CMPS
            0x8C | 0x9C | 0xAC | 0xBC => {
                let m = self.read_operand16(opcode, bus, master);
                self.perform_cmp16(self.s, m);
            }

            _ => {
                self.record_fault(opcode, 3);
                return 3;
            }
        }
        cycles
    }

    /// Sample the interrupt lines at an instruction boundary. Returns the
    /// cycles spent when an interrupt was taken.
    fn handle_interrupts<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        ints: InterruptState,
        bus: &mut B,
        master: BusMaster,
    ) -> Option<u32> {
        // NMI is edge-triggered and ignored until S has been loaded once
        let nmi_edge = ints.nmi && !self.nmi_line;
        self.nmi_line = ints.nmi;

        if nmi_edge && self.nmi_armed {
            return Some(self.enter_interrupt(bus, master, VECTOR_NMI, true, true));
        }
        if ints.firq && !self.flag(CcFlag::F) {
            return Some(self.enter_interrupt(bus, master, VECTOR_FIRQ, false, true));
        }
        if ints.irq && !self.flag(CcFlag::I) {
            return Some(self.enter_interrupt(bus, master, VECTOR_IRQ, true, false));
        }

        // A masked interrupt still releases SYNC; execution resumes in line
        if self.wait == WaitState::Sync && (ints.irq || ints.firq || ints.nmi) {
            self.wait = WaitState::Running;
        }
        None
    }
}

impl BusMasterComponent for M6809 {
    type Bus = dyn Bus<Address = u16, Data = u8>;

    fn step_with_bus(&mut self, bus: &mut Self::Bus, master: BusMaster) -> u32 {
        self.step(bus, master)
    }
}

impl Cpu for M6809 {
    fn reset(&mut self, bus: &mut Self::Bus, master: BusMaster) {
        self.reset_with_bus(bus, master);
    }

    fn is_sleeping(&self) -> bool {
        self.wait != WaitState::Running
    }
}

impl CpuStateTrait for M6809 {
    type Snapshot = M6809State;

    fn snapshot(&self) -> M6809State {
        M6809State {
            a: self.a,
            b: self.b,
            dp: self.dp,
            x: self.x,
            y: self.y,
            u: self.u,
            s: self.s,
            pc: self.pc,
            cc: self.cc,
        }
    }
}
