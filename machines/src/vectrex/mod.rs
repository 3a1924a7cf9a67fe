//! Vectrex-class vector console.
//!
//! `Vectrex` owns the CPU and the board as sibling fields, so each step can
//! lend the board to the CPU as its bus. Every instruction's cycle count is
//! then replayed through the board one cycle at a time (VIA timers, shift
//! register, beam integrator) before the next instruction samples IRQ.

pub mod board;
pub mod cartridge;

use beamline_core::core::machine::{InputButton, Machine};
use beamline_core::core::{Bus, BusMaster};
use beamline_core::cpu::CpuStateTrait;
use beamline_core::cpu::m6809::M6809;
use beamline_core::device::integrator::{ALG_MAX_X, ALG_MAX_Y, FCYCLES_INIT, Vector};
use beamline_core::device::dac::JOY_CENTER;

use crate::debugger::{DebugController, Retired, StepMode};
use crate::rom_loader::{RomLoadError, RomSet, crc32};
use crate::snapshot::{
    DebugEvent, FaultSnapshot, MetricsSnapshot, PauseMode, RegisterSnapshot, Segment,
};

pub use board::{BIOS_SIZE, RAM_SIZE, VectrexBoard};
pub use cartridge::{BANK_REGISTER, BANK_SIZE, Cartridge, MAX_CART_SIZE};

/// CPU E clock.
pub const CPU_CLOCK_HZ: u64 = 1_500_000;

/// ROM set file names used by the registry factory.
pub const BIOS_FILE: &str = "bios.bin";
pub const CART_FILE: &str = "cart.bin";

// Input button IDs
pub const INPUT_BUTTON_1: u8 = 0;
pub const INPUT_BUTTON_2: u8 = 1;
pub const INPUT_BUTTON_3: u8 = 2;
pub const INPUT_BUTTON_4: u8 = 3;
pub const INPUT_LEFT: u8 = 4;
pub const INPUT_RIGHT: u8 = 5;
pub const INPUT_UP: u8 = 6;
pub const INPUT_DOWN: u8 = 7;

const VECTREX_INPUT_MAP: &[InputButton] = &[
    InputButton {
        id: INPUT_BUTTON_1,
        name: "Button 1",
    },
    InputButton {
        id: INPUT_BUTTON_2,
        name: "Button 2",
    },
    InputButton {
        id: INPUT_BUTTON_3,
        name: "Button 3",
    },
    InputButton {
        id: INPUT_BUTTON_4,
        name: "Button 4",
    },
    InputButton {
        id: INPUT_LEFT,
        name: "Left",
    },
    InputButton {
        id: INPUT_RIGHT,
        name: "Right",
    },
    InputButton {
        id: INPUT_UP,
        name: "Up",
    },
    InputButton {
        id: INPUT_DOWN,
        name: "Down",
    },
];

/// Digital joystick directions currently held.
#[derive(Clone, Copy, Default)]
struct Joystick {
    left: bool,
    right: bool,
    up: bool,
    down: bool,
}

impl Joystick {
    fn pot_x(&self) -> u8 {
        match (self.left, self.right) {
            (true, false) => 0x00,
            (false, true) => 0xFF,
            _ => JOY_CENTER,
        }
    }

    fn pot_y(&self) -> u8 {
        match (self.down, self.up) {
            (true, false) => 0x00,
            (false, true) => 0xFF,
            _ => JOY_CENTER,
        }
    }
}

pub struct Vectrex {
    cpu: M6809,
    board: VectrexBoard,
    debugger: DebugController,

    cycles: u64,
    joystick: Joystick,
    buttons: u8,
    bios_loaded: bool,
    powered: bool,
}

impl Default for Vectrex {
    fn default() -> Self {
        Self::new()
    }
}

impl Vectrex {
    pub fn new() -> Self {
        Self {
            cpu: M6809::new(),
            board: VectrexBoard::new(),
            debugger: DebugController::new(),
            cycles: 0,
            joystick: Joystick::default(),
            buttons: 0,
            bios_loaded: false,
            powered: false,
        }
    }

    /// Build a machine from a ROM set holding `bios.bin` and, optionally,
    /// `cart.bin`, and reset it.
    pub fn from_rom_set(rom_set: &RomSet) -> Result<Self, RomLoadError> {
        let mut sys = Self::new();
        sys.load_bios(rom_set.require(BIOS_FILE)?);
        if rom_set.get(CART_FILE).is_some() {
            sys.load_program(rom_set.require(CART_FILE)?);
        }
        sys.reset();
        Ok(sys)
    }

    // --- Loading ---

    /// Install the 8 KB system ROM. Longer images are truncated.
    pub fn load_bios(&mut self, data: &[u8]) {
        let dropped = self.board.load_bios(data);
        if dropped > 0 {
            log::warn!("BIOS image truncated: {dropped} bytes past 0x{BIOS_SIZE:X} dropped");
        }
        log::info!("BIOS loaded: {} bytes, CRC32 {:08X}", data.len(), crc32(data));
        self.bios_loaded = true;
    }

    /// Insert a cartridge image at the start of cartridge space.
    pub fn load_program(&mut self, data: &[u8]) {
        self.load_program_at(data, 0);
    }

    /// Insert a cartridge image at byte offset `base`. Images that reach past
    /// 32 KB put the slot into multi-bank mode.
    pub fn load_program_at(&mut self, data: &[u8], base: u16) {
        let dropped = self.board.cart.load(data, base as usize);
        if dropped > 0 {
            log::warn!("cartridge image truncated: {dropped} bytes past 0x{MAX_CART_SIZE:X} dropped");
        }
        let cart = self.board.cartridge();
        log::info!(
            "cartridge loaded: {} bytes at 0x{base:04X}, CRC32 {:08X}, {}",
            data.len(),
            crc32(data),
            if cart.is_multi_bank() {
                format!("{} banks", cart.bank_count())
            } else {
                "single bank".to_string()
            }
        );
    }

    // --- Execution ---

    /// Power-on reset: devices to their reset state, CPU to the reset vector.
    pub fn reset(&mut self) {
        self.board.reset();
        self.apply_inputs();
        self.cpu.reset_with_bus(&mut self.board, BusMaster::Cpu(0));
        self.cycles = 0;
        self.powered = true;
    }

    /// Execute one instruction with no debugger involvement and replay its
    /// cycles through the board. Returns the cycles taken.
    pub fn step(&mut self) -> u32 {
        let cycles = self.cpu.step(&mut self.board, BusMaster::Cpu(0));
        for _ in 0..cycles {
            self.board.tick();
        }
        self.board.beam.end_instruction(cycles);
        self.cycles += u64::from(cycles);
        cycles
    }

    /// Advance the debugger state machine by one instruction.
    ///
    /// Returns the cycles executed, or `None` when the machine is paused or
    /// the debugger paused it instead of executing.
    pub fn poll(&mut self) -> Option<u32> {
        if self.debugger.is_paused() {
            return None;
        }
        let pc = self.cpu.pc;
        let opcode = self.board.read(BusMaster::Debugger, pc);
        if let Some(mode) = self.debugger.before_step(pc, opcode) {
            self.enter_pause(mode);
            return None;
        }

        let taken = self.cpu.interrupts_taken();
        let swi = match opcode {
            0x3F => true,
            0x10 | 0x11 => self.board.read(BusMaster::Debugger, pc.wrapping_add(1)) == 0x3F,
            _ => false,
        };
        let cycles = self.step();

        // A serviced interrupt means the peeked instruction never ran
        let retired = if swi || self.cpu.interrupts_taken() != taken {
            Retired::HandlerEntry
        } else {
            Retired::Instruction(opcode)
        };
        if let Some(mode) = self.debugger.after_step(retired, self.cpu.pc) {
            self.enter_pause(mode);
        }
        Some(cycles)
    }

    /// Run until at least `budget` cycles have executed or the debugger
    /// pauses. Returns the cycles executed.
    pub fn run_cycles(&mut self, budget: u64) -> u64 {
        let mut executed = 0;
        while executed < budget {
            match self.poll() {
                Some(cycles) => executed += u64::from(cycles),
                None => break,
            }
            if self.debugger.is_paused() {
                break;
            }
        }
        executed
    }

    fn enter_pause(&mut self, mode: PauseMode) {
        let event = DebugEvent::new(mode, self.registers());
        self.debugger.pause(event);
    }

    fn drive_step(&mut self) {
        while self.debugger.is_stepping() {
            if self.poll().is_none() {
                break;
            }
        }
    }

    // --- Debug control ---

    pub fn debugger(&self) -> &DebugController {
        &self.debugger
    }

    pub fn add_breakpoint(&mut self, addr: u16) {
        self.debugger.add_breakpoint(addr);
    }

    pub fn remove_breakpoint(&mut self, addr: u16) {
        self.debugger.remove_breakpoint(addr);
    }

    pub fn clear_breakpoints(&mut self) {
        self.debugger.clear_breakpoints();
    }

    /// Resume from a pause; the breakpoint under PC is skipped once.
    pub fn debug_continue(&mut self) {
        self.debugger.resume();
    }

    /// Pause a running session at the current PC.
    pub fn debug_pause(&mut self) {
        if self.debugger.state() == crate::debugger::DebugState::Running {
            self.enter_pause(PauseMode::Manual);
        }
    }

    pub fn debug_stop(&mut self) {
        self.debugger.stop();
    }

    pub fn set_step_ceiling(&mut self, ceiling: u64) {
        self.debugger.set_step_ceiling(ceiling);
    }

    /// Start a step over without running it; each later `poll()` advances
    /// it by one instruction until it pauses, is cancelled by
    /// `debug_continue`/`debug_stop`, or hits the step ceiling.
    pub fn begin_step_over(&mut self, target: u16) {
        self.debugger.begin_step(StepMode::Over { target });
    }

    pub fn begin_step_into(&mut self, native: bool) {
        self.debugger.begin_step(StepMode::Into { native });
    }

    pub fn begin_step_out(&mut self) {
        self.debugger.begin_step(StepMode::Out);
    }

    /// Run until PC reaches `target` or the current routine returns. Falls
    /// back to free-running after the step ceiling.
    pub fn step_over(&mut self, target: u16) {
        self.begin_step_over(target);
        self.drive_step();
    }

    /// Execute one instruction, or with `native` set, run up to and through
    /// the next call instruction.
    pub fn step_into(&mut self, native: bool) {
        self.begin_step_into(native);
        self.drive_step();
    }

    /// Run until the current routine returns.
    pub fn step_out(&mut self) {
        self.begin_step_out();
        self.drive_step();
    }

    pub fn drain_events(&mut self) -> Vec<DebugEvent> {
        self.debugger.drain_events()
    }

    // --- Host accessors ---

    pub fn is_initialized(&self) -> bool {
        self.bios_loaded && self.powered
    }

    pub fn registers(&self) -> RegisterSnapshot {
        if !self.powered {
            return RegisterSnapshot::default();
        }
        let cpu = self.cpu.snapshot();
        RegisterSnapshot {
            pc: cpu.pc,
            a: cpu.a,
            b: cpu.b,
            x: cpu.x,
            y: cpu.y,
            u: cpu.u,
            s: cpu.s,
            dp: cpu.dp,
            cc: cpu.cc,
            d: cpu.d(),
            cycles: self.cycles,
            bank: self.board.cart.current_bank(),
            frames: self.board.beam.frames(),
        }
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        if !self.powered {
            return MetricsSnapshot::default();
        }
        let via = self.board.via();
        let beam = self.board.beam();
        MetricsSnapshot {
            cycles: self.cycles,
            instructions: self.cpu.instructions(),
            frames: beam.frames(),
            segments: beam.draw_list().len(),
            dropped_segments: beam.dropped(),
            multi_bank: self.board.cart.is_multi_bank(),
            bank_count: self.board.cart.bank_count(),
            last_fault: self.cpu.last_fault().map(|f| FaultSnapshot {
                pc: f.pc,
                opcode: f.opcode,
                page: f.page,
            }),
            via_t1: via.t1_counter(),
            via_ifr: via.ifr(),
            via_ier: via.ier(),
            irq_line: via.irq(),
            interrupts: self.cpu.interrupts_taken(),
        }
    }

    /// Segments committed so far in the frame being drawn.
    pub fn segments(&self) -> Vec<Segment> {
        self.board.beam.draw_list().iter().map(Segment::from).collect()
    }

    /// Segments of the last completed frame.
    pub fn frame_segments(&self) -> Vec<Segment> {
        self.board.beam.erase_list().iter().map(Segment::from).collect()
    }

    pub fn cpu(&self) -> &M6809 {
        &self.cpu
    }

    pub fn cpu_mut(&mut self) -> &mut M6809 {
        &mut self.cpu
    }

    pub fn board(&self) -> &VectrexBoard {
        &self.board
    }

    /// Side-effect-free memory read for hosts and tests.
    pub fn peek(&mut self, addr: u16) -> u8 {
        self.board.read(BusMaster::Debugger, addr)
    }

    /// Memory write as the debugger (bank register included).
    pub fn poke(&mut self, addr: u16, data: u8) {
        self.board.write(BusMaster::Debugger, addr, data);
    }

    // --- Input ---

    fn apply_inputs(&mut self) {
        for button in 0..4 {
            self.board.set_button(button, self.buttons & (1 << button) != 0);
        }
        self.board.set_pot(0, self.joystick.pot_x());
        self.board.set_pot(1, self.joystick.pot_y());
    }
}

impl Machine for Vectrex {
    fn display_extent(&self) -> (i32, i32) {
        (ALG_MAX_X, ALG_MAX_Y)
    }

    fn run_frame(&mut self) -> u64 {
        self.run_cycles(FCYCLES_INIT as u64)
    }

    fn frame_vectors(&self) -> &[Vector] {
        self.board.beam.erase_list()
    }

    fn set_input(&mut self, button: u8, pressed: bool) {
        match button {
            INPUT_BUTTON_1..=INPUT_BUTTON_4 => {
                if pressed {
                    self.buttons |= 1 << button;
                } else {
                    self.buttons &= !(1 << button);
                }
            }
            INPUT_LEFT => self.joystick.left = pressed,
            INPUT_RIGHT => self.joystick.right = pressed,
            INPUT_UP => self.joystick.up = pressed,
            INPUT_DOWN => self.joystick.down = pressed,
            _ => return,
        }
        self.apply_inputs();
    }

    fn input_map(&self) -> &[InputButton] {
        VECTREX_INPUT_MAP
    }

    fn reset(&mut self) {
        Vectrex::reset(self);
    }
}

fn create_vectrex(rom_set: &RomSet) -> Result<Box<dyn Machine>, RomLoadError> {
    Ok(Box::new(Vectrex::from_rom_set(rom_set)?))
}

inventory::submit! {
    crate::registry::MachineEntry::new("vectrex", BIOS_FILE, create_vectrex)
}
