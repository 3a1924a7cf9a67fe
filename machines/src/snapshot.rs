//! Host-facing projections of engine state.
//!
//! Plain serde structs: the engine fills them in, hosts serialize or
//! inspect them. None of them hold references back into the engine.

use serde::{Deserialize, Serialize};

use beamline_core::device::integrator::{ALG_MAX_X, ALG_MAX_Y, Vector};

/// CPU registers plus the counters a debugger shows next to them.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterSnapshot {
    pub pc: u16,
    pub a: u8,
    pub b: u8,
    pub x: u16,
    pub y: u16,
    pub u: u16,
    pub s: u16,
    pub dp: u8,
    pub cc: u8,
    pub d: u16,
    pub cycles: u64,
    pub bank: usize,
    pub frames: u64,
}

/// Last undecodable opcode seen by the CPU.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaultSnapshot {
    pub pc: u16,
    pub opcode: u8,
    pub page: u8,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub cycles: u64,
    pub instructions: u64,
    pub frames: u64,
    pub segments: usize,
    pub dropped_segments: u64,
    pub multi_bank: bool,
    pub bank_count: usize,
    pub last_fault: Option<FaultSnapshot>,
    pub via_t1: u16,
    pub via_ifr: u8,
    pub via_ier: u8,
    pub irq_line: bool,
    pub interrupts: u64,
}

/// A committed segment in integrator coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    pub x0: i32,
    pub y0: i32,
    pub x1: i32,
    pub y1: i32,
    pub color: u8,
}

impl From<&Vector> for Segment {
    fn from(v: &Vector) -> Self {
        Self {
            x0: v.x0,
            y0: v.y0,
            x1: v.x1,
            y1: v.y1,
            color: v.color,
        }
    }
}

/// A segment with coordinates scaled to [0, 1].
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct NormalizedSegment {
    pub x0: f32,
    pub y0: f32,
    pub x1: f32,
    pub y1: f32,
    pub color: u8,
}

impl Segment {
    pub fn normalized(&self) -> NormalizedSegment {
        let sx = |x: i32| x as f32 / ALG_MAX_X as f32;
        let sy = |y: i32| y as f32 / ALG_MAX_Y as f32;
        NormalizedSegment {
            x0: sx(self.x0),
            y0: sy(self.y0),
            x1: sx(self.x1),
            y1: sy(self.y1),
            color: self.color,
        }
    }
}

/// Why the debugger stopped.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PauseMode {
    Breakpoint,
    Step,
    Manual,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallFrame {
    pub function: String,
    pub address: u16,
    pub kind: String,
}

/// Emitted on every transition into the paused state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DebugEvent {
    pub pc: u16,
    pub pc_hex: String,
    pub mode: PauseMode,
    pub registers: RegisterSnapshot,
    pub call_stack: Vec<CallFrame>,
    pub cycles: u64,
}

impl DebugEvent {
    /// Event for a pause at the current PC. Without a symbol table the call
    /// stack is a single `MAIN` frame.
    pub fn new(mode: PauseMode, registers: RegisterSnapshot) -> Self {
        let pc = registers.pc;
        Self {
            pc,
            pc_hex: format!("0x{pc:04X}"),
            mode,
            call_stack: vec![CallFrame {
                function: "MAIN".to_string(),
                address: pc,
                kind: "program".to_string(),
            }],
            cycles: registers.cycles,
            registers,
        }
    }
}
