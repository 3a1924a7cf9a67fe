//! Breakpoint and stepping state machine.
//!
//! The controller never executes anything itself. The engine asks it before
//! each instruction (`before_step`) and after (`after_step`) whether to
//! pause, and the controller answers from its state: the breakpoint set, the
//! active step request and a call-depth counter maintained by watching
//! call/return opcodes go past. Interrupt and SWI handler entries count as
//! calls and RTI as their return, so a handler running in the middle of a
//! step is stepped over like a subroutine.

use std::collections::{BTreeSet, VecDeque};

use crate::snapshot::{DebugEvent, PauseMode};

/// Instructions a step request may run before it gives up and free-runs.
pub const DEFAULT_STEP_CEILING: u64 = 1_000_000;

/// JSR direct/indexed/extended, BSR, LBSR.
pub fn is_call_opcode(opcode: u8) -> bool {
    matches!(opcode, 0x9D | 0xAD | 0xBD | 0x8D | 0x17)
}

/// RTS.
pub fn is_return_opcode(opcode: u8) -> bool {
    opcode == 0x39
}

/// RTI.
pub fn is_handler_return_opcode(opcode: u8) -> bool {
    opcode == 0x3B
}

/// What one CPU step did, as far as the controller is concerned.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Retired {
    /// An instruction ran to completion; carries its first opcode byte.
    Instruction(u8),
    /// The CPU entered an interrupt or SWI handler through its vector.
    HandlerEntry,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DebugState {
    /// No debug session: execution free-runs, breakpoints are not checked.
    Stopped,
    /// Free execution with breakpoints armed.
    Running,
    /// Halted; only stepping advances the machine.
    Paused,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepMode {
    /// Run until PC reaches the target, or the current routine returns.
    Over { target: u16 },
    /// Execute one instruction. With `native` set, keep going until a call
    /// instruction has executed and pause at its destination.
    Into { native: bool },
    /// Run until the current routine returns.
    Out,
}

pub struct DebugController {
    state: DebugState,
    step: Option<StepMode>,
    call_depth: i32,
    /// Instructions executed under the current step request.
    step_count: u64,
    step_ceiling: u64,
    breakpoints: BTreeSet<u16>,
    skip_once: bool,
    events: VecDeque<DebugEvent>,
}

impl Default for DebugController {
    fn default() -> Self {
        Self::new()
    }
}

impl DebugController {
    pub fn new() -> Self {
        Self {
            state: DebugState::Stopped,
            step: None,
            call_depth: 0,
            step_count: 0,
            step_ceiling: DEFAULT_STEP_CEILING,
            breakpoints: BTreeSet::new(),
            skip_once: false,
            events: VecDeque::new(),
        }
    }

    pub fn state(&self) -> DebugState {
        self.state
    }

    pub fn step_mode(&self) -> Option<StepMode> {
        self.step
    }

    pub fn is_paused(&self) -> bool {
        self.state == DebugState::Paused
    }

    pub fn is_stepping(&self) -> bool {
        self.step.is_some()
    }

    pub fn call_depth(&self) -> i32 {
        self.call_depth
    }

    pub fn skip_pending(&self) -> bool {
        self.skip_once
    }

    pub fn set_step_ceiling(&mut self, ceiling: u64) {
        self.step_ceiling = ceiling.max(1);
    }

    pub fn step_ceiling(&self) -> u64 {
        self.step_ceiling
    }

    // --- Breakpoints ---

    /// Add a breakpoint. The first breakpoint added outside a debug session
    /// starts one.
    pub fn add_breakpoint(&mut self, addr: u16) {
        let was_empty = self.breakpoints.is_empty();
        self.breakpoints.insert(addr);
        log::debug!("breakpoint added at 0x{addr:04X}");
        if was_empty && self.state == DebugState::Stopped {
            self.state = DebugState::Running;
        }
    }

    pub fn remove_breakpoint(&mut self, addr: u16) {
        if self.breakpoints.remove(&addr) {
            log::debug!("breakpoint removed at 0x{addr:04X}");
        }
    }

    pub fn clear_breakpoints(&mut self) {
        self.breakpoints.clear();
        log::debug!("breakpoints cleared");
    }

    pub fn has_breakpoint(&self, addr: u16) -> bool {
        self.breakpoints.contains(&addr)
    }

    pub fn breakpoints(&self) -> impl Iterator<Item = u16> + '_ {
        self.breakpoints.iter().copied()
    }

    // --- Controls ---

    /// Leave the paused state, or cancel a step request still in flight.
    /// Coming out of a pause, the breakpoint under PC is skipped once.
    pub fn resume(&mut self) {
        match self.state {
            DebugState::Paused => self.skip_once = true,
            DebugState::Running if self.step.is_some() => {}
            _ => return,
        }
        self.state = DebugState::Running;
        self.step = None;
        log::debug!("continue");
    }

    /// End the debug session. Breakpoints are kept.
    pub fn stop(&mut self) {
        self.state = DebugState::Stopped;
        self.step = None;
        self.skip_once = false;
        self.call_depth = 0;
        self.step_count = 0;
        log::debug!("stopped");
    }

    /// Start a step request. The engine then polls until it completes.
    ///
    /// A request made outside a pause starts stepping from the current PC,
    /// as if the machine had been paused there first.
    pub fn begin_step(&mut self, mode: StepMode) {
        self.step = Some(mode);
        self.state = DebugState::Running;
        self.call_depth = 0;
        self.step_count = 0;
        log::debug!("step {mode:?}");
    }

    /// Record the transition into the paused state.
    pub fn pause(&mut self, event: DebugEvent) {
        log::debug!("paused at {} ({:?})", event.pc_hex, event.mode);
        self.state = DebugState::Paused;
        self.step = None;
        self.step_count = 0;
        self.call_depth = 0;
        self.events.push_back(event);
    }

    /// Take all queued pause events, oldest first.
    pub fn drain_events(&mut self) -> Vec<DebugEvent> {
        self.events.drain(..).collect()
    }

    pub fn pending_events(&self) -> usize {
        self.events.len()
    }

    // --- Per-instruction checks ---

    /// Called with the PC and opcode of the instruction about to execute.
    /// Returns the reason to pause instead of executing it, if any.
    pub fn before_step(&mut self, pc: u16, opcode: u8) -> Option<PauseMode> {
        let skip = std::mem::take(&mut self.skip_once);

        if let Some(mode) = self.step {
            self.step_count += 1;
            if self.step_count > self.step_ceiling {
                log::debug!(
                    "step {mode:?} did not finish within {} instructions, running free",
                    self.step_ceiling
                );
                self.step = None;
                self.state = DebugState::Running;
            } else {
                // The breakpoint the step started from never re-triggers
                let first = self.step_count == 1;
                return match mode {
                    StepMode::Over { target } if pc == target => Some(PauseMode::Step),
                    StepMode::Over { .. } | StepMode::Out
                        if !first && self.breakpoints.contains(&pc) =>
                    {
                        Some(PauseMode::Breakpoint)
                    }
                    _ => {
                        log::trace!("step at 0x{pc:04X} op 0x{opcode:02X}");
                        None
                    }
                };
            }
        }

        if self.state == DebugState::Running && self.breakpoints.contains(&pc) {
            if skip {
                log::trace!("breakpoint at 0x{pc:04X} skipped once");
            } else {
                return Some(PauseMode::Breakpoint);
            }
        }
        None
    }

    /// Called after each CPU step with what it retired and the PC it left.
    pub fn after_step(&mut self, retired: Retired, new_pc: u16) -> Option<PauseMode> {
        let Some(mode) = self.step else {
            if self.state == DebugState::Running && self.breakpoints.contains(&new_pc) {
                return Some(PauseMode::Breakpoint);
            }
            return None;
        };

        match mode {
            StepMode::Into { native: false } => Some(PauseMode::Step),
            StepMode::Into { native: true } => {
                // Only a call made at the starting level counts, not one
                // made by a handler that ran in between
                let called = matches!(retired, Retired::Instruction(op) if is_call_opcode(op));
                if called && self.call_depth <= 0 {
                    return Some(PauseMode::Step);
                }
                self.track_depth(retired);
                None
            }
            StepMode::Over { target } => {
                self.track_depth(retired);
                if new_pc == target || self.call_depth < 0 {
                    return Some(PauseMode::Step);
                }
                None
            }
            StepMode::Out => {
                self.track_depth(retired);
                if self.call_depth < 0 {
                    return Some(PauseMode::Step);
                }
                None
            }
        }
    }

    fn track_depth(&mut self, retired: Retired) {
        match retired {
            Retired::HandlerEntry => self.call_depth += 1,
            Retired::Instruction(op) if is_call_opcode(op) => self.call_depth += 1,
            Retired::Instruction(op) if is_return_opcode(op) || is_handler_return_opcode(op) => {
                self.call_depth -= 1
            }
            Retired::Instruction(_) => {}
        }
    }
}
