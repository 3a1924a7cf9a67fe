mod common;

use beamline_machines::debugger::DebugState;
use beamline_machines::snapshot::PauseMode;
use common::*;

// =================================================================
// Stepping
// =================================================================

#[test]
fn test_step_over_runs_through_subroutine() {
    let mut sys = machine(&call_program(), 0x0000);
    sys.step(); // LDS
    assert_eq!(sys.registers().pc, 0x0004);

    sys.step_over(0x0007);
    assert_eq!(sys.registers().pc, 0x0007);
    assert!(sys.debugger().is_paused());

    let events = sys.drain_events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].mode, PauseMode::Step);
    assert_eq!(events[0].pc, 0x0007);
    assert_eq!(events[0].pc_hex, "0x0007");
    assert_eq!(events[0].call_stack.len(), 1);
    assert_eq!(events[0].call_stack[0].function, "MAIN");
    assert_eq!(events[0].cycles, sys.registers().cycles);
}

#[test]
fn test_step_out_returns_to_caller() {
    let mut sys = machine(&call_program(), 0x0000);
    sys.step(); // LDS
    sys.step(); // JSR
    assert_eq!(sys.registers().pc, 0x0010);

    sys.step_out();
    assert_eq!(sys.registers().pc, 0x0007);
    let events = sys.drain_events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].mode, PauseMode::Step);
}

#[test]
fn test_step_into_executes_one_instruction() {
    let mut sys = machine(&call_program(), 0x0000);
    sys.step_into(false);
    assert_eq!(sys.registers().pc, 0x0004);
    sys.step_into(false);
    assert_eq!(sys.registers().pc, 0x0010);
    assert_eq!(sys.drain_events().len(), 2);
}

#[test]
fn test_native_step_into_stops_after_call() {
    let mut sys = machine(&call_program(), 0x0000);
    sys.step_into(true);
    assert_eq!(sys.registers().pc, 0x0010);
    assert_eq!(sys.metrics().instructions, 2);
}

#[test]
fn test_step_ceiling_falls_back_to_running() {
    let mut sys = machine(&call_program(), 0x0000);
    for _ in 0..6 {
        sys.step();
    }
    assert_eq!(sys.registers().pc, 0x0008); // BRA *

    sys.set_step_ceiling(50);
    sys.step_over(0x4000);
    assert!(!sys.debugger().is_stepping());
    assert_eq!(sys.debugger().state(), DebugState::Running);
    assert!(sys.drain_events().is_empty());
    // The instruction that crosses the ceiling still executes
    assert_eq!(sys.metrics().instructions, 6 + 51);
}

/// Arms a one-shot T1 interrupt (handler at 0x0100 acknowledges it and
/// returns), then runs `tail` from 0x0012. 0x0030 holds `routine`.
fn irq_program(tail: &[u8], routine: &[u8]) -> Vec<u8> {
    cart_with(&[
        (0x0000, &[0x10, 0xCE, 0xCB, 0xFF]), // LDS #$CBFF
        (0x0004, &[0x86, 0xC0]),             // LDA #$C0
        (0x0006, &[0xB7, 0xD0, 0x0E]),       // STA IER (enable T1)
        (0x0009, &[0x86, 0x02]),             // LDA #$02
        (0x000B, &[0xB7, 0xD0, 0x04]),       // STA T1L
        (0x000E, &[0x4F]),                   // CLRA
        (0x000F, &[0xB7, 0xD0, 0x05]),       // STA T1H (start)
        (0x0012, tail),
        (0x0030, routine),
        (0x0100, &[0xB6, 0xD0, 0x04, 0x3B]), // handler: LDA T1C-L, RTI
    ])
}

#[test]
fn test_step_out_runs_through_interrupt_taken_at_rts() {
    // JSR $0030, BRA *; routine: ANDCC #$EF, RTS
    let cart = irq_program(&[0xBD, 0x00, 0x30, 0x20, 0xFE], &[0x1C, 0xEF, 0x39]);
    let mut sys = machine(&cart, 0x0100);
    for _ in 0..8 {
        sys.step();
    }
    assert_eq!(sys.registers().pc, 0x0030);
    assert!(sys.metrics().irq_line);

    // The IRQ is taken where the RTS would run; the handler returns to it
    sys.step_out();
    assert_eq!(sys.registers().pc, 0x0015);
    assert_eq!(sys.metrics().interrupts, 1);
    let events = sys.drain_events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].mode, PauseMode::Step);
}

#[test]
fn test_native_step_into_is_not_fooled_by_interrupt() {
    // ANDCC #$EF, JSR $0030, BRA *; routine: NOP, RTS
    let cart = irq_program(&[0x1C, 0xEF, 0xBD, 0x00, 0x30, 0x20, 0xFE], &[0x12, 0x39]);
    let mut sys = machine(&cart, 0x0100);
    for _ in 0..8 {
        sys.step();
    }
    assert_eq!(sys.registers().pc, 0x0014);
    assert_eq!(sys.metrics().interrupts, 0);

    sys.step_into(true);
    assert_eq!(sys.registers().pc, 0x0030);
    assert_eq!(sys.metrics().interrupts, 1);
    assert_eq!(sys.drain_events().len(), 1);
}

#[test]
fn test_step_over_tracks_depth_across_interrupt() {
    let cart = irq_program(&[0xBD, 0x00, 0x30, 0x20, 0xFE], &[0x1C, 0xEF, 0x12, 0x39]);
    let mut sys = machine(&cart, 0x0100);
    for _ in 0..8 {
        sys.step();
    }
    assert_eq!(sys.registers().pc, 0x0030);

    // Target is never reached; the routine returning ends the step
    sys.step_over(0x7000);
    assert_eq!(sys.registers().pc, 0x0015);
    assert_eq!(sys.metrics().interrupts, 1);
    assert_eq!(sys.drain_events()[0].mode, PauseMode::Step);
}

// =================================================================
// Polled stepping
// =================================================================

#[test]
fn test_step_from_stopped_session_starts_stepping() {
    let mut sys = machine(&call_program(), 0x0000);
    assert_eq!(sys.debugger().state(), DebugState::Stopped);
    sys.begin_step_into(false);
    assert!(sys.debugger().is_stepping());
    assert_eq!(sys.debugger().state(), DebugState::Running);

    assert!(sys.poll().is_some());
    assert!(sys.debugger().is_paused());
    assert_eq!(sys.registers().pc, 0x0004);
}

#[test]
fn test_stop_cancels_step_in_flight() {
    let mut sys = machine(&call_program(), 0x0000);
    for _ in 0..6 {
        sys.step();
    }
    sys.begin_step_over(0x4000);
    for _ in 0..5 {
        assert!(sys.poll().is_some());
    }
    assert!(sys.debugger().is_stepping());

    sys.debug_stop();
    assert!(!sys.debugger().is_stepping());
    assert!(sys.poll().is_some());
    assert!(!sys.debugger().is_stepping());
    assert_eq!(sys.debugger().state(), DebugState::Stopped);
    assert!(sys.drain_events().is_empty());
}

#[test]
fn test_continue_cancels_step_in_flight() {
    let mut sys = machine(&call_program(), 0x0000);
    for _ in 0..6 {
        sys.step();
    }
    sys.begin_step_out();
    assert!(sys.poll().is_some());

    sys.debug_continue();
    assert!(!sys.debugger().is_stepping());
    assert_eq!(sys.debugger().state(), DebugState::Running);
    assert!(sys.run_cycles(500) >= 500);
    assert!(sys.drain_events().is_empty());
}

// =================================================================
// Breakpoints
// =================================================================

#[test]
fn test_breakpoint_pauses_and_continue_skips_it_once() {
    let mut sys = machine(&call_program(), 0x0000);
    sys.add_breakpoint(0x0007);
    assert_eq!(sys.debugger().state(), DebugState::Running);

    sys.run_cycles(1_000);
    assert_eq!(sys.registers().pc, 0x0007);
    let events = sys.drain_events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].mode, PauseMode::Breakpoint);

    // Paused: nothing runs
    assert_eq!(sys.run_cycles(1_000), 0);
    assert!(sys.poll().is_none());

    sys.debug_continue();
    let executed = sys.run_cycles(1_000);
    assert!(executed >= 1_000);
    assert!(sys.drain_events().is_empty());
    assert_eq!(sys.registers().pc, 0x0008);
}

#[test]
fn test_breakpoint_in_subroutine_hit_by_step_over() {
    let mut sys = machine(&call_program(), 0x0000);
    sys.step(); // LDS
    sys.add_breakpoint(0x0011);
    sys.step_over(0x0007);

    assert_eq!(sys.registers().pc, 0x0011);
    let events = sys.drain_events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].mode, PauseMode::Breakpoint);
}

#[test]
fn test_removed_breakpoint_does_not_fire() {
    let mut sys = machine(&call_program(), 0x0000);
    sys.add_breakpoint(0x0007);
    sys.remove_breakpoint(0x0007);
    sys.run_cycles(500);
    assert!(sys.drain_events().is_empty());
    assert!(!sys.debugger().is_paused());
}

#[test]
fn test_manual_pause_and_stop() {
    let mut sys = machine(&call_program(), 0x0000);
    // No session yet: pause is ignored
    sys.debug_pause();
    assert!(!sys.debugger().is_paused());

    sys.add_breakpoint(0x7FFF);
    sys.run_cycles(20);
    sys.debug_pause();
    assert!(sys.debugger().is_paused());
    let events = sys.drain_events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].mode, PauseMode::Manual);

    sys.debug_stop();
    assert_eq!(sys.debugger().state(), DebugState::Stopped);
    assert!(sys.run_cycles(100) >= 100);
}

#[test]
fn test_debug_event_serializes_lowercase_mode() {
    let mut sys = machine(&call_program(), 0x0000);
    sys.step_into(false);
    let events = sys.drain_events();
    let json = serde_json::to_value(&events[0]).expect("serializable");
    assert_eq!(json["mode"], "step");
    assert_eq!(json["pc_hex"], "0x0004");
    assert_eq!(json["registers"]["s"], 0xCBFF);
}
