//! Headless frame loop: run, report pauses, continue, print the result.

use std::io::{self, Write};

use beamline_core::device::integrator::FCYCLES_INIT;
use beamline_machines::snapshot::DebugEvent;
use beamline_machines::vectrex::Vectrex;
use serde_json::json;

use crate::config::OutputFormat;

/// Pause events reported before the runner clears all breakpoints.
const MAX_EVENTS: usize = 1000;

#[derive(Debug, Clone)]
pub struct RunOptions {
    pub frames: u32,
    pub breakpoints: Vec<u16>,
    pub step_ceiling: Option<u64>,
    pub output: OutputFormat,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            frames: 60,
            breakpoints: Vec::new(),
            step_ceiling: None,
            output: OutputFormat::Summary,
        }
    }
}

#[derive(Debug, Default)]
pub struct RunReport {
    pub cycles: u64,
    pub events: usize,
}

fn report_event(event: &DebugEvent, format: OutputFormat, out: &mut dyn Write) -> io::Result<()> {
    match format {
        OutputFormat::Json => writeln!(out, "{}", json!({ "event": event })),
        OutputFormat::Summary => writeln!(
            out,
            "{:?} at {} after {} cycles",
            event.mode, event.pc_hex, event.cycles
        ),
    }
}

/// Run `opts.frames` frames, stopping at breakpoints only long enough to
/// report them, then print the final state.
pub fn run(sys: &mut Vectrex, opts: &RunOptions, out: &mut dyn Write) -> io::Result<RunReport> {
    if let Some(ceiling) = opts.step_ceiling {
        sys.set_step_ceiling(ceiling);
    }
    for &addr in &opts.breakpoints {
        sys.add_breakpoint(addr);
    }

    let mut report = RunReport::default();
    let budget = FCYCLES_INIT as u64;

    for _ in 0..opts.frames {
        let mut executed = 0;
        while executed < budget {
            executed += sys.run_cycles(budget - executed);
            if !sys.debugger().is_paused() {
                continue;
            }
            for event in sys.drain_events() {
                report_event(&event, opts.output, out)?;
                report.events += 1;
            }
            if report.events >= MAX_EVENTS {
                log::warn!("{MAX_EVENTS} pause events reported, clearing breakpoints");
                sys.clear_breakpoints();
            }
            sys.debug_continue();
        }
        report.cycles += executed;
    }

    write_final_state(sys, opts.output, out)?;
    Ok(report)
}

fn write_final_state(sys: &Vectrex, format: OutputFormat, out: &mut dyn Write) -> io::Result<()> {
    let registers = sys.registers();
    let metrics = sys.metrics();
    match format {
        OutputFormat::Json => {
            writeln!(out, "{}", json!({ "registers": registers }))?;
            writeln!(out, "{}", json!({ "metrics": metrics }))?;
            writeln!(out, "{}", json!({ "segments": sys.frame_segments() }))
        }
        OutputFormat::Summary => {
            writeln!(
                out,
                "PC={:04X} A={:02X} B={:02X} X={:04X} Y={:04X} U={:04X} S={:04X} DP={:02X} CC={:02X}",
                registers.pc,
                registers.a,
                registers.b,
                registers.x,
                registers.y,
                registers.u,
                registers.s,
                registers.dp,
                registers.cc
            )?;
            writeln!(
                out,
                "cycles={} instructions={} frames={} segments={} dropped={} bank={}/{}",
                metrics.cycles,
                metrics.instructions,
                metrics.frames,
                sys.frame_segments().len(),
                metrics.dropped_segments,
                registers.bank,
                metrics.bank_count
            )?;
            if let Some(fault) = metrics.last_fault {
                writeln!(
                    out,
                    "last fault: opcode 0x{:02X} (page {}) at 0x{:04X}",
                    fault.opcode, fault.page, fault.pc
                )?;
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn machine() -> Vectrex {
        // Reset vector 0x0000; cartridge: NOP at 0, BRA * at 1
        let mut bios = vec![0u8; 0x2000];
        bios[0x1FFE] = 0x00;
        bios[0x1FFF] = 0x00;
        let mut sys = Vectrex::new();
        sys.load_bios(&bios);
        sys.load_program(&[0x12, 0x20, 0xFE]);
        sys.reset();
        sys
    }

    #[test]
    fn runs_requested_frames() {
        let mut sys = machine();
        let mut out = Vec::new();
        let opts = RunOptions {
            frames: 2,
            ..Default::default()
        };
        let report = run(&mut sys, &opts, &mut out).unwrap();
        assert!(report.cycles >= 2 * FCYCLES_INIT as u64);
        assert_eq!(report.events, 0);
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("PC=0001"));
    }

    #[test]
    fn breakpoint_is_reported_and_run_continues() {
        let mut sys = machine();
        let mut out = Vec::new();
        let opts = RunOptions {
            frames: 1,
            breakpoints: vec![0x0001],
            output: OutputFormat::Json,
            ..Default::default()
        };
        let report = run(&mut sys, &opts, &mut out).unwrap();
        assert!(report.events >= 1);
        assert!(report.cycles >= FCYCLES_INIT as u64);

        let text = String::from_utf8(out).unwrap();
        let first: serde_json::Value = serde_json::from_str(text.lines().next().unwrap()).unwrap();
        assert_eq!(first["event"]["mode"], "breakpoint");
        assert_eq!(first["event"]["pc_hex"], "0x0001");
        assert!(text.lines().any(|l| l.starts_with("{\"metrics\"")));
    }
}
