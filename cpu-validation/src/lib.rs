use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::Path;

use beamline_core::core::bus::InterruptState;
use beamline_core::core::{Bus, BusMaster};
use beamline_core::cpu::m6809::M6809;
use flate2::Compression;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use serde::{Deserialize, Serialize};

/// Where generated vectors live, relative to the crate root.
pub const TEST_DATA_DIR: &str = "test_data/m6809";

// --- TracingBus: flat 64KB memory with access recording ---

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum BusOp {
    Read,
    Write,
}

impl BusOp {
    pub fn as_str(self) -> &'static str {
        match self {
            BusOp::Read => "read",
            BusOp::Write => "write",
        }
    }
}

#[derive(Clone, Debug)]
pub struct BusAccess {
    pub addr: u16,
    pub data: u8,
    pub op: BusOp,
}

pub struct TracingBus {
    pub memory: [u8; 0x10000],
    pub accesses: Vec<BusAccess>,
}

impl TracingBus {
    pub fn new() -> Self {
        Self {
            memory: [0; 0x10000],
            accesses: Vec::new(),
        }
    }

    pub fn load(&mut self, addr: u16, data: &[u8]) {
        let start = addr as usize;
        self.memory[start..start + data.len()].copy_from_slice(data);
    }

    pub fn clear_accesses(&mut self) {
        self.accesses.clear();
    }
}

impl Default for TracingBus {
    fn default() -> Self {
        Self::new()
    }
}

impl Bus for TracingBus {
    type Address = u16;
    type Data = u8;

    fn read(&mut self, _master: BusMaster, addr: u16) -> u8 {
        let data = self.memory[addr as usize];
        self.accesses.push(BusAccess {
            addr,
            data,
            op: BusOp::Read,
        });
        data
    }

    fn write(&mut self, _master: BusMaster, addr: u16, data: u8) {
        self.memory[addr as usize] = data;
        self.accesses.push(BusAccess {
            addr,
            data,
            op: BusOp::Write,
        });
    }

    fn check_interrupts(&self, _target: BusMaster) -> InterruptState {
        InterruptState::default()
    }
}

// --- Test vector types ---

/// One recorded instruction: state before and after, the E-clock cycles it
/// was charged, and every bus access in order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestCase {
    pub name: String,
    pub initial: CpuState,
    #[serde(rename = "final")]
    pub final_state: CpuState,
    pub cycles: u32,
    pub accesses: Vec<(u16, u8, String)>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CpuState {
    pub pc: u16,
    pub s: u16,
    pub u: u16,
    pub a: u8,
    pub b: u8,
    pub dp: u8,
    pub x: u16,
    pub y: u16,
    pub cc: u8,
    pub ram: Vec<(u16, u8)>,
}

impl CpuState {
    /// Registers of `cpu` with an empty RAM list.
    pub fn capture(cpu: &M6809) -> Self {
        Self {
            pc: cpu.pc,
            s: cpu.s,
            u: cpu.u,
            a: cpu.a,
            b: cpu.b,
            dp: cpu.dp,
            x: cpu.x,
            y: cpu.y,
            cc: cpu.cc,
            ram: Vec::new(),
        }
    }

    /// Load the registers into `cpu` and the RAM bytes into `bus`.
    pub fn apply(&self, cpu: &mut M6809, bus: &mut TracingBus) {
        cpu.pc = self.pc;
        cpu.s = self.s;
        cpu.u = self.u;
        cpu.a = self.a;
        cpu.b = self.b;
        cpu.dp = self.dp;
        cpu.x = self.x;
        cpu.y = self.y;
        cpu.cc = self.cc;
        for &(addr, val) in &self.ram {
            bus.memory[addr as usize] = val;
        }
    }
}

// --- Gzipped JSON storage ---

pub fn write_cases(path: &Path, cases: &[TestCase]) -> io::Result<()> {
    let mut encoder = GzEncoder::new(BufWriter::new(File::create(path)?), Compression::default());
    serde_json::to_writer(&mut encoder, cases).map_err(io::Error::other)?;
    encoder.finish()?.flush()
}

pub fn read_cases(path: &Path) -> io::Result<Vec<TestCase>> {
    let decoder = GzDecoder::new(BufReader::new(File::open(path)?));
    serde_json::from_reader(decoder).map_err(io::Error::other)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracing_bus_records_in_order() {
        let mut bus = TracingBus::new();
        bus.load(0x1000, &[0xAB]);
        assert_eq!(bus.read(BusMaster::Cpu(0), 0x1000), 0xAB);
        bus.write(BusMaster::Cpu(0), 0x2000, 0x55);
        assert_eq!(bus.accesses.len(), 2);
        assert_eq!(bus.accesses[0].op, BusOp::Read);
        assert_eq!(bus.accesses[1].addr, 0x2000);
        assert_eq!(bus.memory[0x2000], 0x55);
    }

    #[test]
    fn cases_round_trip_through_gzip() {
        let path = std::env::temp_dir().join(format!("beamline-cases-{}.json.gz", std::process::id()));
        let case = TestCase {
            name: "12".to_string(),
            initial: CpuState::capture(&M6809::new()),
            final_state: CpuState::capture(&M6809::new()),
            cycles: 2,
            accesses: vec![(0x0000, 0x12, "read".to_string())],
        };
        write_cases(&path, std::slice::from_ref(&case)).expect("write");
        let back = read_cases(&path).expect("read");
        std::fs::remove_file(&path).ok();
        assert_eq!(back.len(), 1);
        assert_eq!(back[0].initial, case.initial);
        assert_eq!(back[0].cycles, 2);
    }
}
