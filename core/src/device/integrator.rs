//! Analog beam integrator.
//!
//! The beam position is the running sum of the DAC deltas, one step per
//! CPU cycle. While the blank line is asserted the beam is "on" and the path
//! it sweeps is recorded as straight segments: a new segment starts whenever
//! the deltas or the intensity change. Segments go into a double-buffered
//! list that swaps once per display frame, with a hash table that lets a
//! segment retraced unchanged on the next frame update the existing entry
//! instead of producing a duplicate.

/// Integrator X extent. Coordinates run from 0 to `ALG_MAX_X - 1`.
pub const ALG_MAX_X: i32 = 33_000;
/// Integrator Y extent.
pub const ALG_MAX_Y: i32 = 41_000;
/// Capacity of each vector buffer.
pub const VECTOR_CNT: usize = 50_000;
/// Size of the dedup hash table (prime).
pub const VECTOR_HASH: usize = 65_521;
/// Intensity value marking an erased vector.
pub const VECTREX_COLORS: u8 = 128;
/// CPU cycles per display frame (1.5 MHz / 30 Hz).
pub const FCYCLES_INIT: i64 = 50_000;

/// A committed line segment in integrator coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Vector {
    pub x0: i32,
    pub y0: i32,
    pub x1: i32,
    pub y1: i32,
    pub color: u8,
}

impl Vector {
    fn same_endpoints(&self, other: &Vector) -> bool {
        self.x0 == other.x0 && self.y0 == other.y0 && self.x1 == other.x1 && self.y1 == other.y1
    }
}

/// Analog signals sampled once per cycle by the integrator.
#[derive(Clone, Copy, Debug, Default)]
pub struct BeamSignals {
    /// Beam on (CB2 high).
    pub blank: bool,
    /// Integrators zeroed (CA2 low): the beam is pulled to the centre.
    pub zero: bool,
    /// Ramp inactive (PB7 high): the integrators hold.
    pub ramp_off: bool,
    /// Analog X delta from the DAC sample-and-holds.
    pub dx: i32,
    /// Analog Y delta.
    pub dy: i32,
    /// Beam intensity (Z sample-and-hold).
    pub intensity: u8,
}

#[inline]
fn in_bounds(x: i32, y: i32) -> bool {
    (0..ALG_MAX_X).contains(&x) && (0..ALG_MAX_Y).contains(&y)
}

pub struct VectorIntegrator {
    curr_x: i32,
    curr_y: i32,

    vectoring: bool,
    pending: Vector,
    pending_dx: i32,
    pending_dy: i32,

    draw: Vec<Vector>,
    erase: Vec<Vector>,
    hash: Vec<usize>,

    fcycles: i64,
    frames: u64,
    dropped: u64,
}

impl Default for VectorIntegrator {
    fn default() -> Self {
        Self::new()
    }
}

impl VectorIntegrator {
    pub fn new() -> Self {
        Self {
            curr_x: ALG_MAX_X / 2,
            curr_y: ALG_MAX_Y / 2,
            vectoring: false,
            pending: Vector::default(),
            pending_dx: 0,
            pending_dy: 0,
            draw: Vec::with_capacity(VECTOR_CNT),
            erase: Vec::with_capacity(VECTOR_CNT),
            hash: vec![0; VECTOR_HASH],
            fcycles: FCYCLES_INIT,
            frames: 0,
            dropped: 0,
        }
    }

    /// Beam to the centre, both buffers empty, frame counter reloaded.
    pub fn reset(&mut self) {
        self.curr_x = ALG_MAX_X / 2;
        self.curr_y = ALG_MAX_Y / 2;
        self.vectoring = false;
        self.pending = Vector::default();
        self.pending_dx = 0;
        self.pending_dy = 0;
        self.draw.clear();
        self.erase.clear();
        self.hash.fill(0);
        self.fcycles = FCYCLES_INIT;
        self.frames = 0;
        self.dropped = 0;
    }

    pub fn position(&self) -> (i32, i32) {
        (self.curr_x, self.curr_y)
    }

    pub fn is_vectoring(&self) -> bool {
        self.vectoring
    }

    /// Segments committed so far in the frame being drawn.
    pub fn draw_list(&self) -> &[Vector] {
        &self.draw
    }

    /// Segments of the last completed frame.
    pub fn erase_list(&self) -> &[Vector] {
        &self.erase
    }

    /// Display frames completed since reset.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Segments discarded because the draw buffer was full.
    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    fn start_segment(&mut self, sig: &BeamSignals) {
        self.pending = Vector {
            x0: self.curr_x,
            y0: self.curr_y,
            x1: self.curr_x,
            y1: self.curr_y,
            color: sig.intensity,
        };
        self.pending_dx = sig.dx;
        self.pending_dy = sig.dy;
    }

    /// Advance the beam by one cycle.
    pub fn tick(&mut self, sig: &BeamSignals) {
        let (dx, dy) = if sig.zero {
            (ALG_MAX_X / 2 - self.curr_x, ALG_MAX_Y / 2 - self.curr_y)
        } else if sig.ramp_off {
            (0, 0)
        } else {
            (sig.dx, sig.dy)
        };
        let sig = BeamSignals { dx, dy, ..*sig };

        if !self.vectoring {
            if sig.blank && in_bounds(self.curr_x, self.curr_y) {
                self.vectoring = true;
                self.start_segment(&sig);
            }
        } else if !sig.blank {
            self.vectoring = false;
            self.add_line(self.pending);
        } else if dx != self.pending_dx
            || dy != self.pending_dy
            || sig.intensity != self.pending.color
        {
            self.add_line(self.pending);
            if in_bounds(self.curr_x, self.curr_y) {
                self.start_segment(&sig);
            } else {
                self.vectoring = false;
            }
        }

        self.curr_x = self.curr_x.wrapping_add(dx);
        self.curr_y = self.curr_y.wrapping_add(dy);
        if self.vectoring && in_bounds(self.curr_x, self.curr_y) {
            self.pending.x1 = self.curr_x;
            self.pending.y1 = self.curr_y;
        }
    }

    fn hash_key(v: &Vector) -> usize {
        let mut key = v.x0 as i64;
        key = key * 31 + v.y0 as i64;
        key = key * 31 + v.x1 as i64;
        key = key * 31 + v.y1 as i64;
        key.rem_euclid(VECTOR_HASH as i64) as usize
    }

    /// Commit a segment to the draw buffer.
    ///
    /// A segment with the same endpoints as the draw-buffer entry its hash
    /// slot names only updates that entry's color. A match in the erase
    /// buffer marks the stale copy with `VECTREX_COLORS` before the new
    /// segment is appended.
    pub fn add_line(&mut self, v: Vector) {
        let key = Self::hash_key(&v);
        let index = self.hash[key];

        if let Some(existing) = self.draw.get_mut(index) {
            if existing.same_endpoints(&v) {
                existing.color = v.color;
                return;
            }
        }

        if let Some(stale) = self.erase.get_mut(index) {
            if stale.same_endpoints(&v) {
                stale.color = VECTREX_COLORS;
            }
        }

        if self.draw.len() >= VECTOR_CNT {
            if self.dropped == 0 {
                log::warn!("vector buffer full, dropping segments");
            }
            self.dropped += 1;
            return;
        }
        self.hash[key] = self.draw.len();
        self.draw.push(v);
    }

    /// Charge `cycles` against the frame budget. Returns true when a frame
    /// boundary was crossed and the buffers swapped.
    pub fn end_instruction(&mut self, cycles: u32) -> bool {
        self.fcycles -= i64::from(cycles);
        if self.fcycles >= 0 {
            return false;
        }
        self.fcycles += FCYCLES_INIT;
        std::mem::swap(&mut self.draw, &mut self.erase);
        self.draw.clear();
        self.frames += 1;
        true
    }
}
