use crate::device::integrator::Vector;

/// Describes a single input button that a machine accepts.
pub struct InputButton {
    /// Machine-defined button identifier, passed to `set_input()`.
    pub id: u8,
    /// Human-readable name for display/configuration (e.g., "Button 1", "Left").
    pub name: &'static str,
}

/// Machine-agnostic interface for emulated vector systems.
///
/// The host is a pure presentation layer: it asks for a frame, then reads
/// the committed line segments and draws them however it likes. It does not
/// know about VIAs, DACs or bank registers.
pub trait Machine {
    /// Extent of the integrator coordinate space as (max_x, max_y).
    /// Segment endpoints lie in `[0, max_x) x [0, max_y)`.
    fn display_extent(&self) -> (i32, i32);

    /// Run one display frame's worth of cycles. Returns the cycles executed,
    /// which is less than a full frame when the debugger paused execution.
    fn run_frame(&mut self) -> u64;

    /// Line segments committed during the most recent frame.
    fn frame_vectors(&self) -> &[Vector];

    /// Handle an input event. `button` is a machine-defined ID from `input_map()`.
    /// `pressed` is true for key-down, false for key-up.
    ///
    /// Called per-event, not per-frame. Each call latches the button state
    /// so that `run_frame()` sees the accumulated input.
    fn set_input(&mut self, button: u8, pressed: bool);

    /// Get the list of input buttons this machine accepts.
    fn input_map(&self) -> &[InputButton];

    /// Reset the machine to its initial power-on state.
    fn reset(&mut self);
}
