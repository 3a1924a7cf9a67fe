pub mod ay38910;
pub mod dac;
pub mod integrator;
pub mod via6522;

pub use ay38910::{Ay38910, SoundSink};
pub use dac::Mc1408Dac;
pub use integrator::{BeamSignals, Vector, VectorIntegrator};
pub use via6522::Via6522;
