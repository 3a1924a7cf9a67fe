pub mod debugger;
pub mod registry;
pub mod rom_loader;
pub mod snapshot;
pub mod vectrex;

pub use debugger::{DebugController, DebugState, StepMode};
pub use rom_loader::{RomLoadError, RomSet};
pub use snapshot::{DebugEvent, MetricsSnapshot, PauseMode, RegisterSnapshot, Segment};
pub use vectrex::Vectrex;
