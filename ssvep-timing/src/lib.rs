pub mod clock;
pub mod error;
pub mod scheduler;
pub mod stats;

pub use clock::{Clock, HighPrecisionTimer, ScriptedClock, SimulatedClock};
pub use error::TimingError;
pub use scheduler::{PeriodicToggle, TIME_TOLERANCE, ToggleDiagnostics};
pub use stats::{LoopStats, TimingSummary};
