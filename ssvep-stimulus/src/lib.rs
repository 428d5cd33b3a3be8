pub mod checkerboard;
pub mod driver;
pub mod error;
pub mod fixation;
pub mod flasher;
pub mod log;
pub mod recorder;
pub mod screen;
pub mod sequence;
pub mod session;
pub mod stimulus;
pub mod waveform;

pub use checkerboard::Checkerboard;
pub use driver::{LoopDriver, RunOptions, RunOutcome, RunReport};
pub use error::StimulusError;
pub use fixation::FixationCross;
pub use flasher::{CheckerboardFlasher, MultiBoardFlasher};
pub use log::TriggerLog;
pub use recorder::{RecordOptions, RecordReport, Recorder};
pub use screen::Screen;
pub use sequence::{BracketColors, SequenceReport, SequenceStep, run_sequence, start_sequence, stop_sequence};
pub use session::{
    PlannedTrial, Session, SessionConfig, SessionPlan, SessionReport, StimulusKind,
    build_trial_stimulus,
};
pub use stimulus::Stimulus;
pub use waveform::{ContrastBoard, ContrastFlasher, Waveform};
