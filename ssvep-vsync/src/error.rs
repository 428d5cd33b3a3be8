use ssvep_core::PresentError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("invalid pulse timing: {reason}")]
    InvalidTiming { reason: String },

    #[error("invalid patch size {width} x {height}")]
    InvalidPatch { width: f32, height: f32 },

    #[error("unknown sync protocol `{0}` (expected `binary` or `pulse-interval`)")]
    UnknownProtocol(String),

    #[error(transparent)]
    Core(#[from] PresentError),
}
