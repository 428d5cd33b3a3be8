use ssvep_core::PresentError;
use ssvep_timing::TimingError;
use ssvep_vsync::SyncError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StimulusError {
    #[error(transparent)]
    Present(#[from] PresentError),

    #[error(transparent)]
    Timing(#[from] TimingError),

    #[error(transparent)]
    Sync(#[from] SyncError),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("frame {frame} could not be stored: {source}")]
    FrameSink {
        frame: u64,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to serialize trigger log: {0}")]
    Json(#[from] serde_json::Error),
}
