use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TimingError {
    #[error("frequency must be finite and positive, got {0} Hz")]
    InvalidFrequency(f64),

    #[error("a periodic toggle needs at least one state")]
    InvalidStateCount,

    #[error("clock step must be finite and positive, got {0} s")]
    InvalidStep(f64),
}
