use thiserror::Error;

/// Errors shared by every presentation crate
#[derive(Error, Debug)]
pub enum PresentError {
    #[error("trigger code {0} is outside 0..=16")]
    TriggerOutOfRange(i64),

    #[error("unknown color name: {0}")]
    UnknownColor(String),

    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    #[error("display error: {0}")]
    Display(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl PresentError {
    pub fn display<E>(err: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        PresentError::Display(err.into())
    }

    pub fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        PresentError::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }
}
