use ssvep_core::PresentError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("cannot allocate a {width}x{height} pixmap")]
    PixmapAllocation { width: u32, height: u32 },

    #[error("frame buffer holds {actual} bytes, canvas needs {expected}")]
    FrameSize { expected: usize, actual: usize },
}

impl From<RenderError> for PresentError {
    fn from(err: RenderError) -> Self {
        PresentError::display(err)
    }
}
