use crate::canvas::Canvas;
use crate::error::PresentError;

/// Input the presentation loop reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    /// User-requested abort of the running sequence
    Escape,
    /// Window closed by the system
    Close,
    Key(char),
}

/// Output device driven by the loop driver
pub trait Display {
    type Canvas: Canvas;

    /// Back buffer the next frame is drawn into
    fn canvas(&mut self) -> &mut Self::Canvas;

    /// Shows the back buffer. May block until vertical blank.
    fn flip(&mut self) -> Result<(), PresentError>;

    /// Appends every input event received since the previous poll.
    fn poll_input(&mut self, events: &mut Vec<InputEvent>);
}
