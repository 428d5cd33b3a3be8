pub mod canvas;
pub mod color;
pub mod display;
pub mod error;
pub mod geometry;
pub mod trigger;

pub use canvas::{Canvas, CommandCanvas, DrawCommand};
pub use color::{Color, ColorSpec};
pub use display::{Display, InputEvent};
pub use error::PresentError;
pub use geometry::{Rect, ScreenBounds};
pub use trigger::TriggerCode;
