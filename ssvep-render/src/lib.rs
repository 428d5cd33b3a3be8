pub mod error;
pub mod headless;
pub mod photodiode;
pub mod render;

pub use error::RenderError;
pub use headless::HeadlessDisplay;
pub use photodiode::Photodiode;
pub use render::SkiaCanvas;
