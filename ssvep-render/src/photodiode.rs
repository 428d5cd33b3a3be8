use crate::render::SkiaCanvas;
use ssvep_core::Rect;

/// Light sensor taped over a screen region
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Photodiode {
    pub region: Rect,
    /// Mean luminance above which the sensor reports light
    pub threshold: f32,
}

impl Photodiode {
    pub fn new(region: Rect) -> Self {
        Self {
            region,
            threshold: 0.5,
        }
    }

    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn sample(&self, canvas: &SkiaCanvas) -> f32 {
        canvas.mean_luminance(self.region)
    }

    pub fn is_lit(&self, canvas: &SkiaCanvas) -> bool {
        self.sample(canvas) > self.threshold
    }
}
