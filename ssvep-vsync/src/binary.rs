use crate::patch::PatchGeometry;
use crate::record::TriggerRecord;
use ssvep_core::{Canvas, Color, TriggerCode};
use tracing::{debug, warn};

/// Protocol v1 patch: one quadrant per bit, on color for a set bit.
#[derive(Debug, Clone)]
pub struct BinaryPatch {
    geometry: PatchGeometry,
    on_color: Color,
    off_color: Color,
    code: TriggerCode,
    epoch_start: Option<f64>,
    ready: bool,
}

impl BinaryPatch {
    pub fn new(geometry: PatchGeometry, on_color: Color, off_color: Color) -> Self {
        Self {
            geometry,
            on_color,
            off_color,
            code: TriggerCode::NONE,
            epoch_start: None,
            ready: false,
        }
    }

    pub fn geometry(&self) -> &PatchGeometry {
        &self.geometry
    }

    pub fn code(&self) -> TriggerCode {
        self.code
    }

    /// Quadrant colors in bit order
    pub fn bit_colors(&self, code: TriggerCode) -> [Color; 4] {
        std::array::from_fn(|i| {
            if code.bit(i) {
                self.on_color
            } else {
                self.off_color
            }
        })
    }

    pub fn start_epoch(&mut self, t: f64, code: TriggerCode) {
        debug!(code = code.value(), bits = code.bits(), t, "binary patch epoch");
        if !code.is_none() && code.bits() == 0 {
            warn!(code = code.value(), "code has no set bits in the quadrant pattern, not recorded");
        }
        self.code = code;
        self.epoch_start = Some(t);
        // Content only changes here.
        self.ready = true;
    }

    pub fn update(&mut self, _t: f64, _dt: f64) {
        self.ready = false;
    }

    pub fn ready_to_render(&self) -> bool {
        self.ready
    }

    pub fn render(&self, canvas: &mut dyn Canvas) {
        let colors = self.bit_colors(self.code);
        for (rect, color) in self.geometry.quadrants().into_iter().zip(colors) {
            canvas.draw_rect(rect, color);
        }
    }

    pub fn completed_code(&self) -> Option<TriggerCode> {
        self.epoch_start.map(|_| self.code)
    }

    pub fn abandon(&mut self) {
        self.code = TriggerCode::NONE;
        self.epoch_start = None;
        self.ready = false;
    }

    /// `None` when the photodiode saw no lit quadrant, which includes code 16.
    pub fn trigger_record(&self) -> Option<TriggerRecord> {
        let start = self.epoch_start?;
        (self.code.bits() != 0).then(|| TriggerRecord::binary(self.code, start))
    }
}

/// Recovers the four code bits from sampled quadrant colors (bit order).
///
/// Each quadrant counts as set when it is closer to `on` than to `off`.
pub fn decode_quadrants(colors: [Color; 4], on: Color, off: Color) -> u8 {
    let dist = |a: Color, b: Color| (a.r - b.r).powi(2) + (a.g - b.g).powi(2) + (a.b - b.b).powi(2);
    colors
        .iter()
        .enumerate()
        .filter(|(_, c)| dist(**c, on) < dist(**c, off))
        .fold(0u8, |acc, (i, _)| acc | (1 << i))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ssvep_core::{CommandCanvas, ScreenBounds};

    fn patch() -> BinaryPatch {
        let geometry = PatchGeometry::bottom_right(ScreenBounds::default(), 0.2, 0.2);
        BinaryPatch::new(geometry, Color::WHITE, Color::BLACK)
    }

    #[test]
    fn round_trips_every_code() {
        let p = patch();
        for value in 0..=16 {
            let code = TriggerCode::new(value).unwrap();
            let decoded = decode_quadrants(p.bit_colors(code), Color::WHITE, Color::BLACK);
            assert_eq!(decoded, code.bits(), "code {value}");
        }
    }

    #[test]
    fn quadrant_layout_follows_bit_order() {
        let mut p = patch();
        p.start_epoch(0.0, TriggerCode::new(0b0101).unwrap());
        let mut canvas = CommandCanvas::new(ScreenBounds::default());
        canvas.clear(Color::NEUTRAL_GRAY);
        p.render(&mut canvas);

        // patch spans x in [0.8, 1.0], y in [-1.0, -0.8]
        assert_eq!(canvas.color_at(0.95, -0.95), Some(Color::WHITE)); // bit 0
        assert_eq!(canvas.color_at(0.85, -0.95), Some(Color::BLACK)); // bit 1
        assert_eq!(canvas.color_at(0.85, -0.85), Some(Color::WHITE)); // bit 2
        assert_eq!(canvas.color_at(0.95, -0.85), Some(Color::BLACK)); // bit 3
    }

    #[test]
    fn ready_only_at_epoch_start() {
        let mut p = patch();
        assert!(!p.ready_to_render());
        p.start_epoch(1.0, TriggerCode::new(3).unwrap());
        assert!(p.ready_to_render());
        p.update(1.01, 0.01);
        assert!(!p.ready_to_render());
        p.update(1.02, 0.01);
        assert!(!p.ready_to_render());
        assert_eq!(p.completed_code(), Some(TriggerCode::new(3).unwrap()));
    }

    #[test]
    fn abandoned_epoch_leaves_no_record() {
        let mut p = patch();
        p.start_epoch(0.0, TriggerCode::new(9).unwrap());
        assert!(p.trigger_record().is_some());
        p.abandon();
        assert_eq!(p.completed_code(), None);
        assert!(p.trigger_record().is_none());
    }

    #[test]
    fn code_zero_is_not_recorded() {
        let mut p = patch();
        p.start_epoch(0.0, TriggerCode::NONE);
        assert_eq!(p.completed_code(), Some(TriggerCode::NONE));
        assert!(p.trigger_record().is_none());
    }

    #[test]
    fn code_sixteen_draws_dark_quadrants_and_is_not_recorded() {
        let mut p = patch();
        let code = TriggerCode::new(16).unwrap();
        p.start_epoch(0.0, code);
        let mut canvas = CommandCanvas::new(ScreenBounds::default());
        p.render(&mut canvas);
        for (x, y) in [(0.95, -0.95), (0.85, -0.95), (0.85, -0.85), (0.95, -0.85)] {
            assert_eq!(canvas.color_at(x, y), Some(Color::BLACK));
        }
        assert!(p.trigger_record().is_none());
    }

    #[test]
    fn decodes_noisy_samples() {
        let dim = Color::gray(0.8);
        let dark = Color::gray(0.1);
        assert_eq!(
            decode_quadrants([dim, dark, dark, dim], Color::WHITE, Color::BLACK),
            0b1001
        );
    }
}
