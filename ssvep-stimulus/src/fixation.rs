use serde::{Deserialize, Serialize};
use ssvep_core::{Canvas, Color};

/// Plus-shaped fixation target
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FixationCross {
    pub position: (f32, f32),
    pub size: f32,
    pub thickness: f32,
    pub color: Color,
}

impl Default for FixationCross {
    fn default() -> Self {
        Self {
            position: (0.0, 0.0),
            size: 0.1,
            thickness: 0.01,
            color: Color::WHITE,
        }
    }
}

impl FixationCross {
    /// Horizontal then vertical beam, each as left-top, left-bottom,
    /// right-bottom, right-top.
    pub fn beams(&self) -> [[(f32, f32); 4]; 2] {
        let (x, y) = self.position;
        let half = self.size / 2.0;
        let t = self.thickness / 2.0;
        [
            [(x - half, y + t), (x - half, y - t), (x + half, y - t), (x + half, y + t)],
            [(x - t, y + half), (x - t, y - half), (x + t, y - half), (x + t, y + half)],
        ]
    }

    pub fn render(&self, canvas: &mut dyn Canvas) {
        for beam in self.beams() {
            canvas.draw_polygon(&beam, self.color);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ssvep_core::{CommandCanvas, ScreenBounds};

    #[test]
    fn cross_covers_both_beams_only() {
        let cross = FixationCross::default();
        let mut canvas = CommandCanvas::new(ScreenBounds::default());
        canvas.clear(Color::BLACK);
        cross.render(&mut canvas);

        assert_eq!(canvas.color_at(0.04, 0.0), Some(Color::WHITE));
        assert_eq!(canvas.color_at(0.0, -0.04), Some(Color::WHITE));
        assert_eq!(canvas.color_at(0.04, 0.04), Some(Color::BLACK));
        assert_eq!(canvas.color_at(0.06, 0.0), Some(Color::BLACK));
    }
}
