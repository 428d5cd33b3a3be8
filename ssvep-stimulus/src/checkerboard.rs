use ssvep_core::{Canvas, Color, PresentError, Rect};
use std::f32::consts::TAU;

const DOT_RADIUS: f32 = 0.005;
const DOT_SEGMENTS: usize = 45;

/// Square grid of alternating checks, drawn from its bottom-left corner
#[derive(Debug, Clone, PartialEq)]
pub struct Checkerboard {
    nrows: usize,
    check_width: f32,
    check_height: f32,
    color1: Color,
    color2: Color,
    fixation_dot: bool,
}

impl Checkerboard {
    pub fn new(nrows: usize, check_width: f32) -> Result<Self, PresentError> {
        if nrows == 0 {
            return Err(PresentError::invalid("nrows", "need at least one row"));
        }
        if !(check_width.is_finite() && check_width > 0.0) {
            return Err(PresentError::invalid(
                "check_width",
                format!("must be positive, got {check_width}"),
            ));
        }
        Ok(Self {
            nrows,
            check_width,
            check_height: check_width,
            color1: Color::WHITE,
            color2: Color::BLACK,
            fixation_dot: false,
        })
    }

    /// Board of `nrows` checks spanning `board_width` world units
    pub fn with_board_width(nrows: usize, board_width: f32) -> Result<Self, PresentError> {
        Self::new(nrows, board_width / nrows.max(1) as f32)
    }

    pub fn with_colors(mut self, color1: Color, color2: Color) -> Self {
        self.color1 = color1;
        self.color2 = color2;
        self
    }

    pub fn with_check_height(mut self, check_height: f32) -> Self {
        self.check_height = check_height;
        self
    }

    pub fn with_fixation_dot(mut self, show: bool) -> Self {
        self.fixation_dot = show;
        self
    }

    pub fn nrows(&self) -> usize {
        self.nrows
    }

    pub fn board_width(&self) -> f32 {
        self.check_width * self.nrows as f32
    }

    pub fn board_height(&self) -> f32 {
        self.check_height * self.nrows as f32
    }

    /// Origin that centres the board on `(x, y)`
    pub fn centered_at(&self, x: f32, y: f32) -> (f32, f32) {
        (x - 0.5 * self.board_width(), y - 0.5 * self.board_height())
    }

    pub fn render(&self, canvas: &mut dyn Canvas, origin: (f32, f32), inverted: bool) {
        if inverted {
            self.render_with_colors(canvas, origin, self.color2, self.color1);
        } else {
            self.render_with_colors(canvas, origin, self.color1, self.color2);
        }
    }

    pub fn render_with_colors(
        &self,
        canvas: &mut dyn Canvas,
        origin: (f32, f32),
        color1: Color,
        color2: Color,
    ) {
        let (w, h) = (self.check_width, self.check_height);
        for x in 0..self.nrows {
            for y in 0..self.nrows {
                let color = if (x + y) % 2 == 0 { color1 } else { color2 };
                let rect = Rect::from_origin_size(
                    origin.0 + w * x as f32,
                    origin.1 + h * y as f32,
                    w,
                    h,
                );
                canvas.draw_rect(rect, color);
            }
        }

        if self.fixation_dot {
            let cx = origin.0 + 0.5 * self.board_width();
            let cy = origin.1 + 0.5 * self.board_height();
            let disk: Vec<(f32, f32)> = (0..DOT_SEGMENTS)
                .map(|i| {
                    let a = TAU * i as f32 / DOT_SEGMENTS as f32;
                    (cx + DOT_RADIUS * a.cos(), cy + DOT_RADIUS * a.sin())
                })
                .collect();
            canvas.draw_polygon(&disk, Color::RED);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ssvep_core::{CommandCanvas, DrawCommand, ScreenBounds};

    #[test]
    fn even_cells_take_first_color() {
        let board = Checkerboard::new(2, 0.5).unwrap();
        let mut canvas = CommandCanvas::new(ScreenBounds::default());
        let origin = board.centered_at(0.0, 0.0);
        board.render(&mut canvas, origin, false);

        assert_eq!(canvas.color_at(-0.25, -0.25), Some(Color::WHITE));
        assert_eq!(canvas.color_at(0.25, -0.25), Some(Color::BLACK));
        assert_eq!(canvas.color_at(0.25, 0.25), Some(Color::WHITE));
        assert_eq!(canvas.rect_count(), 4);

        let mut inverted = CommandCanvas::new(ScreenBounds::default());
        board.render(&mut inverted, origin, true);
        assert_eq!(inverted.color_at(-0.25, -0.25), Some(Color::BLACK));
    }

    #[test]
    fn fixation_dot_is_a_red_45_gon_at_centre() {
        let board = Checkerboard::new(4, 0.25).unwrap().with_fixation_dot(true);
        let mut canvas = CommandCanvas::new(ScreenBounds::default());
        board.render(&mut canvas, board.centered_at(0.0, 0.0), false);
        match canvas.commands().last() {
            Some(DrawCommand::Polygon(vertices, color)) => {
                assert_eq!(vertices.len(), 45);
                assert_eq!(*color, Color::RED);
            }
            other => panic!("expected dot polygon, got {other:?}"),
        }
        assert_eq!(canvas.color_at(0.0, 0.0), Some(Color::RED));
        assert_eq!(canvas.color_at(0.01, 0.0), Some(Color::WHITE));
    }

    #[test]
    fn board_width_fills_screen() {
        let board = Checkerboard::with_board_width(64, 2.0).unwrap();
        assert!((board.board_width() - 2.0).abs() < 1e-5);
        assert_eq!(board.centered_at(0.0, 0.0).0, -0.5 * board.board_width());
    }

    #[test]
    fn rejects_empty_board() {
        assert!(Checkerboard::new(0, 0.1).is_err());
        assert!(Checkerboard::new(4, -0.1).is_err());
    }
}
