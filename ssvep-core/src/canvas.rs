use crate::color::Color;
use crate::geometry::{Rect, ScreenBounds};

/// Immediate-mode drawing surface in world coordinates
pub trait Canvas {
    fn bounds(&self) -> ScreenBounds;
    fn clear(&mut self, color: Color);
    fn draw_rect(&mut self, rect: Rect, color: Color);
    fn draw_polygon(&mut self, vertices: &[(f32, f32)], color: Color);
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Clear(Color),
    Rect(Rect, Color),
    Polygon(Vec<(f32, f32)>, Color),
}

impl DrawCommand {
    fn covers(&self, x: f32, y: f32) -> Option<Color> {
        match self {
            DrawCommand::Clear(c) => Some(*c),
            DrawCommand::Rect(r, c) => r.contains(x, y).then_some(*c),
            DrawCommand::Polygon(v, c) => point_in_polygon(v, x, y).then_some(*c),
        }
    }
}

/// Canvas that keeps the draw calls of a frame instead of rasterising them
#[derive(Debug, Clone, Default)]
pub struct CommandCanvas {
    bounds: ScreenBounds,
    commands: Vec<DrawCommand>,
}

impl CommandCanvas {
    pub fn new(bounds: ScreenBounds) -> Self {
        Self {
            bounds,
            commands: Vec::new(),
        }
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn take(&mut self) -> Vec<DrawCommand> {
        std::mem::take(&mut self.commands)
    }

    pub fn rect_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::Rect(..)))
            .count()
    }

    /// Color of the last command painted over `(x, y)`
    pub fn color_at(&self, x: f32, y: f32) -> Option<Color> {
        self.commands.iter().rev().find_map(|c| c.covers(x, y))
    }
}

impl Canvas for CommandCanvas {
    fn bounds(&self) -> ScreenBounds {
        self.bounds
    }

    fn clear(&mut self, color: Color) {
        // Everything drawn before a clear is invisible.
        self.commands.clear();
        self.commands.push(DrawCommand::Clear(color));
    }

    fn draw_rect(&mut self, rect: Rect, color: Color) {
        self.commands.push(DrawCommand::Rect(rect, color));
    }

    fn draw_polygon(&mut self, vertices: &[(f32, f32)], color: Color) {
        self.commands
            .push(DrawCommand::Polygon(vertices.to_vec(), color));
    }
}

// even-odd ray cast
fn point_in_polygon(vertices: &[(f32, f32)], x: f32, y: f32) -> bool {
    let mut inside = false;
    let n = vertices.len();
    if n < 3 {
        return false;
    }
    let mut j = n - 1;
    for i in 0..n {
        let (xi, yi) = vertices[i];
        let (xj, yj) = vertices[j];
        if (yi > y) != (yj > y) && x < (xj - xi) * (y - yi) / (yj - yi) + xi {
            inside = !inside;
        }
        j = i;
    }
    inside
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn later_commands_win() {
        let mut canvas = CommandCanvas::new(ScreenBounds::default());
        canvas.clear(Color::BLACK);
        canvas.draw_rect(Rect::new(-0.5, -0.5, 0.5, 0.5), Color::RED);
        canvas.draw_polygon(
            &[(0.0, 0.0), (0.4, 0.0), (0.4, 0.4), (0.0, 0.4)],
            Color::BLUE,
        );

        assert_eq!(canvas.color_at(0.9, 0.9), Some(Color::BLACK));
        assert_eq!(canvas.color_at(-0.25, -0.25), Some(Color::RED));
        assert_eq!(canvas.color_at(0.2, 0.2), Some(Color::BLUE));
        assert_eq!(canvas.rect_count(), 1);
    }

    #[test]
    fn clear_discards_previous_frame() {
        let mut canvas = CommandCanvas::new(ScreenBounds::default());
        canvas.draw_rect(Rect::new(0.0, 0.0, 1.0, 1.0), Color::RED);
        canvas.clear(Color::WHITE);
        assert_eq!(canvas.commands().len(), 1);
        assert_eq!(canvas.color_at(0.5, 0.5), Some(Color::WHITE));
    }
}
