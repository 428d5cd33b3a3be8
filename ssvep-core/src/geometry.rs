use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle in world coordinates (y grows upwards)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub left: f32,
    pub bottom: f32,
    pub right: f32,
    pub top: f32,
}

impl Rect {
    pub const fn new(left: f32, bottom: f32, right: f32, top: f32) -> Self {
        Self {
            left,
            bottom,
            right,
            top,
        }
    }

    pub fn from_origin_size(left: f32, bottom: f32, width: f32, height: f32) -> Self {
        Self::new(left, bottom, left + width, bottom + height)
    }

    pub fn width(&self) -> f32 {
        self.right - self.left
    }

    pub fn height(&self) -> f32 {
        self.top - self.bottom
    }

    pub fn center(&self) -> (f32, f32) {
        (
            (self.left + self.right) * 0.5,
            (self.bottom + self.top) * 0.5,
        )
    }

    /// Half-open containment: left/bottom edges inside, right/top outside.
    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.left && x < self.right && y >= self.bottom && y < self.top
    }

    pub fn translated(&self, dx: f32, dy: f32) -> Self {
        Self::new(self.left + dx, self.bottom + dy, self.right + dx, self.top + dy)
    }
}

/// Visible world-coordinate window of the display
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScreenBounds {
    pub left: f32,
    pub right: f32,
    pub bottom: f32,
    pub top: f32,
}

impl Default for ScreenBounds {
    fn default() -> Self {
        Self {
            left: -1.0,
            right: 1.0,
            bottom: -1.0,
            top: 1.0,
        }
    }
}

impl ScreenBounds {
    /// Bounds for a `width` x `height` pixel display.
    ///
    /// The short axis always spans `[-1, 1]`; with `constrain_aspect` the long
    /// axis is stretched so squares stay square on screen.
    pub fn from_resolution(width: u32, height: u32, constrain_aspect: bool) -> Self {
        let mut bounds = Self::default();
        if !constrain_aspect || width == 0 || height == 0 {
            return bounds;
        }
        if width <= height {
            let aspect = height as f32 / width as f32;
            bounds.bottom /= aspect;
            bounds.top /= aspect;
        } else {
            let aspect = width as f32 / height as f32;
            bounds.left *= aspect;
            bounds.right *= aspect;
        }
        bounds
    }

    pub fn width(&self) -> f32 {
        self.right - self.left
    }

    pub fn height(&self) -> f32 {
        self.top - self.bottom
    }

    pub fn as_rect(&self) -> Rect {
        Rect::new(self.left, self.bottom, self.right, self.top)
    }

    /// left-top, left-bottom, right-bottom, right-top
    pub fn corner_vertices(&self) -> [(f32, f32); 4] {
        [
            (self.left, self.top),
            (self.left, self.bottom),
            (self.right, self.bottom),
            (self.right, self.top),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wide_screen_stretches_horizontally() {
        let b = ScreenBounds::from_resolution(1920, 1080, true);
        assert!((b.right - 1920.0 / 1080.0).abs() < 1e-6);
        assert_eq!(b.left, -b.right);
        assert_eq!((b.bottom, b.top), (-1.0, 1.0));
    }

    #[test]
    fn tall_screen_shrinks_vertically() {
        let b = ScreenBounds::from_resolution(600, 800, true);
        assert_eq!((b.left, b.right), (-1.0, 1.0));
        assert!((b.top - 0.75).abs() < 1e-6);
        assert!((b.bottom + 0.75).abs() < 1e-6);
    }

    #[test]
    fn unconstrained_is_unit_square() {
        assert_eq!(
            ScreenBounds::from_resolution(1920, 1080, false),
            ScreenBounds::default()
        );
    }

    #[test]
    fn rect_containment_is_half_open() {
        let r = Rect::from_origin_size(0.0, 0.0, 1.0, 1.0);
        assert!(r.contains(0.0, 0.0));
        assert!(r.contains(0.5, 0.99));
        assert!(!r.contains(1.0, 0.5));
        assert_eq!(r.center(), (0.5, 0.5));
    }
}
