use crate::error::RenderError;
use bytemuck::cast_slice;
use ssvep_core::{Canvas, Color, Rect, ScreenBounds};
use tiny_skia::{FillRule, Paint, PathBuilder, Pixmap};

/// Raster canvas over a `tiny_skia::Pixmap`.
///
/// World coordinates follow `ScreenBounds` with y pointing up; the pixmap has
/// its origin in the top-left corner.
pub struct SkiaCanvas {
    pixmap: Pixmap,
    bounds: ScreenBounds,
    scale_x: f32,
    scale_y: f32,
}

impl SkiaCanvas {
    pub fn new(width: u32, height: u32, bounds: ScreenBounds) -> Result<Self, RenderError> {
        let pixmap =
            Pixmap::new(width, height).ok_or(RenderError::PixmapAllocation { width, height })?;
        Ok(Self {
            scale_x: width as f32 / bounds.width(),
            scale_y: height as f32 / bounds.height(),
            pixmap,
            bounds,
        })
    }

    /// Canvas whose bounds are derived from the pixel size
    pub fn for_resolution(
        width: u32,
        height: u32,
        constrain_aspect: bool,
    ) -> Result<Self, RenderError> {
        Self::new(
            width,
            height,
            ScreenBounds::from_resolution(width, height, constrain_aspect),
        )
    }

    pub fn resize(&mut self, width: u32, height: u32, bounds: ScreenBounds) -> Result<(), RenderError> {
        *self = Self::new(width, height, bounds)?;
        Ok(())
    }

    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    pub fn pixmap(&self) -> &Pixmap {
        &self.pixmap
    }

    /// RGBA8 bytes, row-major
    pub fn data(&self) -> &[u8] {
        self.pixmap.data()
    }

    pub fn world_to_pixel(&self, x: f32, y: f32) -> (f32, f32) {
        (
            (x - self.bounds.left) * self.scale_x,
            (self.bounds.top - y) * self.scale_y,
        )
    }

    pub fn copy_to_frame(&self, frame: &mut [u8]) -> Result<(), RenderError> {
        let data = self.pixmap.data();
        if frame.len() != data.len() {
            return Err(RenderError::FrameSize {
                expected: data.len(),
                actual: frame.len(),
            });
        }
        frame.copy_from_slice(data);
        Ok(())
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width() || y >= self.height() {
            return None;
        }
        let pixels: &[[u8; 4]] = cast_slice(self.pixmap.data());
        pixels
            .get(y as usize * self.width() as usize + x as usize)
            .copied()
    }

    /// Mean Rec. 709 luminance over the pixels whose centers fall in `rect`
    pub fn mean_luminance(&self, rect: Rect) -> f32 {
        let (x0, y0) = self.world_to_pixel(rect.left, rect.top);
        let (x1, y1) = self.world_to_pixel(rect.right, rect.bottom);
        let clamp_x = |v: f32| (v - 0.5).ceil().clamp(0.0, self.width() as f32) as usize;
        let clamp_y = |v: f32| (v - 0.5).ceil().clamp(0.0, self.height() as f32) as usize;
        let (x0, x1, y0, y1) = (clamp_x(x0), clamp_x(x1), clamp_y(y0), clamp_y(y1));
        if x1 <= x0 || y1 <= y0 {
            return 0.0;
        }

        let stride = self.width() as usize;
        let pixels: &[[u8; 4]] = cast_slice(self.pixmap.data());
        let mut sum = 0.0f32;
        for row in y0..y1 {
            for px in &pixels[row * stride + x0..row * stride + x1] {
                sum += Color::rgb(px[0] as f32, px[1] as f32, px[2] as f32).luminance();
            }
        }
        sum / (255.0 * ((x1 - x0) * (y1 - y0)) as f32)
    }

    fn paint(color: Color, anti_alias: bool) -> Paint<'static> {
        let [r, g, b, a] = color.to_rgba8();
        let mut paint = Paint::default();
        paint.set_color_rgba8(r, g, b, a);
        paint.anti_alias = anti_alias;
        paint
    }
}

impl Canvas for SkiaCanvas {
    fn bounds(&self) -> ScreenBounds {
        self.bounds
    }

    fn clear(&mut self, color: Color) {
        let [r, g, b, a] = color.to_rgba8();
        self.pixmap.fill(tiny_skia::Color::from_rgba8(r, g, b, a));
    }

    fn draw_rect(&mut self, rect: Rect, color: Color) {
        let (left, top) = self.world_to_pixel(rect.left, rect.top);
        let (right, bottom) = self.world_to_pixel(rect.right, rect.bottom);
        // Degenerate rects are skipped by from_ltrb.
        if let Some(r) = tiny_skia::Rect::from_ltrb(left, top, right, bottom) {
            // Hard edges: checks must not bleed into each other.
            let paint = Self::paint(color, false);
            self.pixmap
                .fill_rect(r, &paint, tiny_skia::Transform::identity(), None);
        }
    }

    fn draw_polygon(&mut self, vertices: &[(f32, f32)], color: Color) {
        let mut pb = PathBuilder::new();
        for (i, &(x, y)) in vertices.iter().enumerate() {
            let (px, py) = self.world_to_pixel(x, y);
            if i == 0 {
                pb.move_to(px, py);
            } else {
                pb.line_to(px, py);
            }
        }
        pb.close();
        if let Some(path) = pb.finish() {
            let paint = Self::paint(color, true);
            self.pixmap.fill_path(
                &path,
                &paint,
                FillRule::Winding,
                tiny_skia::Transform::identity(),
                None,
            );
        }
    }
}
