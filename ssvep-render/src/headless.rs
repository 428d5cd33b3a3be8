use crate::error::RenderError;
use crate::photodiode::Photodiode;
use crate::render::SkiaCanvas;
use ssvep_core::{Display, InputEvent, PresentError, ScreenBounds};

/// Off-screen `Display`: renders into a pixmap and never blocks.
///
/// Input can be scripted per poll so loops can be cancelled at a known
/// iteration. A photodiode, when attached, is sampled on every flip.
pub struct HeadlessDisplay {
    canvas: SkiaCanvas,
    flips: u64,
    polls: u64,
    script: Vec<(u64, InputEvent)>,
    photodiode: Option<Photodiode>,
    light_trace: Vec<bool>,
    fail_at_flip: Option<u64>,
}

impl HeadlessDisplay {
    pub fn new(width: u32, height: u32, bounds: ScreenBounds) -> Result<Self, RenderError> {
        Ok(Self {
            canvas: SkiaCanvas::new(width, height, bounds)?,
            flips: 0,
            polls: 0,
            script: Vec::new(),
            photodiode: None,
            light_trace: Vec::new(),
            fail_at_flip: None,
        })
    }

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

    /// Delivers `event` on the poll with zero-based index `poll`.
    pub fn with_input(mut self, poll: u64, event: InputEvent) -> Self {
        self.script.push((poll, event));
        self
    }

    pub fn with_photodiode(mut self, photodiode: Photodiode) -> Self {
        self.photodiode = Some(photodiode);
        self
    }

    /// Makes the flip with zero-based index `flip` fail.
    pub fn failing_at_flip(mut self, flip: u64) -> Self {
        self.fail_at_flip = Some(flip);
        self
    }

    pub fn flips(&self) -> u64 {
        self.flips
    }

    pub fn polls(&self) -> u64 {
        self.polls
    }

    /// Photodiode state per completed flip
    pub fn light_trace(&self) -> &[bool] {
        &self.light_trace
    }

    pub fn inner(&self) -> &SkiaCanvas {
        &self.canvas
    }
}

impl Display for HeadlessDisplay {
    type Canvas = SkiaCanvas;

    fn canvas(&mut self) -> &mut SkiaCanvas {
        &mut self.canvas
    }

    fn flip(&mut self) -> Result<(), PresentError> {
        if self.fail_at_flip == Some(self.flips) {
            return Err(PresentError::display(format!(
                "headless flip {} failed",
                self.flips
            )));
        }
        if let Some(diode) = &self.photodiode {
            self.light_trace.push(diode.is_lit(&self.canvas));
        }
        self.flips += 1;
        Ok(())
    }

    fn poll_input(&mut self, events: &mut Vec<InputEvent>) {
        let poll = self.polls;
        events.extend(
            self.script
                .iter()
                .filter(|(at, _)| *at == poll)
                .map(|(_, event)| *event),
        );
        self.polls += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ssvep_core::{Canvas, Color, Rect};

    #[test]
    fn scripted_input_arrives_on_its_poll() {
        let mut display = HeadlessDisplay::new(8, 8, ScreenBounds::default())
            .unwrap()
            .with_input(1, InputEvent::Key('q'));
        let mut events = Vec::new();
        display.poll_input(&mut events);
        assert!(events.is_empty());
        display.poll_input(&mut events);
        assert_eq!(events, vec![InputEvent::Key('q')]);
        assert_eq!(display.polls(), 2);
    }

    #[test]
    fn photodiode_sampled_per_flip() {
        let region = Rect::new(0.0, -1.0, 1.0, 0.0);
        let mut display = HeadlessDisplay::new(16, 16, ScreenBounds::default())
            .unwrap()
            .with_photodiode(Photodiode::new(region));
        display.canvas().clear(Color::BLACK);
        display.flip().unwrap();
        display.canvas().draw_rect(region, Color::WHITE);
        display.flip().unwrap();
        assert_eq!(display.light_trace(), &[false, true]);
        assert_eq!(display.flips(), 2);
    }

    #[test]
    fn injected_flip_failure() {
        let mut display = HeadlessDisplay::new(4, 4, ScreenBounds::default())
            .unwrap()
            .failing_at_flip(1);
        assert!(display.flip().is_ok());
        assert!(matches!(display.flip(), Err(PresentError::Display(_))));
        assert_eq!(display.flips(), 1);
    }
}
