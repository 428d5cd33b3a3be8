use crate::fixation::FixationCross;
use crate::stimulus::Stimulus;
use ssvep_core::{Canvas, Color, TriggerCode};
use ssvep_vsync::{SyncPatch, SyncPatchEncoder, TriggerRecord};

/// Plain background with the sync patch, optionally a fixation cross.
///
/// Flashers embed a `Screen` and draw their boards between
/// [`Screen::render_background`] and [`Screen::render_overlay`], so the patch
/// always ends up on top.
#[derive(Debug, Clone)]
pub struct Screen {
    background: Color,
    fixation: Option<FixationCross>,
    patch: SyncPatch,
}

impl Screen {
    pub fn new(background: Color, patch: SyncPatch) -> Self {
        Self {
            background,
            fixation: None,
            patch,
        }
    }

    pub fn with_fixation(mut self, cross: Option<FixationCross>) -> Self {
        self.fixation = cross;
        self
    }

    pub fn background(&self) -> Color {
        self.background
    }

    pub fn patch(&self) -> &SyncPatch {
        &self.patch
    }

    pub fn render_background(&self, canvas: &mut dyn Canvas) {
        canvas.clear(self.background);
    }

    pub fn render_overlay(&self, canvas: &mut dyn Canvas) {
        if let Some(cross) = &self.fixation {
            cross.render(canvas);
        }
        self.patch.render(canvas);
    }
}

impl Stimulus for Screen {
    fn start_epoch(&mut self, t: f64, code: TriggerCode) {
        self.patch.start_epoch(t, code);
    }

    fn update(&mut self, t: f64, dt: f64) {
        self.patch.update(t, dt);
    }

    fn ready_to_render(&self) -> bool {
        self.patch.ready_to_render()
    }

    fn render(&self, canvas: &mut dyn Canvas) {
        self.render_background(canvas);
        self.render_overlay(canvas);
    }

    fn abandon(&mut self) {
        self.patch.abandon();
    }

    fn completed_trigger(&self) -> Option<TriggerRecord> {
        self.patch.trigger_record()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ssvep_core::{CommandCanvas, ScreenBounds};
    use ssvep_vsync::SyncConfig;

    fn screen() -> Screen {
        let patch = SyncPatch::new(&SyncConfig::default(), ScreenBounds::default()).unwrap();
        Screen::new(Color::NEUTRAL_GRAY, patch).with_fixation(Some(FixationCross::default()))
    }

    #[test]
    fn draws_background_cross_then_patch() {
        let mut s = screen();
        s.start_epoch(0.0, TriggerCode::new(1).unwrap());
        let mut canvas = CommandCanvas::new(ScreenBounds::default());
        s.render(&mut canvas);

        assert_eq!(canvas.color_at(0.5, 0.5), Some(Color::NEUTRAL_GRAY));
        assert_eq!(canvas.color_at(0.0, 0.03), Some(Color::WHITE));
        // bit 0 quadrant of the patch
        assert_eq!(canvas.color_at(0.99, -0.99), Some(Color::WHITE));
        assert_eq!(canvas.color_at(0.8, -0.99), Some(Color::BLACK));
    }

    #[test]
    fn ready_follows_patch() {
        let mut s = screen();
        s.start_epoch(0.0, TriggerCode::new(2).unwrap());
        assert!(s.ready_to_render());
        s.update(0.01, 0.01);
        assert!(!s.ready_to_render());
        assert!(s.completed_trigger().is_some());
        s.abandon();
        assert!(s.completed_trigger().is_none());
    }
}
