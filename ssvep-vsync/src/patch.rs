use crate::binary::BinaryPatch;
use crate::config::{SyncConfig, SyncProtocol};
use crate::error::SyncError;
use crate::pulse::PulsePatch;
use crate::record::TriggerRecord;
use ssvep_core::{Canvas, Rect, ScreenBounds, TriggerCode};

/// Screen area watched by the photodiode
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PatchGeometry {
    pub rect: Rect,
}

impl PatchGeometry {
    pub fn bottom_right(bounds: ScreenBounds, width: f32, height: f32) -> Self {
        Self {
            rect: Rect::new(
                bounds.right - width,
                bounds.bottom,
                bounds.right,
                bounds.bottom + height,
            ),
        }
    }

    /// Quadrants in bit order: bottom-right, bottom-left, top-left, top-right.
    pub fn quadrants(&self) -> [Rect; 4] {
        let r = self.rect;
        let (cx, cy) = r.center();
        [
            Rect::new(cx, r.bottom, r.right, cy),
            Rect::new(r.left, r.bottom, cx, cy),
            Rect::new(r.left, cy, cx, r.top),
            Rect::new(cx, cy, r.right, r.top),
        ]
    }
}

/// Common surface of the sync patch encoders
pub trait SyncPatchEncoder {
    fn start_epoch(&mut self, t: f64, code: TriggerCode);
    fn update(&mut self, t: f64, dt: f64);
    fn ready_to_render(&self) -> bool;
    fn render(&self, canvas: &mut dyn Canvas);
    fn completed_code(&self) -> Option<TriggerCode>;
    fn abandon(&mut self);
    fn trigger_record(&self) -> Option<TriggerRecord>;
}

#[derive(Debug, Clone)]
pub enum SyncPatch {
    Binary(BinaryPatch),
    Pulse(PulsePatch),
}

impl SyncPatch {
    pub fn new(config: &SyncConfig, bounds: ScreenBounds) -> Result<Self, SyncError> {
        config.validate()?;
        let geometry = PatchGeometry::bottom_right(bounds, config.patch_width, config.patch_height);
        Ok(match config.protocol {
            SyncProtocol::Binary => {
                SyncPatch::Binary(BinaryPatch::new(geometry, config.on_color, config.off_color))
            }
            SyncProtocol::PulseInterval => SyncPatch::Pulse(PulsePatch::new(
                geometry,
                config.timing,
                config.on_color,
                config.off_color,
            )),
        })
    }

    pub fn protocol(&self) -> SyncProtocol {
        match self {
            SyncPatch::Binary(_) => SyncProtocol::Binary,
            SyncPatch::Pulse(p) => p.protocol(),
        }
    }

    pub fn geometry(&self) -> &PatchGeometry {
        match self {
            SyncPatch::Binary(p) => p.geometry(),
            SyncPatch::Pulse(p) => p.geometry(),
        }
    }
}

impl SyncPatchEncoder for SyncPatch {
    fn start_epoch(&mut self, t: f64, code: TriggerCode) {
        match self {
            SyncPatch::Binary(p) => p.start_epoch(t, code),
            SyncPatch::Pulse(p) => p.start_epoch(t, code),
        }
    }

    fn update(&mut self, t: f64, dt: f64) {
        match self {
            SyncPatch::Binary(p) => p.update(t, dt),
            SyncPatch::Pulse(p) => p.update(t, dt),
        }
    }

    fn ready_to_render(&self) -> bool {
        match self {
            SyncPatch::Binary(p) => p.ready_to_render(),
            SyncPatch::Pulse(p) => p.ready_to_render(),
        }
    }

    fn render(&self, canvas: &mut dyn Canvas) {
        match self {
            SyncPatch::Binary(p) => p.render(canvas),
            SyncPatch::Pulse(p) => p.render(canvas),
        }
    }

    fn completed_code(&self) -> Option<TriggerCode> {
        match self {
            SyncPatch::Binary(p) => p.completed_code(),
            SyncPatch::Pulse(p) => p.completed_code(),
        }
    }

    fn abandon(&mut self) {
        match self {
            SyncPatch::Binary(p) => p.abandon(),
            SyncPatch::Pulse(p) => p.abandon(),
        }
    }

    fn trigger_record(&self) -> Option<TriggerRecord> {
        match self {
            SyncPatch::Binary(p) => p.trigger_record(),
            SyncPatch::Pulse(p) => p.trigger_record(),
        }
    }
}
