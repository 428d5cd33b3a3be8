use ssvep_core::{Canvas, TriggerCode};
use ssvep_timing::ToggleDiagnostics;
use ssvep_vsync::TriggerRecord;

/// Something the loop driver can present.
///
/// Time only enters through `start_epoch` and `update`; implementations
/// never read a clock.
pub trait Stimulus {
    fn start_epoch(&mut self, t: f64, code: TriggerCode);

    fn update(&mut self, t: f64, dt: f64);

    /// Whether the last `update` changed anything visible
    fn ready_to_render(&self) -> bool;

    fn render(&self, canvas: &mut dyn Canvas);

    /// Drops the running epoch, e.g. after a user abort.
    fn abandon(&mut self);

    /// Record of the trigger sent this epoch, once fully on screen
    fn completed_trigger(&self) -> Option<TriggerRecord>;

    fn diagnostics(&self, _t: f64) -> Vec<ToggleDiagnostics> {
        Vec::new()
    }
}
