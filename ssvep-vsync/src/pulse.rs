use crate::config::{PulseTiming, SyncProtocol};
use crate::patch::PatchGeometry;
use crate::record::TriggerRecord;
use ssvep_core::{Canvas, Color, TriggerCode};
use ssvep_timing::TIME_TOLERANCE;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PulseIndex {
    First,
    Second,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PulseState {
    /// No code to send, patch dark
    Idle,
    Pulse {
        which: PulseIndex,
        started_at: f64,
        first_started_at: f64,
    },
    Waiting {
        first_started_at: f64,
        ended_at: f64,
    },
    Done {
        first_started_at: f64,
        second_started_at: f64,
        ended_at: f64,
    },
}

/// Protocol v2 patch: two full-patch pulses per epoch.
///
/// The second pulse starts `(code + 0.25) * timing_base` after the first one
/// started. Transitions are level-triggered, so a late update delays a pulse
/// but never drops it.
#[derive(Debug, Clone)]
pub struct PulsePatch {
    geometry: PatchGeometry,
    timing: PulseTiming,
    on_color: Color,
    off_color: Color,
    code: TriggerCode,
    interval: Option<f64>,
    epoch_start: Option<f64>,
    state: PulseState,
    ready: bool,
}

impl PulsePatch {
    pub fn new(
        geometry: PatchGeometry,
        timing: PulseTiming,
        on_color: Color,
        off_color: Color,
    ) -> Self {
        Self {
            geometry,
            timing,
            on_color,
            off_color,
            code: TriggerCode::NONE,
            interval: None,
            epoch_start: None,
            state: PulseState::Idle,
            ready: false,
        }
    }

    pub fn geometry(&self) -> &PatchGeometry {
        &self.geometry
    }

    pub fn timing(&self) -> PulseTiming {
        self.timing
    }

    pub fn state(&self) -> PulseState {
        self.state
    }

    pub fn pulse_interval(&self) -> Option<f64> {
        self.interval
    }

    pub fn is_lit(&self) -> bool {
        matches!(self.state, PulseState::Pulse { .. })
    }

    pub fn start_epoch(&mut self, t: f64, code: TriggerCode) {
        self.code = code;
        self.interval = self.timing.interval_for(code);
        self.epoch_start = Some(t);
        self.state = match self.interval {
            Some(_) => PulseState::Pulse {
                which: PulseIndex::First,
                started_at: t,
                first_started_at: t,
            },
            None => PulseState::Idle,
        };
        debug!(code = code.value(), interval = ?self.interval, t, "pulse patch epoch");
        self.ready = true;
    }

    pub fn update(&mut self, t: f64, _dt: f64) {
        let duration = self.timing.pulse_duration;
        let reached = |since: f64, span: f64| t - since + TIME_TOLERANCE >= span;

        let next = match self.state {
            PulseState::Pulse {
                which: PulseIndex::First,
                started_at,
                first_started_at,
            } if reached(started_at, duration) => Some(PulseState::Waiting {
                first_started_at,
                ended_at: t,
            }),
            PulseState::Waiting {
                first_started_at, ..
            } => self
                .interval
                .filter(|&interval| reached(first_started_at, interval))
                .map(|_| PulseState::Pulse {
                    which: PulseIndex::Second,
                    started_at: t,
                    first_started_at,
                }),
            PulseState::Pulse {
                which: PulseIndex::Second,
                started_at,
                first_started_at,
            } if reached(started_at, duration) => Some(PulseState::Done {
                first_started_at,
                second_started_at: started_at,
                ended_at: t,
            }),
            _ => None,
        };

        self.ready = next.is_some();
        if let Some(state) = next {
            self.state = state;
            if let PulseState::Done { .. } = state {
                // interval is spent, nothing else to emit this epoch
                self.interval = None;
            }
        }
    }

    pub fn ready_to_render(&self) -> bool {
        self.ready
    }

    pub fn render(&self, canvas: &mut dyn Canvas) {
        let color = if self.is_lit() {
            self.on_color
        } else {
            self.off_color
        };
        canvas.draw_rect(self.geometry.rect, color);
    }

    pub fn completed_code(&self) -> Option<TriggerCode> {
        matches!(self.state, PulseState::Done { .. }).then_some(self.code)
    }

    pub fn abandon(&mut self) {
        if matches!(self.state, PulseState::Pulse { .. } | PulseState::Waiting { .. }) {
            debug!(code = self.code.value(), "pulse epoch abandoned");
        }
        self.code = TriggerCode::NONE;
        self.interval = None;
        self.epoch_start = None;
        self.state = PulseState::Idle;
        self.ready = false;
    }

    pub fn trigger_record(&self) -> Option<TriggerRecord> {
        match (self.state, self.epoch_start) {
            (
                PulseState::Done {
                    first_started_at,
                    second_started_at,
                    ..
                },
                Some(epoch_start),
            ) => Some(TriggerRecord::pulses(
                self.code,
                epoch_start,
                first_started_at,
                second_started_at,
            )),
            _ => None,
        }
    }

    pub fn protocol(&self) -> SyncProtocol {
        SyncProtocol::PulseInterval
    }
}

/// Code whose interval is nearest to the measured start-to-start gap
pub fn decode_interval(interval: f64, timing_base: f64) -> Option<TriggerCode> {
    if !(interval.is_finite() && timing_base > 0.0) {
        return None;
    }
    let value = (interval / timing_base - PulseTiming::OFFSET).round();
    if value < 1.0 {
        return None;
    }
    TriggerCode::new(value as i64).ok()
}

/// Decodes a photodiode trace of `(time, lit)` samples from its first two
/// rising edges. A trace that starts lit counts as a rising edge.
pub fn decode_light_trace(samples: &[(f64, bool)], timing_base: f64) -> Option<TriggerCode> {
    let mut was_lit = false;
    let mut edges = samples.iter().filter_map(|&(t, lit)| {
        let rising = lit && !was_lit;
        was_lit = lit;
        rising.then_some(t)
    });
    let first = edges.next()?;
    let second = edges.next()?;
    decode_interval(second - first, timing_base)
}
