use crate::driver::RunOutcome;
use crate::error::StimulusError;
use crate::stimulus::Stimulus;
use serde::Serialize;
use ssvep_core::{Display, InputEvent, PresentError, TriggerCode};
use ssvep_timing::{Clock, SimulatedClock, ToggleDiagnostics};
use ssvep_vsync::TriggerRecord;
use std::time::Instant;
use tracing::{debug, info};

pub type FrameSinkError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Clone, PartialEq)]
pub struct RecordOptions {
    pub duration: f64,
    pub frame_rate: f64,
    pub code: TriggerCode,
    /// Also flip every frame to the display
    pub show: bool,
}

impl Default for RecordOptions {
    fn default() -> Self {
        Self {
            duration: 5.0,
            frame_rate: 60.0,
            code: TriggerCode::NONE,
            show: false,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RecordReport {
    pub outcome: RunOutcome,
    pub frames: u64,
    pub trigger: Option<TriggerRecord>,
    pub diagnostics: Vec<ToggleDiagnostics>,
}

/// Offline loop on simulated time: one frame every `1 / frame_rate` seconds,
/// each handed to a sink (typically an image writer).
#[derive(Debug, Clone)]
pub struct Recorder {
    options: RecordOptions,
}

impl Recorder {
    const PROGRESS_EVERY_S: f64 = 10.0;

    pub fn new(options: RecordOptions) -> Result<Self, StimulusError> {
        if !(options.duration.is_finite() && options.duration >= 0.0) {
            return Err(StimulusError::InvalidConfig(format!(
                "recording duration must be non-negative, got {}",
                options.duration
            )));
        }
        SimulatedClock::from_frame_rate(options.frame_rate)?;
        Ok(Self { options })
    }

    pub fn options(&self) -> &RecordOptions {
        &self.options
    }

    pub fn record<D, S, F>(
        &self,
        display: &mut D,
        stimulus: &mut S,
        mut on_frame: F,
    ) -> Result<RecordReport, StimulusError>
    where
        D: Display,
        S: Stimulus + ?Sized,
        F: FnMut(u64, f64, &D::Canvas) -> Result<(), FrameSinkError>,
    {
        let opts = &self.options;
        let mut clock = SimulatedClock::from_frame_rate(opts.frame_rate)?;
        let total = (opts.duration * opts.frame_rate).floor() as u64 + 1;
        debug!(frames = total, frame_rate = opts.frame_rate, "recording started");

        let t0 = clock.now();
        stimulus.start_epoch(t0, opts.code);
        stimulus.render(display.canvas());

        let wall_start = Instant::now();
        let mut last_progress = wall_start;
        let mut events = Vec::new();
        let mut frame = 0u64;
        let mut t = t0;
        let outcome = loop {
            on_frame(frame, t, display.canvas())
                .map_err(|source| StimulusError::FrameSink { frame, source })?;
            if opts.show {
                flip_or_abandon(display, stimulus)?;
            }
            frame += 1;

            if last_progress.elapsed().as_secs_f64() > Self::PROGRESS_EVERY_S {
                last_progress = Instant::now();
                info!(
                    percent = 100.0 * frame as f64 / total as f64,
                    elapsed_s = wall_start.elapsed().as_secs(),
                    "recording progress"
                );
            }

            let next = clock.now();
            let dt = next - t;
            t = next;

            events.clear();
            display.poll_input(&mut events);
            if let Some(outcome) = events.iter().find_map(|e| match e {
                InputEvent::Escape => Some(RunOutcome::Cancelled),
                InputEvent::Close => Some(RunOutcome::Closed),
                InputEvent::Key(_) => None,
            }) {
                break outcome;
            }
            if t - t0 > opts.duration {
                break RunOutcome::Completed;
            }

            stimulus.update(t, dt);
            if stimulus.ready_to_render() {
                stimulus.render(display.canvas());
            }
        };

        if outcome == RunOutcome::Cancelled {
            stimulus.abandon();
        }
        info!(frames = frame, ?outcome, "recording finished");
        Ok(RecordReport {
            outcome,
            frames: frame,
            trigger: stimulus.completed_trigger(),
            diagnostics: stimulus.diagnostics(t),
        })
    }
}

fn flip_or_abandon<D, S>(display: &mut D, stimulus: &mut S) -> Result<(), PresentError>
where
    D: Display,
    S: Stimulus + ?Sized,
{
    display.flip().inspect_err(|_| stimulus.abandon())
}
