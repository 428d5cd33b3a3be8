use crate::stimulus::Stimulus;
use serde::Serialize;
use ssvep_core::{Display, InputEvent, PresentError, TriggerCode};
use ssvep_timing::{Clock, LoopStats, TimingSummary, ToggleDiagnostics};
use ssvep_vsync::TriggerRecord;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq)]
pub struct RunOptions {
    /// `None` runs until input ends the loop.
    pub duration: Option<f64>,
    pub code: TriggerCode,
    pub mask_escape: bool,
    pub wait_for_ack: bool,
    pub exit_keys: Vec<char>,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            duration: Some(5.0),
            code: TriggerCode::NONE,
            mask_escape: false,
            wait_for_ack: false,
            exit_keys: Vec::new(),
        }
    }
}

impl RunOptions {
    pub fn for_duration(duration: f64) -> Self {
        Self {
            duration: Some(duration),
            ..Self::default()
        }
    }

    pub fn with_code(mut self, code: TriggerCode) -> Self {
        self.code = code;
        self
    }

    pub fn masked(mut self) -> Self {
        self.mask_escape = true;
        self
    }

    pub fn waiting_for_ack(mut self) -> Self {
        self.wait_for_ack = true;
        self
    }

    pub fn with_exit_keys(mut self, keys: impl IntoIterator<Item = char>) -> Self {
        self.exit_keys = keys.into_iter().collect();
        self
    }

    fn outcome_for(&self, events: &[InputEvent]) -> Option<RunOutcome> {
        events.iter().find_map(|event| match *event {
            InputEvent::Escape if !self.mask_escape => Some(RunOutcome::Cancelled),
            InputEvent::Close => Some(RunOutcome::Closed),
            InputEvent::Key(c) if self.exit_keys.contains(&c) => Some(RunOutcome::ExitKey(c)),
            _ => None,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum RunOutcome {
    Completed,
    ExitKey(char),
    /// The window was closed
    Closed,
    /// Escape pressed by the user
    Cancelled,
}

impl RunOutcome {
    /// Whether an enclosing sequence should stop
    pub fn is_interrupted(self) -> bool {
        matches!(self, RunOutcome::Cancelled | RunOutcome::Closed)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub outcome: RunOutcome,
    pub trigger: Option<TriggerRecord>,
    pub timing: TimingSummary,
    pub diagnostics: Vec<ToggleDiagnostics>,
    pub started_at: f64,
    pub ended_at: f64,
}

/// Busy-polling presentation loop.
///
/// Owns the clock: each iteration samples it once and hands `(t, dt)` to the
/// stimulus. There is no sleep; `Display::flip` is the only blocking call.
pub struct LoopDriver<C: Clock> {
    clock: C,
}

impl<C: Clock> LoopDriver<C> {
    pub fn new(clock: C) -> Self {
        Self { clock }
    }

    pub fn now(&mut self) -> f64 {
        self.clock.now()
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn run<D, S>(
        &mut self,
        display: &mut D,
        stimulus: &mut S,
        options: &RunOptions,
    ) -> Result<RunReport, PresentError>
    where
        D: Display,
        S: Stimulus + ?Sized,
    {
        let t0 = self.clock.now();
        stimulus.start_epoch(t0, options.code);
        debug!(code = options.code.value(), duration = ?options.duration, t0, "run started");

        let mut stats = LoopStats::new();
        if let Err(err) = present(display, stimulus, &mut stats) {
            stimulus.abandon();
            return Err(err);
        }

        let mut events = Vec::new();
        let mut last_t = t0;
        let mut t;
        let outcome = loop {
            t = self.clock.now();
            let dt = t - last_t;
            stats.record_iteration(dt);
            stimulus.update(t, dt);

            if stimulus.ready_to_render() {
                if let Err(err) = present(display, stimulus, &mut stats) {
                    stimulus.abandon();
                    return Err(err);
                }
            }

            events.clear();
            display.poll_input(&mut events);
            if let Some(outcome) = options.outcome_for(&events) {
                break outcome;
            }
            if options.duration.is_some_and(|d| t - t0 > d) {
                break RunOutcome::Completed;
            }
            last_t = t;
        };

        if outcome == RunOutcome::Cancelled {
            stimulus.abandon();
            info!(code = options.code.value(), "run cancelled");
        }

        let timing = stats.summary(t - t0);
        let diagnostics = stimulus.diagnostics(t);
        for d in diagnostics.iter().filter(|d| d.skipped > 0) {
            warn!(
                label = %d.label,
                nominal_hz = d.nominal_hz,
                achieved_hz = ?d.achieved_hz,
                skipped = d.skipped,
                "loop too slow for toggle frequency"
            );
        }
        info!(
            ?outcome,
            iterations = timing.iterations,
            flips = timing.flips,
            loop_rate_hz = timing.loop_rate_hz,
            jitter_ms = timing.jitter_s * 1e3,
            "run finished"
        );

        let trigger = stimulus.completed_trigger();
        if outcome == RunOutcome::Completed && !options.code.is_none() && trigger.is_none() {
            warn!(
                code = options.code.value(),
                duration = ?options.duration,
                "run completed but its code never finished on the sync patch"
            );
        }
        let outcome = match outcome {
            RunOutcome::Completed | RunOutcome::ExitKey(_) if options.wait_for_ack => {
                match self.wait_for_acknowledgment(display) {
                    RunOutcome::Closed => RunOutcome::Closed,
                    _ => outcome,
                }
            }
            other => other,
        };

        Ok(RunReport {
            outcome,
            trigger,
            timing,
            diagnostics,
            started_at: t0,
            ended_at: t,
        })
    }

    /// Polls until Escape or Close. Escape is never masked here.
    pub fn wait_for_acknowledgment<D: Display>(&mut self, display: &mut D) -> RunOutcome {
        debug!("waiting for acknowledgment");
        let mut events = Vec::new();
        loop {
            events.clear();
            display.poll_input(&mut events);
            for event in &events {
                match event {
                    InputEvent::Escape => return RunOutcome::Cancelled,
                    InputEvent::Close => return RunOutcome::Closed,
                    InputEvent::Key(_) => {}
                }
            }
        }
    }
}

fn present<D, S>(display: &mut D, stimulus: &S, stats: &mut LoopStats) -> Result<(), PresentError>
where
    D: Display,
    S: Stimulus + ?Sized,
{
    stimulus.render(display.canvas());
    display.flip()?;
    stats.record_flip();
    Ok(())
}
