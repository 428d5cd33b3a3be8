use crate::driver::{LoopDriver, RunOptions, RunOutcome};
use crate::error::StimulusError;
use crate::fixation::FixationCross;
use crate::screen::Screen;
use serde::{Deserialize, Serialize};
use ssvep_core::{Canvas, Color, Display, TriggerCode};
use ssvep_timing::Clock;
use ssvep_vsync::{SyncConfig, SyncPatch, TriggerRecord};
use tracing::debug;

/// Length of each timed start and stop step, in seconds
pub const BRACKET_STEP: f64 = 1.0;

/// One full-screen color shown for a fixed time with a trigger code
#[derive(Debug, Clone, PartialEq)]
pub struct SequenceStep {
    pub background: Color,
    pub duration: f64,
    pub code: TriggerCode,
    pub mask_escape: bool,
    pub wait_for_ack: bool,
}

impl SequenceStep {
    pub fn new(background: Color, duration: f64, code: TriggerCode) -> Self {
        Self {
            background,
            duration,
            code,
            mask_escape: true,
            wait_for_ack: false,
        }
    }

    fn options(&self) -> RunOptions {
        RunOptions {
            duration: Some(self.duration),
            code: self.code,
            mask_escape: self.mask_escape,
            wait_for_ack: self.wait_for_ack,
            exit_keys: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BracketColors {
    pub default: Color,
    pub start: Color,
    pub stop: Color,
}

impl Default for BracketColors {
    fn default() -> Self {
        Self {
            default: Color::NEUTRAL_GRAY,
            start: Color::GREEN,
            stop: Color::RED,
        }
    }
}

/// Marks the beginning of a session for the acquisition side
pub fn start_sequence(colors: &BracketColors) -> Vec<SequenceStep> {
    vec![
        SequenceStep::new(colors.default, BRACKET_STEP, TriggerCode::NONE),
        SequenceStep::new(colors.start, BRACKET_STEP, TriggerCode::SESSION_MARK),
        SequenceStep::new(colors.default, BRACKET_STEP, TriggerCode::NONE),
        SequenceStep::new(colors.default, BRACKET_STEP, TriggerCode::RECORDING_MARK),
        SequenceStep::new(colors.default, BRACKET_STEP, TriggerCode::NONE),
    ]
}

/// Closes a session; the final red screen stays up until acknowledged.
pub fn stop_sequence(colors: &BracketColors) -> Vec<SequenceStep> {
    vec![
        SequenceStep::new(colors.default, BRACKET_STEP, TriggerCode::SESSION_MARK),
        SequenceStep::new(colors.default, BRACKET_STEP, TriggerCode::NONE),
        SequenceStep::new(colors.stop, BRACKET_STEP, TriggerCode::RECORDING_MARK),
        SequenceStep {
            mask_escape: false,
            wait_for_ack: true,
            ..SequenceStep::new(colors.stop, 0.0, TriggerCode::NONE)
        },
    ]
}

#[derive(Debug, Clone, Serialize)]
pub struct SequenceReport {
    pub outcome: RunOutcome,
    pub steps_run: usize,
    pub triggers: Vec<TriggerRecord>,
}

/// Runs `steps` back to back, stopping early on cancel or close.
pub fn run_sequence<C, D>(
    driver: &mut LoopDriver<C>,
    display: &mut D,
    steps: &[SequenceStep],
    sync: &SyncConfig,
    fixation: Option<FixationCross>,
) -> Result<SequenceReport, StimulusError>
where
    C: Clock,
    D: Display,
{
    let bounds = display.canvas().bounds();
    let mut report = SequenceReport {
        outcome: RunOutcome::Completed,
        steps_run: 0,
        triggers: Vec::new(),
    };
    for step in steps {
        let mut screen = Screen::new(step.background, SyncPatch::new(sync, bounds)?)
            .with_fixation(fixation);
        let run = driver.run(display, &mut screen, &step.options())?;
        report.steps_run += 1;
        report.triggers.extend(run.trigger);
        report.outcome = run.outcome;
        if run.outcome.is_interrupted() {
            debug!(step = report.steps_run, outcome = ?run.outcome, "sequence interrupted");
            break;
        }
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_sequence_codes() {
        let steps = start_sequence(&BracketColors::default());
        let codes: Vec<u8> = steps.iter().map(|s| s.code.value()).collect();
        assert_eq!(codes, vec![0, 13, 0, 5, 0]);
        assert!(steps.iter().all(|s| s.mask_escape && s.duration == 1.0));
        assert_eq!(steps[1].background, Color::GREEN);
    }

    #[test]
    fn stop_sequence_ends_with_acknowledgment() {
        let steps = stop_sequence(&BracketColors::default());
        let codes: Vec<u8> = steps.iter().map(|s| s.code.value()).collect();
        assert_eq!(codes, vec![13, 0, 5, 0]);
        let last = steps.last().unwrap();
        assert!(last.wait_for_ack);
        assert_eq!(last.duration, 0.0);
        assert_eq!(last.background, Color::RED);
        assert_eq!(steps[0].background, Color::NEUTRAL_GRAY);
    }
}
