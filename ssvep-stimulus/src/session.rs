use crate::checkerboard::Checkerboard;
use crate::driver::{LoopDriver, RunOptions, RunOutcome};
use crate::error::StimulusError;
use crate::fixation::FixationCross;
use crate::flasher::CheckerboardFlasher;
use crate::log::TriggerLog;
use crate::screen::Screen;
use crate::sequence::{BRACKET_STEP, BracketColors, run_sequence, start_sequence, stop_sequence};
use crate::stimulus::Stimulus;
use crate::waveform::ContrastFlasher;
use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use ssvep_core::{Canvas, Color, Display, ScreenBounds, TriggerCode};
use ssvep_timing::Clock;
use ssvep_vsync::{SyncConfig, SyncPatch, SyncProtocol};
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StimulusKind {
    /// Pattern reversal at the flash rate
    #[default]
    Reversal,
    /// Sine contrast modulation at the flash rate
    Contrast,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub flash_rates: Vec<f64>,
    /// One code per flash rate, sent at flash onset
    pub codes: Vec<TriggerCode>,
    pub blocks: usize,
    pub repetitions: usize,
    pub nrows: usize,
    pub board_width: f32,
    pub flash_duration: f64,
    pub pause_range: (f64, f64),
    pub stimulus: StimulusKind,
    pub inv_gamma: f64,
    pub background: Color,
    pub pause_background: Color,
    pub check_color1: Color,
    pub check_color2: Color,
    pub show_fixation_dot: bool,
    pub bracket: BracketColors,
    pub fixation: FixationCross,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            flash_rates: vec![16.0, 19.0, 23.0],
            codes: [1, 2, 3]
                .into_iter()
                .filter_map(|c| TriggerCode::new(c).ok())
                .collect(),
            blocks: 3,
            repetitions: 3,
            nrows: 64,
            board_width: 2.0,
            flash_duration: 2.0,
            pause_range: (2.0, 5.0),
            stimulus: StimulusKind::Reversal,
            inv_gamma: 0.43,
            background: Color::NEUTRAL_GRAY,
            pause_background: Color::BLACK,
            check_color1: Color::WHITE,
            check_color2: Color::BLACK,
            show_fixation_dot: false,
            bracket: BracketColors::default(),
            fixation: FixationCross::default(),
        }
    }
}

impl SessionConfig {
    pub fn validate(&self) -> Result<(), StimulusError> {
        let invalid = |msg: String| Err(StimulusError::InvalidConfig(msg));
        if self.flash_rates.is_empty() {
            return invalid("flash_rates is empty".into());
        }
        if self.flash_rates.len() != self.codes.len() {
            return invalid(format!(
                "{} flash rates but {} codes",
                self.flash_rates.len(),
                self.codes.len()
            ));
        }
        if let Some(rate) = self
            .flash_rates
            .iter()
            .find(|r| !(r.is_finite() && **r > 0.0))
        {
            return invalid(format!("flash rate {rate} must be positive"));
        }
        if self.codes.iter().any(|c| c.is_none()) {
            return invalid("trial codes must be non-zero".into());
        }
        if self.blocks == 0 || self.repetitions == 0 || self.nrows == 0 {
            return invalid("blocks, repetitions and nrows must be at least 1".into());
        }
        if !(self.board_width.is_finite() && self.board_width > 0.0) {
            return invalid(format!("board_width {} must be positive", self.board_width));
        }
        if !(self.flash_duration.is_finite() && self.flash_duration > 0.0) {
            return invalid(format!(
                "flash_duration {} must be positive",
                self.flash_duration
            ));
        }
        let (lo, hi) = self.pause_range;
        if !(lo.is_finite() && hi.is_finite() && 0.0 <= lo && lo <= hi) {
            return invalid(format!("pause_range ({lo}, {hi}) is not a valid range"));
        }
        if !(self.inv_gamma.is_finite() && self.inv_gamma > 0.0) {
            return invalid(format!("inv_gamma {} must be positive", self.inv_gamma));
        }
        Ok(())
    }

    pub fn board(&self) -> Result<Checkerboard, StimulusError> {
        Ok(Checkerboard::with_board_width(self.nrows, self.board_width)?
            .with_colors(self.check_color1, self.check_color2)
            .with_fixation_dot(self.show_fixation_dot))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PlannedTrial {
    pub block: usize,
    pub flash_rate: f64,
    pub code: TriggerCode,
    pub pause: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionPlan {
    pub trials: Vec<PlannedTrial>,
}

impl SessionPlan {
    /// Every (rate, code) pair `repetitions` times per block, shuffled within
    /// the block, each followed by a uniformly drawn pause.
    pub fn generate<R: Rng + ?Sized>(
        config: &SessionConfig,
        rng: &mut R,
    ) -> Result<Self, StimulusError> {
        config.validate()?;
        let (lo, hi) = config.pause_range;
        let pairs: Vec<(f64, TriggerCode)> = config
            .flash_rates
            .iter()
            .copied()
            .zip(config.codes.iter().copied())
            .collect();

        let mut trials = Vec::with_capacity(config.blocks * config.repetitions * pairs.len());
        for block in 0..config.blocks {
            let mut stims: Vec<(f64, TriggerCode)> = (0..config.repetitions)
                .flat_map(|_| pairs.iter().copied())
                .collect();
            stims.shuffle(rng);
            for (flash_rate, code) in stims {
                trials.push(PlannedTrial {
                    block,
                    flash_rate,
                    code,
                    pause: rng.random_range(lo..=hi),
                });
            }
        }
        Ok(Self { trials })
    }

    pub fn len(&self) -> usize {
        self.trials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trials.is_empty()
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct SessionReport {
    pub planned_trials: usize,
    pub completed_trials: usize,
    pub cancelled: bool,
    pub closed: bool,
    pub triggers: TriggerLog,
}

/// Flasher for one trial of the session
pub fn build_trial_stimulus(
    config: &SessionConfig,
    sync: &SyncConfig,
    bounds: ScreenBounds,
    flash_rate: f64,
) -> Result<Box<dyn Stimulus>, StimulusError> {
    let screen = Screen::new(config.background, SyncPatch::new(sync, bounds)?);
    let board = config.board()?;
    let stimulus: Box<dyn Stimulus> = match config.stimulus {
        StimulusKind::Reversal => Box::new(CheckerboardFlasher::new(screen, board, flash_rate)?),
        StimulusKind::Contrast => Box::new(ContrastFlasher::single(
            screen,
            board,
            flash_rate,
            config.inv_gamma,
        )?),
    };
    Ok(stimulus)
}

/// Every code the session sends has to be fully visible on the patch before
/// its epoch ends, otherwise the acquisition side never sees it.
fn check_codes_fit(config: &SessionConfig, sync: &SyncConfig) -> Result<(), StimulusError> {
    let bracket = [TriggerCode::SESSION_MARK, TriggerCode::RECORDING_MARK];
    let epochs = config
        .codes
        .iter()
        .map(|&code| (code, config.flash_duration, "flash_duration"))
        .chain(bracket.into_iter().map(|code| (code, BRACKET_STEP, "bracket step")));
    for (code, epoch, what) in epochs {
        if sync.protocol == SyncProtocol::Binary && code.bits() == 0 {
            return Err(StimulusError::InvalidConfig(format!(
                "code {} has no set bits under the {} protocol",
                code.value(),
                sync.protocol
            )));
        }
        let needed = sync.min_epoch(code);
        if needed >= epoch {
            return Err(StimulusError::InvalidConfig(format!(
                "code {} needs {needed:.3} s under the {} protocol but {what} is {epoch} s",
                code.value(),
                sync.protocol
            )));
        }
    }
    Ok(())
}

/// SSVEP block design: bracketed by the start and stop sequences, each trial
/// is a flash epoch followed by a dark fixation pause.
pub struct Session {
    config: SessionConfig,
    sync: SyncConfig,
}

impl Session {
    pub fn new(config: SessionConfig, sync: SyncConfig) -> Result<Self, StimulusError> {
        config.validate()?;
        sync.validate()?;
        check_codes_fit(&config, &sync)?;
        Ok(Self { config, sync })
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn run<C, D>(
        &self,
        driver: &mut LoopDriver<C>,
        display: &mut D,
        plan: &SessionPlan,
    ) -> Result<SessionReport, StimulusError>
    where
        C: Clock,
        D: Display,
    {
        let bounds = display.canvas().bounds();
        let fixation = Some(self.config.fixation);
        let mut report = SessionReport {
            planned_trials: plan.len(),
            triggers: TriggerLog::new(driver.now()),
            ..SessionReport::default()
        };
        info!(trials = plan.len(), protocol = %self.sync.protocol, "session started");

        let start = run_sequence(
            driver,
            display,
            &start_sequence(&self.config.bracket),
            &self.sync,
            fixation,
        )?;
        report.triggers.extend(start.triggers);
        report.closed = start.outcome == RunOutcome::Closed;

        if !report.closed {
            self.run_trials(driver, display, bounds, plan, &mut report)?;
        }

        // Stop markers are sent after a cancelled trial too.
        if !report.closed {
            let stop = run_sequence(
                driver,
                display,
                &stop_sequence(&self.config.bracket),
                &self.sync,
                None,
            )?;
            report.triggers.extend(stop.triggers);
            report.closed = stop.outcome == RunOutcome::Closed;
        } else {
            warn!("display closed, stop sequence skipped");
        }

        info!(
            completed = report.completed_trials,
            planned = report.planned_trials,
            cancelled = report.cancelled,
            triggers = report.triggers.len(),
            "session finished"
        );
        Ok(report)
    }

    fn run_trials<C, D>(
        &self,
        driver: &mut LoopDriver<C>,
        display: &mut D,
        bounds: ScreenBounds,
        plan: &SessionPlan,
        report: &mut SessionReport,
    ) -> Result<(), StimulusError>
    where
        C: Clock,
        D: Display,
    {
        for (index, trial) in plan.trials.iter().enumerate() {
            info!(
                trial = index,
                block = trial.block,
                rate_hz = trial.flash_rate,
                code = trial.code.value(),
                "trial"
            );
            let mut flasher = build_trial_stimulus(&self.config, &self.sync, bounds, trial.flash_rate)?;
            let flash = driver.run(
                display,
                flasher.as_mut(),
                &RunOptions::for_duration(self.config.flash_duration).with_code(trial.code),
            )?;
            report.triggers.extend(flash.trigger);
            if self.interrupted(flash.outcome, report) {
                return Ok(());
            }

            let mut pause = Screen::new(self.config.pause_background, SyncPatch::new(&self.sync, bounds)?)
                .with_fixation(Some(self.config.fixation));
            let rest = driver.run(
                display,
                &mut pause,
                &RunOptions::for_duration(trial.pause).with_code(TriggerCode::NONE),
            )?;
            report.completed_trials += 1;
            if self.interrupted(rest.outcome, report) {
                return Ok(());
            }
        }
        Ok(())
    }

    fn interrupted(&self, outcome: RunOutcome, report: &mut SessionReport) -> bool {
        match outcome {
            RunOutcome::Cancelled => report.cancelled = true,
            RunOutcome::Closed => report.closed = true,
            _ => return false,
        }
        true
    }
}
