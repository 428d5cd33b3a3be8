use crate::error::TimingError;
use serde::Serialize;

/// Float slack for the period comparison (1 ns)
pub const TIME_TOLERANCE: f64 = 1e-9;

/// Level-triggered periodic state cycler.
///
/// Each `update` compares the time elapsed since the last change against the
/// period and advances the state index by at most one step. Time lost to a
/// slow loop is not made up later, so the achieved frequency drops instead
/// of bunching toggles.
#[derive(Debug, Clone)]
pub struct PeriodicToggle {
    period: f64,
    states: usize,
    index: usize,
    started_at: Option<f64>,
    last_change: f64,
    toggles: u64,
    skipped: u64,
}

impl PeriodicToggle {
    pub fn new(frequency_hz: f64, states: usize) -> Result<Self, TimingError> {
        if !frequency_hz.is_finite() || frequency_hz <= 0.0 {
            return Err(TimingError::InvalidFrequency(frequency_hz));
        }
        if states == 0 {
            return Err(TimingError::InvalidStateCount);
        }
        Ok(Self {
            period: 1.0 / frequency_hz,
            states,
            index: 0,
            started_at: None,
            last_change: 0.0,
            toggles: 0,
            skipped: 0,
        })
    }

    /// Two-state toggle (pattern / inverse)
    pub fn binary(frequency_hz: f64) -> Result<Self, TimingError> {
        Self::new(frequency_hz, 2)
    }

    pub fn start(&mut self, t: f64) {
        self.started_at = Some(t);
        self.last_change = t;
        self.index = 0;
        self.toggles = 0;
        self.skipped = 0;
    }

    pub fn is_started(&self) -> bool {
        self.started_at.is_some()
    }

    /// Returns `true` when the state advanced on this call.
    ///
    /// An unstarted toggle starts at `t` and reports no change.
    pub fn update(&mut self, t: f64) -> bool {
        if self.started_at.is_none() {
            self.start(t);
            return false;
        }
        let elapsed = t - self.last_change;
        if elapsed + TIME_TOLERANCE < self.period {
            return false;
        }
        let due = ((elapsed + TIME_TOLERANCE) / self.period).floor() as u64;
        self.skipped += due.saturating_sub(1);
        self.last_change = t;
        self.index = (self.index + 1) % self.states;
        self.toggles += 1;
        true
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn states(&self) -> usize {
        self.states
    }

    pub fn period(&self) -> f64 {
        self.period
    }

    pub fn nominal_frequency(&self) -> f64 {
        1.0 / self.period
    }

    pub fn last_change(&self) -> f64 {
        self.last_change
    }

    pub fn toggles(&self) -> u64 {
        self.toggles
    }

    /// Periods that elapsed without their own toggle
    pub fn skipped_toggles(&self) -> u64 {
        self.skipped
    }

    pub fn achieved_frequency(&self, t: f64) -> Option<f64> {
        let elapsed = t - self.started_at?;
        (elapsed > 0.0).then(|| self.toggles as f64 / elapsed)
    }

    pub fn diagnostics(&self, label: impl Into<String>, t: f64) -> ToggleDiagnostics {
        ToggleDiagnostics {
            label: label.into(),
            nominal_hz: self.nominal_frequency(),
            achieved_hz: self.achieved_frequency(t),
            toggles: self.toggles,
            skipped: self.skipped,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToggleDiagnostics {
    pub label: String,
    pub nominal_hz: f64,
    pub achieved_hz: Option<f64>,
    pub toggles: u64,
    pub skipped: u64,
}
