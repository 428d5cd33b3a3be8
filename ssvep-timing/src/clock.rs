use crate::error::TimingError;
use std::time::Instant;

/// Monotonic time source in seconds.
///
/// The loop driver samples the clock once per iteration; everything below it
/// receives the sampled value.
pub trait Clock {
    fn now(&mut self) -> f64;
}

/// Wall clock backed by `Instant`
#[derive(Debug, Clone)]
pub struct HighPrecisionTimer {
    start: Instant,
}

impl HighPrecisionTimer {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Default for HighPrecisionTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for HighPrecisionTimer {
    fn now(&mut self) -> f64 {
        self.start.elapsed().as_secs_f64()
    }
}

/// Returns `start`, then advances by a fixed `step` on every call.
#[derive(Debug, Clone)]
pub struct SimulatedClock {
    start: f64,
    step: f64,
    ticks: u64,
}

impl SimulatedClock {
    pub fn new(start: f64, step: f64) -> Result<Self, TimingError> {
        if !step.is_finite() || step <= 0.0 {
            return Err(TimingError::InvalidStep(step));
        }
        Ok(Self {
            start,
            step,
            ticks: 0,
        })
    }

    pub fn from_frame_rate(frame_rate: f64) -> Result<Self, TimingError> {
        if !frame_rate.is_finite() || frame_rate <= 0.0 {
            return Err(TimingError::InvalidFrequency(frame_rate));
        }
        Self::new(0.0, 1.0 / frame_rate)
    }

    pub fn step(&self) -> f64 {
        self.step
    }

    /// Calls to `now` so far
    pub fn ticks(&self) -> u64 {
        self.ticks
    }
}

impl Clock for SimulatedClock {
    fn now(&mut self) -> f64 {
        // Multiply instead of accumulating so long runs don't drift.
        let t = self.start + self.ticks as f64 * self.step;
        self.ticks += 1;
        t
    }
}

/// Replays a fixed list of timestamps, then keeps advancing by the last gap.
///
/// Used to reproduce stalls and irregular loop rates in tests.
#[derive(Debug, Clone)]
pub struct ScriptedClock {
    times: Vec<f64>,
    next: usize,
    last: f64,
    tail_step: f64,
}

impl ScriptedClock {
    pub fn new(times: Vec<f64>) -> Self {
        let tail_step = match times.as_slice() {
            [.., a, b] if b > a => b - a,
            _ => 1e-3,
        };
        Self {
            times,
            next: 0,
            last: 0.0,
            tail_step,
        }
    }
}

impl Clock for ScriptedClock {
    fn now(&mut self) -> f64 {
        let t = match self.times.get(self.next) {
            Some(&t) => t,
            None => self.last + self.tail_step,
        };
        self.next += 1;
        self.last = t;
        t
    }
}
