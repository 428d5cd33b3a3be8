use serde::Serialize;
use std::collections::VecDeque;

const MAX_SAMPLES: usize = 1000;

/// Iteration timing of the presentation loop
#[derive(Debug, Clone, Default)]
pub struct LoopStats {
    intervals: VecDeque<f64>,
    iterations: u64,
    flips: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TimingSummary {
    pub mean_interval_s: f64,
    pub jitter_s: f64,
    pub min_interval_s: f64,
    pub max_interval_s: f64,
    pub loop_rate_hz: f64,
    pub flip_rate_hz: f64,
    pub iterations: u64,
    pub flips: u64,
    pub elapsed_s: f64,
}

impl LoopStats {
    pub fn new() -> Self {
        Self {
            intervals: VecDeque::with_capacity(MAX_SAMPLES),
            iterations: 0,
            flips: 0,
        }
    }

    pub fn record_iteration(&mut self, dt: f64) {
        if self.intervals.len() == MAX_SAMPLES {
            self.intervals.pop_front();
        }
        self.intervals.push_back(dt);
        self.iterations += 1;
    }

    pub fn record_flip(&mut self) {
        self.flips += 1;
    }

    pub fn iterations(&self) -> u64 {
        self.iterations
    }

    pub fn flips(&self) -> u64 {
        self.flips
    }

    /// Interval statistics cover the most recent samples only; the rates
    /// cover the whole run of `elapsed` seconds.
    pub fn summary(&self, elapsed: f64) -> TimingSummary {
        let rate = |count: u64| {
            if elapsed > 0.0 {
                count as f64 / elapsed
            } else {
                0.0
            }
        };
        let mut summary = TimingSummary {
            loop_rate_hz: rate(self.iterations),
            flip_rate_hz: rate(self.flips),
            iterations: self.iterations,
            flips: self.flips,
            elapsed_s: elapsed,
            ..TimingSummary::default()
        };
        if self.intervals.is_empty() {
            return summary;
        }

        let n = self.intervals.len() as f64;
        let mean = self.intervals.iter().sum::<f64>() / n;
        let var = self
            .intervals
            .iter()
            .map(|x| (x - mean).powi(2))
            .sum::<f64>()
            / n;
        summary.mean_interval_s = mean;
        summary.jitter_s = var.sqrt();
        summary.min_interval_s = self.intervals.iter().copied().fold(f64::INFINITY, f64::min);
        summary.max_interval_s = self
            .intervals
            .iter()
            .copied()
            .fold(f64::NEG_INFINITY, f64::max);
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summarizes_intervals_and_rates() {
        let mut stats = LoopStats::new();
        for dt in [0.001, 0.003, 0.002] {
            stats.record_iteration(dt);
        }
        stats.record_flip();
        let s = stats.summary(0.5);
        assert!((s.mean_interval_s - 0.002).abs() < 1e-12);
        assert_eq!(s.min_interval_s, 0.001);
        assert_eq!(s.max_interval_s, 0.003);
        assert!(s.jitter_s > 0.0);
        assert_eq!(s.iterations, 3);
        assert!((s.loop_rate_hz - 6.0).abs() < 1e-9);
        assert!((s.flip_rate_hz - 2.0).abs() < 1e-9);
    }

    #[test]
    fn keeps_a_bounded_window() {
        let mut stats = LoopStats::new();
        for _ in 0..MAX_SAMPLES {
            stats.record_iteration(1.0);
        }
        for _ in 0..MAX_SAMPLES {
            stats.record_iteration(0.5);
        }
        let s = stats.summary(1.0);
        assert_eq!(s.max_interval_s, 0.5);
        assert_eq!(s.iterations, 2 * MAX_SAMPLES as u64);
    }

    #[test]
    fn empty_summary_is_zeroed() {
        let s = LoopStats::new().summary(0.0);
        assert_eq!(s, TimingSummary::default());
    }
}
