use crate::error::SyncError;
use serde::{Deserialize, Serialize};
use ssvep_core::{Color, TriggerCode};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SyncProtocol {
    /// v1: four-quadrant static bit pattern
    #[default]
    Binary,
    /// v2: two pulses, code carried by their start-to-start interval
    PulseInterval,
}

impl FromStr for SyncProtocol {
    type Err = SyncError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "binary" | "v1" => Ok(SyncProtocol::Binary),
            "pulse-interval" | "pulse" | "v2" => Ok(SyncProtocol::PulseInterval),
            _ => Err(SyncError::UnknownProtocol(s.to_string())),
        }
    }
}

impl fmt::Display for SyncProtocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SyncProtocol::Binary => "binary",
            SyncProtocol::PulseInterval => "pulse-interval",
        })
    }
}

/// Pulse widths for the v2 protocol, in seconds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PulseTiming {
    pub timing_base: f64,
    pub pulse_duration: f64,
}

impl Default for PulseTiming {
    fn default() -> Self {
        Self {
            timing_base: 4.0 / 60.0,
            pulse_duration: 2.0 / 60.0,
        }
    }
}

impl PulseTiming {
    /// Added to the code so that code 1 is still clearly longer than one pulse
    pub const OFFSET: f64 = 0.25;

    /// Start-to-start gap that encodes `code`; `None` for code 0, which emits
    /// no pulses at all.
    pub fn interval_for(&self, code: TriggerCode) -> Option<f64> {
        (!code.is_none()).then(|| (code.value() as f64 + Self::OFFSET) * self.timing_base)
    }

    /// Time from epoch start until the second pulse has ended
    pub fn emission_time(&self, code: TriggerCode) -> Option<f64> {
        self.interval_for(code).map(|gap| gap + self.pulse_duration)
    }

    pub fn validate(&self) -> Result<(), SyncError> {
        let positive = |v: f64| v.is_finite() && v > 0.0;
        if !positive(self.timing_base) || !positive(self.pulse_duration) {
            return Err(SyncError::InvalidTiming {
                reason: format!(
                    "timing_base ({}) and pulse_duration ({}) must be positive",
                    self.timing_base, self.pulse_duration
                ),
            });
        }
        // Shortest gap is code 1; the first pulse has to end before it.
        let shortest = (1.0 + Self::OFFSET) * self.timing_base;
        if self.pulse_duration >= shortest {
            return Err(SyncError::InvalidTiming {
                reason: format!(
                    "pulse_duration {} overlaps the shortest interval {shortest}",
                    self.pulse_duration
                ),
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    pub protocol: SyncProtocol,
    pub patch_width: f32,
    pub patch_height: f32,
    pub on_color: Color,
    pub off_color: Color,
    pub timing: PulseTiming,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            protocol: SyncProtocol::Binary,
            patch_width: 0.225,
            patch_height: 0.225,
            on_color: Color::WHITE,
            off_color: Color::BLACK,
            timing: PulseTiming::default(),
        }
    }
}

impl SyncConfig {
    pub fn with_protocol(mut self, protocol: SyncProtocol) -> Self {
        self.protocol = protocol;
        self
    }

    /// Shortest epoch that still shows `code` completely on the patch
    pub fn min_epoch(&self, code: TriggerCode) -> f64 {
        match self.protocol {
            SyncProtocol::Binary => 0.0,
            SyncProtocol::PulseInterval => self.timing.emission_time(code).unwrap_or(0.0),
        }
    }

    pub fn validate(&self) -> Result<(), SyncError> {
        let ok = |v: f32| v.is_finite() && v > 0.0 && v <= 2.0;
        if !ok(self.patch_width) || !ok(self.patch_height) {
            return Err(SyncError::InvalidPatch {
                width: self.patch_width,
                height: self.patch_height,
            });
        }
        if self.protocol == SyncProtocol::PulseInterval {
            self.timing.validate()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interval_has_quarter_offset() {
        let timing = PulseTiming::default();
        let code = TriggerCode::new(5).unwrap();
        let interval = timing.interval_for(code).unwrap();
        assert!((interval - 0.35).abs() < 1e-12);
        assert_eq!(timing.interval_for(TriggerCode::NONE), None);
    }

    #[test]
    fn min_epoch_covers_both_pulses() {
        let code = TriggerCode::new(13).unwrap();
        let binary = SyncConfig::default();
        assert_eq!(binary.min_epoch(code), 0.0);

        let pulse = SyncConfig::default().with_protocol(SyncProtocol::PulseInterval);
        let expected = 13.25 * 4.0 / 60.0 + 2.0 / 60.0;
        assert!((pulse.min_epoch(code) - expected).abs() < 1e-12);
        assert_eq!(pulse.min_epoch(TriggerCode::NONE), 0.0);
    }

    #[test]
    fn rejects_overlapping_pulses() {
        let timing = PulseTiming {
            timing_base: 0.04,
            pulse_duration: 0.05,
        };
        assert!(timing.validate().is_err());
        assert!(PulseTiming::default().validate().is_ok());
        let zero = PulseTiming {
            timing_base: 0.0,
            ..PulseTiming::default()
        };
        assert!(zero.validate().is_err());
    }

    #[test]
    fn protocol_names() {
        assert_eq!("binary".parse::<SyncProtocol>().unwrap(), SyncProtocol::Binary);
        assert_eq!(
            "pulse-interval".parse::<SyncProtocol>().unwrap(),
            SyncProtocol::PulseInterval
        );
        assert_eq!("V2".parse::<SyncProtocol>().unwrap(), SyncProtocol::PulseInterval);
        assert!("morse".parse::<SyncProtocol>().is_err());
        assert_eq!(SyncProtocol::PulseInterval.to_string(), "pulse-interval");
    }

    #[test]
    fn partial_config_uses_defaults() {
        let cfg: SyncConfig =
            serde_json::from_str(r#"{"protocol": "pulse-interval", "on_color": "green"}"#)
                .unwrap();
        assert_eq!(cfg.protocol, SyncProtocol::PulseInterval);
        assert_eq!(cfg.on_color, Color::GREEN);
        assert_eq!(cfg.patch_width, 0.225);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn rejects_degenerate_patch() {
        let cfg = SyncConfig {
            patch_width: 0.0,
            ..SyncConfig::default()
        };
        assert!(matches!(cfg.validate(), Err(SyncError::InvalidPatch { .. })));
    }
}
