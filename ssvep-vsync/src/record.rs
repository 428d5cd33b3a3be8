use crate::config::SyncProtocol;
use serde::Serialize;
use ssvep_core::TriggerCode;

/// A trigger that was fully emitted on screen
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TriggerRecord {
    pub code: TriggerCode,
    pub protocol: SyncProtocol,
    pub epoch_start: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_pulse_start: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub second_pulse_start: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub measured_interval: Option<f64>,
}

impl TriggerRecord {
    pub fn binary(code: TriggerCode, epoch_start: f64) -> Self {
        Self {
            code,
            protocol: SyncProtocol::Binary,
            epoch_start,
            first_pulse_start: None,
            second_pulse_start: None,
            measured_interval: None,
        }
    }

    pub fn pulses(code: TriggerCode, epoch_start: f64, first: f64, second: f64) -> Self {
        Self {
            code,
            protocol: SyncProtocol::PulseInterval,
            epoch_start,
            first_pulse_start: Some(first),
            second_pulse_start: Some(second),
            measured_interval: Some(second - first),
        }
    }

    /// Same record with every timestamp relative to `origin`
    pub fn offset(&self, origin: f64) -> Self {
        Self {
            epoch_start: self.epoch_start - origin,
            first_pulse_start: self.first_pulse_start.map(|t| t - origin),
            second_pulse_start: self.second_pulse_start.map(|t| t - origin),
            ..self.clone()
        }
    }
}
