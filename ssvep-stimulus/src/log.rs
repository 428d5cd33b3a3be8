use crate::error::StimulusError;
use serde::Serialize;
use ssvep_vsync::TriggerRecord;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Completed triggers with times relative to the session start
#[derive(Debug, Clone, Default, Serialize)]
pub struct TriggerLog {
    pub origin: f64,
    pub records: Vec<TriggerRecord>,
}

impl TriggerLog {
    pub fn new(origin: f64) -> Self {
        Self {
            origin,
            records: Vec::new(),
        }
    }

    pub fn push(&mut self, record: TriggerRecord) {
        self.records.push(record.offset(self.origin));
    }

    pub fn extend(&mut self, records: impl IntoIterator<Item = TriggerRecord>) {
        for record in records {
            self.push(record);
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn to_json(&self) -> Result<String, StimulusError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn write_json(&self, path: &Path) -> Result<(), StimulusError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let mut writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(&mut writer, self)?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ssvep_core::TriggerCode;

    #[test]
    fn stores_session_relative_times() {
        let mut log = TriggerLog::new(100.0);
        log.push(TriggerRecord::pulses(
            TriggerCode::new(3).unwrap(),
            101.0,
            101.0,
            101.25,
        ));
        let r = &log.records[0];
        assert_eq!(r.epoch_start, 1.0);
        assert_eq!(r.second_pulse_start, Some(1.25));
        assert_eq!(r.measured_interval, Some(0.25));

        let json = log.to_json().unwrap();
        assert!(json.contains("\"protocol\": \"pulse-interval\""));
        assert!(json.contains("\"code\": 3"));
    }

    #[test]
    fn writes_file() {
        let dir = std::env::temp_dir().join(format!("ssvep_log_{}", std::process::id()));
        let path = dir.join("triggers.json");
        let mut log = TriggerLog::new(0.0);
        log.push(TriggerRecord::binary(TriggerCode::SESSION_MARK, 2.0));
        log.write_json(&path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["records"][0]["code"], 13);
        assert!(value["records"][0].get("first_pulse_start").is_none());
        let _ = std::fs::remove_dir_all(&dir);
    }
}
